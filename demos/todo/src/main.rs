//! Scripted CLI demo for the todo example.
//!
//! Set `RUST_LOG` to see the store's tracing output and
//! `SLICESTORE_METRICS=1` to print the Prometheus metrics at the end.

use slicestore_runtime::metrics::install_prometheus_recorder;
use todo::{View, create, create_store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo=info,slicestore_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let metrics = match std::env::var("SLICESTORE_METRICS") {
        Ok(value) if value == "1" => Some(install_prometheus_recorder()?),
        _ => None,
    };

    println!("=== Todo Example ===\n");

    let store = create_store()?;
    let app = create(&store, |view: View| {
        tracing::debug!(lines = view.to_text().lines().count(), "Root rendered");
    })?;
    println!("{}", app.view());

    for text in ["Learn reducers", "Compose slices", "Connect components"] {
        println!(">>> Adding '{text}'");
        app.add(text)?;
    }
    println!("{}", app.view());

    println!(">>> Clicking 'Compose slices'");
    app.click("Compose slices")?;
    println!("{}", app.view());

    println!(">>> Showing completed todos");
    app.click("Completed")?;
    println!("{}", app.view());

    println!(">>> Showing active todos");
    app.click("Active")?;
    println!("{}", app.view());

    println!(
        "Root renders: {} ({} dispatches + mount)",
        app.render_count(),
        app.render_count() - 1
    );

    app.unmount()?;

    if let Some(handle) = metrics {
        println!("\n=== Metrics ===\n{}", handle.render());
    }

    println!("=== Demo Complete ===");
    Ok(())
}
