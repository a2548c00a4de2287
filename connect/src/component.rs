//! Seams to the presentation layer.
//!
//! A [`Component`] is a pure function of props. A [`RenderTarget`] receives
//! each rendered output; what it does with it (print, diff, keep the latest)
//! is up to the caller.

use crate::props::Props;

/// A presentation component
///
/// Any `Fn(&Props<A>) -> O` is a component.
pub trait Component<A> {
    /// The view description this component renders
    type Output;

    /// Render the given props
    fn render(&self, props: &Props<A>) -> Self::Output;
}

impl<A, O, F> Component<A> for F
where
    F: Fn(&Props<A>) -> O,
{
    type Output = O;

    fn render(&self, props: &Props<A>) -> O {
        self(props)
    }
}

/// Destination for rendered output
///
/// Any `FnMut(O)` is a render target.
pub trait RenderTarget<O> {
    /// Accept the latest rendered output
    fn commit(&mut self, output: O);
}

impl<O, F> RenderTarget<O> for F
where
    F: FnMut(O),
{
    fn commit(&mut self, output: O) {
        self(output);
    }
}
