//! Derive macros for slicestore
//!
//! This crate provides procedural macros to reduce boilerplate when declaring
//! action enums.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Implements `slicestore_core::Action` for an enum
//!
//! # Example
//!
//! ```ignore
//! use slicestore_macros::Action;
//!
//! #[derive(Action, Clone, Debug)]
//! enum TodoAction {
//!     #[action(init)]
//!     Init,
//!
//!     AddTodo { id: u64, text: String },
//!
//!     #[action(rename = "TOGGLE")]
//!     ToggleTodo { id: u64 },
//! }
//!
//! // Generated:
//! assert_eq!(TodoAction::AddTodo { id: 0, text: "a".into() }.action_type(), "ADD_TODO");
//! assert_eq!(TodoAction::ToggleTodo { id: 0 }.action_type(), "TOGGLE");
//! assert!(TodoAction::init().is_init());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Variant, parse_macro_input};

/// Must match `slicestore_core::INIT_ACTION_TYPE`.
const INIT_ACTION_TYPE: &str = "@@slicestore/INIT";

/// Derive macro for action enums
///
/// Implements `slicestore_core::Action`:
/// - `action_type()` - the variant name in `SCREAMING_SNAKE_CASE`, or the
///   `rename` value
/// - `init()` - the variant marked `#[action(init)]`
///
/// # Attributes
///
/// - `#[action(init)]` - Marks the reserved init variant (exactly one, unit)
/// - `#[action(rename = "TYPE")]` - Overrides the discriminant
///
/// # Errors
///
/// This macro produces a compile error if:
/// - Applied to a non-enum type
/// - No variant, or more than one, is marked `#[action(init)]`
/// - The init variant has fields
/// - Two variants share a discriminant, or a variant claims the reserved one
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_action(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(error) => error.to_compile_error().into(),
    }
}

/// Parsed `#[action(...)]` options for one variant
#[derive(Default)]
struct VariantOptions {
    init: bool,
    rename: Option<String>,
}

fn expand_action(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(Action)] can only be used on enums",
        ));
    };

    let mut init_variant: Option<&Variant> = None;
    let mut seen_types: Vec<String> = Vec::new();
    let mut type_arms = Vec::new();

    for variant in &data_enum.variants {
        let options = parse_options(&variant.attrs)?;
        let variant_name = &variant.ident;

        let action_type = if options.init {
            if init_variant.is_some() {
                return Err(syn::Error::new_spanned(
                    variant,
                    "only one variant can be marked #[action(init)]",
                ));
            }
            if !matches!(variant.fields, Fields::Unit) {
                return Err(syn::Error::new_spanned(
                    variant,
                    "the #[action(init)] variant cannot carry fields",
                ));
            }
            if options.rename.is_some() {
                return Err(syn::Error::new_spanned(
                    variant,
                    "the #[action(init)] variant cannot be renamed",
                ));
            }
            init_variant = Some(variant);
            INIT_ACTION_TYPE.to_string()
        } else {
            let action_type = options
                .rename
                .unwrap_or_else(|| screaming_snake_case(&variant_name.to_string()));
            if action_type == INIT_ACTION_TYPE {
                return Err(syn::Error::new_spanned(
                    variant,
                    "this action type is reserved for the #[action(init)] variant",
                ));
            }
            action_type
        };

        if seen_types.contains(&action_type) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("action type \"{action_type}\" is used by more than one variant"),
            ));
        }
        seen_types.push(action_type.clone());

        type_arms.push(match &variant.fields {
            Fields::Named(_) => quote! { Self::#variant_name { .. } => #action_type, },
            Fields::Unnamed(_) => quote! { Self::#variant_name(..) => #action_type, },
            Fields::Unit => quote! { Self::#variant_name => #action_type, },
        });
    }

    let Some(init_variant) = init_variant else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(Action)] needs one unit variant marked #[action(init)]",
        ));
    };
    let init_name = &init_variant.ident;

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::slicestore_core::Action for #name #ty_generics #where_clause {
            fn action_type(&self) -> &'static str {
                match self {
                    #(#type_arms)*
                }
            }

            fn init() -> Self {
                Self::#init_name
            }
        }
    })
}

fn parse_options(attrs: &[Attribute]) -> syn::Result<VariantOptions> {
    let mut options = VariantOptions::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("action")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("init") {
                options.init = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                options.rename = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `init` or `rename = \"...\"`"))
            }
        })?;
    }

    Ok(options)
}

/// `SetVisibilityFilter` → `SET_VISIBILITY_FILTER`, `HTTPRequest` → `HTTP_REQUEST`
fn screaming_snake_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (index, &ch) in chars.iter().enumerate() {
        if ch == '_' {
            out.push('_');
            continue;
        }
        if index > 0 && ch.is_uppercase() {
            let prev = chars[index - 1];
            let next_is_lower = chars.get(index + 1).is_some_and(|c| c.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.extend(ch.to_uppercase());
    }

    out
}
