mod component;

use proc_macro::TokenStream;

/// Implements `sparse_ecs::components::Component` for a `Pod` type.
///
/// Optional hooks can be attached with
/// `#[component(construct = "path::to::fn", destruct = "path::to::fn")]`,
/// where each function has the signature `fn(&mut Self)`.
#[proc_macro_derive(Component, attributes(component))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as syn::DeriveInput);
    match component::impl_component(&ast) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}
