use proc_macro2::TokenStream;
use syn::{DeriveInput, Lit, Meta, NestedMeta, Path};
use quote::quote;

#[derive(Default)]
struct Hooks {
    construct: Option<Path>,
    destruct: Option<Path>,
}

pub fn impl_component(ast: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();
    let hooks = parse_hooks(ast)?;

    let construct = hooks.construct.map(|path| {
        quote! {
            const CONSTRUCT: ::core::option::Option<fn(&mut Self)> = ::core::option::Option::Some(#path);
        }
    });

    let destruct = hooks.destruct.map(|path| {
        quote! {
            const DESTRUCT: ::core::option::Option<fn(&mut Self)> = ::core::option::Option::Some(#path);
        }
    });

    Ok(quote! {
        impl #impl_generics sparse_ecs::components::Component for #name #ty_generics #where_clause {
            #construct
            #destruct
        }
    })
}

fn parse_hooks(ast: &DeriveInput) -> syn::Result<Hooks> {
    let mut hooks = Hooks::default();

    for attr in ast.attrs.iter().filter(|a| a.path.is_ident("component")) {
        let list = match attr.parse_meta()? {
            Meta::List(list) => list,
            other => return Err(syn::Error::new_spanned(other, "expected #[component(...)]")),
        };

        for nested in list.nested {
            let pair = match nested {
                NestedMeta::Meta(Meta::NameValue(pair)) => pair,
                other => return Err(syn::Error::new_spanned(other, "expected `key = value`")),
            };

            let path = match &pair.lit {
                Lit::Str(value) => value.parse::<Path>()?,
                other => return Err(syn::Error::new_spanned(other, "expected a string literal path")),
            };

            if pair.path.is_ident("construct") {
                hooks.construct = Some(path);
            } else if pair.path.is_ident("destruct") {
                hooks.destruct = Some(path);
            } else {
                return Err(syn::Error::new_spanned(pair.path, "unknown component hook"));
            }
        }
    }

    Ok(hooks)
}
