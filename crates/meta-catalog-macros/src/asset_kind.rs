//! Implementation of #[derive(AssetKind)] for asset detail structs

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Ident, LitStr};

pub fn derive_asset_kind_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    // Validate: must be a struct, the detail fields are flattened into `attributes`
    if !matches!(input.data, Data::Struct(_)) {
        return syn::Error::new_spanned(&input, "AssetKind only works on structs")
            .to_compile_error()
            .into();
    }

    let attrs = match parse_asset_attrs(&input.attrs) {
        Ok(attrs) => attrs,
        Err(err) => return err.to_compile_error().into(),
    };

    let Some(type_name) = attrs.type_name else {
        return syn::Error::new_spanned(
            &input,
            "AssetKind requires #[asset(type_name = \"...\")]",
        )
        .to_compile_error()
        .into();
    };

    // The record variant carries the type name verbatim
    let variant: Ident = match syn::parse_str(&type_name.value()) {
        Ok(ident) => ident,
        Err(_) => {
            return syn::Error::new_spanned(&type_name, "type_name must be a valid identifier")
                .to_compile_error()
                .into();
        }
    };

    let capabilities = &attrs.capabilities;

    let expanded = quote! {
        impl crate::asset::AssetKind for #name {
            const TYPE_NAME: &'static str = #type_name;
            const CAPABILITIES: &'static [crate::capability::Capability] = &[
                #(crate::capability::Capability::#capabilities),*
            ];

            fn from_record(
                record: crate::record::AssetRecord,
            ) -> ::std::result::Result<crate::asset::Asset<Self>, crate::record::AssetRecord> {
                match record {
                    crate::record::AssetRecord::#variant(asset) => ::std::result::Result::Ok(asset),
                    other => ::std::result::Result::Err(other),
                }
            }

            fn into_record(asset: crate::asset::Asset<Self>) -> crate::record::AssetRecord {
                crate::record::AssetRecord::#variant(asset)
            }
        }

        #(
            impl crate::capability::#capabilities for #name {}
        )*
    };

    TokenStream::from(expanded)
}

struct AssetAttrs {
    type_name: Option<LitStr>,
    capabilities: Vec<Ident>,
}

fn parse_asset_attrs(attrs: &[syn::Attribute]) -> syn::Result<AssetAttrs> {
    let mut parsed = AssetAttrs {
        type_name: None,
        capabilities: Vec::new(),
    };

    for attr in attrs {
        if !attr.path().is_ident("asset") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("type_name") {
                parsed.type_name = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("capabilities") {
                meta.parse_nested_meta(|capability| {
                    let ident = capability
                        .path
                        .get_ident()
                        .cloned()
                        .ok_or_else(|| capability.error("expected a capability name"))?;
                    parsed.capabilities.push(ident);
                    Ok(())
                })
            } else {
                Err(meta.error("unsupported asset attribute"))
            }
        })?;
    }

    Ok(parsed)
}
