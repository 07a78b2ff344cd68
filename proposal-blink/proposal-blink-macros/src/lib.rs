extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse::Parse, parse::ParseStream, parse_macro_input, Ident, Item, LitStr, Result, Token};

const DEFAULT_RENAME_ALL: &str = "camelCase";
const SUPPORTED_RENAME_RULES: &[&str] = &[
    "lowercase",
    "UPPERCASE",
    "PascalCase",
    "camelCase",
    "snake_case",
    "SCREAMING_SNAKE_CASE",
    "kebab-case",
    "SCREAMING-KEBAB-CASE",
];

/// Arguments accepted by `#[api_dto]`, e.g. `#[api_dto(rename_all = "snake_case")]`.
struct ApiDtoArgs {
    rename_all: Option<LitStr>,
}

impl Parse for ApiDtoArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.is_empty() {
            return Ok(ApiDtoArgs { rename_all: None });
        }
        let key: Ident = input.parse()?;
        if key != "rename_all" {
            return Err(syn::Error::new(key.span(), "expected `rename_all = \"...\"`"));
        }
        input.parse::<Token![=]>()?;
        let value: LitStr = input.parse()?;
        if !SUPPORTED_RENAME_RULES.contains(&value.value().as_str()) {
            return Err(syn::Error::new(
                value.span(),
                format!("unsupported rename rule, expected one of: {}", SUPPORTED_RENAME_RULES.join(", ")),
            ));
        }
        Ok(ApiDtoArgs { rename_all: Some(value) })
    }
}

/// Marks a struct as a wire DTO of the action API.
///
/// Derives `Debug`, `Clone`, `PartialEq`, `serde::Serialize`, `serde::Deserialize`
/// and `utoipa::ToSchema`, and serializes fields in camelCase unless a
/// `rename_all` rule is given. Field-level `#[serde(...)]` attributes are kept.
#[proc_macro_attribute]
pub fn api_dto(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as ApiDtoArgs);
    let item = parse_macro_input!(input as Item);

    if !matches!(item, Item::Struct(_)) {
        return syn::Error::new_spanned(&item, "#[api_dto] can only be used on structs")
            .to_compile_error()
            .into();
    }

    let rename_all = args
        .rename_all
        .map(|lit| lit.value())
        .unwrap_or_else(|| DEFAULT_RENAME_ALL.to_string());

    let output = quote! {
        #[derive(
            ::std::fmt::Debug,
            ::std::clone::Clone,
            ::std::cmp::PartialEq,
            ::serde::Serialize,
            ::serde::Deserialize,
            ::utoipa::ToSchema,
        )]
        #[serde(rename_all = #rename_all)]
        #item
    };

    output.into()
}
