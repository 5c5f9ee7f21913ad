use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, LitStr, Meta, Token, Type};

/// Derive macro that generates CSV column information from struct fields.
///
/// For each field, extracts:
/// - Key (respects #[serde(rename = "...")])
/// - Column header (first #[serde(alias = "...")], falling back to the key)
/// - Required (false for Option<T> or #[serde(default)])
/// - Description (from doc comments)
///
/// Fields marked #[serde(flatten)] are skipped.
///
/// Generates a `csv_schema() -> &'static [CsvField]` method.
#[proc_macro_derive(CsvSchema, attributes(serde))]
pub fn derive_csv_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "CsvSchema only supports structs with named fields",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(name, "CsvSchema only supports structs")),
    };

    let mut entries = Vec::new();
    for field in fields {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let attrs = serde_attrs(&field.attrs)?;
        if attrs.flatten {
            continue;
        }

        let key = attrs.rename.unwrap_or_else(|| ident.to_string());
        let column = attrs.alias.unwrap_or_else(|| key.clone());
        let required = !attrs.default && !is_option_type(&field.ty);
        let description = get_doc_comment(&field.attrs);

        entries.push(quote! {
            CsvField {
                key: #key,
                column: #column,
                required: #required,
                description: #description,
            }
        });
    }

    Ok(quote! {
        impl #name {
            pub fn csv_schema() -> &'static [CsvField] {
                static SCHEMA: &[CsvField] = &[
                    #(#entries),*
                ];
                SCHEMA
            }
        }
    })
}

#[derive(Default)]
struct SerdeAttrs {
    rename: Option<String>,
    alias: Option<String>,
    default: bool,
    flatten: bool,
}

fn serde_attrs(attrs: &[syn::Attribute]) -> syn::Result<SerdeAttrs> {
    let mut out = SerdeAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                out.rename = Some(lit.value());
            } else if meta.path.is_ident("alias") {
                let lit: LitStr = meta.value()?.parse()?;
                // first alias wins
                out.alias.get_or_insert(lit.value());
            } else if meta.path.is_ident("default") {
                out.default = true;
                if meta.input.peek(Token![=]) {
                    let _: LitStr = meta.value()?.parse()?;
                }
            } else if meta.path.is_ident("flatten") {
                out.flatten = true;
            } else if meta.input.peek(Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        })?;
    }
    Ok(out)
}

fn get_doc_comment(attrs: &[syn::Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }
            if let Meta::NameValue(meta) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &meta.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value().trim().to_string());
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
