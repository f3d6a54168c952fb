//! `#[derive(PathRecord)]` for `path_mapper`.
//!
//! The derive emits a static field table and positional accessors, so that
//! path placeholders can be resolved against the struct's field names at run
//! time without any further reflection.

use proc_macro::TokenStream;
use quote::{quote, ToTokens};
use syn::{
    ext::IdentExt, parse_macro_input, spanned::Spanned, Data, DeriveInput, Error, Fields, LitStr,
};

/// Implement `path_mapper::PathRecord` for a struct with named fields.
///
/// Field attributes, under `#[path_mapper(...)]`:
///
/// - `alias = "name"`: match placeholders against `name` instead of the
///   field identifier.
/// - `embed`: the field holds another `PathRecord` (bare, boxed or
///   optional) whose fields are promoted into this one.
/// - `readonly`: the field is resolved but refuses writes.
/// - `skip`: the field is not visible to placeholders at all.
#[proc_macro_derive(PathRecord, attributes(path_mapper))]
pub fn derive_path_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}

#[derive(Default)]
struct FieldOptions {
    alias: Option<LitStr>,
    embed: bool,
    readonly: bool,
    skip: bool,
}

impl FieldOptions {
    fn from_field(field: &syn::Field) -> Result<Self, Error> {
        let mut options = FieldOptions::default();
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("path_mapper")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("alias") {
                    options.alias = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("embed") {
                    options.embed = true;
                } else if meta.path.is_ident("readonly") {
                    options.readonly = true;
                } else if meta.path.is_ident("skip") {
                    options.skip = true;
                } else {
                    return Err(meta.error("expected `alias`, `embed`, `readonly` or `skip`"));
                }
                Ok(())
            })?;
        }
        Ok(options)
    }
}

fn expand(input: DeriveInput) -> Result<proc_macro2::TokenStream, Error> {
    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "#[derive(PathRecord)] does not support generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(Error::new(
                    input.ident.span(),
                    "#[derive(PathRecord)] requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.ident.span(),
                "#[derive(PathRecord)] can only be used on structs",
            ))
        }
    };

    let mut descriptors = Vec::new();
    let mut accessors = Vec::new();
    for field in fields {
        let options = FieldOptions::from_field(field)?;
        if options.skip {
            continue;
        }

        let index = descriptors.len();
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;
        let name = LitStr::new(&ident.unraw().to_string(), ident.span());
        let type_name = LitStr::new(
            &ty.to_token_stream().to_string().replace(' ', ""),
            ty.span(),
        );
        let alias = match &options.alias {
            Some(alias) => quote!(::core::option::Option::Some(#alias)),
            None => quote!(::core::option::Option::None),
        };
        let settable = !options.readonly;

        if options.embed {
            descriptors.push(quote! {
                ::path_mapper::Field {
                    ident: #name,
                    alias: #alias,
                    type_name: #type_name,
                    settable: #settable,
                    shape: ::path_mapper::FieldShape::Embedded(
                        <<#ty as ::path_mapper::Embed>::Target as ::path_mapper::PathRecord>::schema,
                    ),
                }
            });
            accessors.push(quote! {
                #index => ::core::option::Option::Some(::path_mapper::FieldMut::Record(
                    ::path_mapper::Embed::embedded_mut(&mut self.#ident),
                ))
            });
        } else {
            descriptors.push(quote! {
                ::path_mapper::Field {
                    ident: #name,
                    alias: #alias,
                    type_name: #type_name,
                    settable: #settable,
                    shape: ::path_mapper::FieldShape::Value,
                }
            });
            accessors.push(quote! {
                #index => ::core::option::Option::Some(::path_mapper::FieldMut::Value(&mut self.#ident))
            });
        }
    }

    let record = &input.ident;
    let record_name = LitStr::new(&record.unraw().to_string(), record.span());

    Ok(quote! {
        impl ::path_mapper::PathRecord for #record {
            fn schema() -> &'static ::path_mapper::Schema {
                static SCHEMA: ::path_mapper::Schema = ::path_mapper::Schema {
                    type_name: #record_name,
                    fields: &[#(#descriptors),*],
                };
                &SCHEMA
            }

            fn field_mut(
                &mut self,
                index: usize,
            ) -> ::core::option::Option<::path_mapper::FieldMut<'_>> {
                match index {
                    #(#accessors,)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        impl ::path_mapper::Embed for #record {
            type Target = Self;

            fn embedded_mut(&mut self) -> &mut Self {
                self
            }
        }
    })
}
