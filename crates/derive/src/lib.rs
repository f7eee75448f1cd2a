//! # Quire Derive Macros
//!
//! `#[derive(Object)]` generates the type descriptor of a struct or enum:
//! its persisted tag, its serializable fields, an allocator that builds a
//! skeleton without running any user constructor, and the field-level
//! encode/decode used by the serializer.
//!
//! Attributes:
//! - `#[quire(tag = "...")]` on the type: persisted tag, defaults to the Rust type name
//! - `#[quire(crate = "...")]` on the type: path of the quire crate, defaults to `::quire`
//! - `#[quire(rename = "...")]` on a field or variant: stored name, unique
//!   among the stored fields or variants of its type
//! - `#[quire(skip)]` on a field: not stored, rebuilt with `Default::default()`
//!
//! Compatible with `syn 2.0`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, parse_quote, Attribute, Data, DataEnum, DeriveInput, Fields, Generics,
    Ident, Index, LitStr, Member, Path, Type,
};
use std::collections::HashSet;

/// Derives `Codec` for structs and enums, and `Object` for structs.
#[proc_macro_derive(Object, attributes(quire))]
pub fn derive_object(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let attrs = parse_container_attributes(&input.attrs)?;

    if let Some(lifetime) = input.generics.lifetimes().next() {
        return Err(syn::Error::new_spanned(
            lifetime,
            "Object cannot be derived for types with lifetime parameters",
        ));
    }

    match &input.data {
        Data::Struct(data) => {
            let fields = collect_fields(&data.fields)?;
            Ok(generate_struct(&input, &attrs, &data.fields, &fields))
        }
        Data::Enum(data) => generate_enum(&input, &attrs, data),
        Data::Union(_) => Err(syn::Error::new(
            input.ident.span(),
            "Object cannot be derived for unions",
        )),
    }
}

// --- Attributes ---

struct ContainerAttributes {
    tag: Option<String>,
    krate: Path,
}

#[derive(Default)]
struct FieldAttributes {
    rename: Option<String>,
    skip: bool,
}

fn parse_container_attributes(attrs: &[Attribute]) -> syn::Result<ContainerAttributes> {
    let mut tag = None;
    let mut krate: Path = parse_quote!(::quire);

    for attr in attrs {
        if attr.path().is_ident("quire") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("tag") {
                    let s: LitStr = meta.value()?.parse()?;
                    if s.value().is_empty() {
                        return Err(meta.error("tag cannot be empty"));
                    }
                    tag = Some(s.value());
                    return Ok(());
                }

                if meta.path.is_ident("crate") {
                    let s: LitStr = meta.value()?.parse()?;
                    krate = s.parse()?;
                    return Ok(());
                }

                Err(meta.error("Unknown quire attribute on type. Supported: tag, crate"))
            })?;
        }
    }

    Ok(ContainerAttributes { tag, krate })
}

fn parse_field_attributes(attrs: &[Attribute]) -> syn::Result<FieldAttributes> {
    let mut parsed = FieldAttributes::default();

    for attr in attrs {
        if attr.path().is_ident("quire") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    parsed.skip = true;
                    return Ok(());
                }

                if meta.path.is_ident("rename") {
                    let s: LitStr = meta.value()?.parse()?;
                    parsed.rename = Some(s.value());
                    return Ok(());
                }

                Err(meta.error("Unknown quire attribute on field. Supported: skip, rename"))
            })?;
        }
    }

    Ok(parsed)
}

// --- Fields ---

struct FieldInfo {
    member: Member,
    binding: Ident,
    ty: Type,
    name: String,
    skip: bool,
}

fn collect_fields(fields: &Fields) -> syn::Result<Vec<FieldInfo>> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        let attrs = parse_field_attributes(&field.attrs)?;
        let (member, default_name) = match &field.ident {
            Some(ident) => (Member::Named(ident.clone()), ident.to_string()),
            None => (Member::Unnamed(Index::from(i)), i.to_string()),
        };
        let name = attrs.rename.unwrap_or(default_name);
        if !attrs.skip && !seen.insert(name.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate stored field name `{}`", name),
            ));
        }
        out.push(FieldInfo {
            member,
            binding: format_ident!("__quire_f{}", i),
            ty: field.ty.clone(),
            name,
            skip: attrs.skip,
        });
    }
    Ok(out)
}

/// Source text of a type without the token spacing `quote` inserts.
fn type_string(ty: &Type) -> String {
    let raw = quote!(#ty).to_string();
    let chars: Vec<char> = raw.chars().collect();
    let is_word = |c: Option<char>| c.map_or(false, |c| c.is_alphanumeric() || c == '_');

    let mut out = String::with_capacity(raw.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            if is_word(out.chars().last()) && is_word(chars.get(i + 1).copied()) {
                out.push(' ');
            }
            continue;
        }
        out.push(c);
    }
    out
}

/// Placeholder expression for one field of a fresh skeleton.
fn field_init(field: &FieldInfo, krate: &Path) -> TokenStream2 {
    let ty = &field.ty;
    if field.skip {
        quote! { ::core::default::Default::default() }
    } else {
        quote! { <#ty as #krate::Codec>::placeholder() }
    }
}

/// Constructor expression from per-field expressions, in declaration order.
fn construct(path: TokenStream2, style: &Fields, fields: &[FieldInfo], values: &[TokenStream2]) -> TokenStream2 {
    match style {
        Fields::Named(_) => {
            let members = fields.iter().map(|f| &f.member);
            quote! { #path { #(#members: #values),* } }
        }
        Fields::Unnamed(_) => quote! { #path( #(#values),* ) },
        Fields::Unit => path,
    }
}

fn bounded_generics(generics: &Generics, krate: &Path) -> Generics {
    let mut generics = generics.clone();
    let params: Vec<Ident> = generics.type_params().map(|p| p.ident.clone()).collect();
    let where_clause = generics.make_where_clause();
    for param in params {
        where_clause
            .predicates
            .push(parse_quote!(#param: #krate::Codec));
    }
    generics
}

fn type_tag_fn(attrs: &ContainerAttributes) -> TokenStream2 {
    let krate = &attrs.krate;
    match &attrs.tag {
        Some(tag) => quote! {
            fn type_tag() -> #krate::TypeTag {
                #krate::TypeTag::new(#tag)
            }
        },
        None => quote! {},
    }
}

// --- Generator: structs ---

fn generate_struct(
    input: &DeriveInput,
    attrs: &ContainerAttributes,
    style: &Fields,
    fields: &[FieldInfo],
) -> TokenStream2 {
    let name = &input.ident;
    let krate = &attrs.krate;
    let generics = bounded_generics(&input.generics, krate);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let stored: Vec<&FieldInfo> = fields.iter().filter(|f| !f.skip).collect();

    let inits: Vec<TokenStream2> = fields.iter().map(|f| field_init(f, krate)).collect();
    let allocate = construct(quote!(Self), style, fields, &inits);

    let descriptors = stored.iter().map(|f| {
        let field_name = &f.name;
        let declared = type_string(&f.ty);
        quote! { #krate::FieldDescriptor::new(#field_name, #declared) }
    });

    let writes = stored.iter().map(|f| {
        let member = &f.member;
        let field_name = &f.name;
        quote! { out.write(#field_name, &self.#member)?; }
    });

    let reads = stored.iter().map(|f| {
        let member = &f.member;
        let field_name = &f.name;
        quote! { input.assign(#field_name, &mut self.#member)?; }
    });

    let tag_fn = type_tag_fn(attrs);

    quote! {
        impl #impl_generics #krate::Object for #name #ty_generics #where_clause {
            fn allocate() -> Self {
                #allocate
            }

            fn fields() -> &'static [#krate::FieldDescriptor] {
                const FIELDS: &[#krate::FieldDescriptor] = &[#(#descriptors),*];
                FIELDS
            }

            #[allow(unused_variables)]
            fn write_fields(&self, out: &mut #krate::FieldWriter<'_, '_>) -> #krate::Result<()> {
                #(#writes)*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn read_fields(&mut self, input: &mut #krate::FieldReader<'_, '_>) -> #krate::Result<()> {
                #(#reads)*
                ::core::result::Result::Ok(())
            }
        }

        impl #impl_generics #krate::Codec for #name #ty_generics #where_clause {
            fn encode(&self, ctx: &mut #krate::EncodeContext<'_>) -> #krate::Result<#krate::Node> {
                #krate::encode_object(self, ctx)
            }

            fn decode(node: &#krate::Node, ctx: &mut #krate::DecodeContext<'_>) -> #krate::Result<Self> {
                #krate::decode_object(node, ctx)
            }

            fn placeholder() -> Self {
                <Self as #krate::Object>::allocate()
            }

            fn layout() -> ::core::option::Option<&'static [#krate::FieldDescriptor]> {
                ::core::option::Option::Some(<Self as #krate::Object>::fields())
            }

            #tag_fn
        }
    }
}

// --- Generator: enums ---

struct VariantInfo {
    ident: Ident,
    name: String,
    style: Fields,
    fields: Vec<FieldInfo>,
}

fn collect_variants(data: &DataEnum) -> syn::Result<Vec<VariantInfo>> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        let attrs = parse_field_attributes(&variant.attrs)?;
        if attrs.skip {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "variants cannot be skipped",
            ));
        }
        let name = attrs.rename.unwrap_or_else(|| variant.ident.to_string());
        if !seen.insert(name.clone()) {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                format!("duplicate stored variant name `{}`", name),
            ));
        }
        out.push(VariantInfo {
            ident: variant.ident.clone(),
            name,
            style: variant.fields.clone(),
            fields: collect_fields(&variant.fields)?,
        });
    }
    Ok(out)
}

fn generate_enum(
    input: &DeriveInput,
    attrs: &ContainerAttributes,
    data: &DataEnum,
) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let krate = &attrs.krate;
    let variants = collect_variants(data)?;

    let first = variants.first().ok_or_else(|| {
        syn::Error::new(
            input.ident.span(),
            "Object cannot be derived for enums without variants",
        )
    })?;

    let generics = bounded_generics(&input.generics, krate);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let placeholder = {
        let ident = &first.ident;
        let inits: Vec<TokenStream2> = first.fields.iter().map(|f| field_init(f, krate)).collect();
        construct(quote!(Self::#ident), &first.style, &first.fields, &inits)
    };

    let encode_arms = variants.iter().map(|v| {
        let ident = &v.ident;
        let variant_name = &v.name;
        let patterns: Vec<TokenStream2> = v
            .fields
            .iter()
            .map(|f| {
                if f.skip {
                    quote!(_)
                } else {
                    let binding = &f.binding;
                    quote!(#binding)
                }
            })
            .collect();
        let pattern = construct(quote!(Self::#ident), &v.style, &v.fields, &patterns);

        let stored: Vec<&FieldInfo> = v.fields.iter().filter(|f| !f.skip).collect();
        let body = if stored.is_empty() {
            quote! { ::std::vec::Vec::new() }
        } else {
            let writes = stored.iter().map(|f| {
                let binding = &f.binding;
                let field_name = &f.name;
                quote! { out.write(#field_name, #binding)?; }
            });
            quote! {{
                let mut out = #krate::FieldWriter::new(ctx);
                #(#writes)*
                out.finish()
            }}
        };

        quote! {
            #pattern => ::core::result::Result::Ok(#krate::Node::Variant {
                tag,
                variant: ::std::string::String::from(#variant_name),
                fields: #body,
            }),
        }
    });

    let decode_arms = variants.iter().map(|v| {
        let ident = &v.ident;
        let variant_name = &v.name;
        let lets = v.fields.iter().filter(|f| !f.skip).map(|f| {
            let binding = &f.binding;
            let ty = &f.ty;
            let field_name = &f.name;
            quote! {
                let mut #binding = <#ty as #krate::Codec>::placeholder();
                input.assign(#field_name, &mut #binding)?;
            }
        });
        let values: Vec<TokenStream2> = v
            .fields
            .iter()
            .map(|f| {
                if f.skip {
                    quote!(::core::default::Default::default())
                } else {
                    let binding = &f.binding;
                    quote!(#binding)
                }
            })
            .collect();
        let value = construct(quote!(Self::#ident), &v.style, &v.fields, &values);

        quote! {
            #variant_name => {
                #(#lets)*
                #value
            }
        }
    });

    let tag_fn = type_tag_fn(attrs);

    Ok(quote! {
        impl #impl_generics #krate::Codec for #name #ty_generics #where_clause {
            fn encode(&self, ctx: &mut #krate::EncodeContext<'_>) -> #krate::Result<#krate::Node> {
                let tag = <Self as #krate::Codec>::type_tag();
                ctx.nested(|ctx| match self {
                    #(#encode_arms)*
                })
            }

            fn decode(node: &#krate::Node, ctx: &mut #krate::DecodeContext<'_>) -> #krate::Result<Self> {
                let tag = <Self as #krate::Codec>::type_tag();
                let (variant, fields) = #krate::variant_parts(node, &tag)?;
                ctx.nested(|ctx| {
                    #[allow(unused_mut)]
                    let mut input = #krate::FieldReader::new(ctx, &tag, fields);
                    let value = match variant {
                        #(#decode_arms)*
                        other => {
                            return ::core::result::Result::Err(#krate::Error::UnknownVariant {
                                tag: tag.clone(),
                                variant: ::std::string::String::from(other),
                            })
                        }
                    };
                    input.finish();
                    ::core::result::Result::Ok(value)
                })
            }

            fn placeholder() -> Self {
                #placeholder
            }

            #tag_fn
        }
    })
}
