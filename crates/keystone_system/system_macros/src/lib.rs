//! Procedural macros for the `keystone_system` crate.
//!
//! This crate provides `#[derive(Injectable)]`, which generates the field
//! descriptors the injector walks.
//!
//! # Example
//!
//! ```ignore
//! use keystone_system::prelude::*;
//!
//! #[derive(Injectable)]
//! struct Render {
//!     #[world("ui")]
//!     ui: Option<World>,
//!     #[pool]
//!     sprites: Option<Pool<Sprite>>,
//!     #[shared]
//!     config: Option<Arc<Config>>,
//!     #[inject]
//!     logger: Option<Arc<dyn Log>>,
//! }
//! ```

mod crate_path;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    Attribute, Data, DeriveInput, Error, Field, GenericArgument, Index, LitStr, Member, Meta,
    PathArguments, Type, parse_macro_input,
};

/// Derives `Injectable` for a struct.
///
/// Every field is described to the injector in declaration order. The slot
/// passed for each field is chosen from its declared type:
///
/// | Declared type | Slot |
/// |---------------|------|
/// | `Option<World>` | world |
/// | `Option<Pool<T>>` | pool |
/// | `Option<F>` with `#[shared]` or `#[inject]` | value (`F: Clone + 'static`) |
/// | anything else | opaque |
///
/// Slots are chosen from the field's resolved type, so type aliases work and
/// unrelated types that happen to be named `World` or `Pool` stay opaque.
///
/// # Attributes
///
/// - `#[world]`, `#[world("name")]` - receive the named world (default world if omitted)
/// - `#[pool]`, `#[pool("name")]` - receive the pool from the named world
/// - `#[shared]` - receive the shared context object
/// - `#[inject]` - receive the first matching custom inject
///
/// Tagged fields must be declared as `Option<_>`.
///
/// # Generated Code
///
/// ```ignore
/// #[derive(Injectable)]
/// struct Movement {
///     #[pool]
///     positions: Option<Pool<Position>>,
///     speed: f32,
/// }
/// ```
///
/// expands to:
///
/// ```ignore
/// impl Injectable for Movement {
///     fn visit_fields(&mut self, visitor: &mut dyn FieldVisitor) -> Result<(), InjectError> {
///         use select::{SelectOpaque as _, SelectPool as _, SelectValue as _, SelectWorld as _};
///         visitor.visit_field(Field::new(
///             "positions",
///             &[FieldTag::Pool("")],
///             (&&&SlotSelector::<Option<Pool<Position>>, false>::new())
///                 .field_slot(&mut self.positions),
///         ))?;
///         visitor.visit_field(Field::new(
///             "speed",
///             &[],
///             (&&&SlotSelector::<f32, false>::new()).field_slot(&mut self.speed),
///         ))?;
///         Ok(())
///     }
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(world, pool, shared, inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_injectable(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn expand_injectable(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(
            &input.ident,
            "`Injectable` can only be derived for structs",
        ));
    };

    // Auto-detect crate path (works with both `keystone_system` and `keystone` umbrella).
    let ks = crate_path::keystone_system_path();

    let mut visits = Vec::new();
    for (index, field) in data.fields.iter().enumerate() {
        let (member, name) = match &field.ident {
            Some(ident) => (Member::Named(ident.clone()), ident.unraw().to_string()),
            None => (Member::Unnamed(Index::from(index)), index.to_string()),
        };
        let tags = parse_tags(field)?;
        let slot = field_slot(&ks, field, &member, &tags)?;
        let tag_exprs = tags.iter().map(|tag| tag.to_expr(&ks));

        visits.push(quote! {
            visitor.visit_field(#ks::inject::Field::new(
                #name,
                &[#(#tag_exprs),*],
                #slot,
            ))?;
        });
    }

    // Keep `visitor` used for structs without fields.
    let body = if visits.is_empty() {
        quote!(let _ = visitor;)
    } else {
        quote! {
            #[allow(unused_imports)]
            use #ks::inject::select::{
                SelectOpaque as _, SelectPool as _, SelectValue as _, SelectWorld as _,
            };
            #(#visits)*
        }
    };

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #ks::inject::Injectable for #ident #ty_generics #where_clause {
            fn visit_fields(
                &mut self,
                visitor: &mut dyn #ks::inject::FieldVisitor,
            ) -> ::core::result::Result<(), #ks::inject::InjectError> {
                #body
                ::core::result::Result::Ok(())
            }
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tags
// ─────────────────────────────────────────────────────────────────────────────

/// A parsed field attribute.
enum Tag {
    Shared,
    Inject,
    World(LitStr),
    Pool(LitStr),
}

impl Tag {
    fn kind(&self) -> &'static str {
        match self {
            Tag::Shared => "shared",
            Tag::Inject => "inject",
            Tag::World(_) => "world",
            Tag::Pool(_) => "pool",
        }
    }

    fn to_expr(&self, ks: &TokenStream2) -> TokenStream2 {
        match self {
            Tag::Shared => quote!(#ks::inject::FieldTag::Shared),
            Tag::Inject => quote!(#ks::inject::FieldTag::Inject),
            Tag::World(name) => quote!(#ks::inject::FieldTag::World(#name)),
            Tag::Pool(name) => quote!(#ks::inject::FieldTag::Pool(#name)),
        }
    }
}

/// Collects the injection attributes on `field`, rejecting malformed or
/// repeated ones.
fn parse_tags(field: &Field) -> syn::Result<Vec<Tag>> {
    let mut tags: Vec<Tag> = Vec::new();

    for attr in &field.attrs {
        let Some(tag) = parse_tag(attr)? else {
            continue;
        };
        if tags.iter().any(|existing| existing.kind() == tag.kind()) {
            return Err(Error::new_spanned(
                attr,
                format!("duplicate `#[{}]` attribute", tag.kind()),
            ));
        }
        tags.push(tag);
    }

    Ok(tags)
}

fn parse_tag(attr: &Attribute) -> syn::Result<Option<Tag>> {
    let path = attr.path();

    if path.is_ident("shared") || path.is_ident("inject") {
        let tag = if path.is_ident("shared") {
            Tag::Shared
        } else {
            Tag::Inject
        };
        if !matches!(attr.meta, Meta::Path(_)) {
            return Err(Error::new_spanned(
                attr,
                format!("`#[{}]` takes no arguments", tag.kind()),
            ));
        }
        return Ok(Some(tag));
    }

    if path.is_ident("world") || path.is_ident("pool") {
        let kind = if path.is_ident("world") { "world" } else { "pool" };
        let name = match &attr.meta {
            Meta::Path(path) => LitStr::new("", path.segments[0].ident.span()),
            Meta::List(list) => list.parse_args::<LitStr>()?,
            Meta::NameValue(_) => {
                return Err(Error::new_spanned(
                    attr,
                    format!("expected `#[{kind}]` or `#[{kind}(\"name\")]`"),
                ));
            }
        };
        let tag = if kind == "world" {
            Tag::World(name)
        } else {
            Tag::Pool(name)
        };
        return Ok(Some(tag));
    }

    Ok(None)
}

// ─────────────────────────────────────────────────────────────────────────────
// Slots
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the `FieldSlot` expression for `field`.
///
/// The slot kind is picked by the compiler from the field's real type through
/// `inject::select`, so a foreign `Pool<T>` or `World` stays opaque.
fn field_slot(
    ks: &TokenStream2,
    field: &Field,
    member: &Member,
    tags: &[Tag],
) -> syn::Result<TokenStream2> {
    let ty = &field.ty;
    if let Some(tag) = tags.first()
        && option_inner(ty).is_none()
    {
        return Err(Error::new_spanned(
            ty,
            format!("`#[{}]` fields must be declared as `Option<_>`", tag.kind()),
        ));
    }

    let value = tags
        .iter()
        .any(|tag| matches!(tag, Tag::Shared | Tag::Inject));

    Ok(quote! {
        (&&&#ks::inject::select::SlotSelector::<#ty, #value>::new()).field_slot(&mut self.#member)
    })
}

/// Strips invisible groups and parentheses around a type.
fn peel(ty: &Type) -> &Type {
    match ty {
        Type::Group(group) => peel(&group.elem),
        Type::Paren(paren) => peel(&paren.elem),
        _ => ty,
    }
}

/// If `ty` is `Option<T>`, returns `T`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = peel(ty) else {
        return None;
    };
    if type_path.qself.is_some() {
        return None;
    }

    let last_segment = type_path.path.segments.last()?;
    if last_segment.ident != "Option" {
        return None;
    }

    let PathArguments::AngleBracketed(angle_args) = &last_segment.arguments else {
        return None;
    };
    if angle_args.args.len() != 1 {
        return None;
    }

    let GenericArgument::Type(inner) = &angle_args.args[0] else {
        return None;
    };
    Some(peel(inner))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(source: &str) -> Type {
        syn::parse_str(source).unwrap()
    }

    fn field(source: &str) -> Field {
        let input: DeriveInput = syn::parse_str(&format!("struct S {{ {source} }}")).unwrap();
        let Data::Struct(data) = input.data else {
            unreachable!()
        };
        data.fields.into_iter().next().unwrap()
    }

    fn slot(source: &str) -> syn::Result<String> {
        let field = field(source);
        let member = Member::Named(field.ident.clone().unwrap());
        let tags = parse_tags(&field)?;
        field_slot(&quote!(ks), &field, &member, &tags).map(|tokens| tokens.to_string())
    }

    #[test]
    fn option_inner_extracts_type() {
        assert!(option_inner(&ty("Option<Pool<Position>>")).is_some());
        assert!(option_inner(&ty("std::option::Option<World>")).is_some());
        assert!(option_inner(&ty("Vec<World>")).is_none());
        assert!(option_inner(&ty("World")).is_none());
    }

    #[test]
    fn slot_is_selected_by_type() {
        let world = slot("#[world] w: Option<World>").unwrap();
        assert!(world.contains("SlotSelector :: < Option < World > , false >"));
        assert!(world.contains("field_slot (& mut self . w)"));

        let pool = slot("p: Option<conn::Pool<u8>>").unwrap();
        assert!(pool.contains("SlotSelector :: < Option < conn :: Pool < u8 > > , false >"));

        let speed = slot("speed: f32").unwrap();
        assert!(speed.contains("SlotSelector :: < f32 , false >"));
    }

    #[test]
    fn shared_and_inject_enable_value_slots() {
        assert!(slot("#[shared] c: Option<Arc<Config>>").unwrap().contains(", true >"));
        assert!(slot("#[inject] l: Option<Arc<dyn Log>>").unwrap().contains(", true >"));
        assert!(slot("#[pool] p: Option<Pool<Hit>>").unwrap().contains(", false >"));
        assert!(slot("c: Option<Arc<Config>>").unwrap().contains(", false >"));
    }

    #[test]
    fn tagged_non_option_is_rejected() {
        let err = slot("#[shared] config: Arc<Config>").unwrap_err();
        assert!(err.to_string().contains("must be declared as `Option<_>`"));
    }

    #[test]
    fn world_and_pool_names_are_parsed() {
        let tags = parse_tags(&field("#[world(\"ui\")] #[pool] w: Option<World>")).unwrap();

        assert_eq!(tags.len(), 2);
        let Tag::World(name) = &tags[0] else {
            panic!("expected world tag");
        };
        assert_eq!(name.value(), "ui");
        let Tag::Pool(name) = &tags[1] else {
            panic!("expected pool tag");
        };
        assert_eq!(name.value(), "");
    }

    #[test]
    fn malformed_attributes_are_rejected() {
        assert!(parse_tags(&field("#[shared(x)] c: Option<u8>")).is_err());
        assert!(parse_tags(&field("#[inject = \"x\"] c: Option<u8>")).is_err());
        assert!(parse_tags(&field("#[world = \"x\"] w: Option<World>")).is_err());
        assert!(parse_tags(&field("#[world(events)] w: Option<World>")).is_err());
        assert!(parse_tags(&field("#[shared] #[shared] c: Option<u8>")).is_err());
    }

    #[test]
    fn other_attributes_are_ignored() {
        let tags = parse_tags(&field("#[doc = \"x\"] #[allow(unused)] c: Option<u8>")).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn enums_are_rejected() {
        let input: DeriveInput = syn::parse_str("enum E { A }").unwrap();
        let err = expand_injectable(&input).unwrap_err();
        assert!(err.to_string().contains("only be derived for structs"));
    }

    #[test]
    fn tuple_fields_are_named_by_index() {
        let input: DeriveInput = syn::parse_str("struct T(#[world] Option<World>, u8);").unwrap();
        let expanded = expand_injectable(&input).unwrap().to_string();

        assert!(expanded.contains("\"0\""));
        assert!(expanded.contains("\"1\""));
        assert!(expanded.contains("self . 0"));
        assert!(expanded.contains("SelectWorld as _"));
    }

    #[test]
    fn unit_struct_uses_visitor() {
        let input: DeriveInput = syn::parse_str("struct Empty;").unwrap();
        let expanded = expand_injectable(&input).unwrap().to_string();

        assert!(expanded.contains("let _ = visitor ;"));
    }
}
