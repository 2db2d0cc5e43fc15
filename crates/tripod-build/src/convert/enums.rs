use super::field::enum_prefix;
use crate::config::Paths;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use tripod_schema::{naming, prelude::*};

/// Conversion functions for one locally defined enum field.
///
/// Storage and domain enums carry every declared literal. The wire enum
/// only carries numbered literals: an unnumbered literal goes out as 0 and
/// an unknown number comes back as the first declared variant.
#[must_use]
pub fn enum_fns(node: &Node, field: &Field, paths: &Paths) -> TokenStream {
    let Some(EnumKind::Local {
        type_name,
        literals,
        values,
    }) = field.enum_kind()
    else {
        return quote!();
    };

    let prefix = enum_prefix(node.name(), field);
    let storage = &paths.storage;
    let domain = &paths.domain;
    let module = naming::ident(&node.snake_name());
    let storage_enum = naming::ident(&naming::pascal(field.name()));
    let domain_enum = naming::ident(type_name);
    let storage_ty = quote!(#storage::#module::#storage_enum);
    let domain_ty = quote!(#domain::#domain_enum);

    let variants: Vec<_> = literals
        .iter()
        .map(|literal| naming::ident(&naming::pascal(literal)))
        .collect();
    let wire_variants: Vec<_> = values
        .iter()
        .map(|value| naming::ident(&value.variant()))
        .collect();
    let numbers: Vec<_> = values.iter().map(EnumValue::number).collect();

    let storage_to_domain = format_ident!("{prefix}_storage_to_domain");
    let domain_to_storage = format_ident!("{prefix}_domain_to_storage");
    let domain_to_wire = format_ident!("{prefix}_domain_to_wire");
    let wire_to_domain = format_ident!("{prefix}_wire_to_domain");

    let skipped = (wire_variants.len() < variants.len()).then(|| quote!(_ => 0,));

    let mut tokens = quote!();

    if node.has_storage() && !field.is_virtual() {
        tokens.extend(quote! {
            #[must_use]
            pub const fn #storage_to_domain(value: &#storage_ty) -> #domain_ty {
                match value {
                    #( #storage_ty::#variants => #domain_ty::#variants, )*
                }
            }

            #[must_use]
            pub const fn #domain_to_storage(value: &#domain_ty) -> #storage_ty {
                match value {
                    #( #domain_ty::#variants => #storage_ty::#variants, )*
                }
            }
        });
    }

    tokens.extend(quote! {
        #[must_use]
        pub const fn #domain_to_wire(value: &#domain_ty) -> i32 {
            match value {
                #( #domain_ty::#wire_variants => #numbers, )*
                #skipped
            }
        }

        #[must_use]
        pub fn #wire_to_domain(value: i32) -> #domain_ty {
            match value {
                #( #numbers => #domain_ty::#wire_variants, )*
                _ => ::std::default::Default::default(),
            }
        }
    });

    tokens
}
