//! Storage, domain and wire conversion synthesis.
//!
//! Every member conversion is a [`Conversion`]: a plain expression, or a
//! setup statement plus the usage expression that reads its result. Mappers
//! emit all setups before the struct literal, so a failed parse returns a
//! field-named `ConvertError` instead of aborting.

pub mod enums;
pub mod field;
pub mod kind;
pub mod mapper;


pub use kind::{Chain, Kind, Layer, Operand, Step};

use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote};

///
/// Conversion
///

#[derive(Clone, Debug)]
pub enum Conversion {
    Expr(TokenStream),
    TwoPhase {
        setup: TokenStream,
        usage: TokenStream,
    },
}

impl Conversion {
    #[must_use]
    pub fn default_value() -> Self {
        Self::Expr(quote!(::std::default::Default::default()))
    }

    #[must_use]
    pub const fn is_fallible(&self) -> bool {
        matches!(self, Self::TwoPhase { .. })
    }

    #[must_use]
    pub const fn setup(&self) -> Option<&TokenStream> {
        match self {
            Self::Expr(_) => None,
            Self::TwoPhase { setup, .. } => Some(setup),
        }
    }

    #[must_use]
    pub const fn usage(&self) -> &TokenStream {
        match self {
            Self::Expr(expr) => expr,
            Self::TwoPhase { usage, .. } => usage,
        }
    }

    /// Bind a `?`-propagating expression to a local.
    fn bind(var: &Ident, expr: &TokenStream) -> Self {
        Self::TwoPhase {
            setup: quote!(let #var = #expr;),
            usage: quote!(#var),
        }
    }
}

///
/// Route
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Route {
    StorageToDomain,
    DomainToStorage,
    DomainToWire,
    WireToDomain,
}

impl Route {
    pub const ALL: [Self; 4] = [
        Self::StorageToDomain,
        Self::DomainToStorage,
        Self::DomainToWire,
        Self::WireToDomain,
    ];

    #[must_use]
    pub const fn layers(self) -> (Layer, Layer) {
        match self {
            Self::StorageToDomain => (Layer::Storage, Layer::Domain),
            Self::DomainToStorage => (Layer::Domain, Layer::Storage),
            Self::DomainToWire => (Layer::Domain, Layer::Wire),
            Self::WireToDomain => (Layer::Wire, Layer::Domain),
        }
    }

    /// `<node>_<from>_to_<to>`
    #[must_use]
    pub fn fn_ident(self, node_snake: &str) -> Ident {
        let (from, to) = self.layers();
        format_ident!("{node_snake}_{}_to_{}", from.label(), to.label())
    }

    #[must_use]
    pub const fn touches_storage(self) -> bool {
        matches!(self, Self::StorageToDomain | Self::DomainToStorage)
    }
}

///
/// Fragment
/// the conversion of one target member
///

#[derive(Clone, Debug)]
pub struct Fragment {
    pub member: String,
    pub route: Route,
    pub conversion: Conversion,
}

///
/// Shape
/// the container around an element value
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Shape {
    Plain,
    Optional,
    Repeated,
}

/// Move `source` from one shape to another through `chain`.
/// `var` names the setup local when the chain can fail.
#[must_use]
pub fn reshape(
    source: &TokenStream,
    from: Shape,
    to: Shape,
    chain: &Chain,
    label: &str,
    var: &Ident,
) -> Conversion {
    let fallible = chain.is_fallible();
    let v = format_ident!("v");
    let body = chain.render(Operand::Ref(v.clone()), label);
    let closure = if fallible {
        quote!(|#v| -> ::std::result::Result<_, ConvertError> { Ok(#body) })
    } else {
        quote!(|#v| #body)
    };

    let expr = match (from, to) {
        (Shape::Plain, Shape::Plain) => chain.render(Operand::Place(source.clone()), label),

        (Shape::Plain, Shape::Optional) if fallible && chain.starts_with_parse() => {
            // empty text stands for an absent value
            let value = chain.render(Operand::Place(source.clone()), label);
            quote! {
                (!#source.is_empty())
                    .then(|| -> ::std::result::Result<_, ConvertError> { Ok(#value) })
                    .transpose()?
            }
        }
        (Shape::Plain, Shape::Optional) => {
            let value = chain.render(Operand::Place(source.clone()), label);
            quote!(Some(#value))
        }

        (Shape::Optional | Shape::Repeated, _) if chain.is_identity() && from == to => {
            quote!(#source.clone())
        }

        (Shape::Optional, Shape::Optional) if fallible => {
            quote!(#source.as_ref().map(#closure).transpose()?)
        }
        (Shape::Optional, Shape::Optional) => quote!(#source.as_ref().map(#closure)),

        (Shape::Optional, Shape::Plain) if fallible => {
            quote!(#source.as_ref().map(#closure).transpose()?.unwrap_or_default())
        }
        (Shape::Optional, Shape::Plain) => {
            quote!(#source.as_ref().map(#closure).unwrap_or_default())
        }

        (Shape::Repeated, Shape::Repeated) if fallible => quote! {
            #source
                .iter()
                .map(#closure)
                .collect::<::std::result::Result<::std::vec::Vec<_>, _>>()?
        },
        (Shape::Repeated, Shape::Repeated) => quote!(#source.iter().map(#closure).collect()),

        // lists never change shape
        _ => return Conversion::default_value(),
    };

    if fallible {
        Conversion::bind(var, &expr)
    } else {
        Conversion::Expr(expr)
    }
}

/// Setup local for a member.
#[must_use]
pub fn setup_var(member: &str) -> Ident {
    format_ident!("{}_val", member.trim_start_matches("r#"))
}

/// Generated error type shared by every mapper.
#[must_use]
pub fn support() -> TokenStream {
    quote! {
        /// Runtime conversion failure, carrying the dotted field path.
        #[derive(Debug)]
        pub struct ConvertError {
            path: ::std::vec::Vec<&'static str>,
            source: ::std::boxed::Box<dyn ::std::error::Error + Send + Sync>,
        }

        impl ConvertError {
            pub fn field<E>(name: &'static str, source: E) -> Self
            where
                E: ::std::convert::Into<::std::boxed::Box<dyn ::std::error::Error + Send + Sync>>,
            {
                Self {
                    path: ::std::vec![name],
                    source: source.into(),
                }
            }

            #[must_use]
            pub fn within(mut self, name: &'static str) -> Self {
                self.path.insert(0, name);
                self
            }

            #[must_use]
            pub fn path(&self) -> ::std::string::String {
                self.path.join(".")
            }
        }

        impl ::std::fmt::Display for ConvertError {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "invalid value for '{}': {}", self.path(), self.source)
            }
        }

        impl ::std::error::Error for ConvertError {
            fn source(&self) -> ::std::option::Option<&(dyn ::std::error::Error + 'static)> {
                Some(&*self.source)
            }
        }
    }
}
