//! Structural descriptors of Rust value types, used to match values
//! with the codecs that can handle them.
//!
//! A [GenericType] is derived from a type with [GenericType::of], which goes through
//! the [Reflect] trait. Its erased counterpart, [RawType], drops type arguments
//! of parameterized types (`HashMap<K, V>` becomes `HashMap`), but keeps the
//! structure of arrays and optional wrappers. Hence `Vec<i8>` and `Vec<Option<i8>>`
//! are different both as generic types and as raw types.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use bytes::Bytes;
use uuid::Uuid;

/// Non-nullable scalar types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PrimitiveType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl PrimitiveType {
    fn name(self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::I8 => "i8",
            PrimitiveType::I16 => "i16",
            PrimitiveType::I32 => "i32",
            PrimitiveType::I64 => "i64",
            PrimitiveType::F32 => "f32",
            PrimitiveType::F64 => "f64",
        }
    }
}

/// Describes a Rust value type, including its type arguments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum GenericType {
    /// A non-nullable scalar, e.g. `i8`.
    Primitive(PrimitiveType),
    /// A nullable wrapper, e.g. `Option<i8>`.
    Optional(Box<GenericType>),
    /// A named type without type arguments, e.g. `String`.
    Class(&'static str),
    /// A sequence of elements, i.e. `Vec<T>`.
    Array(Box<GenericType>),
    /// A named type with type arguments, e.g. `HashMap<String, i32>`.
    Parameterized {
        raw: &'static str,
        args: Vec<GenericType>,
    },
}

/// A [GenericType] with the type arguments of parameterized types erased.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum RawType {
    Primitive(PrimitiveType),
    Optional(Box<RawType>),
    Class(&'static str),
    Array(Box<RawType>),
}

impl GenericType {
    /// Returns the descriptor of `T`.
    pub fn of<T: Reflect>() -> Self {
        T::generic_type()
    }

    /// Returns the descriptor of a `Vec` with elements described by `component`.
    pub fn array_of(component: GenericType) -> Self {
        GenericType::Array(Box::new(component))
    }

    /// Returns the descriptor of an `Option` wrapping `inner`.
    pub fn optional_of(inner: GenericType) -> Self {
        GenericType::Optional(Box::new(inner))
    }

    /// Returns the element descriptor if this is an array.
    pub fn component(&self) -> Option<&GenericType> {
        match self {
            GenericType::Array(component) => Some(component),
            _ => None,
        }
    }

    pub fn raw_type(&self) -> RawType {
        match self {
            GenericType::Primitive(p) => RawType::Primitive(*p),
            GenericType::Optional(inner) => RawType::Optional(Box::new(inner.raw_type())),
            GenericType::Class(name) => RawType::Class(*name),
            GenericType::Array(component) => RawType::Array(Box::new(component.raw_type())),
            GenericType::Parameterized { raw, .. } => RawType::Class(*raw),
        }
    }

    /// Structural equality with another descriptor.
    pub fn matches_exact(&self, other: &GenericType) -> bool {
        self == other
    }

    /// Compares the erased form of this descriptor with `raw`.
    pub fn matches_raw(&self, raw: &RawType) -> bool {
        self.raw_type() == *raw
    }
}

impl fmt::Display for GenericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenericType::Primitive(p) => f.write_str(p.name()),
            GenericType::Optional(inner) => write!(f, "Option<{}>", inner),
            GenericType::Class(name) => f.write_str(name),
            GenericType::Array(component) => write!(f, "Vec<{}>", component),
            GenericType::Parameterized { raw, args } => {
                write!(f, "{}<", raw)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(">")
            }
        }
    }
}

impl fmt::Display for RawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawType::Primitive(p) => f.write_str(p.name()),
            RawType::Optional(inner) => write!(f, "Option<{}>", inner),
            RawType::Class(name) => f.write_str(name),
            RawType::Array(component) => write!(f, "Vec<{}>", component),
        }
    }
}

/// Types that can describe themselves with a [GenericType].
pub trait Reflect: 'static {
    fn generic_type() -> GenericType;
}

macro_rules! impl_reflect_primitive {
    ($($t:ty => $p:ident),* $(,)?) => {
        $(
            impl Reflect for $t {
                fn generic_type() -> GenericType {
                    GenericType::Primitive(PrimitiveType::$p)
                }
            }
        )*
    };
}

impl_reflect_primitive!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
);

macro_rules! impl_reflect_class {
    ($($t:ty => $name:literal),* $(,)?) => {
        $(
            impl Reflect for $t {
                fn generic_type() -> GenericType {
                    GenericType::Class($name)
                }
            }
        )*
    };
}

impl_reflect_class!(
    String => "String",
    Uuid => "Uuid",
    Bytes => "Bytes",
);

impl<T: Reflect> Reflect for Vec<T> {
    fn generic_type() -> GenericType {
        GenericType::array_of(T::generic_type())
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn generic_type() -> GenericType {
        GenericType::optional_of(T::generic_type())
    }
}

macro_rules! impl_reflect_parameterized {
    ($($t:ident < $($arg:ident),+ > => $name:literal),* $(,)?) => {
        $(
            impl<$($arg: Reflect),+> Reflect for $t<$($arg),+> {
                fn generic_type() -> GenericType {
                    GenericType::Parameterized {
                        raw: $name,
                        args: vec![$($arg::generic_type()),+],
                    }
                }
            }
        )*
    };
}

impl_reflect_parameterized!(
    HashMap<K, V> => "HashMap",
    BTreeMap<K, V> => "BTreeMap",
    HashSet<T> => "HashSet",
    BTreeSet<T> => "BTreeSet",
);
