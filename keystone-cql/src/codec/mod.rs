//! Conversion between Rust values and their CQL representations.
//!
//! A codec ([TypeCodec]) is bound to one CQL type and one Rust type. It converts
//! values to and from the binary wire format ([TypeCodec::encode] / [TypeCodec::decode])
//! and to and from CQL literal text ([TypeCodec::format] / [TypeCodec::parse]).
//!
//! Codecs are stateless, so a single instance can be shared between threads.
//! Codecs of composite types are generic over the codecs of their elements,
//! see [collection::ArrayCodec].

use std::any::Any;

use bytes::Bytes;
use thiserror::Error;

use crate::column_type::ColumnType;
use crate::frame::frame_errors::LowLevelDeserializationError;
use crate::utils::parse::ParseError;

pub mod collection;
pub mod extra;
pub mod framing;
pub mod generic_type;
pub mod primitive;
pub mod registry;


pub use collection::{ArrayCodec, MapCodec};
pub use generic_type::{GenericType, PrimitiveType, RawType, Reflect};
pub use primitive::{BigIntCodec, BooleanCodec, IntCodec, TextCodec, TinyIntCodec};
pub use registry::{CodecNotFoundError, CodecRegistry, ErasedCodec};

/// The literal of a null value, as produced by [TypeCodec::format].
pub const NULL_LITERAL: &str = "NULL";

/// A converter between values of one Rust type and one CQL type.
///
/// `None` stands for a CQL null on both sides of every conversion.
pub trait TypeCodec: Send + Sync {
    /// The Rust type handled by this codec.
    type Value: Reflect + Send + Sync + 'static;

    /// The CQL type handled by this codec.
    fn cql_type(&self) -> ColumnType;

    /// The descriptor of [TypeCodec::Value].
    fn generic_type(&self) -> GenericType {
        GenericType::of::<Self::Value>()
    }

    /// Whether this codec handles values described by `typ`.
    fn accepts_type(&self, typ: &GenericType) -> bool {
        self.generic_type().matches_exact(typ)
    }

    /// Whether this codec handles values whose erased type is `raw`.
    fn accepts_raw(&self, raw: &RawType) -> bool {
        self.generic_type().matches_raw(raw)
    }

    /// Whether this codec handles the runtime type of `value`.
    fn accepts_value(&self, value: &dyn Any) -> bool {
        value.is::<Self::Value>()
    }

    /// Whether this codec handles columns of type `typ`.
    fn accepts_cql_type(&self, typ: &ColumnType) -> bool {
        self.cql_type() == *typ
    }

    fn encode(&self, value: Option<&Self::Value>) -> Result<Option<Bytes>, CodecError>;

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Option<Self::Value>, CodecError>;

    /// Renders the value as a CQL literal. A null value is rendered as [NULL_LITERAL].
    fn format(&self, value: Option<&Self::Value>) -> String;

    fn parse(&self, literal: Option<&str>) -> Result<Option<Self::Value>, CodecError>;
}

/// Strips whitespace from a literal and returns it,
/// unless it stands for null (absent, blank or `NULL` in any case).
pub(crate) fn non_null_literal(literal: Option<&str>) -> Option<&str> {
    let literal = literal?.trim();
    if literal.is_empty() || literal.eq_ignore_ascii_case(NULL_LITERAL) {
        None
    } else {
        Some(literal)
    }
}

/// An error returned by a codec operation.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum CodecError {
    #[error("Malformed binary value: {0}")]
    MalformedBinary(#[from] MalformedBinaryKind),

    #[error("Null element at index {index}, collections of this type cannot contain nulls")]
    NullElement { index: usize },

    #[error("Cannot parse literal {literal:?}: {reason} at character {position}")]
    MalformedLiteral {
        literal: String,
        /// 1-based position of the offending character.
        position: usize,
        reason: String,
    },

    #[error("Value is not of the type handled by the codec, expected {expected}")]
    TypeMismatch { expected: GenericType },

    #[error("Serialized value does not fit in the maximum allowed size of 2^31 - 1")]
    SizeOverflow,

    #[error("Element at index {index}: {source}")]
    Element {
        index: usize,
        source: Box<CodecError>,
    },
}

impl CodecError {
    pub(crate) fn malformed_literal(
        literal: &str,
        position: usize,
        reason: impl Into<String>,
    ) -> Self {
        CodecError::MalformedLiteral {
            literal: literal.to_owned(),
            position,
            reason: reason.into(),
        }
    }

    pub(crate) fn from_parse_error(literal: &str, err: ParseError) -> Self {
        Self::malformed_literal(
            literal,
            err.calculate_position(literal).unwrap_or(0),
            err.get_cause().to_string(),
        )
    }

    pub(crate) fn in_element(self, index: usize) -> Self {
        CodecError::Element {
            index,
            source: Box::new(self),
        }
    }
}

impl From<LowLevelDeserializationError> for CodecError {
    fn from(err: LowLevelDeserializationError) -> Self {
        CodecError::MalformedBinary(MalformedBinaryKind::LowLevel(err))
    }
}

/// Describes what exactly is wrong with a binary value.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum MalformedBinaryKind {
    #[error(transparent)]
    LowLevel(#[from] LowLevelDeserializationError),

    #[error("expected {expected} bytes, got {received}")]
    InvalidLength { expected: usize, received: usize },

    #[error("negative element count: {0}")]
    NegativeCount(i32),

    #[error("declared {declared} elements, but only {read} could be read")]
    TooFewElements { declared: usize, read: usize },

    #[error("empty cell where a value was expected")]
    EmptyCell,

    #[error("{0} unexpected bytes after the last element")]
    TrailingBytes(usize),

    #[error("invalid UTF-8 text: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}
