//! Lookup of codecs by Rust type, by runtime value and by CQL type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use itertools::Itertools;
use thiserror::Error;

use super::extra;
use super::generic_type::{GenericType, RawType};
use super::primitive::{BigIntCodec, BooleanCodec, IntCodec, TextCodec, TinyIntCodec};
use super::{CodecError, TypeCodec};
use crate::column_type::ColumnType;

/// A type-erased [TypeCodec], usable as a trait object.
///
/// Implemented for every [TypeCodec]. Values travel as `dyn Any`; a value of a type
/// other than the codec's own is rejected with [CodecError::TypeMismatch] before anything
/// is serialized.
pub trait ErasedCodec: Send + Sync {
    fn cql_type(&self) -> ColumnType;

    fn generic_type(&self) -> GenericType;

    fn accepts_type(&self, typ: &GenericType) -> bool;

    fn accepts_raw(&self, raw: &RawType) -> bool;

    fn accepts_value(&self, value: &dyn Any) -> bool;

    fn accepts_cql_type(&self, typ: &ColumnType) -> bool;

    fn encode_value(&self, value: Option<&dyn Any>) -> Result<Option<Bytes>, CodecError>;

    fn decode_value(
        &self,
        bytes: Option<&[u8]>,
    ) -> Result<Option<Box<dyn Any + Send + Sync>>, CodecError>;

    fn format_value(&self, value: Option<&dyn Any>) -> Result<String, CodecError>;

    fn parse_value(
        &self,
        literal: Option<&str>,
    ) -> Result<Option<Box<dyn Any + Send + Sync>>, CodecError>;
}

fn downcast<'a, C: TypeCodec>(
    codec: &C,
    value: Option<&'a dyn Any>,
) -> Result<Option<&'a C::Value>, CodecError> {
    value
        .map(|v| {
            v.downcast_ref::<C::Value>()
                .ok_or_else(|| CodecError::TypeMismatch {
                    expected: TypeCodec::generic_type(codec),
                })
        })
        .transpose()
}

fn boxed<T: Send + Sync + 'static>(value: Option<T>) -> Option<Box<dyn Any + Send + Sync>> {
    value.map(|v| Box::new(v) as Box<dyn Any + Send + Sync>)
}

impl<C: TypeCodec> ErasedCodec for C {
    fn cql_type(&self) -> ColumnType {
        TypeCodec::cql_type(self)
    }

    fn generic_type(&self) -> GenericType {
        TypeCodec::generic_type(self)
    }

    fn accepts_type(&self, typ: &GenericType) -> bool {
        TypeCodec::accepts_type(self, typ)
    }

    fn accepts_raw(&self, raw: &RawType) -> bool {
        TypeCodec::accepts_raw(self, raw)
    }

    fn accepts_value(&self, value: &dyn Any) -> bool {
        TypeCodec::accepts_value(self, value)
    }

    fn accepts_cql_type(&self, typ: &ColumnType) -> bool {
        TypeCodec::accepts_cql_type(self, typ)
    }

    fn encode_value(&self, value: Option<&dyn Any>) -> Result<Option<Bytes>, CodecError> {
        self.encode(downcast(self, value)?)
    }

    fn decode_value(
        &self,
        bytes: Option<&[u8]>,
    ) -> Result<Option<Box<dyn Any + Send + Sync>>, CodecError> {
        self.decode(bytes).map(boxed)
    }

    fn format_value(&self, value: Option<&dyn Any>) -> Result<String, CodecError> {
        Ok(self.format(downcast(self, value)?))
    }

    fn parse_value(
        &self,
        literal: Option<&str>,
    ) -> Result<Option<Box<dyn Any + Send + Sync>>, CodecError> {
        self.parse(literal).map(boxed)
    }
}

/// Returned when no registered codec satisfies a lookup.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum CodecNotFoundError {
    #[error("No codec registered for Rust type {0}")]
    RustType(GenericType),
    #[error("No codec registered for raw Rust type {0}")]
    RawType(RawType),
    #[error("No codec registered for the runtime type of the given value")]
    Value,
    #[error("No codec registered for CQL type {0}")]
    CqlType(ColumnType),
    #[error("No codec registered for CQL type {cql_type} and Rust type {rust_type}")]
    Pair {
        cql_type: ColumnType,
        rust_type: GenericType,
    },
}

/// A set of codecs, searched by the type of the values to convert.
///
/// When several codecs match, the most recently registered one wins.
#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: Vec<Arc<dyn ErasedCodec>>,
}

impl CodecRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the scalar codecs and their list counterparts.
    pub fn with_default_codecs() -> Self {
        let mut registry = Self::new();
        registry
            .register(TinyIntCodec)
            .register(IntCodec)
            .register(BigIntCodec)
            .register(BooleanCodec)
            .register(TextCodec)
            .register(extra::byte_list_to_array())
            .register(extra::int_list_to_array())
            .register(extra::long_list_to_array())
            .register(extra::boolean_list_to_array())
            .register(extra::text_list_to_array());
        registry
    }

    pub fn register<C: TypeCodec + 'static>(&mut self, codec: C) -> &mut Self {
        self.register_shared(Arc::new(codec))
    }

    pub fn register_shared(&mut self, codec: Arc<dyn ErasedCodec>) -> &mut Self {
        self.codecs.push(codec);
        self
    }

    /// Returns the number of registered codecs.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    fn find(&self, pred: impl Fn(&dyn ErasedCodec) -> bool) -> Option<&Arc<dyn ErasedCodec>> {
        self.codecs.iter().rev().find(|codec| pred(codec.as_ref()))
    }

    pub fn codec_for_type(
        &self,
        typ: &GenericType,
    ) -> Result<&Arc<dyn ErasedCodec>, CodecNotFoundError> {
        self.find(|c| c.accepts_type(typ))
            .ok_or_else(|| CodecNotFoundError::RustType(typ.clone()))
    }

    pub fn codec_for_raw(
        &self,
        raw: &RawType,
    ) -> Result<&Arc<dyn ErasedCodec>, CodecNotFoundError> {
        self.find(|c| c.accepts_raw(raw))
            .ok_or_else(|| CodecNotFoundError::RawType(raw.clone()))
    }

    pub fn codec_for_value(
        &self,
        value: &dyn Any,
    ) -> Result<&Arc<dyn ErasedCodec>, CodecNotFoundError> {
        self.find(|c| c.accepts_value(value))
            .ok_or(CodecNotFoundError::Value)
    }

    pub fn codec_for_cql_type(
        &self,
        typ: &ColumnType,
    ) -> Result<&Arc<dyn ErasedCodec>, CodecNotFoundError> {
        self.find(|c| c.accepts_cql_type(typ))
            .ok_or_else(|| CodecNotFoundError::CqlType(typ.clone()))
    }

    /// Returns a codec converting between `cql_type` and `rust_type`.
    pub fn codec_for(
        &self,
        cql_type: &ColumnType,
        rust_type: &GenericType,
    ) -> Result<&Arc<dyn ErasedCodec>, CodecNotFoundError> {
        self.find(|c| c.accepts_cql_type(cql_type) && c.accepts_type(rust_type))
            .ok_or_else(|| CodecNotFoundError::Pair {
                cql_type: cql_type.clone(),
                rust_type: rust_type.clone(),
            })
    }
}

impl fmt::Debug for dyn ErasedCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.cql_type(), self.generic_type())
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CodecRegistry [{}]",
            self.codecs
                .iter()
                .map(|c| format!("{:?}", c))
                .join(", ")
        )
    }
}
