//! CQL-level building blocks of the keystone driver core.
//!
//! Contains the binary representation of CQL values, the description of CQL types,
//! value codecs with their literal (text) forms, and the helpers used to parse
//! CQL text returned by the server in schema rows.

pub mod pretty;

pub mod frame;

pub mod codec;
pub mod column_type;
pub mod identifier;
pub mod value;

pub mod utils;

pub use crate::codec::{CodecError, CodecRegistry, TypeCodec};
pub use crate::column_type::ColumnType;
pub use crate::identifier::CqlIdentifier;
