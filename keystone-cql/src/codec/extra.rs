//! Ready-made codecs of collections whose Rust counterparts are plain vectors.
//!
//! These are not registered in a [CodecRegistry](super::CodecRegistry) by default,
//! apart from the ones listed in [CodecRegistry::with_default_codecs](super::CodecRegistry::with_default_codecs).

use super::collection::ArrayCodec;
use super::primitive::{BigIntCodec, BooleanCodec, IntCodec, TextCodec, TinyIntCodec};

/// `list<tinyint>` as `Vec<i8>`.
pub const fn byte_list_to_array() -> ArrayCodec<TinyIntCodec> {
    ArrayCodec::with_element(TinyIntCodec)
}

/// `list<int>` as `Vec<i32>`.
pub const fn int_list_to_array() -> ArrayCodec<IntCodec> {
    ArrayCodec::with_element(IntCodec)
}

/// `list<bigint>` as `Vec<i64>`.
pub const fn long_list_to_array() -> ArrayCodec<BigIntCodec> {
    ArrayCodec::with_element(BigIntCodec)
}

/// `list<boolean>` as `Vec<bool>`.
pub const fn boolean_list_to_array() -> ArrayCodec<BooleanCodec> {
    ArrayCodec::with_element(BooleanCodec)
}

/// `list<text>` as `Vec<String>`.
pub const fn text_list_to_array() -> ArrayCodec<TextCodec> {
    ArrayCodec::with_element(TextCodec)
}
