//! Codecs of scalar CQL types, used as element codecs of collections.
//!
//! An empty buffer decodes to null for the fixed-width types, as the
//! protocol allows "empty" values of those types.

use bytes::Bytes;

use super::{non_null_literal, CodecError, MalformedBinaryKind, TypeCodec, NULL_LITERAL};
use crate::column_type::{ColumnType, NativeType};
use crate::pretty::CqlStringLiteralDisplayer;

fn exact_width<const N: usize>(bytes: &[u8]) -> Result<[u8; N], CodecError> {
    bytes.try_into().map_err(|_| {
        MalformedBinaryKind::InvalidLength {
            expected: N,
            received: bytes.len(),
        }
        .into()
    })
}

macro_rules! impl_integer_codec {
    ($(#[$attr:meta])* $codec:ident, $t:ty, $native:ident) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
        pub struct $codec;

        impl TypeCodec for $codec {
            type Value = $t;

            fn cql_type(&self) -> ColumnType {
                ColumnType::Native(NativeType::$native)
            }

            fn encode(&self, value: Option<&$t>) -> Result<Option<Bytes>, CodecError> {
                Ok(value.map(|v| Bytes::copy_from_slice(&v.to_be_bytes())))
            }

            fn decode(&self, bytes: Option<&[u8]>) -> Result<Option<$t>, CodecError> {
                match bytes {
                    None | Some([]) => Ok(None),
                    Some(bytes) => Ok(Some(<$t>::from_be_bytes(exact_width(bytes)?))),
                }
            }

            fn format(&self, value: Option<&$t>) -> String {
                match value {
                    Some(v) => v.to_string(),
                    None => NULL_LITERAL.to_owned(),
                }
            }

            fn parse(&self, literal: Option<&str>) -> Result<Option<$t>, CodecError> {
                let Some(literal) = non_null_literal(literal) else {
                    return Ok(None);
                };
                literal.parse::<$t>().map(Some).map_err(|err| {
                    CodecError::malformed_literal(
                        literal,
                        1,
                        format!("invalid {} value: {}", NativeType::$native.cql_name(), err),
                    )
                })
            }
        }
    };
}

impl_integer_codec!(
    /// `tinyint` as `i8`.
    TinyIntCodec,
    i8,
    TinyInt
);
impl_integer_codec!(
    /// `int` as `i32`.
    IntCodec,
    i32,
    Int
);
impl_integer_codec!(
    /// `bigint` as `i64`.
    BigIntCodec,
    i64,
    BigInt
);

/// `boolean` as `bool`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BooleanCodec;

impl TypeCodec for BooleanCodec {
    type Value = bool;

    fn cql_type(&self) -> ColumnType {
        ColumnType::Native(NativeType::Boolean)
    }

    fn encode(&self, value: Option<&bool>) -> Result<Option<Bytes>, CodecError> {
        Ok(value.map(|v| Bytes::copy_from_slice(&[*v as u8])))
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Option<bool>, CodecError> {
        match bytes {
            None | Some([]) => Ok(None),
            Some(bytes) => {
                let [b] = exact_width::<1>(bytes)?;
                Ok(Some(b != 0))
            }
        }
    }

    fn format(&self, value: Option<&bool>) -> String {
        match value {
            Some(v) => v.to_string(),
            None => NULL_LITERAL.to_owned(),
        }
    }

    fn parse(&self, literal: Option<&str>) -> Result<Option<bool>, CodecError> {
        match non_null_literal(literal) {
            None => Ok(None),
            Some(l) if l.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(l) if l.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(l) => Err(CodecError::malformed_literal(
                l,
                1,
                "expected \"true\" or \"false\"",
            )),
        }
    }
}

/// `text` as `String`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextCodec;

impl TypeCodec for TextCodec {
    type Value = String;

    fn cql_type(&self) -> ColumnType {
        ColumnType::Native(NativeType::Text)
    }

    fn encode(&self, value: Option<&String>) -> Result<Option<Bytes>, CodecError> {
        Ok(value.map(|v| Bytes::copy_from_slice(v.as_bytes())))
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Option<String>, CodecError> {
        bytes
            .map(|bytes| {
                std::str::from_utf8(bytes)
                    .map(str::to_owned)
                    .map_err(|err| MalformedBinaryKind::InvalidUtf8(err).into())
            })
            .transpose()
    }

    fn format(&self, value: Option<&String>) -> String {
        match value {
            Some(v) => CqlStringLiteralDisplayer(v).to_string(),
            None => NULL_LITERAL.to_owned(),
        }
    }

    fn parse(&self, literal: Option<&str>) -> Result<Option<String>, CodecError> {
        let Some(literal) = non_null_literal(literal) else {
            return Ok(None);
        };
        let inner = literal
            .strip_prefix('\'')
            .and_then(|l| l.strip_suffix('\''))
            .filter(|_| literal.len() >= 2)
            .ok_or_else(|| {
                CodecError::malformed_literal(
                    literal,
                    1,
                    "text values must be enclosed in single quotes",
                )
            })?;

        let mut unescaped = String::with_capacity(inner.len());
        let mut chars = inner.char_indices();
        while let Some((idx, c)) = chars.next() {
            if c == '\'' {
                // Inside the literal a quote must be doubled.
                match chars.next() {
                    Some((_, '\'')) => (),
                    _ => {
                        let position = inner[..idx].chars().count() + 2;
                        return Err(CodecError::malformed_literal(
                            literal,
                            position,
                            "unescaped single quote",
                        ));
                    }
                }
            }
            unescaped.push(c);
        }
        Ok(Some(unescaped))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_integer_codecs() {
        assert_eq!(
            TinyIntCodec.encode(Some(&-2)).unwrap().unwrap().as_ref(),
            [0xfe]
        );
        assert_eq!(
            IntCodec.encode(Some(&258)).unwrap().unwrap().as_ref(),
            [0, 0, 1, 2]
        );
        assert_eq!(BigIntCodec.decode(Some(&[0, 0, 0, 0, 0, 0, 1, 0])).unwrap(), Some(256));
        assert_eq!(IntCodec.decode(Some(&[])).unwrap(), None);
        assert_eq!(IntCodec.encode(None).unwrap(), None);

        assert_matches!(
            IntCodec.decode(Some(&[1, 2, 3])),
            Err(CodecError::MalformedBinary(MalformedBinaryKind::InvalidLength {
                expected: 4,
                received: 3
            }))
        );
        assert_matches!(
            TinyIntCodec.decode(Some(&[1, 2])),
            Err(CodecError::MalformedBinary(MalformedBinaryKind::InvalidLength {
                expected: 1,
                received: 2
            }))
        );
    }

    #[test]
    fn test_integer_literals() {
        assert_eq!(TinyIntCodec.format(Some(&-128)), "-128");
        assert_eq!(IntCodec.format(None), "NULL");
        assert_eq!(BigIntCodec.parse(Some(" 42 ")).unwrap(), Some(42));
        assert_eq!(TinyIntCodec.parse(Some("null")).unwrap(), None);
        assert_eq!(TinyIntCodec.parse(None).unwrap(), None);
        assert_matches!(
            TinyIntCodec.parse(Some("300")),
            Err(CodecError::MalformedLiteral { position: 1, .. })
        );
    }

    #[test]
    fn test_boolean_codec() {
        assert_eq!(BooleanCodec.encode(Some(&true)).unwrap().unwrap().as_ref(), [1]);
        assert_eq!(BooleanCodec.decode(Some(&[0])).unwrap(), Some(false));
        assert_eq!(BooleanCodec.decode(Some(&[7])).unwrap(), Some(true));
        assert_eq!(BooleanCodec.parse(Some("TRUE")).unwrap(), Some(true));
        assert_eq!(BooleanCodec.format(Some(&false)), "false");
        assert_matches!(
            BooleanCodec.parse(Some("yes")),
            Err(CodecError::MalformedLiteral { .. })
        );
    }

    #[test]
    fn test_text_codec() {
        let value = "it's".to_string();
        let encoded = TextCodec.encode(Some(&value)).unwrap().unwrap();
        assert_eq!(encoded.as_ref(), b"it's");
        assert_eq!(TextCodec.decode(Some(&encoded[..])).unwrap(), Some(value.clone()));
        assert_eq!(TextCodec.decode(Some(&[])).unwrap(), Some(String::new()));

        assert_eq!(TextCodec.format(Some(&value)), "'it''s'");
        assert_eq!(TextCodec.parse(Some("'it''s'")).unwrap(), Some(value));
        assert_eq!(TextCodec.parse(Some("''")).unwrap(), Some(String::new()));

        assert_matches!(
            TextCodec.decode(Some(&[0xff, 0xfe])),
            Err(CodecError::MalformedBinary(MalformedBinaryKind::InvalidUtf8(_)))
        );
        assert_matches!(
            TextCodec.parse(Some("bare")),
            Err(CodecError::MalformedLiteral { position: 1, .. })
        );
        assert_matches!(
            TextCodec.parse(Some("'")),
            Err(CodecError::MalformedLiteral { position: 1, .. })
        );
        assert_matches!(
            TextCodec.parse(Some("'a'b'")),
            Err(CodecError::MalformedLiteral { position: 3, .. })
        );
    }
}
