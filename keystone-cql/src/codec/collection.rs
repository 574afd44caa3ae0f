//! Codecs of CQL collections.
//!
//! [ArrayCodec] maps a CQL `list` to a `Vec` of values of its element codec.
//! Elements may not be null: the Rust side has no place to put them, so a null
//! element is reported as [CodecError::NullElement] both when encoding and
//! decoding. A present cell the element codec reads as null (e.g. an empty
//! `tinyint` cell) is malformed instead.

use std::collections::BTreeMap;

use bytes::Bytes;
use itertools::Itertools;

use super::framing::{SequenceReader, SequenceWriter};
use super::{non_null_literal, CodecError, MalformedBinaryKind, TypeCodec, NULL_LITERAL};
use crate::column_type::{CollectionType, ColumnType};
use crate::utils::parse::ParserState;

/// Codec of `list<E>` as `Vec<E::Value>`, where `E` is the element codec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArrayCodec<E> {
    element: E,
}

impl<E> ArrayCodec<E> {
    /// Same as [ArrayCodec::new], usable in constant expressions.
    pub const fn with_element(element: E) -> Self {
        Self { element }
    }
}

impl<E: TypeCodec> ArrayCodec<E> {
    pub fn new(element: E) -> Self {
        Self { element }
    }

    pub fn element_codec(&self) -> &E {
        &self.element
    }
}

impl<E: TypeCodec> TypeCodec for ArrayCodec<E> {
    type Value = Vec<E::Value>;

    fn cql_type(&self) -> ColumnType {
        ColumnType::list_of(self.element.cql_type())
    }

    /// Frozen and non-frozen lists share the same representation.
    fn accepts_cql_type(&self, typ: &ColumnType) -> bool {
        match typ {
            ColumnType::Collection {
                typ: CollectionType::List(elem),
                ..
            } => self.element.accepts_cql_type(elem),
            _ => false,
        }
    }

    fn encode(&self, value: Option<&Self::Value>) -> Result<Option<Bytes>, CodecError> {
        let Some(value) = value else {
            return Ok(None);
        };

        let mut writer = SequenceWriter::with_capacity(value.len() * 8);
        for (index, element) in value.iter().enumerate() {
            let bytes = self
                .element
                .encode(Some(element))
                .map_err(|err| err.in_element(index))?
                .ok_or(CodecError::NullElement { index })?;
            writer
                .make_cell_writer()
                .set_value(&bytes)
                .map_err(|err| CodecError::from(err).in_element(index))?;
        }
        Ok(Some(writer.finish()?))
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Option<Self::Value>, CodecError> {
        let bytes = match bytes {
            None | Some([]) => return Ok(Some(Vec::new())),
            Some(bytes) => bytes,
        };

        let mut reader = SequenceReader::new(bytes)?;
        let mut values = Vec::with_capacity(reader.capacity_hint());
        for (index, cell) in reader.by_ref().enumerate() {
            let cell = cell?.ok_or(CodecError::NullElement { index })?;
            let value = self
                .element
                .decode(Some(cell))
                .and_then(|value| value.ok_or(MalformedBinaryKind::EmptyCell.into()))
                .map_err(|err| err.in_element(index))?;
            values.push(value);
        }
        reader.finish()?;

        Ok(Some(values))
    }

    fn format(&self, value: Option<&Self::Value>) -> String {
        match value {
            Some(values) => format!(
                "[{}]",
                values
                    .iter()
                    .map(|element| self.element.format(Some(element)))
                    .join(",")
            ),
            None => NULL_LITERAL.to_owned(),
        }
    }

    fn parse(&self, literal: Option<&str>) -> Result<Option<Self::Value>, CodecError> {
        let Some(literal) = non_null_literal(literal) else {
            return Ok(None);
        };
        let mut values = Vec::new();
        parse_delimited(literal, ("[", "]"), |index, p| {
            let (element, p) = p
                .take_cql_value()
                .map_err(|err| CodecError::from_parse_error(literal, err))?;
            let value = self
                .element
                .parse(Some(element))
                .map_err(|err| err.in_element(index))?
                .ok_or(CodecError::NullElement { index })?;
            values.push(value);
            Ok(p)
        })?;
        Ok(Some(values))
    }
}

/// Codec of `map<K, V>` as a `BTreeMap` of the values of its key and value codecs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapCodec<K, V> {
    key: K,
    value: V,
}

impl<K: TypeCodec, V: TypeCodec> MapCodec<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

impl<K, V> MapCodec<K, V>
where
    K: TypeCodec,
    K::Value: Ord,
    V: TypeCodec,
{
    fn encode_cell<C: TypeCodec>(
        codec: &C,
        value: &C::Value,
        index: usize,
        writer: &mut SequenceWriter,
    ) -> Result<(), CodecError> {
        let bytes = codec
            .encode(Some(value))
            .map_err(|err| err.in_element(index))?
            .ok_or(CodecError::NullElement { index })?;
        writer
            .make_cell_writer()
            .set_value(&bytes)
            .map_err(|err| CodecError::from(err).in_element(index))?;
        Ok(())
    }

    fn decode_cell<C: TypeCodec>(
        codec: &C,
        cell: Option<&[u8]>,
        index: usize,
    ) -> Result<C::Value, CodecError> {
        let cell = cell.ok_or(CodecError::NullElement { index })?;
        codec
            .decode(Some(cell))
            .and_then(|value| value.ok_or(MalformedBinaryKind::EmptyCell.into()))
            .map_err(|err| err.in_element(index))
    }
}

impl<K, V> TypeCodec for MapCodec<K, V>
where
    K: TypeCodec,
    K::Value: Ord,
    V: TypeCodec,
{
    type Value = BTreeMap<K::Value, V::Value>;

    fn cql_type(&self) -> ColumnType {
        ColumnType::map_of(self.key.cql_type(), self.value.cql_type())
    }

    fn accepts_cql_type(&self, typ: &ColumnType) -> bool {
        match typ {
            ColumnType::Collection {
                typ: CollectionType::Map(key, value),
                ..
            } => self.key.accepts_cql_type(key) && self.value.accepts_cql_type(value),
            _ => false,
        }
    }

    fn encode(&self, value: Option<&Self::Value>) -> Result<Option<Bytes>, CodecError> {
        let Some(map) = value else {
            return Ok(None);
        };

        let mut writer = SequenceWriter::map_with_capacity(map.len() * 16);
        for (index, (key, value)) in map.iter().enumerate() {
            Self::encode_cell(&self.key, key, index, &mut writer)?;
            Self::encode_cell(&self.value, value, index, &mut writer)?;
        }
        Ok(Some(writer.finish()?))
    }

    fn decode(&self, bytes: Option<&[u8]>) -> Result<Option<Self::Value>, CodecError> {
        let bytes = match bytes {
            None | Some([]) => return Ok(Some(BTreeMap::new())),
            Some(bytes) => bytes,
        };

        let mut reader = SequenceReader::new_map(bytes)?;
        let mut map = BTreeMap::new();
        let mut index = 0;
        while let Some(key_cell) = reader.next() {
            let key = Self::decode_cell(&self.key, key_cell?, index)?;
            let Some(value_cell) = reader.next() else {
                break;
            };
            let value = Self::decode_cell(&self.value, value_cell?, index)?;
            map.insert(key, value);
            index += 1;
        }
        reader.finish()?;

        Ok(Some(map))
    }

    fn format(&self, value: Option<&Self::Value>) -> String {
        match value {
            Some(map) => format!(
                "{{{}}}",
                map.iter()
                    .map(|(k, v)| format!(
                        "{}:{}",
                        self.key.format(Some(k)),
                        self.value.format(Some(v))
                    ))
                    .join(",")
            ),
            None => NULL_LITERAL.to_owned(),
        }
    }

    fn parse(&self, literal: Option<&str>) -> Result<Option<Self::Value>, CodecError> {
        let Some(literal) = non_null_literal(literal) else {
            return Ok(None);
        };
        let literal_err = |err| CodecError::from_parse_error(literal, err);
        let mut map = BTreeMap::new();
        parse_delimited(literal, ("{", "}"), |index, p| {
            let (key, p) = p.take_cql_value().map_err(literal_err)?;
            let p = p.skip_white().accept(":").map_err(literal_err)?.skip_white();
            let (value, p) = p.take_cql_value().map_err(literal_err)?;

            let key = self
                .key
                .parse(Some(key))
                .map_err(|err| err.in_element(index))?
                .ok_or(CodecError::NullElement { index })?;
            let value = self
                .value
                .parse(Some(value))
                .map_err(|err| err.in_element(index))?
                .ok_or(CodecError::NullElement { index })?;
            map.insert(key, value);
            Ok(p)
        })?;
        Ok(Some(map))
    }
}

/// Parses `<open> elem, elem, ... <close>`, calling `parse_element` for each element
/// with its index and the parser positioned at its first character.
/// Whitespace is allowed around the delimiters and elements; nothing may follow
/// the closing delimiter.
fn parse_delimited<'s>(
    literal: &'s str,
    (open, close): (&'static str, &'static str),
    mut parse_element: impl FnMut(usize, ParserState<'s>) -> Result<ParserState<'s>, CodecError>,
) -> Result<(), CodecError> {
    let literal_err = |err| CodecError::from_parse_error(literal, err);

    let p = ParserState::new(literal).skip_white();
    let mut p = p.accept(open).map_err(literal_err)?.skip_white();

    if let Ok(rest) = p.accept(close) {
        p = rest;
    } else {
        let mut index = 0;
        loop {
            let next = parse_element(index, p)?.skip_white();
            index += 1;
            if let Ok(rest) = next.accept(close) {
                p = rest;
                break;
            }
            if next.is_at_eof() {
                return Err(CodecError::malformed_literal(
                    literal,
                    next.calculate_position(literal).unwrap_or(0),
                    format!("missing closing {:?}", close),
                ));
            }
            p = next
                .accept(",")
                .map_err(|_| {
                    CodecError::malformed_literal(
                        literal,
                        next.calculate_position(literal).unwrap_or(0),
                        format!("expected \",\" or {:?}", close),
                    )
                })?
                .skip_white();
        }
    }

    let p = p.skip_white();
    if !p.is_at_eof() {
        return Err(CodecError::malformed_literal(
            literal,
            p.calculate_position(literal).unwrap_or(0),
            format!("unexpected characters after {:?}", close),
        ));
    }
    Ok(())
}
