use std::borrow::Borrow;
use std::fmt::{Display, LowerHex};

use itertools::Itertools;

use crate::value::CqlValue;

pub(crate) struct HexBytes<'a>(pub(crate) &'a [u8]);

impl LowerHex for HexBytes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Displays a CqlValue. The syntax should resemble the CQL literal syntax
/// (but no guarantee is given that it's always the same).
pub struct CqlValueDisplayer<C>(pub C);

impl<C> Display for CqlValueDisplayer<C>
where
    C: Borrow<CqlValue>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.borrow() {
            CqlValue::Ascii(a) => write!(f, "{}", CqlStringLiteralDisplayer(a))?,
            CqlValue::Text(t) => write!(f, "{}", CqlStringLiteralDisplayer(t))?,
            CqlValue::Blob(b) => write!(f, "0x{:x}", HexBytes(b))?,
            CqlValue::Boolean(b) => write!(f, "{}", b)?,
            CqlValue::Int(i) => write!(f, "{}", i)?,
            CqlValue::BigInt(bi) => write!(f, "{}", bi)?,
            CqlValue::TinyInt(ti) => write!(f, "{}", ti)?,
            CqlValue::Uuid(u) => write!(f, "{}", u)?,

            CqlValue::List(v) => write!(
                f,
                "[{}]",
                v.iter().map(CqlValueDisplayer).format(",")
            )?,
            CqlValue::Set(v) => write!(
                f,
                "{{{}}}",
                v.iter().map(CqlValueDisplayer).format(",")
            )?,
            CqlValue::Map(m) => write!(
                f,
                "{{{}}}",
                m.iter()
                    .map(|(k, v)| PairDisplayer(CqlValueDisplayer(k), CqlValueDisplayer(v)))
                    .format(",")
            )?,
        }
        Ok(())
    }
}

/// Renders a string as a CQL string literal.
pub struct CqlStringLiteralDisplayer<'a>(pub &'a str);

impl Display for CqlStringLiteralDisplayer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // CQL string literals use single quotes. The only character that
        // needs escaping is singular quote, and escaping is done by repeating
        // the quote character.
        f.write_str("'")?;
        let mut first = true;
        for part in self.0.split('\'') {
            if first {
                first = false;
            } else {
                f.write_str("''")?;
            }
            f.write_str(part)?;
        }
        f.write_str("'")?;
        Ok(())
    }
}

pub(crate) struct PairDisplayer<K, V>(K, V);

impl<K, V> Display for PairDisplayer<K, V>
where
    K: Display,
    V: Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.0, self.1)
    }
}
