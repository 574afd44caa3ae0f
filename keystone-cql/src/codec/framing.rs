//! Framing shared by the codecs of sequence-like collections.
//!
//! ```text
//! [int32 count]
//! repeat count times:
//!   [int32 element length]   // -1 denotes a null element
//!   [element bytes]
//! ```

use bytes::Bytes;
use thiserror::Error;

use super::{CodecError, MalformedBinaryKind};
use crate::frame::frame_errors::LowLevelDeserializationError;
use crate::frame::types::{read_bytes_opt, read_int};

/// Writes a sequence of cells, prefixed with the number of elements.
///
/// The count is not known upfront, so a placeholder is written first
/// and overwritten by [SequenceWriter::finish]. An element of a map
/// spans two cells, the key and the value.
pub struct SequenceWriter {
    buf: Vec<u8>,
    cell_count: usize,
    cells_per_element: usize,
}

impl SequenceWriter {
    /// Creates a writer of a list-like sequence with room for `size_hint`
    /// bytes of cell contents.
    pub fn with_capacity(size_hint: usize) -> Self {
        Self::with_layout(size_hint, 1)
    }

    /// Creates a writer of a map, which expects key and value cells alternately.
    pub fn map_with_capacity(size_hint: usize) -> Self {
        Self::with_layout(size_hint, 2)
    }

    fn with_layout(size_hint: usize, cells_per_element: usize) -> Self {
        let mut buf = Vec::with_capacity(4 + size_hint);
        buf.extend_from_slice(&0i32.to_be_bytes());
        Self {
            buf,
            cell_count: 0,
            cells_per_element,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Returns the number of cells written so far.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    /// Appends a new cell to the sequence.
    ///
    /// The cell must be filled in, otherwise the resulting value is invalid.
    #[inline]
    pub fn make_cell_writer(&mut self) -> CellWriter<'_> {
        self.cell_count += 1;
        CellWriter::new(&mut self.buf)
    }

    /// Writes the final element count and returns the serialized sequence.
    pub fn finish(mut self) -> Result<Bytes, CellOverflowError> {
        debug_assert_eq!(self.cell_count % self.cells_per_element, 0);
        let count: i32 = (self.cell_count / self.cells_per_element)
            .try_into()
            .map_err(|_| CellOverflowError)?;
        self.buf[0..4].copy_from_slice(&count.to_be_bytes());
        Ok(Bytes::from(self.buf))
    }
}

impl Default for SequenceWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes a single `[bytes]` cell.
pub struct CellWriter<'buf> {
    buf: &'buf mut Vec<u8>,
}

impl<'buf> CellWriter<'buf> {
    #[inline]
    pub fn new(buf: &'buf mut Vec<u8>) -> Self {
        Self { buf }
    }

    #[inline]
    pub fn set_null(self) -> WrittenCellProof<'buf> {
        self.buf.extend_from_slice(&(-1i32).to_be_bytes());
        WrittenCellProof::new()
    }

    #[inline]
    pub fn set_value(self, contents: &[u8]) -> Result<WrittenCellProof<'buf>, CellOverflowError> {
        let value_len: i32 = contents.len().try_into().map_err(|_| CellOverflowError)?;
        self.buf.extend_from_slice(&value_len.to_be_bytes());
        self.buf.extend_from_slice(contents);
        Ok(WrittenCellProof::new())
    }
}

/// Proves that a [CellWriter] was consumed.
#[derive(Debug)]
pub struct WrittenCellProof<'buf> {
    _phantom: std::marker::PhantomData<*mut &'buf ()>,
}

impl WrittenCellProof<'_> {
    #[inline]
    fn new() -> Self {
        WrittenCellProof {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// There was an attempt to produce a CQL value over the maximum size limit (i32::MAX).
#[derive(Debug, Clone, Copy, Error)]
#[error("CQL cell overflowed the maximum allowed size of 2^31 - 1")]
pub struct CellOverflowError;

impl From<CellOverflowError> for CodecError {
    fn from(_: CellOverflowError) -> Self {
        CodecError::SizeOverflow
    }
}

/// Reads the cells of a serialized sequence.
///
/// The element count is read on construction. Iteration yields
/// the cells one by one, `None` standing for a null cell.
/// [SequenceReader::finish] verifies that the whole input was consumed.
#[derive(Debug)]
pub struct SequenceReader<'a> {
    buf: &'a [u8],
    declared: usize,
    cells_per_element: usize,
    cells_read: usize,
    failed: bool,
}

impl<'a> SequenceReader<'a> {
    /// Reads the header of a list-like sequence: one cell per element.
    pub fn new(buf: &'a [u8]) -> Result<Self, CodecError> {
        Self::with_layout(buf, 1)
    }

    /// Reads the header of a map: key and value cells alternately.
    pub fn new_map(buf: &'a [u8]) -> Result<Self, CodecError> {
        Self::with_layout(buf, 2)
    }

    fn with_layout(mut buf: &'a [u8], cells_per_element: usize) -> Result<Self, CodecError> {
        let count = read_int(&mut buf).map_err(LowLevelDeserializationError::from)?;
        let declared: usize = count
            .try_into()
            .map_err(|_| MalformedBinaryKind::NegativeCount(count))?;
        Ok(Self {
            buf,
            declared,
            cells_per_element,
            cells_read: 0,
            failed: false,
        })
    }

    /// The number of elements declared in the header.
    #[inline]
    pub fn declared_count(&self) -> usize {
        self.declared
    }

    fn declared_cells(&self) -> usize {
        self.declared * self.cells_per_element
    }

    /// A capacity that can be safely preallocated for the elements.
    /// Every cell takes at least 4 bytes, so a bogus count cannot cause a huge allocation.
    pub fn capacity_hint(&self) -> usize {
        self.declared
            .min(self.buf.len() / (4 * self.cells_per_element))
    }

    /// Fails unless all declared elements were read and no bytes remain.
    pub fn finish(self) -> Result<(), CodecError> {
        if self.cells_read < self.declared_cells() {
            return Err(MalformedBinaryKind::TooFewElements {
                declared: self.declared,
                read: self.cells_read / self.cells_per_element,
            }
            .into());
        }
        if !self.buf.is_empty() {
            return Err(MalformedBinaryKind::TrailingBytes(self.buf.len()).into());
        }
        Ok(())
    }
}

impl<'a> Iterator for SequenceReader<'a> {
    type Item = Result<Option<&'a [u8]>, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cells_read >= self.declared_cells() {
            return None;
        }
        match read_bytes_opt(&mut self.buf) {
            Ok(cell) => {
                self.cells_read += 1;
                Some(Ok(cell))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err.into()))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        (0, Some(self.declared_cells() - self.cells_read))
    }
}
