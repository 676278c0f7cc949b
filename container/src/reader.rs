use std::io::{self, BufRead, Read};

use log::trace;

use crate::{ContainerErr, DIM_TYPE_SIZE, DimType, ElementWidth, NAME_LEN, Result};

/// Sequential reader over the records of a weight container.
///
/// Every read either consumes exactly the bytes it asked for or fails with
/// [`ContainerErr::TruncatedInput`], so a failed load never hands out a
/// partially filled record.
pub struct RecordReader<R: BufRead> {
    inner: R,
    position: usize,
}

impl<R: BufRead> RecordReader<R> {
    /// Creates a new `RecordReader` instance.
    ///
    /// # Arguments
    /// * `inner` - The underlying buffered byte stream.
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Returns the amount of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Checks whether the underlying stream has no bytes left.
    pub fn is_at_end(&mut self) -> Result<bool> {
        loop {
            match self.inner.fill_buf() {
                Ok(buf) => return Ok(buf.is_empty()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Unwraps this `RecordReader`, returning the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads a single little-endian `i32`.
    pub fn read_i32(&mut self, what: &'static str) -> Result<i32> {
        let mut buf = [0; DIM_TYPE_SIZE];
        self.read_exact(what, &mut buf)?;
        Ok(DimType::from_le_bytes(buf))
    }

    /// Reads a count field, rejecting negative values.
    pub fn read_dim(&mut self, what: &'static str) -> Result<usize> {
        let got = self.read_i32(what)?;
        usize::try_from(got).map_err(|_| ContainerErr::NegativeDimension { what, got })
    }

    /// Reads an element width field.
    pub fn read_width(&mut self) -> Result<ElementWidth> {
        ElementWidth::try_from(self.read_i32("element width")?)
    }

    /// Reads a fixed-length, NUL-padded name.
    ///
    /// # Returns
    /// The bytes up to the first NUL, invalid UTF-8 being replaced.
    pub fn read_name(&mut self) -> Result<String> {
        let mut buf = [0; NAME_LEN];
        self.read_exact("layer name", &mut buf)?;

        let len = buf.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        Ok(String::from_utf8_lossy(&buf[..len]).into_owned())
    }

    /// Reads `count` floats stored at `width` and widens them to `f32`.
    pub fn read_floats(
        &mut self,
        what: &'static str,
        width: ElementWidth,
        count: usize,
    ) -> Result<Vec<f32>> {
        let bytes = self.read_payload(what, count, width.size())?;
        trace!("read {count} values of {what} at {width:?}");
        Ok(width.decode(&bytes))
    }

    /// Reads `count` little-endian `i16` index entries.
    pub fn read_indices(&mut self, what: &'static str, count: usize) -> Result<Vec<i16>> {
        let bytes = self.read_payload(what, count, size_of::<i16>())?;

        Ok(bytes
            .chunks_exact(size_of::<i16>())
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect())
    }

    fn read_exact(&mut self, what: &'static str, buf: &mut [u8]) -> Result<()> {
        let needed = buf.len();
        let mut got = 0;

        while got < needed {
            match self.inner.read(&mut buf[got..]) {
                Ok(0) => return Err(ContainerErr::TruncatedInput { what, needed, got }),
                Ok(n) => got += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        self.position += needed;
        Ok(())
    }

    /// Reads `count * size` bytes, the buffer grows with the data actually read
    /// rather than with the declared count.
    fn read_payload(&mut self, what: &'static str, count: usize, size: usize) -> Result<Vec<u8>> {
        let needed = count
            .checked_mul(size)
            .ok_or(ContainerErr::TruncatedInput {
                what,
                needed: usize::MAX,
                got: 0,
            })?;

        let mut buf = Vec::new();
        self.inner.by_ref().take(needed as u64).read_to_end(&mut buf)?;
        self.position += buf.len();

        if buf.len() < needed {
            return Err(ContainerErr::TruncatedInput {
                what,
                needed,
                got: buf.len(),
            });
        }

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordWriter;

    fn reader(bytes: &[u8]) -> RecordReader<&[u8]> {
        RecordReader::new(bytes)
    }

    #[test]
    fn reads_counts_and_tracks_position() {
        let mut w = RecordWriter::new();
        w.write_i32(7);
        w.write_i32(-1);
        let bytes = w.into_bytes();

        let mut r = reader(&bytes);
        assert_eq!(r.read_dim("rows").unwrap(), 7);
        assert_eq!(r.position(), 4);
        assert!(matches!(
            r.read_dim("cols"),
            Err(ContainerErr::NegativeDimension { what: "cols", got: -1 })
        ));
        assert!(r.is_at_end().unwrap());
    }

    #[test]
    fn short_count_is_truncated() {
        let mut r = reader(&[1, 0]);
        assert!(matches!(
            r.read_i32("rows"),
            Err(ContainerErr::TruncatedInput {
                what: "rows",
                needed: 4,
                got: 2
            })
        ));
    }

    #[test]
    fn name_stops_at_first_nul() {
        let mut w = RecordWriter::new();
        w.write_name("rnn1");
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), NAME_LEN);

        let mut r = reader(&bytes);
        assert_eq!(r.read_name().unwrap(), "rnn1");
        assert!(r.is_at_end().unwrap());
    }

    #[test]
    fn short_name_is_truncated() {
        let mut r = reader(&[b'a'; NAME_LEN - 1]);
        assert!(matches!(
            r.read_name(),
            Err(ContainerErr::TruncatedInput { needed: NAME_LEN, .. })
        ));
    }

    #[test]
    fn floats_at_both_widths() {
        let values = [0.0, 1.0, -0.5, 3.25];

        for width in [ElementWidth::F16, ElementWidth::F32] {
            let mut w = RecordWriter::new();
            w.write_floats(width, &values);
            let bytes = w.into_bytes();

            let mut r = reader(&bytes);
            assert_eq!(r.read_floats("bias", width, 4).unwrap(), values);
            assert_eq!(r.position(), 4 * width.size());
        }
    }

    #[test]
    fn short_float_payload_reports_what_it_got() {
        let mut w = RecordWriter::new();
        w.write_floats(ElementWidth::F32, &[1.0, 2.0]);
        let bytes = w.into_bytes();

        let mut r = reader(&bytes);
        assert!(matches!(
            r.read_floats("bias", ElementWidth::F32, 3),
            Err(ContainerErr::TruncatedInput {
                what: "bias",
                needed: 12,
                got: 8
            })
        ));
    }

    #[test]
    fn huge_declared_count_does_not_allocate() {
        let mut r = reader(&[0; 16]);
        assert!(matches!(
            r.read_floats("weights", ElementWidth::F32, i32::MAX as usize),
            Err(ContainerErr::TruncatedInput { got: 16, .. })
        ));
    }

    #[test]
    fn indices_keep_their_sign() {
        let mut w = RecordWriter::new();
        w.write_indices(&[3, -1, 0, -1]);
        let bytes = w.into_bytes();

        let mut r = reader(&bytes);
        assert_eq!(r.read_indices("index", 4).unwrap(), vec![3, -1, 0, -1]);
    }

    #[test]
    fn width_field_is_validated() {
        let mut w = RecordWriter::new();
        w.write_i32(3);
        let bytes = w.into_bytes();

        assert!(matches!(
            reader(&bytes).read_width(),
            Err(ContainerErr::UnsupportedElementWidth(3))
        ));
    }
}
