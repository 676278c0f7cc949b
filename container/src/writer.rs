use crate::{ContainerErr, DimType, ElementWidth, NAME_LEN, Result};

/// Builds a weight container in memory, the inverse of [`crate::RecordReader`].
#[derive(Debug, Default, Clone)]
pub struct RecordWriter {
    buf: Vec<u8>,
}

impl RecordWriter {
    /// Creates a new, empty `RecordWriter`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the amount of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Writes a single little-endian `i32`.
    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes a count field.
    ///
    /// # Errors
    /// `DimensionOverflow` if `value` does not fit in an `i32`.
    pub fn write_dim(&mut self, what: &'static str, value: usize) -> Result<()> {
        let dim = DimType::try_from(value)
            .map_err(|_| ContainerErr::DimensionOverflow { what, got: value })?;

        self.write_i32(dim);
        Ok(())
    }

    pub fn write_width(&mut self, width: ElementWidth) {
        self.write_i32(width.into());
    }

    /// Writes `name` into a NUL-padded field of `NAME_LEN` bytes.
    ///
    /// Longer names are cut on a character boundary so the field always keeps a terminating
    /// NUL.
    pub fn write_name(&mut self, name: &str) {
        let mut len = name.len().min(NAME_LEN - 1);
        while !name.is_char_boundary(len) {
            len -= 1;
        }

        self.buf.extend_from_slice(&name.as_bytes()[..len]);
        self.buf.resize(self.buf.len() + NAME_LEN - len, 0);
    }

    pub fn write_floats(&mut self, width: ElementWidth, values: &[f32]) {
        width.encode(values, &mut self.buf);
    }

    /// Moves the bytes of a finished record to the end of this one.
    pub fn append(&mut self, record: RecordWriter) {
        self.buf.extend_from_slice(&record.buf);
    }

    pub fn write_indices(&mut self, indices: &[i16]) {
        self.buf.reserve(indices.len() * size_of::<i16>());
        indices
            .iter()
            .for_each(|i| self.buf.extend_from_slice(&i.to_le_bytes()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordReader;

    #[test]
    fn long_names_keep_a_terminator() {
        let name = "x".repeat(NAME_LEN + 10);
        let mut w = RecordWriter::new();
        w.write_name(&name);

        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), NAME_LEN);
        assert_eq!(bytes[NAME_LEN - 1], 0);

        let mut r = RecordReader::new(bytes.as_slice());
        assert_eq!(r.read_name().unwrap(), "x".repeat(NAME_LEN - 1));
    }

    #[test]
    fn long_names_are_cut_between_characters() {
        // 2 bytes per character, so byte 63 falls inside the 32nd one.
        let name = "é".repeat(40);
        let mut w = RecordWriter::new();
        w.write_name(&name);

        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), NAME_LEN);
        assert_eq!(&bytes[NAME_LEN - 2..], &[0, 0]);

        let mut r = RecordReader::new(bytes.as_slice());
        assert_eq!(r.read_name().unwrap(), "é".repeat(31));
    }

    #[test]
    fn appended_records_follow_the_existing_bytes() {
        let mut w = RecordWriter::new();
        w.write_i32(1);

        let mut record = RecordWriter::new();
        record.write_i32(2);
        w.append(record);

        assert_eq!(w.as_bytes(), [1, 0, 0, 0, 2, 0, 0, 0]);
    }

    #[test]
    fn dims_must_fit_the_field() {
        let mut w = RecordWriter::new();
        w.write_dim("rows", 12).unwrap();
        assert_eq!(w.as_bytes(), &12i32.to_le_bytes());

        assert!(matches!(
            w.write_dim("rows", i32::MAX as usize + 1),
            Err(ContainerErr::DimensionOverflow { what: "rows", .. })
        ));
        assert_eq!(w.len(), 4);
    }

    #[test]
    fn random_payload_survives_f32() {
        use rand::Rng;

        let mut rng = rand::rng();
        let values: Vec<f32> = (0..257).map(|_| rng.random::<f32>() - 0.5).collect();

        let mut w = RecordWriter::new();
        w.write_width(ElementWidth::F32);
        w.write_floats(ElementWidth::F32, &values);
        let bytes = w.into_bytes();

        let mut r = RecordReader::new(bytes.as_slice());
        let width = r.read_width().unwrap();
        assert_eq!(r.read_floats("weights", width, values.len()).unwrap(), values);
        assert!(r.is_at_end().unwrap());
    }
}
