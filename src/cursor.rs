use crate::error::{Error, Result};
use byteorder::ByteOrder;

/// Bounds-checked advancing reader over a borrowed byte buffer.
///
/// Endianness is a per-call type parameter because the shapefile format mixes
/// big-endian record headers with little-endian payload fields within the same
/// record. Every read checks the remaining length first and fails with
/// [`Error::InsufficientData`] instead of panicking; record-declared lengths
/// are never trusted to stay within the buffer.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ByteCursor { buf, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn check(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(Error::InsufficientData {
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Borrow `len` bytes at the current position without advancing.
    pub fn sub_view(&self, len: usize) -> Result<&'a [u8]> {
        self.check(len)?;
        Ok(&self.buf[self.pos..self.pos + len])
    }

    /// Borrow `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let view = self.sub_view(len)?;
        self.pos += len;
        Ok(view)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.check(n)?;
        self.pos += n;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.check(1)?;
        let value = self.buf[self.pos];
        self.pos += 1;
        Ok(value)
    }

    pub fn read_u16<B: ByteOrder>(&mut self) -> Result<u16> {
        self.check(2)?;
        let value = B::read_u16(&self.buf[self.pos..self.pos + 2]);
        self.pos += 2;
        Ok(value)
    }

    pub fn read_u32<B: ByteOrder>(&mut self) -> Result<u32> {
        self.check(4)?;
        let value = B::read_u32(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(value)
    }

    pub fn read_i32<B: ByteOrder>(&mut self) -> Result<i32> {
        self.check(4)?;
        let value = B::read_i32(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(value)
    }

    pub fn read_u64<B: ByteOrder>(&mut self) -> Result<u64> {
        self.check(8)?;
        let value = B::read_u64(&self.buf[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(value)
    }

    pub fn read_f64<B: ByteOrder>(&mut self) -> Result<f64> {
        self.check(8)?;
        let value = B::read_f64(&self.buf[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian};

    #[test]
    fn mixed_endian_reads() {
        let buf = [0x00, 0x00, 0x27, 0x0A, 0xE8, 0x03, 0x00, 0x00];
        let mut cur = ByteCursor::new(&buf);
        assert_eq!(cur.read_i32::<BigEndian>().unwrap(), 9994);
        assert_eq!(cur.read_i32::<LittleEndian>().unwrap(), 1000);
        assert_eq!(cur.remaining(), 0);
    }

    #[test]
    fn read_past_end_fails_without_advancing() {
        let buf = [1u8, 2, 3];
        let mut cur = ByteCursor::new(&buf);
        assert_eq!(
            cur.read_u32::<LittleEndian>(),
            Err(Error::InsufficientData {
                needed: 4,
                remaining: 3
            })
        );
        assert_eq!(cur.position(), 0);
        assert_eq!(cur.read_u8().unwrap(), 1);
    }

    #[test]
    fn sub_view_does_not_advance() {
        let buf = [1u8, 2, 3, 4];
        let mut cur = ByteCursor::new(&buf);
        cur.skip(1).unwrap();
        assert_eq!(cur.sub_view(2).unwrap(), &[2, 3]);
        assert_eq!(cur.position(), 1);
        assert!(cur.sub_view(4).is_err());
    }

    #[test]
    fn f64_little_endian() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&10.0f64.to_le_bytes());
        let mut cur = ByteCursor::new(&buf);
        assert_eq!(cur.read_f64::<LittleEndian>().unwrap(), 10.0);
    }

    #[test]
    fn skip_past_end_fails() {
        let buf = [0u8; 4];
        let mut cur = ByteCursor::new(&buf);
        assert!(cur.skip(5).is_err());
        assert!(cur.skip(4).is_ok());
        assert_eq!(cur.remaining(), 0);
    }
}
