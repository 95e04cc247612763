use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::geometry::{Shape, ShapeType, Strictness};
use crate::{SHP_FILE_CODE, SHP_HEADER_SIZE, SHP_RECORD_HEADER_SIZE};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tracing::debug;

/// The 100-byte file header shared by .shp content files and .shx index
/// files.
///
/// The file code is recorded, not enforced; callers that care compare it
/// against [`SHP_FILE_CODE`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShpHeader {
    pub file_code: i32,
    /// File length in 16-bit words, as declared on the wire.
    pub file_length: i32,
    pub version: i32,
    /// Raw shape type tag; see [`ShpHeader::kind`].
    pub shape_type: i32,
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
    pub m_min: f64,
    pub m_max: f64,
}

impl ShpHeader {
    /// Read the fixed header, leaving the cursor at the first record.
    pub fn read(cur: &mut ByteCursor) -> Result<ShpHeader> {
        // one size check up front covers every fixed-width read below
        if cur.remaining() < SHP_HEADER_SIZE {
            return Err(Error::InsufficientData {
                needed: SHP_HEADER_SIZE,
                remaining: cur.remaining(),
            });
        }

        let file_code = cur.read_i32::<BigEndian>()?;
        cur.skip(5 * 4)?; // unused words
        let file_length = cur.read_i32::<BigEndian>()?;
        let version = cur.read_i32::<LittleEndian>()?;
        let shape_type = cur.read_i32::<LittleEndian>()?;
        let x_min = cur.read_f64::<LittleEndian>()?;
        let y_min = cur.read_f64::<LittleEndian>()?;
        let x_max = cur.read_f64::<LittleEndian>()?;
        let y_max = cur.read_f64::<LittleEndian>()?;
        let z_min = cur.read_f64::<LittleEndian>()?;
        let z_max = cur.read_f64::<LittleEndian>()?;
        let m_min = cur.read_f64::<LittleEndian>()?;
        let m_max = cur.read_f64::<LittleEndian>()?;

        Ok(ShpHeader {
            file_code,
            file_length,
            version,
            shape_type,
            x_min,
            y_min,
            x_max,
            y_max,
            z_min,
            z_max,
            m_min,
            m_max,
        })
    }

    /// Declared file size in bytes.
    pub fn file_size(&self) -> usize {
        self.file_length.max(0) as usize * 2
    }

    pub fn kind(&self) -> Option<ShapeType> {
        ShapeType::from_i32(self.shape_type)
    }
}

/// One record of a .shp file: the wire-declared record number, the shape
/// type tag peeked from the payload, and a borrowed view of the content
/// excluding the 8-byte record header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShpRecord<'a> {
    /// 1-based record number as declared on the wire; read, not assumed.
    pub record_number: i32,
    /// Raw tag from the first four content bytes; zero when the content is
    /// too short to carry one.
    pub shape_type: i32,
    pub content: &'a [u8],
}

impl<'a> ShpRecord<'a> {
    pub fn kind(&self) -> Option<ShapeType> {
        ShapeType::from_i32(self.shape_type)
    }

    pub fn content_size(&self) -> usize {
        self.content.len()
    }

    /// Total on-disk size including the record header.
    pub fn record_size(&self) -> usize {
        self.content_size() + SHP_RECORD_HEADER_SIZE
    }

    /// Decode the geometry payload with the legacy lenient policy.
    pub fn shape(&self) -> Result<Shape> {
        Shape::read(self.content)
    }

    pub fn shape_with(&self, strictness: Strictness) -> Result<Shape> {
        Shape::read_with(self.content, strictness)
    }
}

/// Lazy single-pass iterator over the record stream.
///
/// Record boundaries come from each record's own declared content length,
/// never from re-parsing payloads; a declared length past the end of the
/// buffer yields an error and fuses the iterator, since every following
/// record's framing would be corrupt.
pub struct RecordIter<'a> {
    cur: ByteCursor<'a>,
    finished: bool,
}

impl<'a> RecordIter<'a> {
    /// Iterate records from a view positioned at the first record header
    /// (i.e. just past the 100-byte file header).
    pub fn new(records: &'a [u8]) -> Self {
        RecordIter {
            cur: ByteCursor::new(records),
            finished: false,
        }
    }

    fn read_record(&mut self) -> Result<ShpRecord<'a>> {
        let record_number = self.cur.read_i32::<BigEndian>()?;
        let content_length = self.cur.read_i32::<BigEndian>()?;
        let declared = i64::from(content_length) * 2;
        if declared < 0 || declared as usize > self.cur.remaining() {
            return Err(Error::ContentOverrun {
                declared: declared.max(0) as usize,
                available: self.cur.remaining(),
            });
        }
        let content = self.cur.read_bytes(declared as usize)?;
        let shape_type = if content.len() >= 4 {
            LittleEndian::read_i32(&content[..4])
        } else {
            0
        };
        Ok(ShpRecord {
            record_number,
            shape_type,
            content,
        })
    }
}

impl<'a> Iterator for RecordIter<'a> {
    type Item = Result<ShpRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.cur.remaining() == 0 {
            return None;
        }
        let item = self.read_record();
        if item.is_err() {
            self.finished = true;
        }
        Some(item)
    }
}

/// An eagerly decoded .shp file: header plus the ordered record list.
///
/// Payloads are not decoded here; each record keeps a borrowed content view
/// and geometry is read on demand via [`ShpRecord::shape`].
#[derive(Debug, Clone)]
pub struct ShpFile<'a> {
    pub header: ShpHeader,
    pub records: Vec<ShpRecord<'a>>,
}

impl<'a> ShpFile<'a> {
    /// Decode header and record stream from the full file buffer.
    ///
    /// Any framing failure fails the whole file: a short record corrupts
    /// every subsequent record's framing, so no partial list is returned.
    pub fn read(buf: &'a [u8]) -> Result<ShpFile<'a>> {
        let mut cur = ByteCursor::new(buf);
        let header = ShpHeader::read(&mut cur)?;
        let records = RecordIter::new(&buf[cur.position()..]).collect::<Result<Vec<_>>>()?;
        debug!(records = records.len(), "decoded shp record stream");
        Ok(ShpFile { header, records })
    }

    pub fn records(&self) -> &[ShpRecord<'a>] {
        &self.records
    }
}

/// One 8-byte record of a .shx index file, converted from words to bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShxRecord {
    /// Byte offset of the record header within the .shp file.
    pub record_offset: usize,
    /// Byte length of the record content.
    pub content_size: usize,
}

impl ShxRecord {
    fn read(cur: &mut ByteCursor) -> Result<ShxRecord> {
        let offset = cur.read_i32::<BigEndian>()?;
        let length = cur.read_i32::<BigEndian>()?;
        Ok(ShxRecord {
            record_offset: offset.max(0) as usize * 2,
            content_size: length.max(0) as usize * 2,
        })
    }

    /// Byte offset of the record content, past the record header.
    pub fn content_offset(&self) -> usize {
        self.record_offset + SHP_RECORD_HEADER_SIZE
    }
}

/// The .shx index file: the shared header plus one fixed-size entry per
/// record of the companion .shp file. Not required for traversal, but
/// typically part of the set.
#[derive(Debug, Clone)]
pub struct ShxFile {
    pub header: ShpHeader,
    records: Vec<ShxRecord>,
}

impl ShxFile {
    pub fn read(buf: &[u8]) -> Result<ShxFile> {
        let mut cur = ByteCursor::new(buf);
        let header = ShpHeader::read(&mut cur)?;
        let mut records = Vec::new();
        while cur.remaining() > 0 {
            records.push(ShxRecord::read(&mut cur)?);
        }
        Ok(ShxFile { header, records })
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Look up an index entry by 1-based record number.
    pub fn record(&self, record_number: usize) -> Option<&ShxRecord> {
        if record_number == 0 {
            return None;
        }
        self.records.get(record_number - 1)
    }
}
