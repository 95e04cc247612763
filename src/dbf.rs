use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::geometry::Strictness;
use byteorder::{ByteOrder, LittleEndian};
use std::collections::HashMap;
use std::str;
use tracing::{debug, warn};

/// Terminator byte closing the field descriptor array.
pub const FIELD_TERMINATOR: u8 = 0x0D;
/// Size of the fixed table header and of each field descriptor.
pub const DBF_HEADER_SIZE: usize = 32;
const FIELD_DESCRIPTOR_SIZE: usize = 32;

/// dBASE field type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    // dBASE III
    Character,
    Date,
    Float,
    Numeric,
    Logical,
    // Visual FoxPro
    DateTime,
    Integer,
    Currency,
    // dBASE III+
    Memo,
    General,
    Picture,
    VarChar,
    Binary,
    VarBinary,
    TimeStamp,
    Double,
    AutoIncrement,
    Unknown,
}

impl FieldType {
    pub fn from_tag(tag: u8) -> FieldType {
        match tag {
            b'C' => FieldType::Character,
            b'D' => FieldType::Date,
            b'F' => FieldType::Float,
            b'N' => FieldType::Numeric,
            b'L' => FieldType::Logical,
            b'T' => FieldType::DateTime,
            b'I' => FieldType::Integer,
            b'Y' => FieldType::Currency,
            b'M' => FieldType::Memo,
            b'G' => FieldType::General,
            b'P' => FieldType::Picture,
            b'V' => FieldType::VarChar,
            b'B' => FieldType::Binary,
            b'Q' => FieldType::VarBinary,
            b'@' => FieldType::TimeStamp,
            b'O' => FieldType::Double,
            b'+' => FieldType::AutoIncrement,
            _ => FieldType::Unknown,
        }
    }
}

/// One field of the row layout.
///
/// `offset` is not on the wire; it is assigned during schema accumulation as
/// the sum of the preceding fields' lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldType,
    /// Reserved in-memory address from the wire; retained, unused.
    pub data_address: u32,
    pub length: u8,
    pub decimal_count: u8,
    pub work_area_id: u16,
    pub example: u8,
    pub mdx_flag: u8,
    pub offset: usize,
}

impl FieldDescriptor {
    /// Read one 32-byte descriptor record.
    ///
    /// Returns `Ok(None)` when the terminator byte is next: that is the
    /// normal end of the schema, distinguished from a true read failure.
    pub fn read(cur: &mut ByteCursor) -> Result<Option<FieldDescriptor>> {
        if cur.sub_view(1)?[0] == FIELD_TERMINATOR {
            cur.skip(1)?;
            return Ok(None);
        }
        if cur.remaining() < FIELD_DESCRIPTOR_SIZE {
            return Err(Error::InsufficientData {
                needed: FIELD_DESCRIPTOR_SIZE,
                remaining: cur.remaining(),
            });
        }

        let name_bytes = cur.read_bytes(11)?;
        let name = trim_name(name_bytes);
        let kind = FieldType::from_tag(cur.read_u8()?);
        let data_address = cur.read_u32::<LittleEndian>()?;
        let length = cur.read_u8()?;
        let decimal_count = cur.read_u8()?;
        let work_area_id = cur.read_u16::<LittleEndian>()?;
        let example = cur.read_u8()?;
        cur.skip(10)?; // reserved
        let mdx_flag = cur.read_u8()?;

        Ok(Some(FieldDescriptor {
            name,
            kind,
            data_address,
            length,
            decimal_count,
            work_area_id,
            example,
            mdx_flag,
            offset: 0,
        }))
    }

    pub fn size(&self) -> usize {
        self.length as usize
    }

    /// Borrow this field's byte range within a row view.
    ///
    /// Returns `None` when the range would overrun the row, which defends
    /// against a corrupt schema whose accumulated offsets exceed the actual
    /// row stride.
    pub fn data<'a>(&self, row: &'a [u8]) -> Option<&'a [u8]> {
        if self.offset + self.size() > row.len() {
            return None;
        }
        Some(&row[self.offset..self.offset + self.size()])
    }

    /// Interpret this field's bytes within a row according to its type tag.
    pub fn value<'a>(&self, row: &'a [u8]) -> Option<ColumnValue<'a>> {
        let raw = self.data(row)?;
        let trimmed = trim_value(raw);
        let value = match self.kind {
            FieldType::Character => match str::from_utf8(trimmed) {
                Ok(s) => ColumnValue::Character(s),
                Err(_) => ColumnValue::Raw(raw),
            },
            FieldType::Date => match str::from_utf8(trimmed) {
                Ok(s) => ColumnValue::Date(s),
                Err(_) => ColumnValue::Raw(raw),
            },
            FieldType::Float => match parse_f64(trimmed) {
                Some(v) => ColumnValue::Float(v),
                None => ColumnValue::Raw(raw),
            },
            FieldType::Numeric => match parse_f64(trimmed) {
                Some(v) => ColumnValue::Numeric(v),
                None => ColumnValue::Raw(raw),
            },
            FieldType::Logical => ColumnValue::Logical(match trimmed.first() {
                Some(b'T' | b't' | b'Y' | b'y') => Some(true),
                Some(b'F' | b'f' | b'N' | b'n') => Some(false),
                _ => None,
            }),
            // binary little-endian, unlike the text-encoded numeric types
            FieldType::Integer if raw.len() >= 4 => {
                ColumnValue::Integer(LittleEndian::read_i32(&raw[..4]))
            }
            _ => ColumnValue::Raw(raw),
        };
        Some(value)
    }
}

fn trim_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end])
        .trim_matches(' ')
        .to_string()
}

/// Trim the spaces and NULs dBASE pads text fields with.
pub fn trim_value(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|&b| b != b' ' && b != 0)
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

fn parse_f64(bytes: &[u8]) -> Option<f64> {
    str::from_utf8(bytes).ok()?.parse().ok()
}

/// A field value interpreted by type tag. Borrowed variants point into the
/// row view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue<'a> {
    Character(&'a str),
    Date(&'a str),
    Float(f64),
    Numeric(f64),
    Logical(Option<bool>),
    Integer(i32),
    Raw(&'a [u8]),
}

/// The ordered field layout of a table.
///
/// Wire order is significant: it is the row layout. The name index resolves
/// duplicates with last-write-wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSchema {
    fields: Vec<FieldDescriptor>,
    by_name: HashMap<String, usize>,
    row_size: usize,
}

impl RowSchema {
    /// Accumulate descriptors until the terminator, assigning each field's
    /// offset, with the legacy best-effort policy.
    pub fn read(cur: &mut ByteCursor) -> RowSchema {
        match RowSchema::read_with(cur, Strictness::Lenient) {
            Ok(schema) => schema,
            // Lenient never reports an error
            Err(_) => RowSchema::default(),
        }
    }

    /// Accumulate descriptors until the terminator.
    ///
    /// Under `Lenient`, a descriptor that individually fails to read stops
    /// the loop and the partial schema is accepted: truncated and corrupt
    /// trailers are common in the wild, and best-effort recovery is the
    /// compatibility behavior. `Strict` propagates the failure instead.
    pub fn read_with(cur: &mut ByteCursor, strictness: Strictness) -> Result<RowSchema> {
        let mut schema = RowSchema::default();
        while cur.remaining() > 0 {
            match FieldDescriptor::read(cur) {
                Ok(Some(mut field)) => {
                    field.offset = schema.row_size;
                    schema.row_size += field.size();
                    schema
                        .by_name
                        .insert(field.name.clone(), schema.fields.len());
                    schema.fields.push(field);
                }
                Ok(None) => return Ok(schema),
                Err(e) => {
                    if strictness == Strictness::Strict {
                        return Err(e);
                    }
                    warn!("field descriptor stream stopped early: {e}");
                    return Ok(schema);
                }
            }
        }
        warn!("field descriptor stream ended without terminator");
        Ok(schema)
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Sum of all field lengths: the row stride minus the status byte.
    pub fn row_size(&self) -> usize {
        self.row_size
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Borrow the named field's byte range within a row view; `None` when
    /// the field is absent or its range overruns the row.
    pub fn field_data<'a>(&self, row: &'a [u8], name: &str) -> Option<&'a [u8]> {
        self.field(name)?.data(row)
    }
}

/// A decoded dBASE III table over a borrowed file buffer.
///
/// Rows are computed, not materialized: [`DbfTable::row`] addresses into the
/// buffer using the header-declared stride and skips the leading row-status
/// byte, so a row view is exactly the schema's field bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct DbfTable<'a> {
    buf: &'a [u8],
    pub version: u8,
    pub last_update_year: u16,
    pub last_update_month: u8,
    pub last_update_day: u8,
    record_count: u32,
    header_size: u16,
    /// On-disk row stride, one larger than the schema row size because of
    /// the status byte.
    record_size: u16,
    schema: RowSchema,
}

impl<'a> DbfTable<'a> {
    pub fn read(buf: &'a [u8]) -> Result<DbfTable<'a>> {
        DbfTable::read_with(buf, Strictness::Lenient)
    }

    pub fn read_with(buf: &'a [u8], strictness: Strictness) -> Result<DbfTable<'a>> {
        let mut cur = ByteCursor::new(buf);
        if cur.remaining() < DBF_HEADER_SIZE {
            return Err(Error::InsufficientData {
                needed: DBF_HEADER_SIZE,
                remaining: cur.remaining(),
            });
        }

        let version = cur.read_u8()? & 0x07;
        if version != 3 {
            return Err(Error::UnsupportedVersion(version));
        }
        let last_update_year = 1900 + cur.read_u8()? as u16;
        let last_update_month = cur.read_u8()?;
        let last_update_day = cur.read_u8()?;
        let record_count = cur.read_u32::<LittleEndian>()?;
        let header_size = cur.read_u16::<LittleEndian>()?;
        let record_size = cur.read_u16::<LittleEndian>()?;
        cur.skip(3)?; // reserved bytes 12-14
        cur.skip(13)?; // reserved bytes 15-27, dBASE III+ on a LAN
        cur.skip(4)?; // reserved bytes 28-31

        let schema = RowSchema::read_with(&mut cur, strictness)?;
        debug!(
            fields = schema.fields().len(),
            rows = record_count,
            "decoded dbf table"
        );

        Ok(DbfTable {
            buf,
            version,
            last_update_year,
            last_update_month,
            last_update_day,
            record_count,
            header_size,
            record_size,
            schema,
        })
    }

    pub fn schema(&self) -> &RowSchema {
        &self.schema
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        self.schema.fields()
    }

    pub fn record_count(&self) -> usize {
        self.record_count as usize
    }

    pub fn header_size(&self) -> usize {
        self.header_size as usize
    }

    /// On-disk row stride including the status byte.
    pub fn record_size(&self) -> usize {
        self.record_size as usize
    }

    /// Borrow the field bytes of row `n` (1-based), skipping the status
    /// byte. Out-of-range row numbers yield `None`, never an error: callers
    /// routinely probe bounds.
    pub fn row(&self, n: usize) -> Option<&'a [u8]> {
        if n == 0 || n > self.record_count as usize {
            return None;
        }
        let start = self.header_size as usize + (n - 1) * self.record_size as usize + 1;
        let end = start + self.schema.row_size();
        if end > self.buf.len() {
            return None;
        }
        Some(&self.buf[start..end])
    }

    pub fn field_data(&self, row: &'a [u8], name: &str) -> Option<&'a [u8]> {
        self.schema.field_data(row, name)
    }
}

/// Feed every field of a row to `reader` in schema order; stops early when
/// the closure returns `true` and reports whether it did. Fields whose byte
/// range falls outside the row are skipped.
pub fn read_fields<'a, F>(schema: &RowSchema, row: &'a [u8], mut reader: F) -> bool
where
    F: FnMut(usize, &str, ColumnValue<'a>) -> bool,
{
    let mut finish = false;
    for (i, field) in schema.fields().iter().enumerate() {
        if finish {
            break;
        }
        if let Some(value) = field.value(row) {
            finish = reader(i, &field.name, value);
        }
    }
    finish
}

/// All fields of a row rendered to strings, keyed by field name.
pub fn row_values(schema: &RowSchema, row: &[u8]) -> HashMap<String, String> {
    let mut values = HashMap::new();
    let _ = read_fields(schema, row, |_i, name, value| {
        let vstr = match value {
            ColumnValue::Character(v) => v.to_string(),
            ColumnValue::Date(v) => v.to_string(),
            ColumnValue::Float(v) => format!("{v}"),
            ColumnValue::Numeric(v) => format!("{v}"),
            ColumnValue::Logical(Some(v)) => format!("{v}"),
            ColumnValue::Logical(None) => String::new(),
            ColumnValue::Integer(v) => format!("{v}"),
            ColumnValue::Raw(v) => String::from_utf8_lossy(trim_value(v)).to_string(),
        };
        values.insert(name.to_string(), vstr);
        false
    });
    values
}
