//! CSV emission for dBASE tables.

use crate::dbf::{trim_value, DbfTable, RowSchema};
use std::io::{self, Write};

/// Write the header row of field names.
pub fn write_header<W: Write>(schema: &RowSchema, out: &mut W) -> io::Result<()> {
    for (i, field) in schema.fields().iter().enumerate() {
        if i > 0 {
            out.write_all(b", ")?;
        }
        out.write_all(field.name.as_bytes())?;
    }
    out.write_all(b"\n")
}

/// Values containing a comma get wrapped in quotes.
fn write_value<W: Write>(value: &[u8], out: &mut W) -> io::Result<()> {
    let quote = value.contains(&b',');
    if quote {
        out.write_all(b"\"")?;
    }
    out.write_all(value)?;
    if quote {
        out.write_all(b"\"")?;
    }
    Ok(())
}

/// Write one row, fields in schema order, trimmed of padding.
pub fn write_row<W: Write>(schema: &RowSchema, row: &[u8], out: &mut W) -> io::Result<()> {
    for (i, field) in schema.fields().iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        if let Some(data) = schema.field_data(row, &field.name) {
            write_value(trim_value(data), out)?;
        }
    }
    out.write_all(b"\n")
}

/// Write the whole table: header row, then every data row.
pub fn write_table<W: Write>(table: &DbfTable, out: &mut W) -> io::Result<()> {
    write_header(table.schema(), out)?;
    for n in 1..=table.record_count() {
        if let Some(row) = table.row(n) {
            write_row(table.schema(), row, out)?;
        }
    }
    Ok(())
}
