//! Zero-copy reader for ESRI shapefile (.shp/.shx) and dBASE III (.dbf)
//! buffers.
//!
//! Both formats are decoded directly from an in-memory byte buffer, e.g. a
//! memory-mapped file. Decoded records and rows hold borrowed views into
//! that buffer; bytes are only interpreted when a caller asks for a typed
//! value. The buffer must outlive every view derived from it, which the
//! borrow checker enforces.
//!
//! ```
//! use shapebuf::{Shape, ShpFile};
//!
//! # fn read(buf: &[u8]) -> shapebuf::Result<()> {
//! let shp = ShpFile::read(buf)?;
//! for rec in shp.records() {
//!     if let Ok(Shape::Point(p)) = rec.shape() {
//!         println!("record {}: {} {}", rec.record_number, p.x, p.y);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod csv;
mod cursor;
mod dbf;
mod error;
mod geometry;
mod mercator;
mod shp;
pub mod svg;

pub use cursor::ByteCursor;
pub use dbf::{
    read_fields, row_values, trim_value, ColumnValue, DbfTable, FieldDescriptor, FieldType,
    RowSchema, DBF_HEADER_SIZE, FIELD_TERMINATOR,
};
pub use error::{Error, Result};
pub use geometry::{
    BBox, GeomReader, MultiPoint, Point, PolyLine, Polygon, Shape, ShapeType, Strictness,
};
pub use mercator::{lat_lon_to_map, lat_lon_to_mercator, EARTH_RADIUS, MAX_MERCATOR};
pub use shp::{RecordIter, ShpFile, ShpHeader, ShpRecord, ShxFile, ShxRecord};
pub use svg::SvgEmitter;

/// Expected value of the big-endian file code word; recorded, not enforced.
pub const SHP_FILE_CODE: i32 = 9994;
/// Shapefile format version.
pub const SHP_VERSION: i32 = 1000;
/// Size of the fixed .shp/.shx file header.
pub const SHP_HEADER_SIZE: usize = 100;
/// Size of the per-record framing header.
pub const SHP_RECORD_HEADER_SIZE: usize = 8;
