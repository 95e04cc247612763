use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use byteorder::LittleEndian;
use std::ops::Range;

/// Shape type tags as they appear on the wire.
///
/// The Z/M/MultiPatch variants are tagged so records carrying them can be
/// identified and skipped; their payloads are not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    NullShape = 0,
    Point = 1,
    PolyLine = 3,
    Polygon = 5,
    MultiPoint = 8,
    PointZ = 11,
    PolyLineZ = 13,
    PolygonZ = 15,
    MultiPointZ = 18,
    PointM = 21,
    PolyLineM = 23,
    PolygonM = 25,
    MultiPointM = 28,
    MultiPatch = 31,
}

impl ShapeType {
    pub fn from_i32(tag: i32) -> Option<ShapeType> {
        let kind = match tag {
            0 => ShapeType::NullShape,
            1 => ShapeType::Point,
            3 => ShapeType::PolyLine,
            5 => ShapeType::Polygon,
            8 => ShapeType::MultiPoint,
            11 => ShapeType::PointZ,
            13 => ShapeType::PolyLineZ,
            15 => ShapeType::PolygonZ,
            18 => ShapeType::MultiPointZ,
            21 => ShapeType::PointM,
            23 => ShapeType::PolyLineM,
            25 => ShapeType::PolygonM,
            28 => ShapeType::MultiPointM,
            31 => ShapeType::MultiPatch,
            _ => return None,
        };
        Some(kind)
    }
}

/// Decode policy for the historically lenient payload reads.
///
/// `Lenient` keeps the historical behavior: a failed part-index read stops the
/// part table where it is, and a short MultiPoint tail keeps the points read
/// so far. `Strict` turns both into errors and additionally rejects part
/// tables that are not non-decreasing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strictness {
    #[default]
    Lenient,
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BBox {
    fn read(cur: &mut ByteCursor) -> Result<BBox> {
        Ok(BBox {
            x_min: cur.read_f64::<LittleEndian>()?,
            y_min: cur.read_f64::<LittleEndian>()?,
            x_max: cur.read_f64::<LittleEndian>()?,
            y_max: cur.read_f64::<LittleEndian>()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiPoint {
    pub bbox: BBox,
    /// Flat interleaved x,y pairs.
    pub xy: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolyLine {
    pub bbox: BBox,
    /// Part-start indices into the point sequence.
    pub parts: Vec<i32>,
    pub xy: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub bbox: BBox,
    pub parts: Vec<i32>,
    pub xy: Vec<f64>,
}

/// A part spans from its start index up to the next part's start; the last
/// part implicitly ends at the total point count.
fn part_range(parts: &[i32], num_points: usize, i: usize) -> Range<usize> {
    let start = parts[i].max(0) as usize;
    let end = match parts.get(i + 1) {
        Some(&next) => next.max(0) as usize,
        None => num_points,
    };
    start.min(num_points)..end.min(num_points)
}

impl MultiPoint {
    pub fn num_points(&self) -> usize {
        self.xy.len() / 2
    }

    pub fn point(&self, i: usize) -> (f64, f64) {
        (self.xy[i * 2], self.xy[i * 2 + 1])
    }
}

impl PolyLine {
    pub fn num_points(&self) -> usize {
        self.xy.len() / 2
    }

    pub fn point(&self, i: usize) -> (f64, f64) {
        (self.xy[i * 2], self.xy[i * 2 + 1])
    }

    pub fn part_range(&self, i: usize) -> Range<usize> {
        part_range(&self.parts, self.num_points(), i)
    }
}

impl Polygon {
    pub fn num_points(&self) -> usize {
        self.xy.len() / 2
    }

    pub fn point(&self, i: usize) -> (f64, f64) {
        (self.xy[i * 2], self.xy[i * 2 + 1])
    }

    pub fn part_range(&self, i: usize) -> Range<usize> {
        part_range(&self.parts, self.num_points(), i)
    }
}

/// Tagged union over the decoded geometry payloads.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Null,
    Point(Point),
    MultiPoint(MultiPoint),
    PolyLine(PolyLine),
    Polygon(Polygon),
}

impl Shape {
    /// Decode a shape from a record content view with the legacy lenient
    /// policy.
    pub fn read(content: &[u8]) -> Result<Shape> {
        Shape::read_with(content, Strictness::Lenient)
    }

    /// Decode a shape from a record content view.
    ///
    /// The view must start with the 4-byte little-endian shape type tag,
    /// i.e. be exactly a record's content excluding the record header.
    pub fn read_with(content: &[u8], strictness: Strictness) -> Result<Shape> {
        let mut cur = ByteCursor::new(content);
        let tag = cur.read_i32::<LittleEndian>()?;
        let kind = ShapeType::from_i32(tag).ok_or(Error::UnknownShapeType(tag))?;
        match kind {
            ShapeType::NullShape => Ok(Shape::Null),
            ShapeType::Point => {
                let x = cur.read_f64::<LittleEndian>()?;
                let y = cur.read_f64::<LittleEndian>()?;
                Ok(Shape::Point(Point { x, y }))
            }
            ShapeType::MultiPoint => {
                let bbox = BBox::read(&mut cur)?;
                let num_points = cur.read_i32::<LittleEndian>()?.max(0) as usize;
                let mut xy = Vec::with_capacity(num_points * 2);
                for _ in 0..num_points {
                    match read_point(&mut cur, &mut xy) {
                        Ok(()) => {}
                        Err(e) => {
                            if strictness == Strictness::Strict {
                                return Err(e);
                            }
                            // short tail: keep the points read so far
                            break;
                        }
                    }
                }
                Ok(Shape::MultiPoint(MultiPoint { bbox, xy }))
            }
            ShapeType::PolyLine => {
                let (bbox, parts, xy) = read_multi_part(&mut cur, strictness)?;
                Ok(Shape::PolyLine(PolyLine { bbox, parts, xy }))
            }
            ShapeType::Polygon => {
                let (bbox, parts, xy) = read_multi_part(&mut cur, strictness)?;
                Ok(Shape::Polygon(Polygon { bbox, parts, xy }))
            }
            other => Err(Error::UnsupportedShapeType(other)),
        }
    }

    pub fn kind(&self) -> ShapeType {
        match self {
            Shape::Null => ShapeType::NullShape,
            Shape::Point(_) => ShapeType::Point,
            Shape::MultiPoint(_) => ShapeType::MultiPoint,
            Shape::PolyLine(_) => ShapeType::PolyLine,
            Shape::Polygon(_) => ShapeType::Polygon,
        }
    }

    /// Walk the shape through a [`GeomReader`].
    pub fn process<R: GeomReader>(&self, reader: &mut R) {
        match self {
            Shape::Null => {}
            Shape::Point(p) => {
                reader.point_begin(0);
                reader.pointxy(p.x, p.y, 0);
                reader.point_end();
            }
            Shape::MultiPoint(mp) => {
                reader.multipoint_begin(mp.num_points());
                for i in 0..mp.num_points() {
                    let (x, y) = mp.point(i);
                    reader.pointxy(x, y, i);
                }
                reader.multipoint_end();
            }
            Shape::PolyLine(pl) => {
                reader.line_begin(pl.parts.len());
                for i in 0..pl.parts.len() {
                    let range = pl.part_range(i);
                    reader.part_begin(range.len(), i);
                    for (idx, j) in range.enumerate() {
                        let (x, y) = pl.point(j);
                        reader.pointxy(x, y, idx);
                    }
                    reader.part_end(i);
                }
                reader.line_end();
            }
            Shape::Polygon(poly) => {
                reader.poly_begin(poly.parts.len());
                for i in 0..poly.parts.len() {
                    let range = poly.part_range(i);
                    reader.ring_begin(range.len(), i);
                    for (idx, j) in range.enumerate() {
                        let (x, y) = poly.point(j);
                        reader.pointxy(x, y, idx);
                    }
                    reader.ring_end(i);
                }
                reader.poly_end();
            }
        }
    }
}

fn read_point(cur: &mut ByteCursor, xy: &mut Vec<f64>) -> Result<()> {
    // check both coordinates up front so a short pair never leaves a
    // dangling x behind
    cur.sub_view(16)?;
    xy.push(cur.read_f64::<LittleEndian>()?);
    xy.push(cur.read_f64::<LittleEndian>()?);
    Ok(())
}

fn read_multi_part(
    cur: &mut ByteCursor,
    strictness: Strictness,
) -> Result<(BBox, Vec<i32>, Vec<f64>)> {
    let bbox = BBox::read(cur)?;
    let num_parts = cur.read_i32::<LittleEndian>()?.max(0) as usize;
    let num_points = cur.read_i32::<LittleEndian>()?.max(0) as usize;

    if num_parts * 4 > cur.remaining() {
        return Err(Error::InsufficientData {
            needed: num_parts * 4,
            remaining: cur.remaining(),
        });
    }

    let mut parts = Vec::with_capacity(num_parts);
    for i in 0..num_parts {
        match cur.read_i32::<LittleEndian>() {
            Ok(start) => {
                if strictness == Strictness::Strict {
                    if let Some(&prev) = parts.last() {
                        if start < prev {
                            return Err(Error::InvalidPartTable { part: i });
                        }
                    }
                }
                parts.push(start);
            }
            Err(e) => {
                if strictness == Strictness::Strict {
                    return Err(e);
                }
                // a failed part read stops the table; the shape keeps going
                break;
            }
        }
    }

    let mut xy = Vec::with_capacity(num_points * 2);
    for _ in 0..num_points {
        // a short point pair fails the whole shape, in either mode
        read_point(cur, &mut xy)?;
    }

    Ok((bbox, parts, xy))
}

/// Visitor over decoded geometry, with no-op defaults.
///
/// Emitters implement the callbacks they care about; this is the only
/// interface they need, the decoded buffers never leave the crate's shapes.
pub trait GeomReader {
    fn pointxy(&mut self, _x: f64, _y: f64, _idx: usize) {}
    fn point_begin(&mut self, _idx: usize) {}
    fn point_end(&mut self) {}
    fn multipoint_begin(&mut self, _size: usize) {}
    fn multipoint_end(&mut self) {}
    fn line_begin(&mut self, _num_parts: usize) {}
    fn line_end(&mut self) {}
    fn part_begin(&mut self, _size: usize, _idx: usize) {}
    fn part_end(&mut self, _idx: usize) {}
    fn ring_begin(&mut self, _size: usize, _idx: usize) {}
    fn ring_end(&mut self, _idx: usize) {}
    fn poly_begin(&mut self, _num_parts: usize) {}
    fn poly_end(&mut self) {}
}
