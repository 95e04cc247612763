//! SVG emission for decoded shapes.
//!
//! The emitters consume shapes through the [`GeomReader`] visitor and never
//! touch the underlying buffer. Coordinates can optionally be reprojected to
//! the Web-Mercator map frame, in which case the shapefile's (x, y) pairs
//! are interpreted as (longitude, latitude) degrees.

use crate::geometry::{GeomReader, Shape, ShapeType};
use crate::mercator::lat_lon_to_map;
use crate::shp::{ShpFile, ShpRecord};
use std::io::{self, Write};

/// Writes one `<path>` element per shape.
///
/// `close_parts` appends `Z` after each part, which is correct for polygon
/// rings. Some renderers close polyline parts too; that stays a caller
/// decision here rather than a silent default.
pub struct SvgEmitter<'a, W: Write> {
    out: &'a mut W,
    project: bool,
    close_parts: bool,
    in_multipoint: bool,
}

impl<'a, W: Write> SvgEmitter<'a, W> {
    pub fn new(out: &'a mut W, project: bool, close_parts: bool) -> SvgEmitter<'a, W> {
        SvgEmitter {
            out,
            project,
            close_parts,
            in_multipoint: false,
        }
    }

    fn write_xy(&mut self, x: f64, y: f64) {
        if self.project {
            let (px, py) = lat_lon_to_map(y, x);
            write!(self.out, "{px:.4}, {py:.4} ").unwrap();
        } else {
            write!(self.out, "{x}, {y} ").unwrap();
        }
    }
}

impl<W: Write> GeomReader for SvgEmitter<'_, W> {
    fn pointxy(&mut self, x: f64, y: f64, _idx: usize) {
        if self.in_multipoint {
            self.out.write_all(b"M ").unwrap();
        }
        self.write_xy(x, y);
    }
    fn point_begin(&mut self, _idx: usize) {
        self.out.write_all(br#"<path d="M "#).unwrap();
    }
    fn point_end(&mut self) {
        self.out.write_all(br#""/>"#).unwrap();
    }
    fn multipoint_begin(&mut self, _size: usize) {
        self.in_multipoint = true;
        self.out.write_all(br#"<path d=""#).unwrap();
    }
    fn multipoint_end(&mut self) {
        self.in_multipoint = false;
        self.out.write_all(br#""/>"#).unwrap();
    }
    fn line_begin(&mut self, _num_parts: usize) {
        self.out.write_all(br#"<path d=""#).unwrap();
    }
    fn line_end(&mut self) {
        self.out.write_all(br#""/>"#).unwrap();
    }
    fn part_begin(&mut self, _size: usize, _idx: usize) {
        self.out.write_all(b"M ").unwrap();
    }
    fn part_end(&mut self, _idx: usize) {
        if self.close_parts {
            self.out.write_all(b"Z ").unwrap();
        }
    }
    fn ring_begin(&mut self, _size: usize, _idx: usize) {
        self.out.write_all(b"M ").unwrap();
    }
    fn ring_end(&mut self, _idx: usize) {
        self.out.write_all(b"Z ").unwrap();
    }
    fn poly_begin(&mut self, _num_parts: usize) {
        self.out.write_all(br#"<path d=""#).unwrap();
    }
    fn poly_end(&mut self) {
        self.out.write_all(br#""/>"#).unwrap();
    }
}

impl Shape {
    /// Render this shape as a `<path>` element.
    pub fn to_svg<W: Write>(&self, out: &mut W, project: bool) -> io::Result<()> {
        // rings close, line parts stay open
        let close_parts = matches!(self, Shape::Polygon(_));
        let mut svg = SvgEmitter::new(out, project, close_parts);
        self.process(&mut svg);
        Ok(())
    }
}

fn write_record<W: Write>(out: &mut W, rec: &ShpRecord, project: bool) -> io::Result<()> {
    match rec.kind() {
        Some(
            ShapeType::NullShape
            | ShapeType::Point
            | ShapeType::MultiPoint
            | ShapeType::PolyLine
            | ShapeType::Polygon,
        ) => match rec.shape() {
            Ok(shape) => shape.to_svg(out, project)?,
            Err(_) => write!(out, "<!-- record {}: parse failed -->", rec.record_number)?,
        },
        Some(kind) => write!(out, "<!-- {kind:?} -->")?,
        None => write!(out, "<!-- unknown shape type {} -->", rec.shape_type)?,
    }
    Ok(())
}

impl ShpFile<'_> {
    /// Write the whole file as an SVG document, one path per record.
    ///
    /// With `project` set, every vertex and the viewBox go through the
    /// Web-Mercator map frame; otherwise raw coordinates are emitted.
    pub fn to_svg<W: Write>(&self, out: &mut W, project: bool) -> io::Result<()> {
        let (min_x, min_y, max_x, max_y) = if project {
            // north-west corner of the bbox lands at the frame minimum
            let (min_x, min_y) = lat_lon_to_map(self.header.y_max, self.header.x_min);
            let (max_x, max_y) = lat_lon_to_map(self.header.y_min, self.header.x_max);
            (min_x, min_y, max_x, max_y)
        } else {
            (
                self.header.x_min,
                self.header.y_min,
                self.header.x_max,
                self.header.y_max,
            )
        };
        let len_x = max_x - min_x;
        let len_y = max_y - min_y;

        out.write_all(b"<svg \n  xmlns='http://www.w3.org/2000/svg'\n")?;
        writeln!(out, "  width='{len_x:.4}' height='{len_y:.4}'")?;
        writeln!(
            out,
            "  viewBox='{min_x:.4} {min_y:.4} {len_x:.4} {len_y:.4}'\n>"
        )?;
        out.write_all(b"<style>\n")?;
        out.write_all(
            b"  svg {stroke-width:0.5;stroke:black;vector-effect:non-scaling-stroke;fill:black;}\n",
        )?;
        out.write_all(
            b"  path {paint-order:fill,stroke;stroke-width:0.5;stroke:black;vector-effect:non-scaling-stroke;fill:beige;}\n",
        )?;
        out.write_all(b"</style>\n")?;

        for rec in self.records() {
            write_record(out, rec, project)?;
            out.write_all(b"\n")?;
        }

        out.write_all(b"</svg>\n")?;
        Ok(())
    }
}
