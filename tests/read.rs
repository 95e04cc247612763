use shapebuf::{
    Error, GeomReader, RecordIter, Shape, ShapeType, ShpFile, ShpHeader, ShpRecord,
    SHP_FILE_CODE, SHP_HEADER_SIZE, SHP_VERSION,
};

fn shp_header(shape_type: i32, bbox: [f64; 4]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SHP_HEADER_SIZE);
    buf.extend_from_slice(&SHP_FILE_CODE.to_be_bytes());
    buf.extend_from_slice(&[0u8; 20]);
    buf.extend_from_slice(&0i32.to_be_bytes()); // file length, patched by callers that care
    buf.extend_from_slice(&SHP_VERSION.to_le_bytes());
    buf.extend_from_slice(&shape_type.to_le_bytes());
    for v in bbox {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    for _ in 0..4 {
        buf.extend_from_slice(&0.0f64.to_le_bytes());
    }
    assert_eq!(buf.len(), SHP_HEADER_SIZE);
    buf
}

fn record(number: i32, content: &[u8]) -> Vec<u8> {
    assert_eq!(content.len() % 2, 0);
    let mut buf = Vec::new();
    buf.extend_from_slice(&number.to_be_bytes());
    buf.extend_from_slice(&((content.len() / 2) as i32).to_be_bytes());
    buf.extend_from_slice(content);
    buf
}

fn point_content(x: f64, y: f64) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&1i32.to_le_bytes());
    buf.extend_from_slice(&x.to_le_bytes());
    buf.extend_from_slice(&y.to_le_bytes());
    buf
}

fn polygon_content(parts: &[i32], points: &[(f64, f64)]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&5i32.to_le_bytes());
    for v in [0.0f64, 0.0, 100.0, 100.0] {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    buf.extend_from_slice(&(parts.len() as i32).to_le_bytes());
    buf.extend_from_slice(&(points.len() as i32).to_le_bytes());
    for p in parts {
        buf.extend_from_slice(&p.to_le_bytes());
    }
    for (x, y) in points {
        buf.extend_from_slice(&x.to_le_bytes());
        buf.extend_from_slice(&y.to_le_bytes());
    }
    buf
}

#[test]
fn header_fields() {
    let buf = shp_header(1, [-10.0, -20.0, 30.0, 40.0]);
    let mut cur = shapebuf::ByteCursor::new(&buf);
    let header = ShpHeader::read(&mut cur).unwrap();
    assert_eq!(header.file_code, SHP_FILE_CODE);
    assert_eq!(header.version, SHP_VERSION);
    assert_eq!(header.kind(), Some(ShapeType::Point));
    assert_eq!(
        (header.x_min, header.y_min, header.x_max, header.y_max),
        (-10.0, -20.0, 30.0, 40.0)
    );
    assert_eq!(cur.position(), SHP_HEADER_SIZE);
}

#[test]
fn point_record_decodes_from_raw_bytes() {
    // content bytes [01 00 00 00][x=10.0 LE][y=20.0 LE]
    let mut content = vec![0x01, 0x00, 0x00, 0x00];
    content.extend_from_slice(&10.0f64.to_le_bytes());
    content.extend_from_slice(&20.0f64.to_le_bytes());

    let mut buf = shp_header(1, [0.0, 0.0, 100.0, 100.0]);
    buf.extend_from_slice(&record(1, &content));

    let shp = ShpFile::read(&buf).unwrap();
    assert_eq!(shp.records().len(), 1);
    let rec = shp.records()[0];
    assert_eq!(rec.record_number, 1);
    assert_eq!(rec.kind(), Some(ShapeType::Point));
    match rec.shape().unwrap() {
        Shape::Point(p) => assert_eq!((p.x, p.y), (10.0, 20.0)),
        other => panic!("expected point, got {other:?}"),
    }
}

#[test]
fn framing_lands_on_every_record() {
    let mut buf = shp_header(1, [0.0, 0.0, 100.0, 100.0]);
    for n in 1..=5 {
        buf.extend_from_slice(&record(n, &point_content(n as f64, -(n as f64))));
    }

    let shp = ShpFile::read(&buf).unwrap();
    assert_eq!(shp.records().len(), 5);

    // re-deriving each record's offset from declared lengths lands exactly
    // on the next record header, and finally on end-of-buffer
    let mut offset = SHP_HEADER_SIZE;
    for (i, rec) in shp.records().iter().enumerate() {
        assert_eq!(rec.record_number, (i + 1) as i32);
        assert_eq!(rec.content_size(), 20);
        offset += rec.record_size();
    }
    assert_eq!(offset, buf.len());
}

#[test]
fn record_numbers_come_from_the_wire() {
    let mut buf = shp_header(1, [0.0, 0.0, 1.0, 1.0]);
    buf.extend_from_slice(&record(7, &point_content(0.0, 0.0)));
    buf.extend_from_slice(&record(3, &point_content(0.0, 0.0)));

    let shp = ShpFile::read(&buf).unwrap();
    assert_eq!(shp.records()[0].record_number, 7);
    assert_eq!(shp.records()[1].record_number, 3);
}

#[test]
fn overrun_record_fails_whole_file() {
    let mut buf = shp_header(1, [0.0, 0.0, 1.0, 1.0]);
    buf.extend_from_slice(&record(1, &point_content(1.0, 2.0)));
    // second record declares 100 words but carries only a point payload
    buf.extend_from_slice(&2i32.to_be_bytes());
    buf.extend_from_slice(&100i32.to_be_bytes());
    buf.extend_from_slice(&point_content(3.0, 4.0));

    match ShpFile::read(&buf) {
        Err(Error::ContentOverrun { declared, .. }) => assert_eq!(declared, 200),
        other => panic!("expected content overrun, got {other:?}"),
    }
}

#[test]
fn record_iter_fuses_after_error() {
    let mut records = Vec::new();
    records.extend_from_slice(&record(1, &point_content(1.0, 2.0)));
    records.extend_from_slice(&1i32.to_be_bytes());
    records.extend_from_slice(&9999i32.to_be_bytes());

    let mut iter = RecordIter::new(&records);
    assert!(iter.next().unwrap().is_ok());
    assert!(iter.next().unwrap().is_err());
    assert!(iter.next().is_none());
}

#[test]
fn header_only_file_has_no_records() {
    let buf = shp_header(5, [0.0, 0.0, 1.0, 1.0]);
    let shp = ShpFile::read(&buf).unwrap();
    assert!(shp.records().is_empty());
}

#[test]
fn unknown_tag_is_tolerated_in_the_stream() {
    let mut content = Vec::new();
    content.extend_from_slice(&99i32.to_le_bytes());
    content.extend_from_slice(&[0u8; 8]);

    let mut buf = shp_header(1, [0.0, 0.0, 1.0, 1.0]);
    buf.extend_from_slice(&record(1, &content));

    let shp = ShpFile::read(&buf).unwrap();
    let rec: ShpRecord = shp.records()[0];
    assert_eq!(rec.shape_type, 99);
    assert_eq!(rec.kind(), None);
    assert_eq!(rec.shape(), Err(Error::UnknownShapeType(99)));
}

struct VertexCounter(u64);

impl GeomReader for VertexCounter {
    fn pointxy(&mut self, _x: f64, _y: f64, _idx: usize) {
        self.0 += 1;
    }
}

#[test]
fn vertex_counter_visits_every_point() {
    let points: Vec<(f64, f64)> = (0..12).map(|i| (i as f64, i as f64)).collect();
    let content = polygon_content(&[0, 4, 10], &points);

    let mut buf = shp_header(5, [0.0, 0.0, 100.0, 100.0]);
    buf.extend_from_slice(&record(1, &content));

    let shp = ShpFile::read(&buf).unwrap();
    let shape = shp.records()[0].shape().unwrap();
    let mut counter = VertexCounter(0);
    shape.process(&mut counter);
    assert_eq!(counter.0, 12);
}
