//! End-to-end DXF interchange tests: export a document, read it back,
//! and check the geometry survives the pixel/mm and Y-flip conversions.

use plotsketch_cad::{CadExporter, CadImporter, DxfParser, ARC_SEGMENTS};
use plotsketch_core::{Point, Rgb, ShapeKind, SketchDocument, PIXELS_PER_MM};

fn sample_document() -> SketchDocument {
    let mut doc = SketchDocument::new();
    doc.add_stroke(
        vec![
            Point::new(10.0, 10.0),
            Point::new(50.0, 80.0),
            Point::new(120.0, 40.0),
        ],
        Rgb::BLACK,
        2.0,
    )
    .unwrap();
    doc.add_shape(
        ShapeKind::Line,
        Point::new(0.0, 0.0),
        Point::new(200.0, 150.0),
        Rgb::RED,
        2.0,
    )
    .unwrap();
    doc.add_shape(
        ShapeKind::Circle,
        Point::new(100.0, 100.0),
        Point::new(150.0, 100.0),
        Rgb::BLUE,
        2.0,
    )
    .unwrap();
    doc.add_shape(
        ShapeKind::Rectangle,
        Point::new(20.0, 20.0),
        Point::new(90.0, 60.0),
        Rgb::GREEN,
        2.0,
    )
    .unwrap();
    doc
}

fn assert_close(a: Point, b: Point) {
    assert!(
        a.distance_to(&b) < 1.0,
        "points differ by more than a pixel: {:?} vs {:?}",
        a,
        b
    );
}

#[test]
fn round_trip_preserves_geometry_within_a_pixel() {
    let original = sample_document();
    let text = CadExporter::export_str(&original);
    let (imported, stats) = CadImporter::new().import_str(&text).unwrap();
    assert!(!stats.recovered);

    // Stroke comes back as a stroke.
    assert_eq!(imported.strokes.len(), 2); // freehand stroke + rectangle outline
    for (a, b) in original.strokes[0]
        .points
        .iter()
        .zip(&imported.strokes[0].points)
    {
        assert_close(*a, *b);
    }

    // Line and circle come back as shapes.
    assert_eq!(imported.shapes.len(), 2);
    let line = &imported.shapes[0];
    assert_eq!(line.kind, ShapeKind::Line);
    assert_close(line.start, original.shapes[0].start);
    assert_close(line.end, original.shapes[0].end);
    assert_eq!(line.color, Rgb::RED);

    let circle = &imported.shapes[1];
    assert_eq!(circle.kind, ShapeKind::Circle);
    assert_close(circle.start, Point::new(100.0, 100.0));
    assert!((circle.radius() - 50.0).abs() < 1.0);
    assert_eq!(circle.color, Rgb::BLUE);
}

#[test]
fn circle_radius_travels_through_mm() {
    let mut doc = SketchDocument::new();
    doc.add_shape(
        ShapeKind::Circle,
        Point::new(100.0, 100.0),
        Point::new(150.0, 100.0),
        Rgb::BLACK,
        2.0,
    )
    .unwrap();
    let file = CadExporter::to_dxf(&doc);
    match &file.entities[0] {
        plotsketch_cad::DxfEntity::Circle(circle) => {
            assert!((circle.radius - 50.0 / PIXELS_PER_MM).abs() < 1e-9);
        }
        other => panic!("expected circle, got {:?}", other),
    }
}

#[test]
fn rectangle_round_trips_as_closed_outline() {
    let mut doc = SketchDocument::new();
    doc.add_shape(
        ShapeKind::Rectangle,
        Point::new(10.0, 10.0),
        Point::new(110.0, 60.0),
        Rgb::BLACK,
        2.0,
    )
    .unwrap();
    let (imported, stats) = CadImporter::new()
        .import_str(&CadExporter::export_str(&doc))
        .unwrap();
    assert_eq!(stats.lwpolylines, 1);
    let outline = &imported.strokes[0];
    assert_eq!(outline.points.len(), 5);
    assert_eq!(outline.points.first(), outline.points.last());
    assert_close(outline.points[0], Point::new(10.0, 10.0));
    assert_close(outline.points[2], Point::new(110.0, 60.0));
}

#[test]
fn arc_import_uses_fixed_segment_count() {
    // Hand-built DXF with an arc wrapping through 0 degrees.
    let content = "\
0\nSECTION\n2\nHEADER\n9\n$ACADVER\n1\nAC1024\n9\n$INSUNITS\n70\n4\n0\nENDSEC\n\
0\nSECTION\n2\nENTITIES\n\
0\nARC\n8\n0\n62\n7\n10\n0.0\n20\n0.0\n40\n10.0\n50\n350.0\n51\n10.0\n\
0\nENDSEC\n0\nEOF\n";
    let (doc, stats) = CadImporter::new().import_str(content).unwrap();
    assert_eq!(stats.arcs, 1);
    let stroke = &doc.strokes[0];
    assert_eq!(stroke.points.len(), ARC_SEGMENTS + 1);
    // A 20 degree sweep stays short; a wrong -340 sweep would not.
    let length: f64 = stroke
        .points
        .windows(2)
        .map(|pair| pair[0].distance_to(&pair[1]))
        .sum();
    let expected = 10.0 * 20.0_f64.to_radians() * PIXELS_PER_MM;
    assert!((length - expected).abs() < 1.0);
}

#[test]
fn damaged_file_import_recovers_entities() {
    let mut doc = SketchDocument::new();
    doc.add_shape(
        ShapeKind::Line,
        Point::new(0.0, 0.0),
        Point::new(100.0, 100.0),
        Rgb::RED,
        2.0,
    )
    .unwrap();
    doc.add_shape(
        ShapeKind::Circle,
        Point::new(50.0, 50.0),
        Point::new(80.0, 50.0),
        Rgb::BLUE,
        2.0,
    )
    .unwrap();

    let text = CadExporter::export_str(&doc);
    // Corrupt the middle of the file.
    let damaged = text.replace("0\nCIRCLE", "## damaged block ##\n0\nCIRCLE");
    assert!(DxfParser::parse(&damaged).is_err());

    let (imported, stats) = CadImporter::new().import_str(&damaged).unwrap();
    assert!(stats.recovered);
    assert!(stats.residual_errors > 0);
    assert_eq!(imported.shapes.len(), 2);
}

#[test]
fn file_based_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sketch.dxf");
    let original = sample_document();

    CadExporter::export_file(&original, &path).unwrap();
    let (imported, stats) = CadImporter::new().import_file(&path).unwrap();

    assert!(!stats.recovered);
    assert_eq!(stats.converted(), 4);
    assert_eq!(imported.shapes.len(), 2);
    assert_eq!(imported.strokes.len(), 2);
}
