mod golden;

use std::io::Cursor;
use std::path::PathBuf;

use cadview_core::drawing::{Circle, DxfEntity, Line, compute_drawing_bounds};
use cadview_core::geometry::{Bounds2D, Point2};
use cadview_io::{DxfFacade, IoError, ModelReader};

use golden::assert_golden;

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/data");
    path.push(name);
    path
}

fn pairs(items: &[(&str, &str)]) -> String {
    items
        .iter()
        .map(|(code, value)| format!("{code}\n{value}\n"))
        .collect()
}

#[test]
fn load_basic_entities_matches_expected_model() {
    let loader = DxfFacade::new();
    let parsed = loader
        .load(&fixture("basic_entities.dxf"))
        .expect("读取 DXF 失败");
    assert_golden("basic_entities", &parsed.model, &parsed.diagnostics);
}

#[test]
fn load_polyline_sequence_skips_unsupported_entities() {
    let loader = DxfFacade::new();
    let parsed = loader
        .load(&fixture("polyline_sequence.dxf"))
        .expect("读取 POLYLINE DXF 失败");
    assert_golden("polyline_sequence", &parsed.model, &parsed.diagnostics);
}

#[test]
fn load_drawing_without_entities_uses_placeholder() {
    let loader = DxfFacade::new();
    let parsed = loader
        .load(&fixture("no_entities.dxf"))
        .expect("读取空 DXF 失败");
    assert_golden("no_entities", &parsed.model, &parsed.diagnostics);
    assert_eq!(parsed.model.entity_count(), 1);
    assert_eq!(parsed.model.bounds, Bounds2D::new(0.0, 100.0, 0.0, 100.0));
}

#[test]
fn load_malformed_entities_keeps_the_rest() {
    let loader = DxfFacade::new();
    let parsed = loader
        .load(&fixture("malformed_entities.dxf"))
        .expect("读取损坏 DXF 失败");
    assert_golden("malformed_entities", &parsed.model, &parsed.diagnostics);
}

#[test]
fn stored_bounds_match_recomputed_bounds() {
    let loader = DxfFacade::new();
    for name in [
        "basic_entities.dxf",
        "polyline_sequence.dxf",
        "no_entities.dxf",
        "malformed_entities.dxf",
    ] {
        let model = loader.load(&fixture(name)).expect("读取 DXF 失败").model;
        assert_eq!(
            compute_drawing_bounds(&model.entities),
            model.bounds,
            "{name} 的包围盒与重新计算结果不一致"
        );
    }
}

#[test]
fn single_line_drawing() {
    let text = pairs(&[
        ("0", "SECTION"),
        ("2", "ENTITIES"),
        ("0", "LINE"),
        ("10", "0"),
        ("20", "0"),
        ("11", "10"),
        ("21", "10"),
        ("0", "ENDSEC"),
    ]);
    let parsed = DxfFacade::new()
        .parse_bytes(text.as_bytes())
        .expect("解析失败");
    assert_eq!(
        parsed.model.entities,
        vec![DxfEntity::Line(Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(10.0, 10.0),
        })]
    );
    assert_eq!(parsed.model.bounds, Bounds2D::new(0.0, 10.0, 0.0, 10.0));
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn single_circle_drawing_read_from_stream() {
    let text = pairs(&[
        ("0", "SECTION"),
        ("2", "ENTITIES"),
        ("0", "CIRCLE"),
        ("10", "5"),
        ("20", "5"),
        ("40", "2"),
        ("0", "ENDSEC"),
    ]);
    let parsed = DxfFacade::new()
        .parse_reader(Cursor::new(text.into_bytes()))
        .expect("解析失败");
    assert_eq!(
        parsed.model.entities,
        vec![DxfEntity::Circle(Circle {
            center: Point2::new(5.0, 5.0),
            radius: 2.0,
        })]
    );
    assert_eq!(parsed.model.bounds, Bounds2D::new(3.0, 7.0, 3.0, 7.0));
}

#[test]
fn lwpolyline_point_count_is_min_of_coordinate_counts() {
    for (xs, ys) in [(3usize, 3usize), (4, 2), (1, 5), (0, 2)] {
        let mut items = vec![("0", "SECTION"), ("2", "ENTITIES"), ("0", "LWPOLYLINE")];
        items.extend(std::iter::repeat_n(("10", "1.5"), xs));
        items.extend(std::iter::repeat_n(("20", "2.5"), ys));
        items.push(("0", "ENDSEC"));
        let parsed = DxfFacade::new()
            .parse_bytes(pairs(&items).as_bytes())
            .expect("解析失败");
        match &parsed.model.entities[0] {
            DxfEntity::LwPolyline(polyline) => {
                assert_eq!(polyline.points.len(), xs.min(ys), "x={xs}, y={ys}");
            }
            other => panic!("期望 LWPOLYLINE，实际为 {other:?}"),
        }
    }
}

#[test]
fn invalid_utf8_is_decoded_lossily() {
    let mut bytes = pairs(&[("0", "SECTION"), ("2", "ENTITIES"), ("0", "CIRCLE"), ("40", "1")])
        .into_bytes();
    bytes.extend_from_slice(b"999\n\xff\xfe\n0\nENDSEC\n");
    let parsed = DxfFacade::new().parse_bytes(&bytes).expect("解析失败");
    assert_eq!(parsed.model.entity_count(), 1);
}

#[test]
fn missing_file_reports_read_error() {
    let err = DxfFacade::new()
        .load(&fixture("does_not_exist.dxf"))
        .expect_err("不存在的文件应返回错误");
    assert!(matches!(err, IoError::ReadError { .. }));
}
