use cadview_core::drawing::{DxfEntity, Model2D};
use cadview_io::{Diagnostic, DiagnosticKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GoldenDrawing {
    bounds: [f32; 4],
    entities: Vec<GoldenEntity>,
    #[serde(default)]
    diagnostics: Vec<GoldenDiagnostic>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct GoldenEntity {
    kind: String,
    points: Vec<[f32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    angles: Option<[f32; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    closed: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct GoldenDiagnostic {
    line: usize,
    kind: String,
}

impl GoldenDrawing {
    fn from_model(model: &Model2D, diagnostics: &[Diagnostic]) -> Self {
        let bounds = model.bounds;
        Self {
            bounds: [bounds.min_x(), bounds.max_x(), bounds.min_y(), bounds.max_y()],
            entities: model.entities.iter().map(GoldenEntity::from_entity).collect(),
            diagnostics: diagnostics
                .iter()
                .map(|diag| GoldenDiagnostic {
                    line: diag.line,
                    kind: diagnostic_label(&diag.kind),
                })
                .collect(),
        }
    }
}

impl GoldenEntity {
    fn from_entity(entity: &DxfEntity) -> Self {
        let mut golden = GoldenEntity {
            kind: entity.kind().to_string(),
            points: Vec::new(),
            radius: None,
            angles: None,
            closed: None,
        };
        match entity {
            DxfEntity::Line(line) => {
                golden.points = vec![
                    [line.start.x(), line.start.y()],
                    [line.end.x(), line.end.y()],
                ];
            }
            DxfEntity::Circle(circle) => {
                golden.points = vec![[circle.center.x(), circle.center.y()]];
                golden.radius = Some(circle.radius);
            }
            DxfEntity::Arc(arc) => {
                golden.points = vec![[arc.center.x(), arc.center.y()]];
                golden.radius = Some(arc.radius);
                golden.angles = Some([arc.start_angle, arc.end_angle]);
            }
            DxfEntity::Polyline(polyline) | DxfEntity::LwPolyline(polyline) => {
                golden.points = polyline.points.iter().map(|p| [p.x(), p.y()]).collect();
                golden.closed = Some(polyline.is_closed);
            }
        }
        golden
    }
}

fn diagnostic_label(kind: &DiagnosticKind) -> String {
    match kind {
        DiagnosticKind::NumericDefaulted { field, .. } => format!("NumericDefaulted({field})"),
        DiagnosticKind::EmptyDrawing => "EmptyDrawing".to_string(),
        DiagnosticKind::DefaultBounds => "DefaultBounds".to_string(),
        DiagnosticKind::UnpairedNormals { .. } => "UnpairedNormals".to_string(),
    }
}

pub fn assert_golden(name: &str, model: &Model2D, diagnostics: &[Diagnostic]) {
    let snapshot = GoldenDrawing::from_model(model, diagnostics);
    let base_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/golden");
    if let Err(err) = fs::create_dir_all(&base_dir) {
        panic!("无法创建黄金数据目录 {}: {err}", base_dir.display());
    }
    let golden_path = base_dir.join(format!("{name}.json"));
    let serialized = serde_json::to_string_pretty(&snapshot).expect("序列化黄金快照失败");

    if !golden_path.exists() {
        fs::write(&golden_path, &serialized)
            .unwrap_or_else(|err| panic!("写入黄金文件 {} 失败: {err}", golden_path.display()));
        panic!(
            "黄金文件 {} 不存在，已自动生成。请确认内容后重新运行测试。",
            golden_path.display()
        );
    }

    let expected_str = fs::read_to_string(&golden_path)
        .unwrap_or_else(|err| panic!("读取黄金文件 {} 失败: {err}", golden_path.display()));
    let expected: GoldenDrawing = serde_json::from_str(&expected_str)
        .unwrap_or_else(|err| panic!("解析黄金文件 {} 失败: {err}", golden_path.display()));

    if expected != snapshot {
        let diff_path = base_dir.join(format!("{name}.actual.json"));
        fs::write(&diff_path, &serialized).expect("写入差异文件失败");
        panic!(
            "黄金文件 {} 与当前解析结果不一致。已生成对照输出 {}。",
            golden_path.display(),
            diff_path.display()
        );
    }
}
