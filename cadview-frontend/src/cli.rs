use std::collections::BTreeMap;

use cadview_core::drawing::Model2D;
use cadview_core::library::ModelInfo;
use cadview_core::mesh::Model3D;

use crate::loader::LoadedModel;

/// 模型库列表，每行：文件名、类型、大小。
pub fn render_catalog(models: &[ModelInfo]) -> String {
    if models.is_empty() {
        return "模型库为空。\n".to_string();
    }
    let width = models
        .iter()
        .map(|info| info.filename.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = format!("共 {} 个模型：\n", models.len());
    for info in models {
        out.push_str(&format!(
            "  {:<width$}  {:<8}  {:>12}\n",
            info.filename,
            info.model_type.display_name(),
            info.formatted_size(),
        ));
    }
    out
}

/// 单个模型的概要。
pub fn render_summary(info: &ModelInfo, model: &LoadedModel) -> String {
    let mut out = format!(
        "{} [{}], 大小={}\n",
        info.filename,
        info.model_type.display_name(),
        info.formatted_size()
    );
    match model {
        LoadedModel::Mesh(mesh) => out.push_str(&describe_mesh(mesh)),
        LoadedModel::Drawing(drawing) => out.push_str(&describe_drawing(drawing)),
    }
    out
}

fn describe_mesh(mesh: &Model3D) -> String {
    let bounds = mesh.bounds;
    [
        format!("  三角形数={}, 顶点数={}", mesh.triangle_count, mesh.vertex_count()),
        format!(
            "  包围盒 X=[{:.3}, {:.3}] Y=[{:.3}, {:.3}] Z=[{:.3}, {:.3}]",
            bounds.min_x(),
            bounds.max_x(),
            bounds.min_y(),
            bounds.max_y(),
            bounds.min_z(),
            bounds.max_z()
        ),
        format!("  最大尺寸={:.3}", bounds.max_dimension()),
    ]
    .iter()
    .map(|line| format!("{line}\n"))
    .collect()
}

fn describe_drawing(drawing: &Model2D) -> String {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for entity in &drawing.entities {
        *counts.entry(entity.kind()).or_default() += 1;
    }
    let parts: Vec<String> = counts
        .iter()
        .map(|(kind, count)| format!("{kind}={count}"))
        .collect();
    let bounds = drawing.bounds;
    let mut out = format!("  实体数={} ({})\n", drawing.entity_count(), parts.join(", "));
    out.push_str(&format!(
        "  包围盒 X=[{:.3}, {:.3}] Y=[{:.3}, {:.3}]\n",
        bounds.min_x(),
        bounds.max_x(),
        bounds.min_y(),
        bounds.max_y()
    ));
    out
}
