use std::path::Path;

use cadview_config::{AppConfig, DetectionMode};
use cadview_core::drawing::Model2D;
use cadview_core::library::{ModelInfo, ModelType};
use cadview_core::mesh::Model3D;
use cadview_io::{
    Diagnostic, DiagnosticKind, DxfFacade, ModelReader, Parsed, StlDetection, StlFacade,
    StlOptions,
};
use tracing::{debug, info, warn};

use crate::catalog::describe;
use crate::errors::FrontendError;

/// 加载后的模型，按格式区分。
#[derive(Debug, Clone)]
pub enum LoadedModel {
    Mesh(Model3D),
    Drawing(Model2D),
}

impl LoadedModel {
    pub fn model_type(&self) -> ModelType {
        match self {
            LoadedModel::Mesh(_) => ModelType::Stl,
            LoadedModel::Drawing(_) => ModelType::Dxf,
        }
    }
}

pub struct ModelLoader {
    dxf: DxfFacade,
    stl: StlFacade,
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new(StlOptions::default())
    }
}

impl ModelLoader {
    pub fn new(stl_options: StlOptions) -> Self {
        Self {
            dxf: DxfFacade::new(),
            stl: StlFacade::with_options(stl_options),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let detection = match config.stl.detection {
            DetectionMode::Prefix => StlDetection::Prefix,
            DetectionMode::Strict => StlDetection::Strict,
        };
        Self::new(StlOptions {
            detection,
            max_triangles: config.stl.max_triangles,
        })
    }

    pub fn stl_options(&self) -> &StlOptions {
        self.stl.options()
    }

    /// 按模型类型分派到对应解析器。
    pub fn load(&self, info: &ModelInfo) -> Result<LoadedModel, FrontendError> {
        match info.model_type {
            ModelType::Stl => self.read_mesh(info).map(LoadedModel::Mesh),
            ModelType::Dxf => self.read_drawing(info).map(LoadedModel::Drawing),
        }
    }

    pub fn load_mesh(&self, info: &ModelInfo) -> Result<Model3D, FrontendError> {
        expect_type(info, ModelType::Stl)?;
        self.read_mesh(info)
    }

    pub fn load_drawing(&self, info: &ModelInfo) -> Result<Model2D, FrontendError> {
        expect_type(info, ModelType::Dxf)?;
        self.read_drawing(info)
    }

    /// 加载任意路径上的模型，类型由扩展名决定。
    pub fn load_path(&self, path: &Path) -> Result<(ModelInfo, LoadedModel), FrontendError> {
        let info = describe(path).ok_or_else(|| FrontendError::UnsupportedFormat(path.to_path_buf()))?;
        let model = self.load(&info)?;
        Ok((info, model))
    }

    fn read_mesh(&self, info: &ModelInfo) -> Result<Model3D, FrontendError> {
        let parsed = self.stl.load(&info.path).map_err(|source| FrontendError::Load {
            filename: info.filename.clone(),
            source,
        })?;
        let model = report(info, parsed);
        info!(
            file = %info.filename,
            triangles = model.triangle_count,
            vertices = model.vertex_count(),
            "STL 模型加载完成"
        );
        Ok(model)
    }

    fn read_drawing(&self, info: &ModelInfo) -> Result<Model2D, FrontendError> {
        let parsed = self.dxf.load(&info.path).map_err(|source| FrontendError::Load {
            filename: info.filename.clone(),
            source,
        })?;
        let model = report(info, parsed);
        info!(file = %info.filename, entities = model.entity_count(), "DXF 图纸加载完成");
        Ok(model)
    }
}

fn expect_type(info: &ModelInfo, expected: ModelType) -> Result<(), FrontendError> {
    if info.model_type == expected {
        Ok(())
    } else {
        Err(FrontendError::TypeMismatch {
            filename: info.filename.clone(),
            expected,
            actual: info.model_type,
        })
    }
}

/// 将解析诊断转交给 tracing，返回模型本身。
fn report<T>(info: &ModelInfo, parsed: Parsed<T>) -> T {
    for diagnostic in &parsed.diagnostics {
        log_diagnostic(&info.filename, diagnostic);
    }
    parsed.into_model()
}

fn log_diagnostic(filename: &str, diagnostic: &Diagnostic) {
    match diagnostic.kind {
        DiagnosticKind::UnpairedNormals { .. } => {
            warn!(file = filename, line = diagnostic.line, "{diagnostic}");
        }
        DiagnosticKind::NumericDefaulted { .. } => {
            debug!(file = filename, line = diagnostic.line, "{diagnostic}");
        }
        DiagnosticKind::EmptyDrawing | DiagnosticKind::DefaultBounds => {
            info!(file = filename, "{diagnostic}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn info(filename: &str, model_type: ModelType) -> ModelInfo {
        ModelInfo {
            filename: filename.to_string(),
            path: PathBuf::from(filename),
            model_type,
            file_size_bytes: 0,
        }
    }

    #[test]
    fn config_selects_stl_options() {
        let mut config = AppConfig::default();
        config.stl.detection = DetectionMode::Prefix;
        config.stl.max_triangles = 42;
        let loader = ModelLoader::from_config(&config);
        assert_eq!(loader.stl_options().detection, StlDetection::Prefix);
        assert_eq!(loader.stl_options().max_triangles, 42);
    }

    #[test]
    fn mismatched_type_is_rejected_before_reading() {
        let loader = ModelLoader::default();
        let err = loader
            .load_mesh(&info("plan.dxf", ModelType::Dxf))
            .expect_err("DXF 不能按网格加载");
        assert!(matches!(
            err,
            FrontendError::TypeMismatch {
                expected: ModelType::Stl,
                actual: ModelType::Dxf,
                ..
            }
        ));

        let err = loader
            .load_drawing(&info("part.stl", ModelType::Stl))
            .expect_err("STL 不能按图纸加载");
        assert!(matches!(err, FrontendError::TypeMismatch { .. }));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = ModelLoader::default()
            .load_path(Path::new("readme.txt"))
            .expect_err("未知扩展名");
        assert!(matches!(err, FrontendError::UnsupportedFormat(_)));
    }
}
