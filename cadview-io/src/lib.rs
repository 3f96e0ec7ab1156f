use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use cadview_core::drawing::Model2D;
use cadview_core::mesh::Model3D;
use serde::Serialize;
use thiserror::Error;

pub mod dxf;
pub mod stl;

pub use stl::{DEFAULT_MAX_TRIANGLES, StlDetection, StlError, StlFormat, StlOptions};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read input stream: {0}")]
    StreamError(#[source] std::io::Error),
    #[error(transparent)]
    Stl(#[from] StlError),
}

/// 解析结果：模型本身以及解析过程中记录的诊断事件。
///
/// 解析核心不依赖任何日志后端，由调用方决定如何呈现 `diagnostics`。
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    pub model: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Parsed<T> {
    pub fn new(model: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { model, diagnostics }
    }

    #[inline]
    pub fn into_model(self) -> T {
        self.model
    }
}

/// 单条诊断。`line` 为源文本中的行号（从 1 开始），二进制输入或整体性事件为 0。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub kind: DiagnosticKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DiagnosticKind {
    /// 数值字段无法解析或不是有限值，按 0 处理。
    NumericDefaulted { field: String, value: String },
    /// 没有解析到任何实体，已替换为占位图元。
    EmptyDrawing,
    /// 实体均不含可测量的顶点，包围盒回退到默认可视区域。
    DefaultBounds,
    /// ASCII STL 中顶点与法线数量不一致。
    UnpairedNormals { vertices: usize, normals: usize },
}

impl Diagnostic {
    #[inline]
    pub fn new(line: usize, kind: DiagnosticKind) -> Self {
        Self { line, kind }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::NumericDefaulted { field, value } => {
                write!(
                    f,
                    "第 {} 行的 {field} 数值 \"{value}\" 无效，按 0 处理",
                    self.line
                )
            }
            DiagnosticKind::EmptyDrawing => write!(f, "未解析到任何实体，使用占位图元"),
            DiagnosticKind::DefaultBounds => write!(f, "实体不含可测量的顶点，使用默认包围盒"),
            DiagnosticKind::UnpairedNormals { vertices, normals } => {
                write!(f, "顶点数 {vertices} 与法线数 {normals} 不一致")
            }
        }
    }
}

/// 统一的模型读取入口。实现者只需提供 `parse_bytes`，流与文件读取由默认方法完成。
pub trait ModelReader {
    type Model;

    fn parse_bytes(&self, data: &[u8]) -> Result<Parsed<Self::Model>, IoError>;

    /// 将流完整读入内存后解析。流的关闭由调用方负责。
    fn parse_reader<R: Read>(&self, mut reader: R) -> Result<Parsed<Self::Model>, IoError>
    where
        Self: Sized,
    {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(IoError::StreamError)?;
        self.parse_bytes(&data)
    }

    fn load(&self, path: &Path) -> Result<Parsed<Self::Model>, IoError> {
        let data = fs::read(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_bytes(&data)
    }
}

#[derive(Debug, Default)]
pub struct DxfFacade;

impl DxfFacade {
    pub fn new() -> Self {
        Self
    }
}

impl ModelReader for DxfFacade {
    type Model = Model2D;

    fn parse_bytes(&self, data: &[u8]) -> Result<Parsed<Model2D>, IoError> {
        let text = String::from_utf8_lossy(data);
        Ok(dxf::parse(&text))
    }
}

#[derive(Debug, Default)]
pub struct StlFacade {
    options: StlOptions,
}

impl StlFacade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: StlOptions) -> Self {
        Self { options }
    }

    #[inline]
    pub fn options(&self) -> &StlOptions {
        &self.options
    }
}

impl ModelReader for StlFacade {
    type Model = Model3D;

    fn parse_bytes(&self, data: &[u8]) -> Result<Parsed<Model3D>, IoError> {
        Ok(stl::parse(data, &self.options)?)
    }
}
