use std::path::PathBuf;

use cadview_core::library::ModelType;
use cadview_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("读取模型目录 {path:?} 失败: {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("不支持的模型文件：{0:?}")]
    UnsupportedFormat(PathBuf),
    #[error("模型 {filename} 的类型为 {actual:?}，期望 {expected:?}")]
    TypeMismatch {
        filename: String,
        expected: ModelType,
        actual: ModelType,
    },
    #[error("加载模型 {filename} 失败: {source}")]
    Load {
        filename: String,
        #[source]
        source: IoError,
    },
}
