use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const CONFIG_ENV: &str = "CADVIEW_CONFIG";

/// cadview 的全部可调项。TOML 中每个段都可省略，缺省段取内建默认值。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub stl: StlConfig,
}

impl AppConfig {
    /// 读取 `--config` 指定的文件。文件必须存在，未知的检测模式等取值错误会返回 `Parse`。
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 未给出 `--config` 时的查找顺序：`CADVIEW_CONFIG` 指向的文件，
    /// 其次是工作目录下的 `config/default.toml`，都没有则用默认值。
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_file(PathBuf::from(path));
        }

        let base_dir = env::current_dir().map_err(|source| ConfigError::WorkingDir { source })?;
        Self::discover_in(&base_dir)
    }

    /// 在指定目录下寻找 `config/default.toml`，缺失时返回默认配置。
    pub fn discover_in(base_dir: &Path) -> Result<Self, ConfigError> {
        let default_path = base_dir.join("config").join("default.toml");
        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// `[logging]` 段。`level` 按 `EnvFilter` 语法解释，例如 `"debug"` 或 `"cadview_io=trace"`。
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// 模型库位置。库目录下约定 `3d/` 存放 STL，`2d/` 存放 DXF。
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryConfig {
    #[serde(default = "LibraryConfig::default_root")]
    pub root: PathBuf,
}

impl LibraryConfig {
    fn default_root() -> PathBuf {
        PathBuf::from("models")
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            root: Self::default_root(),
        }
    }
}

/// `[stl] detection` 的取值，对应解析器的 ASCII/二进制判别策略。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    Prefix,
    #[default]
    Strict,
}

/// `[stl]` 段：判别策略与二进制 STL 的三角形数量上限。
#[derive(Debug, Clone, Deserialize)]
pub struct StlConfig {
    #[serde(default)]
    pub detection: DetectionMode,
    #[serde(default = "StlConfig::default_max_triangles")]
    pub max_triangles: u32,
}

impl StlConfig {
    fn default_max_triangles() -> u32 {
        10_000_000
    }
}

impl Default for StlConfig {
    fn default() -> Self {
        Self {
            detection: DetectionMode::default(),
            max_triangles: Self::default_max_triangles(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无法读取 cadview 配置 {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cadview 配置 {path:?} 格式错误: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("无法确定工作目录，未查找 config/default.toml: {source}")]
    WorkingDir {
        #[source]
        source: std::io::Error,
    },
}
