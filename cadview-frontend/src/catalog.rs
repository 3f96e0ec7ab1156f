use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cadview_config::AppConfig;
use cadview_core::library::{ModelInfo, ModelType};
use tracing::{debug, trace, warn};

use crate::errors::FrontendError;

const MESH_DIR: &str = "3d";
const DRAWING_DIR: &str = "2d";

/// 模型库：`<root>/3d` 下的 STL 与 `<root>/2d` 下的 DXF。
pub struct ModelCatalog {
    root: PathBuf,
}

impl ModelCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.library.root.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 列出全部模型，先按类型（STL 在前）再按文件名排序。
    pub fn list(&self) -> Result<Vec<ModelInfo>, FrontendError> {
        let mut models = self.scan_folder(MESH_DIR, ModelType::Stl)?;
        models.extend(self.scan_folder(DRAWING_DIR, ModelType::Dxf)?);
        models.sort_by(|a, b| {
            a.model_type
                .cmp(&b.model_type)
                .then_with(|| a.filename.cmp(&b.filename))
        });
        debug!(root = %self.root.display(), count = models.len(), "模型库扫描完成");
        Ok(models)
    }

    fn scan_folder(&self, folder: &str, model_type: ModelType) -> Result<Vec<ModelInfo>, FrontendError> {
        let dir = self.root.join(folder);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "模型目录不存在，跳过");
                return Ok(Vec::new());
            }
            Err(source) => return Err(FrontendError::Catalog { path: dir, source }),
        };

        let mut models = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(dir = %dir.display(), error = %err, "读取目录项失败");
                    continue;
                }
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match describe(&path) {
                Some(info) if info.model_type == model_type => {
                    trace!(path = %path.display(), "收录模型");
                    models.push(info);
                }
                _ => trace!(path = %path.display(), "忽略非模型文件"),
            }
        }
        Ok(models)
    }
}

/// 根据文件名识别类型并读取大小；类型无法识别时返回 `None`，大小无法读取时记为 0。
pub fn describe(path: &Path) -> Option<ModelInfo> {
    let filename = path.file_name()?.to_string_lossy().into_owned();
    let model_type = ModelType::from_filename(&filename)?;
    let file_size_bytes = fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
    Some(ModelInfo {
        filename,
        path: path.to_path_buf(),
        model_type,
        file_size_bytes,
    })
}
