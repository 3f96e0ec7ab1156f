pub mod catalog;
pub mod cli;
pub mod errors;
pub mod loader;

use std::path::Path;

use cadview_config::AppConfig;
use catalog::ModelCatalog;
use errors::FrontendError;
use loader::ModelLoader;
use tracing::info;

/// 打印模型库列表。
pub fn run_list(config: &AppConfig) -> Result<(), FrontendError> {
    let catalog = ModelCatalog::from_config(config);
    info!(root = %catalog.root().display(), "扫描模型库");
    let models = catalog.list()?;
    print!("{}", cli::render_catalog(&models));
    Ok(())
}

/// 加载单个模型文件并打印概要。
pub fn run_show(config: &AppConfig, path: &Path) -> Result<(), FrontendError> {
    let loader = ModelLoader::from_config(config);
    let (info, model) = loader.load_path(path)?;
    print!("{}", cli::render_summary(&info, &model));
    Ok(())
}
