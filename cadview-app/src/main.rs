use std::path::{Path, PathBuf};

use cadview_config::{AppConfig, ConfigError};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Show(PathBuf),
}

#[derive(Debug, PartialEq, Eq)]
struct Invocation {
    command: Command,
    config_path: Option<PathBuf>,
}

fn main() {
    let invocation = match parse_args(std::env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("用法：cadview-app [--config <路径>] [--list | <模型文件>]");
            std::process::exit(1);
        }
    };

    // 配置决定日志等级，因此配置错误要等订阅者安装后再输出
    let (config, config_error) = resolve_config(invocation.config_path.as_deref());
    let level_accepted = init_logging(&config.logging.level);
    if let Some(err) = &config_error {
        report_config_error(err);
    }
    if !level_accepted {
        warn!(level = %config.logging.level, "无效的日志等级，改用 info");
    }
    info!(library = %config.library.root.display(), "启动 cadview");

    let result = match &invocation.command {
        Command::List => cadview_frontend::run_list(&config),
        Command::Show(path) => cadview_frontend::run_show(&config, path),
    };
    if let Err(err) = result {
        error!(error = %err, "执行失败");
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Invocation, String> {
    let mut args = args.into_iter();
    let mut command = None;
    let mut config_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--list" => command = Some(Command::List),
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| "`--config` 需要提供配置文件路径".to_string())?;
                config_path = Some(PathBuf::from(path));
            }
            other if other.starts_with("--") => return Err(format!("未知参数：{other}")),
            file => command = Some(Command::Show(PathBuf::from(file))),
        }
    }

    Ok(Invocation {
        command: command.unwrap_or(Command::List),
        config_path,
    })
}

/// 显式路径优先，否则走自动发现；失败时退回内建默认值并交回错误。
fn resolve_config(explicit: Option<&Path>) -> (AppConfig, Option<ConfigError>) {
    let loaded = match explicit {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::discover(),
    };
    match loaded {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    }
}

fn report_config_error(err: &ConfigError) {
    match err {
        ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
            warn!(path = %path.display(), error = %err, "配置文件不可用，使用内建默认值");
        }
        ConfigError::WorkingDir { .. } => {
            warn!(error = %err, "无法定位配置文件，使用内建默认值");
        }
    }
}

/// 安装全局订阅者。返回 `false` 表示配置的等级无法解析。
fn init_logging(level: &str) -> bool {
    let (filter, accepted) = match EnvFilter::try_new(level) {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new("info"), false),
    };
    // 测试或嵌入场景下可能已有订阅者
    let _ = fmt().with_env_filter(filter).try_init();
    accepted
}
