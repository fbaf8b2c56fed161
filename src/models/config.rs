// 应用配置：启动时构建一次，以 Arc<AppConfig> 传给各组件

use crate::core::error::{AppError, AppResult};
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SERVICE_NAME: &str = "MoonstoneZapret";
pub const DEFAULT_DRIVER_SERVICE_NAME: &str = "WinDivert";
pub const DEFAULT_TASK_NAME: &str = "MoonstoneAutostart";
pub const DEFAULT_PRODUCT_NAME: &str = "Moonstone Zapret DPI Bypass";
pub const DEFAULT_SCRIPT_ENCODING: &str = "cp866";
pub const DEFAULT_RELEASES_API: &str = "https://api.github.com/repos/bol-van/zapret/releases/latest";

/// 安装目录下的可选覆盖配置文件
pub const OVERRIDES_FILE: &str = "moonstone.toml";

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    #[default]
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// 日志输出目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Console,
    #[default]
    File,
    Both,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// 日志文件路径（文件输出时使用）
    pub file_path: Option<PathBuf>,
}

/// 安装目录下的各类路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub root: PathBuf,
    pub icon: PathBuf,
    /// 配置脚本（*.bat）所在目录
    pub config_dir: PathBuf,
    /// 当前使用的组件包目录
    pub bundled_dir: PathBuf,
    /// 组件包备份目录（最多一代）
    pub backup_dir: PathBuf,
    pub log_file: PathBuf,
    pub state_file: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config_dir = root.join("zapret");
        Self {
            icon: root.join("icons").join("moonstone.ico"),
            bundled_dir: config_dir.join("bundled"),
            backup_dir: config_dir.join("bundled_backup"),
            log_file: root.join("moonstone.log"),
            state_file: root.join("moonstone_state.json"),
            config_dir,
            root,
        }
    }
}

/// 组件包更新配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterConfig {
    pub releases_api: String,
    pub archive_suffix: String,
    /// 压缩包内 `binaries/<platform_dir>` 目录名
    pub platform_dir: String,
    pub feed_timeout: Duration,
    pub download_timeout: Duration,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            releases_api: DEFAULT_RELEASES_API.to_string(),
            archive_suffix: ".zip".to_string(),
            platform_dir: "windows-x86_64".to_string(),
            feed_timeout: Duration::from_secs(30),
            download_timeout: Duration::from_secs(60),
        }
    }
}

/// 应用配置（不可变）
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub service_name: String,
    /// 可能被 winws 遗留的底层驱动服务
    pub driver_service_name: String,
    pub autostart_task_name: String,
    pub product_name: String,
    /// 配置脚本及控制台输出使用的旧式单字节编码
    pub script_encoding: &'static Encoding,
    pub paths: AppPaths,
    pub updater: UpdaterConfig,
    pub log: LogConfig,
    /// 实际加载的覆盖配置文件（没有时为 None）
    pub overrides_file: Option<PathBuf>,
}

impl AppConfig {
    /// 以默认值构建配置
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let paths = AppPaths::from_root(root);
        let log = LogConfig {
            file_path: Some(paths.log_file.clone()),
            ..LogConfig::default()
        };
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            driver_service_name: DEFAULT_DRIVER_SERVICE_NAME.to_string(),
            autostart_task_name: DEFAULT_TASK_NAME.to_string(),
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            script_encoding: encoding_rs::IBM866,
            paths,
            updater: UpdaterConfig::default(),
            log,
            overrides_file: None,
        }
    }

    /// 读取安装目录下的 `moonstone.toml` 覆盖默认值（文件不存在时使用默认值）
    ///
    /// 在日志初始化之前调用，本身不写日志；加载了哪个文件记录在 `overrides_file`。
    pub fn load(root: &Path) -> AppResult<Self> {
        let mut config = Self::with_root(root);
        let overrides_path = root.join(OVERRIDES_FILE);
        if !overrides_path.exists() {
            return Ok(config);
        }

        let content = fs::read_to_string(&overrides_path)
            .map_err(|e| AppError::io(&overrides_path, e))?;
        let overrides: ConfigOverrides = toml::from_str(&content)
            .map_err(|e| AppError::ConfigError(format!("{}: {e}", overrides_path.display())))?;
        config.apply(overrides)?;
        config.overrides_file = Some(overrides_path);
        Ok(config)
    }

    fn apply(&mut self, overrides: ConfigOverrides) -> AppResult<()> {
        if let Some(v) = overrides.service_name {
            self.service_name = v;
        }
        if let Some(v) = overrides.driver_service_name {
            self.driver_service_name = v;
        }
        if let Some(v) = overrides.autostart_task_name {
            self.autostart_task_name = v;
        }
        if let Some(v) = overrides.product_name {
            self.product_name = v;
        }
        if let Some(label) = overrides.script_encoding {
            self.script_encoding = Encoding::for_label(label.as_bytes())
                .ok_or_else(|| AppError::ConfigError(format!("未知编码: {label}")))?;
        }

        let updater = overrides.updater;
        if let Some(v) = updater.releases_api {
            self.updater.releases_api = v;
        }
        if let Some(v) = updater.archive_suffix {
            self.updater.archive_suffix = v;
        }
        if let Some(v) = updater.platform_dir {
            self.updater.platform_dir = v;
        }
        if let Some(secs) = updater.feed_timeout_secs {
            self.updater.feed_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = updater.download_timeout_secs {
            self.updater.download_timeout = Duration::from_secs(secs);
        }

        let log = overrides.log;
        if let Some(v) = log.level {
            self.log.level = v;
        }
        if let Some(v) = log.format {
            self.log.format = v;
        }
        if let Some(v) = log.output {
            self.log.output = v;
        }
        if let Some(v) = log.file_path {
            self.log.file_path = Some(self.paths.root.join(v));
        }

        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigOverrides {
    service_name: Option<String>,
    driver_service_name: Option<String>,
    autostart_task_name: Option<String>,
    product_name: Option<String>,
    script_encoding: Option<String>,
    updater: UpdaterOverrides,
    log: LogOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct UpdaterOverrides {
    releases_api: Option<String>,
    archive_suffix: Option<String>,
    platform_dir: Option<String>,
    feed_timeout_secs: Option<u64>,
    download_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct LogOverrides {
    level: Option<LogLevel>,
    format: Option<LogFormat>,
    output: Option<LogOutput>,
    file_path: Option<PathBuf>,
}
