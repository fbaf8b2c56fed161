// 服务定义：每次重建服务都会构造一个新的定义，构造后不再修改

use crate::models::config::AppConfig;
use crate::models::profile::LaunchCommand;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;

static VERSION_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"version\[([^\]]+)\]").expect("valid version label regex"));

/// 服务启动方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartMode {
    Demand,
    #[default]
    Auto,
}

impl StartMode {
    /// `sc.exe create ... start= <mode>` 的取值
    pub fn as_sc_arg(&self) -> &'static str {
        match self {
            StartMode::Demand => "demand",
            StartMode::Auto => "auto",
        }
    }
}

/// 托管服务定义
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub name: String,
    pub display_name: String,
    pub executable_path: PathBuf,
    pub argument_string: String,
    pub start_mode: StartMode,
}

impl ServiceDefinition {
    pub fn new(config: &AppConfig, version_label: &str, command: LaunchCommand) -> Self {
        Self {
            name: config.service_name.clone(),
            display_name: display_name_for(&config.product_name, version_label),
            executable_path: command.executable,
            argument_string: command.arguments,
            start_mode: StartMode::Auto,
        }
    }

    /// 服务命令行：带引号的可执行文件路径 + 参数
    pub fn command_line(&self) -> String {
        let exe = format!("\"{}\"", self.executable_path.display());
        if self.argument_string.is_empty() {
            exe
        } else {
            format!("{exe} {}", self.argument_string)
        }
    }
}

/// 生成 `"<product> version[<label>]"` 形式的显示名
pub fn display_name_for(product_name: &str, version_label: &str) -> String {
    format!("{product_name} version[{version_label}]")
}

/// 从显示名中取回配置标签
pub fn label_from_display_name(display_name: &str) -> Option<String> {
    VERSION_LABEL_RE
        .captures(display_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
