// 系统服务管理接口及基于 sc.exe 的实现

use crate::models::service::ServiceDefinition;
use crate::utils::command::{CommandExecutor, CommandResult};
use once_cell::sync::Lazy;
use regex::Regex;

const SC: &str = "sc.exe";

static DISPLAY_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"DISPLAY_NAME\s*:\s*(.+)").expect("valid DISPLAY_NAME regex"));

/// 系统服务管理器的最小接口
///
/// 查询类方法没有副作用；变更类方法返回原始命令结果，由调用方决定如何处理失败。
pub trait ServiceBackend: Send + Sync {
    fn exists(&self, name: &str) -> bool;
    fn query_display_name(&self, name: &str) -> Option<String>;
    fn create(&self, definition: &ServiceDefinition) -> CommandResult;
    fn start(&self, name: &str) -> CommandResult;
    fn stop(&self, name: &str) -> CommandResult;
    fn delete(&self, name: &str) -> CommandResult;
}

/// 通过 sc.exe 管理 Windows 服务
#[derive(Debug, Clone)]
pub struct ScBackend {
    executor: CommandExecutor,
}

impl ScBackend {
    pub fn new(executor: CommandExecutor) -> Self {
        Self { executor }
    }

    /// 组装 `sc.exe create` 的参数
    pub fn create_args(definition: &ServiceDefinition) -> Vec<String> {
        vec![
            "create".to_string(),
            definition.name.clone(),
            "start=".to_string(),
            definition.start_mode.as_sc_arg().to_string(),
            "displayname=".to_string(),
            definition.display_name.clone(),
            "binPath=".to_string(),
            definition.command_line(),
        ]
    }
}

impl ServiceBackend for ScBackend {
    fn exists(&self, name: &str) -> bool {
        let result = self.executor.execute(SC, ["query", name]);
        result.success && result.stdout.contains(name)
    }

    fn query_display_name(&self, name: &str) -> Option<String> {
        let result = self.executor.execute(SC, ["qc", name]);
        if !result.success {
            return None;
        }
        parse_display_name(&result.stdout)
    }

    fn create(&self, definition: &ServiceDefinition) -> CommandResult {
        self.executor.execute(SC, Self::create_args(definition))
    }

    fn start(&self, name: &str) -> CommandResult {
        self.executor.execute(SC, ["start", name])
    }

    fn stop(&self, name: &str) -> CommandResult {
        self.executor.execute(SC, ["stop", name])
    }

    fn delete(&self, name: &str) -> CommandResult {
        self.executor.execute(SC, ["delete", name])
    }
}

/// 从 `sc.exe qc` 输出中提取 DISPLAY_NAME
pub fn parse_display_name(qc_output: &str) -> Option<String> {
    DISPLAY_NAME_RE
        .captures(qc_output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}
