// 开机自启：登录时以最高权限运行的计划任务

use crate::core::error::{AppError, AppResult};
use crate::utils::command::CommandExecutor;
use std::path::PathBuf;

const SCHTASKS: &str = "schtasks.exe";

/// 开机自启注册能力
pub trait AutostartScheduler: Send + Sync {
    fn is_enabled(&self) -> bool;
    fn enable(&self) -> AppResult<()>;
    fn disable(&self) -> AppResult<()>;
}

/// 基于 schtasks.exe 的实现
#[derive(Debug, Clone)]
pub struct SchtasksAutostart {
    executor: CommandExecutor,
    task_name: String,
    executable: PathBuf,
}

impl SchtasksAutostart {
    pub fn new(executor: CommandExecutor, task_name: impl Into<String>, executable: PathBuf) -> Self {
        Self {
            executor,
            task_name: task_name.into(),
            executable,
        }
    }

    /// `schtasks /Create` 参数：登录时触发，最高权限，已存在则覆盖
    pub fn create_args(&self) -> Vec<String> {
        vec![
            "/Create".to_string(),
            "/TN".to_string(),
            self.task_name.clone(),
            "/TR".to_string(),
            format!("\"{}\"", self.executable.display()),
            "/SC".to_string(),
            "ONLOGON".to_string(),
            "/RL".to_string(),
            "HIGHEST".to_string(),
            "/F".to_string(),
        ]
    }

    pub fn delete_args(&self) -> Vec<String> {
        vec![
            "/Delete".to_string(),
            "/TN".to_string(),
            self.task_name.clone(),
            "/F".to_string(),
        ]
    }
}

impl AutostartScheduler for SchtasksAutostart {
    fn is_enabled(&self) -> bool {
        self.executor
            .execute(SCHTASKS, ["/Query", "/TN", self.task_name.as_str()])
            .success
    }

    fn enable(&self) -> AppResult<()> {
        let result = self.executor.execute(SCHTASKS, self.create_args());
        if !result.success {
            return Err(AppError::SchedulerError(result.diagnostic().to_string()));
        }
        tracing::info!(task = %self.task_name, "已添加开机自启任务");
        Ok(())
    }

    fn disable(&self) -> AppResult<()> {
        let result = self.executor.execute(SCHTASKS, self.delete_args());
        if !result.success {
            return Err(AppError::SchedulerError(result.diagnostic().to_string()));
        }
        tracing::info!(task = %self.task_name, "已删除开机自启任务");
        Ok(())
    }
}
