// lib.rs - 暴露核心组件给托盘程序和测试使用

pub mod core;
pub mod models;
pub mod services;
pub mod ui;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use models::*;
pub use services::{
    AutostartScheduler, BundleStore, BundleUpdater, ConfigExtractor, GithubReleaseFeed,
    Notifier, ReleaseFeed, ScBackend, ServiceBackend, ServiceController,
    SessionStore, SchtasksAutostart,
};

// 导出核心模块
pub use crate::core::{build_http_client, init_logger, AppError, AppResult};

// 导出 UI 层
pub use ui::{
    ActionCategory, ConsoleTray, ControlFlow, MenuAction, TrayDeps, TrayMenu, TrayNotifier,
    TrayOrchestrator,
};

pub use utils::command::{CommandExecutor, CommandResult};
pub use utils::config::install_root;
