// 服务层模块
//
// - extractor: 配置脚本解析
// - service: 托管服务（sc.exe）
// - session_store: 会话状态持久化
// - update: 组件包更新
// - autostart: 开机自启计划任务
// - notify: 通知接口

pub mod autostart;
pub mod extractor;
pub mod notify;
pub mod service;
pub mod session_store;
pub mod update;

pub use autostart::{AutostartScheduler, SchtasksAutostart};
pub use extractor::ConfigExtractor;
pub use notify::Notifier;
pub use service::{ScBackend, ServiceBackend, ServiceController};
pub use session_store::SessionStore;
pub use update::{BundleStore, BundleUpdater, GithubReleaseFeed, ReleaseFeed};
