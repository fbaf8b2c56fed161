// UI 层：托盘编排、菜单展示、单任务 worker

pub mod console;
pub mod notifier;
pub mod tray;
pub mod worker;

pub use console::ConsoleTray;
pub use notifier::TrayNotifier;
pub use tray::{ControlFlow, MenuAction, TrayDeps, TrayMenu, TrayOrchestrator};
pub use worker::{ActionCategory, Dispatch, SingleFlight};
