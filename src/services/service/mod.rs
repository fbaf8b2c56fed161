// 托管服务：系统服务管理接口 + 生命周期控制

pub mod backend;
pub mod controller;

pub use backend::{ScBackend, ServiceBackend};
pub use controller::ServiceController;
