/// 面向用户的通知能力（托盘气泡等）
///
/// 更新器和服务控制器只依赖这个接口，由托盘编排层提供实现。
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str, is_error: bool);
}
