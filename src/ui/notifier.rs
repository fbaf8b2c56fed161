use crate::services::notify::Notifier;
use crate::ui::tray::TrayMenu;
use std::sync::Arc;

const TITLE_PREFIX: &str = "Moonstone - ";

/// 通过托盘气泡通知用户，标题统一加产品前缀
#[derive(Clone)]
pub struct TrayNotifier {
    menu: Arc<dyn TrayMenu>,
}

impl TrayNotifier {
    pub fn new(menu: Arc<dyn TrayMenu>) -> Self {
        Self { menu }
    }
}

impl Notifier for TrayNotifier {
    fn notify(&self, title: &str, message: &str, is_error: bool) {
        if is_error {
            tracing::error!(title, message, "托盘通知");
        } else {
            tracing::info!(title, message, "托盘通知");
        }
        self.menu
            .show_message(&format!("{TITLE_PREFIX}{title}"), message, is_error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MenuEvent, RecordingMenu};

    #[test]
    fn prefixes_title_and_forwards_severity() {
        let menu = Arc::new(RecordingMenu::new());
        let notifier = TrayNotifier::new(menu.clone());

        notifier.notify("更新失败", "网络错误", true);

        assert_eq!(
            menu.events(),
            vec![MenuEvent::Message {
                title: "Moonstone - 更新失败".to_string(),
                message: "网络错误".to_string(),
                is_error: true,
            }]
        );
    }
}
