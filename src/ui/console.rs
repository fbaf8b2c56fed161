// 控制台菜单：没有图形托盘时的 TrayMenu 实现（编号菜单 + 标准输入）

use crate::ui::tray::{MenuAction, TrayMenu};
use crate::ui::worker::ActionCategory;
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct ConsoleState {
    profiles: Vec<String>,
    active: Option<String>,
    autostart: bool,
    busy: HashSet<ActionCategory>,
}

#[derive(Debug, Default)]
pub struct ConsoleTray {
    state: Mutex<ConsoleState>,
}

impl ConsoleTray {
    pub fn new() -> Self {
        Self::default()
    }

    /// 渲染当前菜单
    pub fn render(&self) -> String {
        let Ok(state) = self.state.lock() else {
            return String::new();
        };

        let mut out = String::from("\n==== Moonstone ====\n");
        let service_busy = state.busy.contains(&ActionCategory::Service);
        for (i, label) in state.profiles.iter().enumerate() {
            let marker = if state.active.as_deref() == Some(label.as_str()) {
                "*"
            } else {
                " "
            };
            out.push_str(&format!("{marker} {:>2}) 启动 {label}\n", i + 1));
        }

        let busy_suffix = |busy: bool| if busy { "（执行中）" } else { "" };
        out.push_str(&format!("   s) 停止{}\n", busy_suffix(service_busy)));
        out.push_str("   c) 打开配置目录\n");
        out.push_str(&format!(
            "   u) 更新组件包{}\n",
            busy_suffix(state.busy.contains(&ActionCategory::Update))
        ));
        out.push_str("   r) 回滚组件包\n");
        out.push_str(&format!(
            "   a) 开机自启 [{}]\n",
            if state.autostart { "x" } else { " " }
        ));
        out.push_str("   q) 退出\n> ");
        out
    }

    /// 把一行输入解析为菜单事件
    pub fn parse_choice(&self, input: &str) -> Option<MenuAction> {
        let state = self.state.lock().ok()?;
        let choice = input.trim();

        if let Ok(index) = choice.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| state.profiles.get(i))
                .map(|label| MenuAction::Start(label.clone()));
        }

        match choice.to_ascii_lowercase().as_str() {
            "s" => Some(MenuAction::Stop),
            "c" => Some(MenuAction::OpenConfigFolder),
            "u" => Some(MenuAction::Update),
            "r" => Some(MenuAction::Rollback),
            "a" => Some(MenuAction::ToggleAutostart(!state.autostart)),
            "q" => Some(MenuAction::Exit),
            _ => None,
        }
    }

    fn with_state(&self, f: impl FnOnce(&mut ConsoleState)) {
        if let Ok(mut state) = self.state.lock() {
            f(&mut state);
        }
    }
}

impl TrayMenu for ConsoleTray {
    fn set_profiles(&self, labels: &[String]) {
        self.with_state(|state| state.profiles = labels.to_vec());
    }

    fn set_active(&self, label: Option<&str>) {
        self.with_state(|state| state.active = label.map(str::to_string));
    }

    fn set_busy(&self, category: ActionCategory, busy: bool) {
        self.with_state(|state| {
            if busy {
                state.busy.insert(category);
            } else {
                state.busy.remove(&category);
            }
        });
    }

    fn set_autostart(&self, enabled: bool) {
        self.with_state(|state| state.autostart = enabled);
    }

    fn show_message(&self, title: &str, message: &str, is_error: bool) {
        if is_error {
            eprintln!("[{title}] {message}");
        } else {
            println!("[{title}] {message}");
        }
    }
}
