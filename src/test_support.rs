// 单元测试共用的替身和夹具

use crate::core::error::{AppError, AppResult};
use crate::models::config::AppConfig;
use crate::models::profile::ConfigurationFile;
use crate::models::service::ServiceDefinition;
use crate::services::autostart::AutostartScheduler;
use crate::services::notify::Notifier;
use crate::services::service::backend::ServiceBackend;
use crate::ui::tray::TrayMenu;
use crate::ui::worker::ActionCategory;
use crate::utils::command::CommandResult;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

/// 以临时目录为安装根目录的配置
pub fn test_config(root: &Path) -> AppConfig {
    AppConfig::with_root(root)
}

/// 在 `<root>/zapret` 下写入一个配置脚本；`with_executable` 控制是否创建 winws.exe
pub fn write_profile(root: &Path, label: &str, with_executable: bool) -> ConfigurationFile {
    let config_dir = root.join("zapret");
    let bin_dir = config_dir.join("bundled");
    fs::create_dir_all(&bin_dir).unwrap();
    if with_executable {
        fs::write(bin_dir.join("winws.exe"), b"MZ").unwrap();
    }

    let script = "@echo off\r\n\
chcp 65001 > nul\r\n\
set \"BIN=%~dp0bundled\\\"\r\n\
set \"LISTS=%~dp0lists\\\"\r\n\
start \"zapret: general\" /min \"%BIN%winws.exe\" --wf-tcp=80,443 ^\r\n\
--hostlist=\"%LISTS%list-general.txt\" --dpi-desync=fake\r\n";
    let path = config_dir.join(format!("{label}.bat"));
    fs::write(&path, script).unwrap();
    ConfigurationFile::new(path)
}

#[derive(Debug, Default)]
struct FakeBackendState {
    /// 已注册服务：名称 → 显示名
    services: HashMap<String, String>,
    calls: Vec<String>,
    create_error: Option<String>,
    skip_registration: bool,
}

/// 内存中的服务管理器，记录每次调用
#[derive(Debug, Default)]
pub struct FakeServiceBackend {
    state: Mutex<FakeBackendState>,
}

impl FakeServiceBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, name: &str, display_name: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .services
            .insert(name.to_string(), display_name.to_string());
    }

    /// 之后的 create 都返回失败
    pub fn fail_create(&self, stderr: &str) {
        self.state.lock().unwrap().create_error = Some(stderr.to_string());
    }

    /// create 报告成功但服务没有注册
    pub fn skip_registration(&self) {
        self.state.lock().unwrap().skip_registration = true;
    }

    pub fn display_name_of(&self, name: &str) -> Option<String> {
        self.state.lock().unwrap().services.get(name).cloned()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.state.lock().unwrap().services.contains_key(name)
    }

    /// 全部调用（包括查询）
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// 只包含变更类调用
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| !call.starts_with("exists:") && !call.starts_with("qc:"))
            .collect()
    }

    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl ServiceBackend for FakeServiceBackend {
    fn exists(&self, name: &str) -> bool {
        self.record(format!("exists:{name}"));
        self.is_registered(name)
    }

    fn query_display_name(&self, name: &str) -> Option<String> {
        self.record(format!("qc:{name}"));
        self.display_name_of(name)
    }

    fn create(&self, definition: &ServiceDefinition) -> CommandResult {
        self.record(format!("create:{}", definition.name));
        let mut state = self.state.lock().unwrap();
        if let Some(stderr) = state.create_error.clone() {
            return CommandResult::failed(5, stderr);
        }
        if !state.skip_registration {
            state
                .services
                .insert(definition.name.clone(), definition.display_name.clone());
        }
        CommandResult::ok("[SC] CreateService SUCCESS")
    }

    fn start(&self, name: &str) -> CommandResult {
        self.record(format!("start:{name}"));
        CommandResult::ok("")
    }

    fn stop(&self, name: &str) -> CommandResult {
        self.record(format!("stop:{name}"));
        if self.is_registered(name) {
            CommandResult::ok("")
        } else {
            CommandResult::failed(1060, "[SC] OpenService FAILED 1060")
        }
    }

    fn delete(&self, name: &str) -> CommandResult {
        self.record(format!("delete:{name}"));
        match self.state.lock().unwrap().services.remove(name) {
            Some(_) => CommandResult::ok("[SC] DeleteService SUCCESS"),
            None => CommandResult::failed(1060, "[SC] OpenService FAILED 1060"),
        }
    }
}

/// 一条记录下来的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedNotice {
    pub title: String,
    pub message: String,
    pub is_error: bool,
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<RecordedNotice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<RecordedNotice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str, is_error: bool) {
        self.notices.lock().unwrap().push(RecordedNotice {
            title: title.to_string(),
            message: message.to_string(),
            is_error,
        });
    }
}

/// 用给定条目写一个 zip 文件（目录由路径隐含）
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let file = fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

/// 托盘菜单收到的一次调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    Profiles(Vec<String>),
    Active(Option<String>),
    Busy(ActionCategory, bool),
    Autostart(bool),
    Message {
        title: String,
        message: String,
        is_error: bool,
    },
}

#[derive(Debug, Default)]
pub struct RecordingMenu {
    events: Mutex<Vec<MenuEvent>>,
}

impl RecordingMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MenuEvent> {
        self.events.lock().unwrap().clone()
    }

    /// 最后一次设置的高亮配置
    pub fn last_active(&self) -> Option<Option<String>> {
        self.events().into_iter().rev().find_map(|event| match event {
            MenuEvent::Active(label) => Some(label),
            _ => None,
        })
    }

    pub fn messages(&self) -> Vec<(String, bool)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                MenuEvent::Message {
                    title, is_error, ..
                } => Some((title, is_error)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: MenuEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl TrayMenu for RecordingMenu {
    fn set_profiles(&self, labels: &[String]) {
        self.push(MenuEvent::Profiles(labels.to_vec()));
    }

    fn set_active(&self, label: Option<&str>) {
        self.push(MenuEvent::Active(label.map(str::to_string)));
    }

    fn set_busy(&self, category: ActionCategory, busy: bool) {
        self.push(MenuEvent::Busy(category, busy));
    }

    fn set_autostart(&self, enabled: bool) {
        self.push(MenuEvent::Autostart(enabled));
    }

    fn show_message(&self, title: &str, message: &str, is_error: bool) {
        self.push(MenuEvent::Message {
            title: title.to_string(),
            message: message.to_string(),
            is_error,
        });
    }
}

/// 内存中的开机自启状态
#[derive(Debug, Default)]
pub struct FakeAutostart {
    enabled: Mutex<bool>,
    fail: bool,
}

impl FakeAutostart {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Mutex::new(enabled),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            enabled: Mutex::new(false),
            fail: true,
        }
    }
}

impl AutostartScheduler for FakeAutostart {
    fn is_enabled(&self) -> bool {
        *self.enabled.lock().unwrap()
    }

    fn enable(&self) -> AppResult<()> {
        if self.fail {
            return Err(AppError::SchedulerError("Access is denied.".to_string()));
        }
        *self.enabled.lock().unwrap() = true;
        Ok(())
    }

    fn disable(&self) -> AppResult<()> {
        if self.fail {
            return Err(AppError::SchedulerError("Access is denied.".to_string()));
        }
        *self.enabled.lock().unwrap() = false;
        Ok(())
    }
}
