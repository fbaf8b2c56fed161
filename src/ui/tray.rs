//! 托盘编排层
//!
//! 把菜单事件路由到服务控制器、组件包更新器和开机自启，并把结果反馈给菜单。
//! 所有会调用系统服务管理器或访问网络的操作都在 worker 上执行，菜单线程不阻塞。
//! 这里是唯一决定错误如何呈现给用户的地方。

use crate::core::error::AppResult;
use crate::models::config::AppConfig;
use crate::models::profile::ConfigurationFile;
use crate::services::autostart::AutostartScheduler;
use crate::services::notify::Notifier;
use crate::services::service::ServiceController;
use crate::services::session_store::SessionStore;
use crate::services::update::BundleUpdater;
use crate::ui::worker::{ActionCategory, Dispatch, SingleFlight};
use crate::utils::command::CommandExecutor;
use std::sync::Arc;

#[cfg(target_os = "windows")]
const FILE_MANAGER: &str = "explorer";
#[cfg(not(target_os = "windows"))]
const FILE_MANAGER: &str = "xdg-open";

/// 托盘菜单的展示接口（图形托盘或控制台菜单）
pub trait TrayMenu: Send + Sync {
    /// 设置“启动”子菜单中的配置列表
    fn set_profiles(&self, labels: &[String]);
    /// 高亮当前运行的配置（None 表示没有运行）
    fn set_active(&self, label: Option<&str>);
    /// 某类操作执行中时禁用对应菜单项
    fn set_busy(&self, category: ActionCategory, busy: bool);
    fn set_autostart(&self, enabled: bool);
    fn show_message(&self, title: &str, message: &str, is_error: bool);
}

/// 菜单事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    Start(String),
    Stop,
    OpenConfigFolder,
    Update,
    Rollback,
    ToggleAutostart(bool),
    Exit,
}

/// 事件处理后是否继续运行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Exit,
}

/// 编排层依赖的组件
pub struct TrayDeps {
    pub config: Arc<AppConfig>,
    pub profiles: Vec<ConfigurationFile>,
    pub controller: Arc<ServiceController>,
    pub updater: Arc<BundleUpdater>,
    pub session: SessionStore,
    pub autostart: Arc<dyn AutostartScheduler>,
    pub menu: Arc<dyn TrayMenu>,
    pub notifier: Arc<dyn Notifier>,
    pub executor: CommandExecutor,
}

pub struct TrayOrchestrator {
    config: Arc<AppConfig>,
    profiles: Vec<ConfigurationFile>,
    controller: Arc<ServiceController>,
    updater: Arc<BundleUpdater>,
    session: SessionStore,
    autostart: Arc<dyn AutostartScheduler>,
    menu: Arc<dyn TrayMenu>,
    notifier: Arc<dyn Notifier>,
    executor: CommandExecutor,
    service_worker: SingleFlight,
    update_worker: SingleFlight,
}

/// 在阻塞线程池执行（sc.exe / schtasks.exe / 文件复制）
async fn run_blocking<F, T>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

impl TrayOrchestrator {
    pub fn new(deps: TrayDeps) -> Self {
        Self {
            config: deps.config,
            profiles: deps.profiles,
            controller: deps.controller,
            updater: deps.updater,
            session: deps.session,
            autostart: deps.autostart,
            menu: deps.menu,
            notifier: deps.notifier,
            executor: deps.executor,
            service_worker: SingleFlight::new(ActionCategory::Service),
            update_worker: SingleFlight::new(ActionCategory::Update),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.profiles.iter().map(|p| p.label.clone()).collect()
    }

    /// 初始化菜单状态；上次退出时服务在运行则自动恢复
    ///
    /// 返回自动恢复任务（没有需要恢复的配置时为 None）。
    pub async fn initialize(&self) -> Option<Dispatch<()>> {
        self.menu.set_profiles(&self.labels());

        let controller = self.controller.clone();
        let active = run_blocking(move || Ok(controller.active_label()))
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "查询当前配置失败");
                None
            });
        tracing::info!(active = ?active, "当前运行的配置");
        self.menu.set_active(active.as_deref());

        let autostart = self.autostart.clone();
        let autostart_enabled = run_blocking(move || Ok(autostart.is_enabled()))
            .await
            .unwrap_or(false);
        self.menu.set_autostart(autostart_enabled);

        self.notifier.notify("已启动", "应用已启动", false);

        let state = self.session.load();
        let label = state.resume_label()?;
        if !self.profiles.iter().any(|p| p.label == label) {
            tracing::warn!(label, "上次使用的配置已不存在，跳过自动恢复");
            return None;
        }

        tracing::info!(label, "自动恢复上次使用的配置");
        Some(self.start_profile(label))
    }

    /// 处理一个菜单事件
    pub async fn handle(&self, action: MenuAction) -> ControlFlow {
        tracing::info!(action = ?action, "托盘菜单事件");
        match action {
            MenuAction::Start(label) => {
                self.start_profile(&label);
            }
            MenuAction::Stop => {
                self.stop_service();
            }
            MenuAction::OpenConfigFolder => self.open_config_folder(),
            MenuAction::Update => {
                self.update_bundle();
            }
            MenuAction::Rollback => {
                self.rollback_bundle();
            }
            MenuAction::ToggleAutostart(enabled) => self.toggle_autostart(enabled).await,
            MenuAction::Exit => {
                self.shutdown().await;
                return ControlFlow::Exit;
            }
        }
        ControlFlow::Continue
    }

    /// 用指定配置启动服务（未知配置同样返回 Rejected）
    pub fn start_profile(&self, label: &str) -> Dispatch<()> {
        let Some(profile) = self.profiles.iter().find(|p| p.label == label).cloned() else {
            tracing::warn!(label, "未知配置");
            self.notifier
                .notify("启动失败", &format!("未找到配置 {label}"), true);
            return Dispatch::Rejected;
        };

        let controller = self.controller.clone();
        let session = self.session.clone();
        let menu = self.menu.clone();
        let notifier = self.notifier.clone();

        self.service_worker.try_spawn(async move {
            menu.set_busy(ActionCategory::Service, true);
            let label = profile.label.clone();
            session.save(Some(&label), false);
            menu.set_active(Some(&label));

            let result = run_blocking(move || {
                let started = controller.start(&profile, &profile.label);
                let active = started.is_err().then(|| controller.active_label()).flatten();
                Ok((started, active))
            })
            .await;

            match result {
                Ok((Ok(()), _)) => {
                    tracing::info!(label = %label, "服务已启动");
                }
                Ok((Err(e), active)) => {
                    tracing::error!(label = %label, error = %e, "启动服务失败");
                    notifier.notify("启动失败", &e.to_string(), true);
                    session.save(active.as_deref(), active.is_none());
                    menu.set_active(active.as_deref());
                }
                Err(e) => {
                    tracing::error!(error = %e, "启动服务任务异常");
                    notifier.notify("启动失败", &e.to_string(), true);
                }
            }
            menu.set_busy(ActionCategory::Service, false);
        })
    }

    /// 停止并删除服务，下次启动不再自动恢复
    pub fn stop_service(&self) -> Dispatch<()> {
        let controller = self.controller.clone();
        let session = self.session.clone();
        let menu = self.menu.clone();

        self.service_worker.try_spawn(async move {
            menu.set_busy(ActionCategory::Service, true);
            session.save(None, true);

            let result = run_blocking(move || {
                controller.stop_and_delete();
                Ok(())
            })
            .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "停止服务任务异常");
            }

            menu.set_active(None);
            menu.set_busy(ActionCategory::Service, false);
        })
    }

    /// 在后台更新组件包；结果由更新器自己通知
    pub fn update_bundle(&self) -> Dispatch<()> {
        let updater = self.updater.clone();
        let notifier = self.notifier.clone();

        self.spawn_bundle_task(async move {
            notifier.notify("组件包更新", "开始更新...", false);
            if let Err(e) = updater.update().await {
                tracing::error!(error = %e, "组件包更新失败");
            }
        })
    }

    /// 回滚到更新前的组件包
    pub fn rollback_bundle(&self) -> Dispatch<()> {
        let updater = self.updater.clone();

        self.spawn_bundle_task(async move {
            if let Err(e) = updater.rollback().await {
                tracing::error!(error = %e, "组件包回滚失败");
            }
        })
    }

    /// 组件包任务会停止服务并替换其文件，执行期间同时占用服务 worker
    fn spawn_bundle_task<F>(&self, task: F) -> Dispatch<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let menu = self.menu.clone();
        self.update_worker
            .try_spawn_with(&[&self.service_worker], async move {
                menu.set_busy(ActionCategory::Update, true);
                menu.set_busy(ActionCategory::Service, true);
                task.await;
                menu.set_busy(ActionCategory::Service, false);
                menu.set_busy(ActionCategory::Update, false);
            })
    }

    pub async fn toggle_autostart(&self, enabled: bool) {
        let autostart = self.autostart.clone();
        let result = run_blocking(move || {
            if enabled {
                autostart.enable()
            } else {
                autostart.disable()
            }
        })
        .await;

        match result {
            Ok(()) => self.menu.set_autostart(enabled),
            Err(e) => {
                tracing::error!(enabled, error = %e, "切换开机自启失败");
                self.notifier.notify("开机自启", &e.to_string(), true);
                let autostart = self.autostart.clone();
                let actual = run_blocking(move || Ok(autostart.is_enabled()))
                    .await
                    .unwrap_or(!enabled);
                self.menu.set_autostart(actual);
            }
        }
    }

    pub fn open_config_folder(&self) {
        let dir = &self.config.paths.config_dir;
        match self.executor.spawn_detached(FILE_MANAGER, [dir.as_os_str()]) {
            Ok(()) => tracing::info!(dir = %dir.display(), "已打开配置目录"),
            Err(e) => tracing::error!(dir = %dir.display(), error = %e, "打开配置目录失败"),
        }
    }

    /// 退出前停止并删除服务（保留会话状态，下次启动时恢复）
    ///
    /// 先等待进行中的服务和组件包任务结束，并在清理期间占用两个 worker。
    pub async fn shutdown(&self) {
        tracing::info!("退出应用");
        let _guard = loop {
            if let Some(guard) = self.service_worker.try_claim(&[&self.update_worker]) {
                break guard;
            }
            tracing::info!("等待进行中的操作结束");
            self.service_worker.wait_idle().await;
            self.update_worker.wait_idle().await;
        };

        let controller = self.controller.clone();
        if let Err(e) = run_blocking(move || {
            controller.stop_and_delete();
            Ok(())
        })
        .await
        {
            tracing::error!(error = %e, "退出时停止服务失败");
        }
        self.menu.set_active(None);
    }
}
