use crate::core::error::{AppError, AppResult};
use crate::models::config::AppConfig;
use crate::models::profile::ConfigurationFile;
use crate::models::service::{label_from_display_name, ServiceDefinition};
use crate::services::extractor::ConfigExtractor;
use crate::services::service::backend::ServiceBackend;
use std::sync::Arc;

/// 托管服务控制器
///
/// 状态：Absent → Created → Running → Stopped → Absent。
/// 系统服务管理器不支持原子地修改运行中服务的程序路径，所以启动时总是先删除再重建。
/// 除 `create` 外的失败都只记录日志：它们是幂等的清理步骤。
pub struct ServiceController {
    config: Arc<AppConfig>,
    backend: Arc<dyn ServiceBackend>,
    extractor: ConfigExtractor,
}

impl ServiceController {
    pub fn new(config: Arc<AppConfig>, backend: Arc<dyn ServiceBackend>) -> Self {
        let extractor = ConfigExtractor::new(config.script_encoding);
        Self {
            config,
            backend,
            extractor,
        }
    }

    fn name(&self) -> &str {
        &self.config.service_name
    }

    /// 服务是否已注册
    pub fn exists(&self) -> bool {
        let exists = self.backend.exists(self.name());
        tracing::info!(service = self.name(), exists, "查询服务");
        exists
    }

    /// 已注册服务的显示名
    pub fn display_name(&self) -> Option<String> {
        if !self.exists() {
            return None;
        }
        let display_name = self.backend.query_display_name(self.name());
        match &display_name {
            Some(name) => tracing::info!(display_name = %name, "获取服务显示名"),
            None => tracing::error!(service = self.name(), "无法获取服务显示名"),
        }
        display_name
    }

    /// 当前运行的配置标签（从显示名中恢复）
    pub fn active_label(&self) -> Option<String> {
        self.display_name()
            .as_deref()
            .and_then(label_from_display_name)
    }

    /// 注册服务；命令失败或注册后查询不到都视为致命错误
    pub fn create(&self, definition: &ServiceDefinition) -> AppResult<()> {
        tracing::info!(
            service = %definition.name,
            display_name = %definition.display_name,
            "创建服务"
        );
        let result = self.backend.create(definition);
        if !result.success {
            tracing::error!(stderr = %result.diagnostic(), "创建服务失败");
            return Err(AppError::CreateFailed {
                stderr: result.diagnostic().to_string(),
            });
        }

        if !self.backend.exists(&definition.name) {
            tracing::error!(service = %definition.name, "服务未被注册");
            return Err(AppError::CreateFailed {
                stderr: format!("服务 '{}' 创建后不存在", definition.name),
            });
        }

        tracing::info!(service = %definition.name, "服务创建成功");
        Ok(())
    }

    /// 用指定配置（重新）创建并启动服务
    ///
    /// 先解析配置脚本：解析失败时不会触碰现有服务。
    pub fn start(&self, profile: &ConfigurationFile, version_label: &str) -> AppResult<()> {
        let command = self.extractor.extract(&profile.path)?;
        let definition = ServiceDefinition::new(&self.config, version_label, command);

        if self.exists() {
            tracing::info!("服务已存在，停止并删除后使用新配置重建");
            self.stop();
            self.delete();
        }

        self.create(&definition)?;

        tracing::info!(service = self.name(), "启动服务");
        let result = self.backend.start(self.name());
        if !result.success {
            tracing::error!(stderr = %result.diagnostic(), "启动服务失败");
        }
        Ok(())
    }

    /// 停止服务，并顺带停止可能遗留的驱动服务
    pub fn stop(&self) {
        if !self.exists() {
            return;
        }

        tracing::info!(service = self.name(), "停止服务");
        let result = self.backend.stop(self.name());
        if !result.success {
            tracing::warn!(stderr = %result.diagnostic(), "停止服务失败");
        }

        let driver = &self.config.driver_service_name;
        tracing::info!(service = %driver, "停止驱动服务");
        let result = self.backend.stop(driver);
        if !result.success {
            tracing::warn!(service = %driver, stderr = %result.diagnostic(), "停止驱动服务失败");
        }
    }

    /// 删除服务
    pub fn delete(&self) {
        if !self.exists() {
            return;
        }

        tracing::info!(service = self.name(), "删除服务");
        let result = self.backend.delete(self.name());
        if !result.success {
            tracing::warn!(stderr = %result.diagnostic(), "删除服务失败");
        }
    }

    /// 停止并删除服务（“停止”菜单项和退出时使用）
    pub fn stop_and_delete(&self) {
        self.stop();
        self.delete();
    }
}
