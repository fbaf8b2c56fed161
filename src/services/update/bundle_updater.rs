use crate::core::error::{AppError, AppResult};
use crate::models::config::AppConfig;
use crate::services::notify::Notifier;
use crate::services::service::ServiceController;
use crate::services::update::archive::{extract_archive, locate_platform_dir};
use crate::services::update::bundle::BundleStore;
use crate::services::update::feed::ReleaseFeed;
use crate::utils::file_helpers::dir_fingerprint;
use std::path::PathBuf;
use std::sync::Arc;

const DOWNLOAD_FILE: &str = "bundle.zip";
const EXTRACT_DIR: &str = "extracted";

/// 组件包更新服务
///
/// 流程：停止服务 → 查询最新发布 → 下载 → 解压 → 定位平台目录 → 备份 → 替换。
/// 备份之前的任何失败都不会改动当前目录；替换失败时从备份恢复。
/// 临时目录在每次尝试结束后删除。单次执行由调用方保证（托盘层的单任务 worker）。
pub struct BundleUpdater {
    config: Arc<AppConfig>,
    feed: Arc<dyn ReleaseFeed>,
    controller: Arc<ServiceController>,
    notifier: Arc<dyn Notifier>,
    store: BundleStore,
}

impl BundleUpdater {
    pub fn new(
        config: Arc<AppConfig>,
        feed: Arc<dyn ReleaseFeed>,
        controller: Arc<ServiceController>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let store = BundleStore::new(&config.paths.bundled_dir, &config.paths.backup_dir);
        Self {
            config,
            feed,
            controller,
            notifier,
            store,
        }
    }

    pub fn store(&self) -> &BundleStore {
        &self.store
    }

    /// 更新组件包，返回新发布的标签
    pub async fn update(&self) -> AppResult<String> {
        tracing::info!("开始更新组件包");
        self.stop_service().await;

        match self.download_and_install().await {
            Ok(tag) => {
                tracing::info!(tag = %tag, "组件包更新成功");
                self.notifier
                    .notify("更新完成", &format!("组件包已更新到 {tag}"), false);
                Ok(tag)
            }
            Err(e) => {
                tracing::error!(error = %e, "组件包更新失败");
                self.notifier
                    .notify("更新失败", &format!("组件包更新失败: {e}"), true);
                Err(e)
            }
        }
    }

    /// 用保留的备份恢复组件包
    pub async fn rollback(&self) -> AppResult<()> {
        tracing::info!("回滚组件包");
        self.stop_service().await;

        let store = self.store.clone();
        let result = tokio::task::spawn_blocking(move || store.restore()).await?;
        match &result {
            Ok(()) => self.notifier.notify("回滚完成", "组件包已恢复到上一版本", false),
            Err(e) => self
                .notifier
                .notify("回滚失败", &format!("组件包回滚失败: {e}"), true),
        }
        result
    }

    async fn stop_service(&self) {
        let controller = self.controller.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || controller.stop()).await {
            tracing::warn!(error = %e, "停止服务任务异常");
        }
    }

    async fn download_and_install(&self) -> AppResult<String> {
        let updater = &self.config.updater;

        let release = self.feed.latest_release().await?;
        let asset = release
            .archive_asset(&updater.archive_suffix)
            .ok_or(AppError::NoReleaseAsset)?;
        tracing::info!(tag = %release.tag, asset = %asset.name, "选择发布资源");

        let workspace = tempfile::Builder::new()
            .prefix("moonstone-update-")
            .tempdir()
            .map_err(|e| AppError::io(std::env::temp_dir(), e))?;
        let archive_path = workspace.path().join(DOWNLOAD_FILE);
        self.feed
            .download_asset(&asset.browser_download_url, &archive_path)
            .await?;

        let extract_dir = workspace.path().join(EXTRACT_DIR);
        let platform = updater.platform_dir.clone();
        let store = self.store.clone();
        let fingerprint = tokio::task::spawn_blocking(move || -> AppResult<String> {
            let root = extract_archive(&archive_path, &extract_dir)?;
            let platform_dir: PathBuf = locate_platform_dir(&root, &platform)?;
            store.install(&platform_dir)?;
            dir_fingerprint(store.live_dir())
        })
        .await??;
        tracing::info!(fingerprint = %fingerprint, "组件包指纹");

        // workspace 在这里 drop，临时目录随之删除
        drop(workspace);
        Ok(release.tag)
    }
}
