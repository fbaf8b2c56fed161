// 组件包目录：当前目录 + 最多一代备份

use crate::core::error::{AppError, AppResult};
use crate::utils::file_helpers::{copy_dir_all, remove_dir_if_exists};
use std::path::{Path, PathBuf};

/// 备份步骤的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupOutcome {
    Created,
    /// 当前目录不存在（首次安装），无需备份
    Skipped,
}

#[derive(Debug, Clone)]
pub struct BundleStore {
    live: PathBuf,
    backup: PathBuf,
}

impl BundleStore {
    pub fn new(live: impl Into<PathBuf>, backup: impl Into<PathBuf>) -> Self {
        Self {
            live: live.into(),
            backup: backup.into(),
        }
    }

    pub fn live_dir(&self) -> &Path {
        &self.live
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup
    }

    pub fn has_backup(&self) -> bool {
        self.backup.is_dir()
    }

    /// 备份当前目录，旧备份先删除
    pub fn backup(&self) -> AppResult<BackupOutcome> {
        if !self.live.is_dir() {
            tracing::info!(live = %self.live.display(), "组件包目录不存在，跳过备份");
            return Ok(BackupOutcome::Skipped);
        }

        remove_dir_if_exists(&self.backup)?;
        if let Err(e) = copy_dir_all(&self.live, &self.backup) {
            tracing::error!(error = %e, "备份组件包失败");
            let _ = remove_dir_if_exists(&self.backup);
            return Err(e);
        }

        tracing::info!(backup = %self.backup.display(), "已备份组件包");
        Ok(BackupOutcome::Created)
    }

    /// 用 `source` 的内容替换当前目录
    pub fn replace_with(&self, source: &Path) -> AppResult<()> {
        remove_dir_if_exists(&self.live)?;
        copy_dir_all(source, &self.live)?;
        tracing::info!(source = %source.display(), live = %self.live.display(), "已替换组件包");
        Ok(())
    }

    /// 从备份恢复当前目录
    pub fn restore(&self) -> AppResult<()> {
        if !self.has_backup() {
            return Err(AppError::NotFound(self.backup.clone()));
        }

        remove_dir_if_exists(&self.live)?;
        copy_dir_all(&self.backup, &self.live)?;
        tracing::info!(live = %self.live.display(), "已从备份恢复组件包");
        Ok(())
    }

    /// 备份后替换；替换失败时恢复到替换前的状态
    pub fn install(&self, source: &Path) -> AppResult<()> {
        let outcome = self.backup()?;

        let Err(err) = self.replace_with(source) else {
            return Ok(());
        };
        tracing::error!(error = %err, "替换组件包失败");

        match outcome {
            BackupOutcome::Created => {
                if let Err(restore_err) = self.restore() {
                    tracing::error!(error = %restore_err, "从备份恢复失败，组件包目录可能不完整");
                }
            }
            BackupOutcome::Skipped => {
                if let Err(cleanup_err) = remove_dir_if_exists(&self.live) {
                    tracing::error!(error = %cleanup_err, "清理不完整的组件包目录失败");
                }
            }
        }
        Err(err)
    }
}
