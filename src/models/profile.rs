// 启动配置（*.bat）：文件名（不含扩展名）即用户可见的版本标签

use crate::core::error::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

const SCRIPT_EXTENSION: &str = "bat";

/// 一个可选择的启动配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationFile {
    pub label: String,
    pub path: PathBuf,
}

impl ConfigurationFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { label, path }
    }

    /// 列出目录中的全部配置脚本，按标签排序
    pub fn discover(dir: &Path) -> AppResult<Vec<Self>> {
        if !dir.is_dir() {
            return Err(AppError::NotFound(dir.to_path_buf()));
        }

        let entries = fs::read_dir(dir).map_err(|e| AppError::io(dir, e))?;
        let mut files: Vec<Self> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_script(path))
            .map(Self::new)
            .collect();
        files.sort_by(|a, b| a.label.cmp(&b.label));

        tracing::info!(
            dir = %dir.display(),
            count = files.len(),
            labels = ?files.iter().map(|f| f.label.as_str()).collect::<Vec<_>>(),
            "已发现配置脚本"
        );
        Ok(files)
    }
}

fn is_script(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SCRIPT_EXTENSION))
}

/// 从配置脚本中解析出的启动命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub executable: PathBuf,
    /// 已去除续行符和换行的参数串
    pub arguments: String,
    /// 解析后的 BIN 目录
    pub bin_dir: PathBuf,
    /// 解析后的 LISTS 目录
    pub lists_dir: PathBuf,
}
