//! 文件操作辅助函数
//!
//! 组件包更新用到的目录复制、删除和目录指纹计算。

use crate::core::error::{AppError, AppResult};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// 递归复制目录（目标目录不存在时创建）
pub fn copy_dir_all(src: &Path, dst: &Path) -> AppResult<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(|e| walkdir_error(src, e))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| AppError::LayoutError(e.to_string()))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| AppError::io(&target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| AppError::io(entry.path(), e))?;
        }
    }
    Ok(())
}

/// 删除目录（不存在时忽略）
pub fn remove_dir_if_exists(path: &Path) -> AppResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::io(path, e)),
    }
}

/// 计算目录的 SHA256 指纹（相对路径 + 文件内容，按路径排序）
///
/// 用于记录安装后的组件包版本，以及校验恢复后的目录与更新前一致。
pub fn dir_fingerprint(root: &Path) -> AppResult<String> {
    let mut hasher = Sha256::new();
    let walker = WalkDir::new(root).sort_by_file_name().follow_links(false);

    for entry in walker {
        let entry = entry.map_err(|e| walkdir_error(root, e))?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| AppError::LayoutError(e.to_string()))?;
        let key = relative.to_string_lossy().replace('\\', "/");

        if entry.file_type().is_dir() {
            hasher.update(b"d:");
            hasher.update(key.as_bytes());
            hasher.update(b"\n");
        } else {
            let content = fs::read(entry.path()).map_err(|e| AppError::io(entry.path(), e))?;
            hasher.update(b"f:");
            hasher.update(key.as_bytes());
            hasher.update(b"\n");
            hasher.update((content.len() as u64).to_le_bytes());
            hasher.update(&content);
        }
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn walkdir_error(root: &Path, error: walkdir::Error) -> AppError {
    let path = error.path().unwrap_or(root).to_path_buf();
    match error.into_io_error() {
        Some(source) => AppError::io(path, source),
        None => AppError::LayoutError(format!("目录遍历失败: {}", path.display())),
    }
}
