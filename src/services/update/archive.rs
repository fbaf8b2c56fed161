//! 压缩包解压与组件目录定位

use crate::core::error::{AppError, AppResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 压缩包内平台二进制目录的固定父目录
const BINARIES_DIR: &str = "binaries";

/// 解压压缩包到 `dest`，返回内容根目录
///
/// 解压结果只有一个顶层目录时（发布包常见的 `zapret-v70.4/` 包装层），返回该目录；
/// 与它并列的散落文件不影响判断。
/// 条目路径逃逸出目标目录的压缩包整体拒绝。
pub fn extract_archive(archive_path: &Path, dest: &Path) -> AppResult<PathBuf> {
    let file = fs::File::open(archive_path).map_err(|e| AppError::io(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file)?;
    fs::create_dir_all(dest).map_err(|e| AppError::io(dest, e))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = entry.enclosed_name().ok_or_else(|| {
            AppError::LayoutError(format!("压缩包条目路径非法: {}", entry.name()))
        })?;
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| AppError::io(&out_path, e))?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
            }
            let mut outfile =
                fs::File::create(&out_path).map_err(|e| AppError::io(&out_path, e))?;
            io::copy(&mut entry, &mut outfile).map_err(|e| AppError::io(&out_path, e))?;
        }
    }

    tracing::info!(entries = archive.len(), dest = %dest.display(), "解压完成");
    content_root(dest)
}

/// 顶层恰好只有一个目录时进入该目录
fn content_root(dest: &Path) -> AppResult<PathBuf> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dest).map_err(|e| AppError::io(dest, e))? {
        let path = entry.map_err(|e| AppError::io(dest, e))?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }

    match dirs.as_slice() {
        [single] => Ok(single.clone()),
        _ => Ok(dest.to_path_buf()),
    }
}

/// 查找平台二进制目录：先看固定位置 `binaries/<platform>`，再递归查找同名目录
pub fn locate_platform_dir(root: &Path, platform: &str) -> AppResult<PathBuf> {
    let fixed = root.join(BINARIES_DIR).join(platform);
    if fixed.is_dir() {
        tracing::info!(path = %fixed.display(), "找到平台目录");
        return Ok(fixed);
    }

    let found = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_type().is_dir() && entry.file_name() == platform)
        .map(|entry| entry.into_path());

    match found {
        Some(path) => {
            tracing::info!(path = %path.display(), "递归查找到平台目录");
            Ok(path)
        }
        None => {
            tracing::error!(platform, root = %root.display(), "压缩包中没有平台目录");
            Err(AppError::LayoutError(format!(
                "压缩包中未找到 {BINARIES_DIR}/{platform} 目录"
            )))
        }
    }
}
