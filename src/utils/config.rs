use crate::core::error::{AppError, AppResult};
use std::env;
use std::path::PathBuf;

/// 覆盖安装目录的环境变量
pub const ROOT_ENV_VAR: &str = "MOONSTONE_ROOT";

/// 应用安装目录
///
/// - 设置了 `MOONSTONE_ROOT` 时使用该目录
/// - 开发模式（debug 构建）使用 crate 根目录
/// - 生产模式使用可执行文件所在目录
pub fn install_root() -> AppResult<PathBuf> {
    if let Some(root) = env::var_os(ROOT_ENV_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(root));
    }

    if cfg!(debug_assertions) {
        return Ok(PathBuf::from(env!("CARGO_MANIFEST_DIR")));
    }

    let exe = env::current_exe().map_err(|e| AppError::io("current_exe", e))?;
    exe.parent()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| AppError::NotFound(exe.clone()))
}
