// 会话状态持久化：记住最后选择的配置以及是否处于停止状态

use crate::core::error::{AppError, AppResult};
use crate::models::session::SessionState;
use std::fs;
use std::path::PathBuf;

/// 基于 JSON 文件的会话状态存储
///
/// 读写失败都不影响主流程：读取失败按默认状态处理，写入失败只记录日志。
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 保存状态（最后选择的配置 + 是否停止）
    pub fn save(&self, last_selected: Option<&str>, stopped: bool) {
        let state = SessionState {
            last_selected: last_selected.map(str::to_string),
            stopped,
        };
        match self.write(&state) {
            Ok(()) => tracing::info!(last_selected = ?state.last_selected, stopped, "会话状态已保存"),
            Err(e) => tracing::error!(path = %self.path.display(), error = %e, "保存会话状态失败"),
        }
    }

    fn write(&self, state: &SessionState) -> AppResult<()> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| AppError::ParseError(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| AppError::io(&self.path, e))
    }

    /// 读取状态；文件不存在或内容损坏时返回默认状态
    pub fn load(&self) -> SessionState {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "会话状态文件不存在");
                return SessionState::default();
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "读取会话状态失败");
                return SessionState::default();
            }
        };

        match serde_json::from_str::<SessionState>(&content) {
            Ok(state) => {
                tracing::info!(last_selected = ?state.last_selected, stopped = state.stopped, "已加载会话状态");
                state
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "会话状态文件损坏，使用默认状态");
                SessionState::default()
            }
        }
    }
}
