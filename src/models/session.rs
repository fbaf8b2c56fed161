use serde::{Deserialize, Serialize};

/// 持久化的会话状态
///
/// `stopped == true` 表示下次启动不应运行服务；
/// `stopped == false` 且存在 `last_selected` 时，下次启动自动恢复该配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(rename = "last_bat")]
    pub last_selected: Option<String>,
    pub stopped: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            last_selected: None,
            stopped: true,
        }
    }
}

impl SessionState {
    /// 需要自动恢复的配置标签
    pub fn resume_label(&self) -> Option<&str> {
        if self.stopped {
            None
        } else {
            self.last_selected.as_deref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_stopped_without_selection() {
        let state = SessionState::default();
        assert_eq!(state.last_selected, None);
        assert!(state.stopped);
        assert_eq!(state.resume_label(), None);
    }

    #[test]
    fn serializes_with_original_field_names() {
        let state = SessionState {
            last_selected: Some("general".to_string()),
            stopped: false,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json, serde_json::json!({"last_bat": "general", "stopped": false}));
        assert_eq!(state.resume_label(), Some("general"));
    }

    #[test]
    fn stopped_state_never_resumes() {
        let state = SessionState {
            last_selected: Some("general".to_string()),
            stopped: true,
        };
        assert_eq!(state.resume_label(), None);
    }
}
