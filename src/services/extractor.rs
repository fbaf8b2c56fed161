//! 配置脚本解析
//!
//! 只针对 zapret 的 `.bat` 启动脚本这一固定写法做模式匹配，不是通用的批处理解析器：
//! - 可选的 `set "BIN=%~dp0..."` / `set "LISTS=%~dp0..."` 目录覆盖
//! - 唯一一条 `start "<title>" /min "<exe>" <args...>` 启动语句，参数可用 `^` 续行

use crate::core::error::{AppError, AppResult};
use crate::models::profile::LaunchCommand;
use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

const BIN_PLACEHOLDER: &str = "%BIN%";
const LISTS_PLACEHOLDER: &str = "%LISTS%";
const DEFAULT_BIN_DIR: &str = "bundled";
const DEFAULT_LISTS_DIR: &str = "lists";
const CONTINUATION: char = '^';

static BIN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)set\s+"BIN=%~dp0([^"]*)""#).expect("valid BIN regex"));
static LISTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)set\s+"LISTS=%~dp0([^"]*)""#).expect("valid LISTS regex"));
static LAUNCH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bstart\s+"[^"]*"\s+/min\s+"([^"]+)"[ \t]*"#).expect("valid launch regex")
});

/// 配置脚本解析器
#[derive(Debug, Clone)]
pub struct ConfigExtractor {
    encoding: &'static Encoding,
}

impl ConfigExtractor {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self { encoding }
    }

    /// 解析配置脚本，得到可执行文件路径和参数串
    pub fn extract(&self, script_path: &Path) -> AppResult<LaunchCommand> {
        tracing::info!(path = %script_path.display(), "读取配置脚本");
        if !script_path.exists() {
            tracing::error!(path = %script_path.display(), "配置脚本不存在");
            return Err(AppError::NotFound(script_path.to_path_buf()));
        }

        let content = self.read_script(script_path)?;
        let script_dir = script_dir(script_path)?;
        let command = parse_script(&content, &script_dir)?;

        if !command.executable.exists() {
            tracing::error!(executable = %command.executable.display(), "可执行文件不存在");
            return Err(AppError::ExecutableNotFound(command.executable));
        }

        Ok(command)
    }

    fn read_script(&self, script_path: &Path) -> AppResult<String> {
        let bytes = fs::read(script_path).map_err(|e| {
            tracing::error!(path = %script_path.display(), error = %e, "读取配置脚本失败");
            AppError::ReadError {
                path: script_path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        self.encoding
            .decode_without_bom_handling_and_without_replacement(&bytes)
            .map(|text| text.into_owned())
            .ok_or_else(|| AppError::ReadError {
                path: script_path.to_path_buf(),
                reason: format!("无法按 {} 解码", self.encoding.name()),
            })
    }
}

/// 脚本所在目录（绝对路径），对应批处理里的 `%~dp0`
fn script_dir(script_path: &Path) -> AppResult<PathBuf> {
    let absolute = if script_path.is_absolute() {
        script_path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| AppError::io(script_path, e))?
            .join(script_path)
    };
    Ok(absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(absolute))
}

/// 从脚本文本中解析启动命令（不检查可执行文件是否存在）
pub fn parse_script(content: &str, script_dir: &Path) -> AppResult<LaunchCommand> {
    let bin_dir = resolve_dir(script_dir, capture(&BIN_RE, content), DEFAULT_BIN_DIR);
    let lists_dir = resolve_dir(script_dir, capture(&LISTS_RE, content), DEFAULT_LISTS_DIR);
    tracing::info!(bin = %bin_dir.display(), lists = %lists_dir.display(), "脚本目录");

    let caps = LAUNCH_RE.captures(content).ok_or_else(|| {
        tracing::error!("未找到 start /min 启动语句");
        AppError::ParseError("未找到 start /min 启动语句".to_string())
    })?;
    let raw_executable = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    let tail_start = caps.get(0).map(|m| m.end()).unwrap_or(content.len());
    let raw_arguments = join_continued_lines(&content[tail_start..]);

    let bin_prefix = with_trailing_separator(&bin_dir);
    let lists_prefix = with_trailing_separator(&lists_dir);
    let substitute = |text: &str| {
        text.replace(BIN_PLACEHOLDER, &bin_prefix)
            .replace(LISTS_PLACEHOLDER, &lists_prefix)
    };

    let executable = PathBuf::from(substitute(raw_executable));
    let arguments = substitute(&raw_arguments);
    tracing::info!(executable = %executable.display(), arguments = %arguments, "解析出启动命令");

    Ok(LaunchCommand {
        executable,
        arguments,
        bin_dir,
        lists_dir,
    })
}

fn capture<'a>(re: &Regex, content: &'a str) -> Option<&'a str> {
    re.captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// `%~dp0` 之后的相对路径拼到脚本目录上，兼容 `\` 和 `/` 分隔符
fn resolve_dir(script_dir: &Path, relative: Option<&str>, default: &str) -> PathBuf {
    relative
        .unwrap_or(default)
        .split(['\\', '/'])
        .filter(|part| !part.is_empty() && *part != ".")
        .fold(script_dir.to_path_buf(), |dir, part| dir.join(part))
}

fn with_trailing_separator(dir: &Path) -> String {
    format!("{}{}", dir.display(), MAIN_SEPARATOR)
}

/// 读取启动语句剩余部分：行尾为 `^` 时继续读下一行，各行去掉首尾空白后用单个空格连接
fn join_continued_lines(tail: &str) -> String {
    let mut parts = Vec::new();

    for line in tail.lines() {
        let trimmed = line.trim();
        let (body, continues) = match trimmed.strip_suffix(CONTINUATION) {
            Some(body) => (body.trim_end(), true),
            None => (trimmed, false),
        };

        let body = body.replace(CONTINUATION, "");
        if !body.is_empty() {
            parts.push(body);
        }
        if !continues {
            break;
        }
    }

    parts.join(" ")
}
