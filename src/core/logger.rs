use crate::models::config::{LogConfig, LogFormat, LogLevel, LogOutput};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// 文件写入线程的 guard（进程存活期间不能被 drop）
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// 默认日志文件名
const DEFAULT_LOG_FILE: &str = "moonstone.log";

/// 初始化日志系统
///
/// 支持基于配置的日志输出，包括：
/// - 日志级别（trace/debug/info/warn/error）
/// - 输出格式（JSON/纯文本）
/// - 输出目标（控制台/文件/both）
///
/// 日志文件每次启动时重写，不做轮转。
pub fn init_logger(config: &LogConfig) -> anyhow::Result<()> {
    let filter = create_env_filter(&config.level);

    let console_layer = match config.output {
        LogOutput::Console | LogOutput::Both => Some(create_console_layer(config.format)),
        LogOutput::File => None,
    };
    let file_layer = match config.output {
        LogOutput::File | LogOutput::Both => {
            Some(create_file_layer(config.format, config.file_path.as_deref())?)
        }
        LogOutput::Console => None,
    };

    Registry::default()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("日志系统已初始化，不能重复初始化: {e}"))?;

    tracing::info!(
        level = config.level.as_str(),
        format = ?config.format,
        output = ?config.output,
        file_path = ?config.file_path,
        "日志系统初始化完成"
    );

    Ok(())
}

/// 创建环境过滤器
fn create_env_filter(level: &LogLevel) -> EnvFilter {
    // 优先从环境变量读取，例如 RUST_LOG=moonstone=trace,reqwest=warn
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

/// 默认过滤规则：应用代码使用指定级别，第三方库使用 WARN
fn default_directives(level: &LogLevel) -> String {
    format!(
        "moonstone={},hyper=warn,reqwest=warn,h2=warn,tokio=warn",
        level.as_str()
    )
}

fn create_console_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync + 'static>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    match format {
        LogFormat::Text => fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(cfg!(debug_assertions))
            .with_ansi(true)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stdout)
            .with_target(cfg!(debug_assertions))
            .boxed(),
    }
}

fn create_file_layer<S>(
    format: LogFormat,
    file_path: Option<&Path>,
) -> anyhow::Result<Box<dyn Layer<S> + Send + Sync + 'static>>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    let (dir, file_name) = split_log_path(file_path)?;
    std::fs::create_dir_all(&dir)?;
    // 与旧版本一致：每次启动清空日志文件
    let _ = std::fs::remove_file(dir.join(&file_name));

    let file_appender = rolling::never(&dir, &file_name);
    let (writer, guard) = non_blocking(file_appender);
    if FILE_GUARD.set(guard).is_err() {
        anyhow::bail!("日志系统已初始化，不能重复初始化");
    }

    let layer = match format {
        LogFormat::Text => fmt::layer()
            .with_writer(writer)
            .with_target(cfg!(debug_assertions))
            .with_ansi(false)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(true)
            .boxed(),
    };
    Ok(layer)
}

/// 拆分日志文件路径为（目录，文件名）
fn split_log_path(file_path: Option<&Path>) -> anyhow::Result<(PathBuf, String)> {
    let path = match file_path {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir()?.join(DEFAULT_LOG_FILE),
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| anyhow::anyhow!("日志文件路径无效: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok((dir, file_name))
}
