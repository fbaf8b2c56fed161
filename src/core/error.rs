//! 统一错误类型定义
//!
//! 使用 `thiserror` 定义核心组件的错误类型。只有最外层（托盘编排层 / main）
//! 决定错误是弹出通知还是终止进程，内部组件只负责返回错误。

use std::path::PathBuf;
use thiserror::Error;

/// 核心组件的统一错误类型
#[derive(Error, Debug)]
pub enum AppError {
    /// 预期的文件或资源不存在
    #[error("未找到: {0}")]
    NotFound(PathBuf),

    /// 配置脚本无法读取或无法按旧式编码解码
    #[error("读取配置脚本失败: {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    /// 配置脚本不符合固定方言
    #[error("解析配置脚本失败: {0}")]
    ParseError(String),

    /// 解析出的可执行文件不存在
    #[error("可执行文件不存在: {0}")]
    ExecutableNotFound(PathBuf),

    /// 服务注册失败（sc create 非零返回或注册后查询不到）
    #[error("创建服务失败: {stderr}")]
    CreateFailed { stderr: String },

    /// 发布源请求未返回成功
    #[error("发布源返回错误: {status} {body}")]
    FeedError { status: u16, body: String },

    /// 最新发布中没有压缩包资源
    #[error("最新发布中未找到压缩包资源")]
    NoReleaseAsset,

    /// 资源下载未返回成功
    #[error("下载失败: {status} {body}")]
    DownloadError { status: u16, body: String },

    /// 压缩包内部结构不符合预期
    #[error("压缩包结构不符合预期: {0}")]
    LayoutError(String),

    /// 网络错误（包含超时）
    #[error("网络错误: {0}")]
    Network(#[from] reqwest::Error),

    /// 压缩包读取/解压错误
    #[error("压缩包错误: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// 文件 I/O 错误
    #[error("文件 I/O 错误: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 应用配置无效
    #[error("配置无效: {0}")]
    ConfigError(String),

    /// 开机自启计划任务操作失败
    #[error("计划任务操作失败: {0}")]
    SchedulerError(String),

    /// 后台阻塞任务异常退出
    #[error("后台任务失败: {0}")]
    TaskFailed(String),
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskFailed(err.to_string())
    }
}

/// 核心组件的 Result 别名
pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    /// 从 `std::io::Error` 和路径创建 I/O 错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
