use crate::core::error::AppResult;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

pub const USER_AGENT: &str = concat!("Moonstone-Updater/", env!("CARGO_PKG_VERSION"));

fn base_builder(connect_timeout: Duration) -> ClientBuilder {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(connect_timeout.min(Duration::from_secs(15)))
        .redirect(reqwest::redirect::Policy::limited(10)) // GitHub 资源下载会重定向
}

/// 构建带总超时的 HTTP 客户端（用于小的 API 请求）
///
/// 超时覆盖整个请求（包括读取响应体），超时后返回网络错误。
pub fn build_http_client(timeout: Duration) -> AppResult<Client> {
    let client = base_builder(timeout).timeout(timeout).build()?;
    Ok(client)
}

/// 构建下载用的 HTTP 客户端
///
/// 只限制连接和两次读取之间的空闲时间，不限制总时长：
/// 持续有数据到达的大文件下载不会被中断。
pub fn build_download_client(idle_timeout: Duration) -> AppResult<Client> {
    let client = base_builder(idle_timeout)
        .read_timeout(idle_timeout)
        .build()?;
    Ok(client)
}
