// 发布源：查询最新发布并下载资源

use crate::core::error::{AppError, AppResult};
use crate::core::http::{build_download_client, build_http_client};
use crate::models::config::UpdaterConfig;
use crate::models::release::ReleaseDescriptor;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// 发布源接口（测试中用内存实现替换）
#[async_trait]
pub trait ReleaseFeed: Send + Sync {
    /// 查询最新发布
    async fn latest_release(&self) -> AppResult<ReleaseDescriptor>;

    /// 流式下载资源到 `dest`，返回写入的字节数；失败时不留下部分文件
    async fn download_asset(&self, url: &str, dest: &Path) -> AppResult<u64>;
}

/// GitHub Releases API
pub struct GithubReleaseFeed {
    api_url: String,
    feed_client: Client,
    download_client: Client,
}

impl GithubReleaseFeed {
    pub fn new(config: &UpdaterConfig) -> AppResult<Self> {
        Ok(Self {
            api_url: config.releases_api.clone(),
            feed_client: build_http_client(config.feed_timeout)?,
            download_client: build_download_client(config.download_timeout)?,
        })
    }

    async fn stream_to_file(response: reqwest::Response, dest: &Path) -> AppResult<u64> {
        let mut file = fs::File::create(dest)
            .await
            .map_err(|e| AppError::io(dest, e))?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)
                .await
                .map_err(|e| AppError::io(dest, e))?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| AppError::io(dest, e))?;
        Ok(written)
    }
}

#[async_trait]
impl ReleaseFeed for GithubReleaseFeed {
    async fn latest_release(&self) -> AppResult<ReleaseDescriptor> {
        tracing::info!(url = %self.api_url, "查询最新发布");
        let response = self
            .feed_client
            .get(&self.api_url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "发布源返回错误");
            return Err(AppError::FeedError {
                status: status.as_u16(),
                body,
            });
        }

        let release: ReleaseDescriptor = response.json().await?;
        tracing::info!(tag = %release.tag, assets = release.assets.len(), "获取到最新发布");
        Ok(release)
    }

    async fn download_asset(&self, url: &str, dest: &Path) -> AppResult<u64> {
        tracing::info!(url, dest = %dest.display(), "开始下载");
        let response = self.download_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "下载失败");
            return Err(AppError::DownloadError {
                status: status.as_u16(),
                body,
            });
        }

        match Self::stream_to_file(response, dest).await {
            Ok(written) => {
                tracing::info!(bytes = written, "下载完成");
                Ok(written)
            }
            Err(e) => {
                // 清理部分下载的文件
                let _ = fs::remove_file(dest).await;
                Err(e)
            }
        }
    }
}
