use serde::{Deserialize, Deserializer, Serialize};

/// 发布源返回的资源
///
/// 字段缺失或为 null 时取空字符串，这样的资源不会被选中，但不影响整个文档的解析。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub browser_download_url: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// 发布源返回的最新发布（只保留需要的字段）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    #[serde(rename = "tag_name", default)]
    pub tag: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl ReleaseDescriptor {
    /// 第一个以指定后缀结尾的资源
    pub fn archive_asset(&self, suffix: &str) -> Option<&ReleaseAsset> {
        self.assets
            .iter()
            .find(|asset| asset.name.ends_with(suffix) && !asset.browser_download_url.is_empty())
    }
}
