// 组件包更新：发布源、解压、目录备份/替换

pub mod archive;
pub mod bundle;
pub mod bundle_updater;
pub mod feed;

pub use bundle::{BackupOutcome, BundleStore};
pub use bundle_updater::BundleUpdater;
pub use feed::{GithubReleaseFeed, ReleaseFeed};
