pub mod config;
pub mod profile;
pub mod release;
pub mod service;
pub mod session;

pub use config::*;
pub use profile::*;
pub use release::*;
pub use service::*;
pub use session::*;
