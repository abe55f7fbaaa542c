//! # 收据与产品 HTTP 服务
//!
//! 这个库提供一个精简的 HTTP 服务，包括：
//! - 产品列表：从数据库表中只读查询
//! - 收据文件：上传到本地目录，并按文件名下载
//! - 所有响应统一附带宽松的 CORS 头

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod infrastructure;

pub use app::{build_router, AppState};
pub use config::{Config, ConfigError};
pub use error::{AppError, Result};
