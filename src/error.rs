//! 启动阶段错误

use crate::config::ConfigError;

/// 启动阶段错误类型，出现即终止进程
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    #[error("数据库连接失败: {0}")]
    Database(#[from] sqlx::Error),
    #[error("收据目录不可用: {0}")]
    Storage(std::io::Error),
    #[error("无法绑定到 {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("服务运行错误: {0}")]
    Serve(std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
