//! 收据：上传、列出与下载

pub mod handler;
pub mod model;
pub mod service;
pub mod sniff;

/// 上传表单中的文件字段名
pub const RECEIPT_FIELD: &str = "receipt";
