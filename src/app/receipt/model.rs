//! 收据数据模型

use tokio::fs::File;

/// 已打开、待下载的收据文件
pub struct ReceiptFile {
    pub filename: String,
    /// 根据文件头部嗅探出的内容类型
    pub content_type: &'static str,
    pub size: u64,
    /// 读取位置已在文件开头
    pub file: File,
}
