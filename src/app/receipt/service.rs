//! 收据存储服务
//!
//! 收据以原始文件名保存在存储目录中，文件名即唯一标识。服务本身不保存任何
//! 内存状态，每次列出或读取都直接访问目录。

use axum::body::Bytes;
use futures::{Stream, StreamExt};
use std::{
    io::SeekFrom,
    path::{Path, PathBuf},
};
use tokio::{
    fs::{self, File},
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::{info, warn};
use uuid::Uuid;

use super::{model::ReceiptFile, sniff};
use crate::core::error::CoreError;

/// 上传过程中的临时文件目录（位于存储目录下，列出时跳过）
const TMP_DIR: &str = ".tmp";

#[derive(Clone)]
pub struct ReceiptService {
    dir: PathBuf,
}

impl ReceiptService {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 启动时确保存储目录存在
    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(self.dir.join(TMP_DIR)).await
    }

    /// 列出已保存的收据文件名（按字典序），跳过目录和以 `.` 开头的文件
    pub async fn list(&self) -> Result<Vec<String>, CoreError> {
        let mut entries = fs::read_dir(&self.dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if name.starts_with('.') => continue,
                Ok(name) => names.push(name),
                Err(name) => warn!("跳过非 UTF-8 文件名: {:?}", name),
            }
        }

        names.sort();
        Ok(names)
    }

    /// 将上传内容以流的方式写入存储目录
    ///
    /// 先写入临时文件，完整写完后再重命名为目标文件名，同名文件被整体替换。
    /// 任何失败都会删除临时文件，目标文件保持不变。
    pub async fn save<S, E>(&self, filename: &str, chunks: S) -> Result<u64, CoreError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        CoreError: From<E>,
    {
        validate_filename(filename)?;

        let tmp_dir = self.dir.join(TMP_DIR);
        fs::create_dir_all(&tmp_dir).await?;
        let tmp_path = tmp_dir.join(format!("{}.part", Uuid::new_v4()));

        let result = match write_chunks(&tmp_path, chunks).await {
            Ok(written) => fs::rename(&tmp_path, self.dir.join(filename))
                .await
                .map(|_| written)
                .map_err(CoreError::Io),
            Err(e) => Err(e),
        };

        match result {
            Ok(written) => {
                info!("收据已保存: {} ({} 字节)", filename, written);
                Ok(written)
            }
            Err(e) => {
                if let Err(remove_err) = fs::remove_file(&tmp_path).await {
                    if remove_err.kind() != std::io::ErrorKind::NotFound {
                        warn!("清理临时文件失败 {:?}: {}", tmp_path, remove_err);
                    }
                }
                Err(e)
            }
        }
    }

    /// 打开收据文件，嗅探内容类型并读取大小，返回前将读取位置复位到开头
    pub async fn open(&self, filename: &str) -> Result<ReceiptFile, CoreError> {
        validate_filename(filename)?;

        let mut file = File::open(self.dir.join(filename))
            .await
            .map_err(|_| CoreError::NotFound(filename.to_string()))?;

        let mut header = Vec::with_capacity(sniff::SNIFF_LEN);
        (&mut file)
            .take(sniff::SNIFF_LEN as u64)
            .read_to_end(&mut header)
            .await?;
        let content_type = sniff::detect_content_type(&header);

        let size = file.metadata().await?.len();
        file.seek(SeekFrom::Start(0)).await?;

        Ok(ReceiptFile {
            filename: filename.to_string(),
            content_type,
            size,
            file,
        })
    }
}

async fn write_chunks<S, E>(path: &Path, chunks: S) -> Result<u64, CoreError>
where
    S: Stream<Item = Result<Bytes, E>>,
    CoreError: From<E>,
{
    futures::pin_mut!(chunks);

    let mut file = File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}

/// 校验文件名只包含单个路径段，拒绝目录穿越和隐藏文件
pub fn validate_filename(filename: &str) -> Result<(), CoreError> {
    let invalid = filename.is_empty()
        || filename.starts_with('.')
        || filename.contains(['/', '\\', '\0']);

    if invalid {
        return Err(CoreError::BadRequest(format!("非法文件名: {:?}", filename)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn chunks(parts: &[&'static str]) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
        stream::iter(
            parts
                .iter()
                .map(|p| Ok(Bytes::from_static(p.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("receipt-2024-01.pdf").is_ok());
        assert!(validate_filename("收据 1.png").is_ok());

        for name in ["", ".", "..", "../etc/passwd", "a/b", "a\\b", ".hidden", "nul\0"] {
            assert!(
                matches!(validate_filename(name), Err(CoreError::BadRequest(_))),
                "{:?} 应当被拒绝",
                name
            );
        }
    }

    #[tokio::test]
    async fn test_save_list_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let service = ReceiptService::new(dir.path());
        service.ensure_dir().await.unwrap();

        let written = service
            .save("b.txt", chunks(&["hello ", "world"]))
            .await
            .unwrap();
        assert_eq!(written, 11);
        service.save("a.txt", chunks(&["first"])).await.unwrap();

        assert_eq!(service.list().await.unwrap(), vec!["a.txt", "b.txt"]);

        let mut receipt = service.open("b.txt").await.unwrap();
        assert_eq!(receipt.size, 11);
        assert_eq!(receipt.content_type, "text/plain; charset=utf-8");

        // 嗅探后已经复位，能读到完整内容
        let mut content = String::new();
        receipt.file.read_to_string(&mut content).await.unwrap();
        assert_eq!(content, "hello world");
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = ReceiptService::new(dir.path());

        service
            .save("r.bin", chunks(&["a much longer first payload"]))
            .await
            .unwrap();
        service.save("r.bin", chunks(&["short"])).await.unwrap();

        let content = fs::read(dir.path().join("r.bin")).await.unwrap();
        assert_eq!(content, b"short");
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = ReceiptService::new(dir.path());

        let failing = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(std::io::Error::new(std::io::ErrorKind::Other, "连接中断")),
        ]);
        assert!(service.save("broken.pdf", failing).await.is_err());

        assert!(!dir.path().join("broken.pdf").exists());
        assert!(service.list().await.unwrap().is_empty());
        let mut leftovers = fs::read_dir(dir.path().join(TMP_DIR)).await.unwrap();
        assert!(leftovers.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = ReceiptService::new(dir.path());

        assert!(matches!(
            service.open("missing.png").await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let service = ReceiptService::new(dir.path().join("absent"));

        assert!(matches!(service.list().await, Err(CoreError::Io(_))));
    }
}
