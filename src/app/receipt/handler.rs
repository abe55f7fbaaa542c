//! 收据处理器

use axum::{
    body::{Body, Bytes},
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::PathRejection,
        Path, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use futures::stream;
use tokio::{fs::File, io::AsyncReadExt};

use super::RECEIPT_FIELD;
use crate::{app::AppState, core::error::CoreError};

/// 下载时每次读取的块大小
const CHUNK_SIZE: usize = 64 * 1024;

/// GET /receipts
pub async fn list_receipts(State(state): State<AppState>) -> Result<Json<Vec<String>>, CoreError> {
    let receipts = state.receipt_service.list().await?;
    Ok(Json(receipts))
}

/// POST /receipts，multipart 表单中的 `receipt` 文件字段
pub async fn upload_receipt(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, CoreError> {
    let mut multipart = multipart.map_err(|e| CoreError::Multipart(e.body_text()))?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(RECEIPT_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_owned)
            .ok_or_else(|| CoreError::Multipart("receipt 字段缺少文件名".to_string()))?;

        state.receipt_service.save(&filename, field).await?;
        return Ok(StatusCode::CREATED);
    }

    Err(CoreError::Multipart(format!(
        "表单缺少 {} 字段",
        RECEIPT_FIELD
    )))
}

/// GET /receipts/{filename}
pub async fn download_receipt(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, CoreError> {
    let Path(path) = path.map_err(|e| CoreError::BadRequest(e.body_text()))?;
    if path.contains('/') {
        return Err(CoreError::BadRequest(format!("多余的路径段: {}", path)));
    }

    let receipt = state.receipt_service.open(&path).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        receipt.filename.replace('"', "\\\"")
    );
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|_| CoreError::BadRequest(format!("文件名无法写入响应头: {}", path)))?;

    let headers = [
        (header::CONTENT_DISPOSITION, disposition),
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static(receipt.content_type),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(receipt.size)),
    ];

    Ok((headers, file_body(receipt.file)).into_response())
}

/// 按块读取文件作为响应体
fn file_body(file: File) -> Body {
    Body::from_stream(stream::try_unfold(file, read_chunk))
}

async fn read_chunk(mut file: File) -> std::io::Result<Option<(Bytes, File)>> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let n = file.read(&mut buf).await?;
    if n == 0 {
        return Ok(None);
    }
    buf.truncate(n);
    Ok(Some((Bytes::from(buf), file)))
}
