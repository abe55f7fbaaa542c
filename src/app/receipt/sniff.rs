//! 文件内容类型嗅探
//!
//! 按 MIME Sniffing 标准的签名表检查文件头部（最多 512 字节）。

/// 参与嗅探的最大字节数
pub const SNIFF_LEN: usize = 512;

/// 无法识别时的通用二进制类型
pub const OCTET_STREAM: &str = "application/octet-stream";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

enum Signature {
    /// 跳过前导空白后，大小写不敏感匹配 HTML 标签，并要求标签结束符
    Html(&'static [u8]),
    /// 按掩码匹配，可选跳过前导空白
    Masked {
        pattern: &'static [u8],
        mask: &'static [u8],
        skip_whitespace: bool,
        content_type: &'static str,
    },
    /// 精确前缀
    Exact(&'static [u8], &'static str),
    Mp4,
}

const fn exact(prefix: &'static [u8], content_type: &'static str) -> Signature {
    Signature::Exact(prefix, content_type)
}

const fn masked(
    pattern: &'static [u8],
    mask: &'static [u8],
    content_type: &'static str,
) -> Signature {
    Signature::Masked {
        pattern,
        mask,
        skip_whitespace: false,
        content_type,
    }
}

static SIGNATURES: &[Signature] = &[
    Signature::Html(b"<!DOCTYPE HTML"),
    Signature::Html(b"<HTML"),
    Signature::Html(b"<HEAD"),
    Signature::Html(b"<SCRIPT"),
    Signature::Html(b"<IFRAME"),
    Signature::Html(b"<H1"),
    Signature::Html(b"<DIV"),
    Signature::Html(b"<FONT"),
    Signature::Html(b"<TABLE"),
    Signature::Html(b"<A"),
    Signature::Html(b"<STYLE"),
    Signature::Html(b"<TITLE"),
    Signature::Html(b"<B"),
    Signature::Html(b"<BODY"),
    Signature::Html(b"<BR"),
    Signature::Html(b"<P"),
    Signature::Html(b"<!--"),
    Signature::Masked {
        pattern: b"<?xml",
        mask: b"\xFF\xFF\xFF\xFF\xFF",
        skip_whitespace: true,
        content_type: "text/xml; charset=utf-8",
    },
    exact(b"%PDF-", "application/pdf"),
    exact(b"%!PS-Adobe-", "application/postscript"),
    // UTF BOM
    masked(b"\xFE\xFF\x00\x00", b"\xFF\xFF\x00\x00", "text/plain; charset=utf-16be"),
    masked(b"\xFF\xFE\x00\x00", b"\xFF\xFF\x00\x00", "text/plain; charset=utf-16le"),
    masked(b"\xEF\xBB\xBF\x00", b"\xFF\xFF\xFF\x00", TEXT_PLAIN),
    // 图片
    exact(b"\x00\x00\x01\x00", "image/x-icon"),
    exact(b"\x00\x00\x02\x00", "image/x-icon"),
    exact(b"BM", "image/bmp"),
    exact(b"GIF87a", "image/gif"),
    exact(b"GIF89a", "image/gif"),
    masked(
        b"RIFF\x00\x00\x00\x00WEBPVP",
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF\xFF\xFF",
        "image/webp",
    ),
    exact(b"\x89PNG\x0D\x0A\x1A\x0A", "image/png"),
    exact(b"\xFF\xD8\xFF", "image/jpeg"),
    // 音视频
    masked(
        b"FORM\x00\x00\x00\x00AIFF",
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        "audio/aiff",
    ),
    masked(b"ID3", b"\xFF\xFF\xFF", "audio/mpeg"),
    masked(b"OggS\x00", b"\xFF\xFF\xFF\xFF\xFF", "application/ogg"),
    masked(
        b"MThd\x00\x00\x00\x06",
        b"\xFF\xFF\xFF\xFF\xFF\xFF\xFF\xFF",
        "audio/midi",
    ),
    masked(
        b"RIFF\x00\x00\x00\x00AVI ",
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        "video/avi",
    ),
    masked(
        b"RIFF\x00\x00\x00\x00WAVE",
        b"\xFF\xFF\xFF\xFF\x00\x00\x00\x00\xFF\xFF\xFF\xFF",
        "audio/wave",
    ),
    Signature::Mp4,
    exact(b"\x1A\x45\xDF\xA3", "video/webm"),
    // 字体
    masked(
        b"\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x4C\x50",
        b"\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\xFF\xFF",
        "application/vnd.ms-fontobject",
    ),
    exact(b"\x00\x01\x00\x00", "font/ttf"),
    exact(b"OTTO", "font/otf"),
    exact(b"ttcf", "font/collection"),
    exact(b"wOFF", "font/woff"),
    exact(b"wOF2", "font/woff2"),
    // 压缩包
    exact(b"\x1F\x8B\x08", "application/x-gzip"),
    exact(b"PK\x03\x04", "application/zip"),
    exact(b"Rar!\x1A\x07\x00", "application/x-rar-compressed"),
    exact(b"Rar!\x1A\x07\x01\x00", "application/x-rar-compressed"),
    exact(b"\x00\x61\x73\x6D", "application/wasm"),
];

/// 根据内容头部推断 Content-Type
///
/// 空内容与无法识别的二进制内容返回 `application/octet-stream`；
/// 不含控制字节的文本返回 `text/plain; charset=utf-8`。
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let data = &data[..data.len().min(SNIFF_LEN)];
    if data.is_empty() {
        return OCTET_STREAM;
    }

    let first_non_ws = data
        .iter()
        .position(|b| !is_whitespace(*b))
        .unwrap_or(data.len());

    for signature in SIGNATURES {
        if let Some(content_type) = signature.matches(data, first_non_ws) {
            return content_type;
        }
    }

    if data.iter().any(|b| is_binary(*b)) {
        OCTET_STREAM
    } else {
        TEXT_PLAIN
    }
}

impl Signature {
    fn matches(&self, data: &[u8], first_non_ws: usize) -> Option<&'static str> {
        match self {
            Signature::Html(tag) => {
                let data = &data[first_non_ws..];
                if data.len() < tag.len() + 1 {
                    return None;
                }
                let name_matches = tag.iter().zip(data).all(|(t, d)| {
                    if t.is_ascii_uppercase() {
                        d.to_ascii_uppercase() == *t
                    } else {
                        d == t
                    }
                });
                let terminated = matches!(data[tag.len()], b' ' | b'>');
                (name_matches && terminated).then_some("text/html; charset=utf-8")
            }
            Signature::Masked {
                pattern,
                mask,
                skip_whitespace,
                content_type,
            } => {
                let data = if *skip_whitespace {
                    &data[first_non_ws..]
                } else {
                    data
                };
                if data.len() < pattern.len() {
                    return None;
                }
                pattern
                    .iter()
                    .zip(mask.iter())
                    .zip(data)
                    .all(|((p, m), d)| d & m == *p)
                    .then_some(*content_type)
            }
            Signature::Exact(prefix, content_type) => {
                data.starts_with(prefix).then_some(*content_type)
            }
            Signature::Mp4 => is_mp4(data).then_some("video/mp4"),
        }
    }
}

/// ISO-BMFF: 首个 box 为 ftyp，且某个兼容品牌以 "mp4" 开头
fn is_mp4(data: &[u8]) -> bool {
    if data.len() < 12 {
        return false;
    }
    let box_size = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if data.len() < box_size || box_size % 4 != 0 || &data[4..8] != b"ftyp" {
        return false;
    }
    (8..box_size)
        .step_by(4)
        // 跳过 minor version
        .filter(|offset| *offset != 12)
        .any(|offset| data.get(offset..offset + 3) == Some(b"mp4".as_slice()))
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\t' | b'\n' | 0x0C | b'\r' | b' ')
}

fn is_binary(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_images() {
        assert_eq!(
            detect_content_type(b"\x89PNG\x0D\x0A\x1A\x0A\x00\x00\x00\x0DIHDR"),
            "image/png"
        );
        assert_eq!(detect_content_type(b"\xFF\xD8\xFF\xE0\x00\x10JFIF"), "image/jpeg");
        assert_eq!(detect_content_type(b"GIF89a\x01\x00"), "image/gif");
        assert_eq!(detect_content_type(b"RIFF\x24\x00\x00\x00WEBPVP8 "), "image/webp");
    }

    #[test]
    fn test_documents_and_archives() {
        assert_eq!(detect_content_type(b"%PDF-1.7\n%\xE2\xE3"), "application/pdf");
        assert_eq!(detect_content_type(b"PK\x03\x04\x14\x00"), "application/zip");
        assert_eq!(detect_content_type(b"\x1F\x8B\x08\x00"), "application/x-gzip");
    }

    #[test]
    fn test_html_and_xml_skip_leading_whitespace() {
        assert_eq!(
            detect_content_type(b"  \n<!doctype html><html></html>"),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            detect_content_type(b"<p>receipt</p>"),
            "text/html; charset=utf-8"
        );
        assert_eq!(
            detect_content_type(b"\n<?xml version=\"1.0\"?>"),
            "text/xml; charset=utf-8"
        );
        // 标签后必须是空格或 '>'
        assert_eq!(detect_content_type(b"<pre"), TEXT_PLAIN);
    }

    #[test]
    fn test_mp4() {
        let mut data = Vec::new();
        data.extend_from_slice(&24u32.to_be_bytes());
        data.extend_from_slice(b"ftypisom\x00\x00\x02\x00isommp41");
        assert_eq!(detect_content_type(&data), "video/mp4");
    }

    #[test]
    fn test_text_and_fallback() {
        assert_eq!(detect_content_type(b"Total: 12.50 EUR\n"), TEXT_PLAIN);
        assert_eq!(detect_content_type(b""), OCTET_STREAM);
        assert_eq!(detect_content_type(b"\x00\x01\x02\x03\x04"), OCTET_STREAM);
    }

    #[test]
    fn test_only_prefix_is_inspected() {
        let mut data = vec![b'a'; SNIFF_LEN];
        data.push(0x00);
        assert_eq!(detect_content_type(&data), TEXT_PLAIN);
    }
}
