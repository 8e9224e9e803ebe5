//! 故事板预览图

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use base64::{engine::general_purpose, Engine as _};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AdboardError, Result};
use crate::pipeline::steps::IMAGE_GENERATOR;
use crate::state::ResultMap;

/// 预览图的字节上限
pub const MAX_PREVIEW_BYTES: usize = 500_000;

const TARGET_WIDTHS: [u32; 5] = [640, 480, 320, 240, 160];

/// 回复中附带的内容
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attachment {
    pub mime_type: String,
    pub uri: String,
}

/// 第一张存在于磁盘上的故事板画面
pub fn first_frame_path(results: &ResultMap) -> Option<PathBuf> {
    results
        .field(IMAGE_GENERATOR, "frames")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(|frame| frame.get("path").and_then(Value::as_str))
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| AdboardError::Other(anyhow!("failed to encode preview: {}", e)))?;
    Ok(bytes)
}

/// 逐级缩小宽度，直到 PNG 小于 `max_bytes`；最小一档仍超出时返回最小一档
pub fn thumbnail_png(path: &Path, max_bytes: usize) -> Result<Vec<u8>> {
    let image = image::open(path).map_err(|e| {
        AdboardError::Other(anyhow!("failed to open {}: {}", path.display(), e))
    })?;

    let mut smallest = Vec::new();
    for width in TARGET_WIDTHS {
        let resized = if image.width() > width {
            image.resize(width, u32::MAX, FilterType::Triangle)
        } else {
            image.clone()
        };
        let bytes = encode_png(&resized)?;
        debug!(width = resized.width(), size = bytes.len(), "encoded preview");
        if bytes.len() < max_bytes {
            return Ok(bytes);
        }
        smallest = bytes;
    }
    Ok(smallest)
}

pub fn png_data_uri(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(bytes))
}

/// 由结果表生成预览附件；没有可用画面或处理失败时返回 None
pub fn storyboard_preview(results: &ResultMap) -> Option<Attachment> {
    let path = first_frame_path(results)?;
    match thumbnail_png(&path, MAX_PREVIEW_BYTES) {
        Ok(bytes) => Some(Attachment {
            mime_type: "image/png".to_string(),
            uri: png_data_uri(&bytes),
        }),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not build preview");
            None
        }
    }
}
