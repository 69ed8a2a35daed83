// 该文件是 Shitu （识图） 项目的一部分。
// src/output/mod.rs - 输出模块
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

pub mod draw;

pub use draw::Annotator;

use std::path::{Path, PathBuf};

use image::{RgbImage, codecs::jpeg::JpegEncoder};
use thiserror::Error;
use tracing::info;

use crate::detection::Detection;

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
}

/// 将标注后的图像编码为 JPEG 字节，用于展示与下载
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, OutputError> {
  let mut buffer = Vec::new();
  let encoder = JpegEncoder::new(&mut buffer);
  image.write_with_encoder(encoder)?;
  Ok(buffer)
}

/// 下载文件名: detected_<原文件名>
pub fn download_file_name(file_name: &str) -> String {
  format!("detected_{}", file_name)
}

/// 将编码后的图像写入输出目录并返回完整路径
pub fn save_annotated(
  directory: &Path,
  file_name: &str,
  jpeg: &[u8],
) -> Result<PathBuf, OutputError> {
  if !directory.as_os_str().is_empty() {
    std::fs::create_dir_all(directory)?;
  }

  let path = directory.join(download_file_name(file_name));
  std::fs::write(&path, jpeg)?;
  info!("保存标注图像: {}", path.display());

  Ok(path)
}

/// 渲染检测结果摘要；零检测是正常结果而非错误
pub fn format_summary(detections: &[Detection]) -> String {
  if detections.is_empty() {
    return "未检测到任何对象".to_string();
  }

  let mut lines = Vec::with_capacity(detections.len() + 1);
  lines.push(format!("检测到 {} 个对象:", detections.len()));
  for det in detections {
    lines.push(format!(
      "  - {}: {:.2} at ({}, {})-({}, {})",
      det.label, det.confidence, det.bbox[0], det.bbox[1], det.bbox[2], det.bbox[3]
    ));
  }

  lines.join("\n")
}
