// 该文件是 Shitu （识图） 项目的一部分。
// src/input.rs - 图像输入源
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::debug;

use crate::scratch::ScratchDir;

#[derive(Error, Debug)]
pub enum InputError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("输入路径缺少文件名: {0}")]
  MissingFileName(PathBuf),
}

/// 图像来源：磁盘文件或内存中的上传字节
#[derive(Debug, Clone)]
pub enum ImageSource {
  /// 磁盘上的图片文件
  FilePath(PathBuf),
  /// 内存中的图片字节（如上传内容）及其展示名称
  InMemoryBytes { data: Vec<u8>, name: String },
}

/// 解码后的图像与展示文件名
pub struct DecodedImage {
  pub image: RgbImage,
  pub file_name: String,
}

impl ImageSource {
  /// 将任一来源归一化为解码后的 RGB 图像与展示文件名
  pub fn decode(&self) -> Result<DecodedImage, InputError> {
    match self {
      ImageSource::FilePath(path) => {
        let file_name = path
          .file_name()
          .ok_or_else(|| InputError::MissingFileName(path.clone()))?
          .to_string_lossy()
          .into_owned();
        let image = ImageReader::open(path)?.decode()?.to_rgb8();
        debug!(
          "读取图片文件: {} ({}x{})",
          path.display(),
          image.width(),
          image.height()
        );

        Ok(DecodedImage { image, file_name })
      }
      ImageSource::InMemoryBytes { data, name } => {
        let image = image::load_from_memory(data)?.to_rgb8();
        debug!("解码内存图片: {} ({}x{})", name, image.width(), image.height());

        Ok(DecodedImage {
          image,
          file_name: name.clone(),
        })
      }
    }
  }

  /// 将内存来源的原始字节保留到临时目录；文件来源无需保留
  pub fn persist_to(&self, scratch: &ScratchDir) -> Result<Option<PathBuf>, InputError> {
    match self {
      ImageSource::FilePath(_) => Ok(None),
      ImageSource::InMemoryBytes { data, name } => Ok(Some(scratch.write_file(name, data)?)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn png_bytes(image: &RgbImage) -> Vec<u8> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    image
      .write_to(&mut buffer, image::ImageFormat::Png)
      .unwrap();
    buffer.into_inner()
  }

  #[test]
  fn in_memory_bytes_decode_with_display_name() {
    let original = RgbImage::from_pixel(8, 6, image::Rgb([12, 34, 56]));
    let source = ImageSource::InMemoryBytes {
      data: png_bytes(&original),
      name: "upload.png".to_string(),
    };

    let decoded = source.decode().unwrap();
    assert_eq!(decoded.file_name, "upload.png");
    assert_eq!(decoded.image.dimensions(), (8, 6));
    assert_eq!(decoded.image.get_pixel(3, 3), &image::Rgb([12, 34, 56]));
  }

  #[test]
  fn garbage_bytes_are_an_image_error() {
    let source = ImageSource::InMemoryBytes {
      data: vec![0, 1, 2, 3],
      name: "broken.png".to_string(),
    };

    assert!(matches!(
      source.decode(),
      Err(InputError::ImageError(_))
    ));
  }

  #[test]
  fn path_without_file_name_is_rejected() {
    let source = ImageSource::FilePath(PathBuf::from("/"));
    assert!(matches!(
      source.decode(),
      Err(InputError::MissingFileName(_))
    ));
  }

  #[test]
  fn only_in_memory_sources_are_persisted() {
    let scratch = ScratchDir::new().unwrap();

    let file_source = ImageSource::FilePath(PathBuf::from("a.jpg"));
    assert_eq!(file_source.persist_to(&scratch).unwrap(), None);

    let memory_source = ImageSource::InMemoryBytes {
      data: vec![1, 2, 3],
      name: "upload.jpg".to_string(),
    };
    let path = memory_source.persist_to(&scratch).unwrap().unwrap();
    assert!(path.exists());
    assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
  }
}
