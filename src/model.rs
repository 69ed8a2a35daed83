// 该文件是 Shitu （识图） 项目的一部分。
// src/model.rs - 外部推理边界
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::{collections::HashMap, path::Path};

use image::RgbImage;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// 外部推理对单个对象的原始输出，未经过滤
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawPrediction {
  /// 边界框 [x_min, y_min, x_max, y_max]，浮点像素坐标
  pub bbox: [f32; 4],
  /// 类别索引
  pub class_id: u32,
  /// 置信度
  pub score: f32,
}

/// 类别索引到名称的映射，随模型一同提供
#[derive(Debug, Clone, Default)]
pub struct ClassNames {
  names: HashMap<u32, String>,
}

impl ClassNames {
  /// 由按顺序编号的类别名称列表构建
  pub fn from_labels<I, S>(labels: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      names: labels
        .into_iter()
        .enumerate()
        .map(|(id, name)| (id as u32, name.into()))
        .collect(),
    }
  }

  pub fn get(&self, class_id: u32) -> Option<&str> {
    self.names.get(&class_id).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.names.len()
  }

  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }
}

impl FromIterator<(u32, String)> for ClassNames {
  fn from_iter<T: IntoIterator<Item = (u32, String)>>(iter: T) -> Self {
    Self {
      names: iter.into_iter().collect(),
    }
  }
}

/// 外部推理边界。模型的选择、加载与推理运行均在本 crate 之外完成，
/// 这里只约定其调用形式。
pub trait Inference {
  type Error: std::error::Error;

  /// 模型自带的类别映射
  fn class_names(&self) -> &ClassNames;

  /// 对图像执行推理，返回置信度不低于阈值的原始预测，
  /// 顺序为模型内部排序
  fn infer(&self, image: &RgbImage, confidence: f32) -> Result<Vec<RawPrediction>, Self::Error>;
}

#[derive(Error, Debug)]
pub enum ModelError {
  #[error("无法读取预测文件: {0}")]
  IoError(#[from] std::io::Error),
  #[error("预测文件格式无效: {0}")]
  ParseError(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct PredictionDocument {
  labels: Vec<String>,
  predictions: Vec<RawPrediction>,
}

/// 回放外部推理导出的预测文件，使演示程序无需捆绑推理运行时
#[derive(Debug)]
pub struct PredictionFile {
  class_names: ClassNames,
  predictions: Vec<RawPrediction>,
}

impl PredictionFile {
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
    let path = path.as_ref();
    info!("加载预测文件: {}", path.display());
    let data = std::fs::read_to_string(path)?;
    Self::from_json(&data)
  }

  pub fn from_json(json: &str) -> Result<Self, ModelError> {
    let document: PredictionDocument = serde_json::from_str(json)?;
    let class_names = ClassNames::from_labels(document.labels);
    debug!(
      "预测文件包含 {} 个类别, {} 条预测",
      class_names.len(),
      document.predictions.len()
    );
    if class_names.is_empty() {
      warn!("预测文件未包含任何类别名称");
    }

    Ok(Self {
      class_names,
      predictions: document.predictions,
    })
  }
}

impl Inference for PredictionFile {
  type Error = ModelError;

  fn class_names(&self) -> &ClassNames {
    &self.class_names
  }

  fn infer(&self, _image: &RgbImage, confidence: f32) -> Result<Vec<RawPrediction>, Self::Error> {
    Ok(
      self
        .predictions
        .iter()
        .filter(|pred| pred.score >= confidence)
        .cloned()
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const DOCUMENT: &str = r#"{
    "labels": ["cat", "dog"],
    "predictions": [
      { "bbox": [10.4, 10.6, 50.2, 50.9], "class_id": 0, "score": 0.8 },
      { "bbox": [1.0, 2.0, 3.0, 4.0], "class_id": 1, "score": 0.2 }
    ]
  }"#;

  #[test]
  fn class_names_resolve_by_index() {
    let names = ClassNames::from_labels(["cat", "dog"]);
    assert_eq!(names.get(0), Some("cat"));
    assert_eq!(names.get(1), Some("dog"));
    assert_eq!(names.get(2), None);
    assert_eq!(names.len(), 2);
    assert!(!names.is_empty());
    assert!(ClassNames::default().is_empty());
  }

  #[test]
  fn loading_a_missing_file_is_an_io_error() {
    let err = PredictionFile::load("/no/such/predictions.json").unwrap_err();
    assert!(matches!(err, ModelError::IoError(_)));
  }

  #[test]
  fn prediction_file_parses_labels_and_predictions() {
    let file = PredictionFile::from_json(DOCUMENT).unwrap();
    assert_eq!(file.class_names().get(1), Some("dog"));
    assert_eq!(file.predictions.len(), 2);
    assert_eq!(file.predictions[0].class_id, 0);
    assert_eq!(file.predictions[0].bbox, [10.4, 10.6, 50.2, 50.9]);
  }

  #[test]
  fn replay_applies_confidence_threshold() {
    let file = PredictionFile::from_json(DOCUMENT).unwrap();
    let image = RgbImage::new(4, 4);

    let all = file.infer(&image, 0.0).unwrap();
    assert_eq!(all.len(), 2);

    let confident = file.infer(&image, 0.25).unwrap();
    assert_eq!(confident.len(), 1);
    assert_eq!(confident[0].score, 0.8);
  }

  #[test]
  fn malformed_document_is_a_parse_error() {
    let err = PredictionFile::from_json("{ \"labels\": [] ").unwrap_err();
    assert!(matches!(err, ModelError::ParseError(_)));
  }
}
