// 该文件是 Shitu （识图） 项目的一部分。
// src/detection.rs - 检测结果后处理与标注
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use image::RgbImage;
use thiserror::Error;
use tracing::debug;

use crate::{
  model::{ClassNames, RawPrediction},
  output::draw::Annotator,
};

/// 单个检测结果
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
  /// 类别名称
  pub label: String,
  /// 置信度（报告值保留两位小数）
  pub confidence: f32,
  /// 边界框 [x_min, y_min, x_max, y_max]，像素坐标
  pub bbox: [i32; 4],
}

/// 标注参数
#[derive(Debug, Clone)]
pub struct AnnotationSpec {
  /// 置信度阈值（含下界）
  pub confidence: f32,
  /// 类别过滤（不区分大小写的精确匹配，空值表示全部接受）
  pub filter: Option<String>,
  /// 边界框颜色
  pub color: [u8; 3],
}

impl AnnotationSpec {
  pub fn new(confidence: f32, filter: Option<String>, color: [u8; 3]) -> Self {
    Self {
      confidence,
      filter,
      color,
    }
  }

  /// 生效的类别过滤；空字符串视为未设置
  pub fn class_filter(&self) -> Option<&str> {
    self.filter.as_deref().filter(|f| !f.is_empty())
  }
}

#[derive(Error, Debug)]
pub enum ProcessError {
  #[error("模型输出无效: 未知类别索引 {0}")]
  InvalidModelOutput(u32),
}

/// 对外部推理的原始输出做过滤，并在输入图像的副本上绘制标注。
///
/// 输入图像不会被修改。返回过滤后的检测列表（保持推理输出顺序，
/// 不按置信度重排）以及标注完成的图像副本；相同输入总是产生
/// 逐字节相同的输出。
pub fn process(
  image: &RgbImage,
  predictions: &[RawPrediction],
  class_names: &ClassNames,
  spec: &AnnotationSpec,
) -> Result<(Vec<Detection>, RgbImage), ProcessError> {
  let mut detections = Vec::new();

  for pred in predictions {
    // 每个类别索引都必须可解析，与阈值过滤无关
    let label = class_names
      .get(pred.class_id)
      .ok_or(ProcessError::InvalidModelOutput(pred.class_id))?;

    // 阈值判断使用未舍入的原始置信度
    if pred.score < spec.confidence {
      continue;
    }

    if let Some(filter) = spec.class_filter()
      && filter.to_lowercase() != label.to_lowercase()
    {
      continue;
    }

    // 坐标向零截断，不做四舍五入
    detections.push(Detection {
      label: label.to_string(),
      confidence: round_confidence(pred.score),
      bbox: [
        pred.bbox[0] as i32,
        pred.bbox[1] as i32,
        pred.bbox[2] as i32,
        pred.bbox[3] as i32,
      ],
    });
  }

  debug!(
    "过滤后保留 {} / {} 个检测",
    detections.len(),
    predictions.len()
  );

  let mut annotated = image.clone();
  let annotator = Annotator::default();
  annotator.draw_detections(&mut annotated, &detections, spec.color);

  Ok((detections, annotated))
}

/// 报告用置信度保留两位小数
fn round_confidence(score: f32) -> f32 {
  (score * 100.0).round() / 100.0
}
