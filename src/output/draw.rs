// 该文件是 Shitu （识图） 项目的一部分。
// src/output/draw.rs - 目标检测结果可视化
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::detection::Detection;

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 20.0;
const LABEL_BG_PADDING: i32 = 10;
const LABEL_TEXT_RAISE: i32 = 5;
const BOX_STROKE_WIDTH: i32 = 2;
const LABEL_TEXT_COLOR: [u8; 3] = [255, 255, 255]; // 白色文本

/// 检测结果标注工具
pub struct Annotator {
  font: FontArc,
  font_scale: PxScale,
  stroke_width: i32,
}

impl Default for Annotator {
  fn default() -> Self {
    let font_data = include_bytes!("../../assets/DejaVuSans.ttf"); // default font
    let font = FontArc::try_from_slice(font_data).expect("无法加载嵌入的字体文件");

    Self {
      font,
      font_scale: PxScale::from(LABEL_FONT_SIZE),
      stroke_width: BOX_STROKE_WIDTH,
    }
  }
}

impl Annotator {
  /// 按检测列表顺序绘制边界框与标签；重叠的框总是以相同顺序
  /// 叠加，保证输出确定性
  pub fn draw_detections(&self, image: &mut RgbImage, detections: &[Detection], color: [u8; 3]) {
    for detection in detections {
      self.draw_bbox_with_label(image, detection, color);
    }
  }

  fn draw_bbox_with_label(&self, image: &mut RgbImage, detection: &Detection, color: [u8; 3]) {
    let [x_min, y_min, x_max, y_max] = detection.bbox;

    // 绘制边框（加粗为 2 像素）
    for t in 0..self.stroke_width {
      let width = x_max - x_min + 1 - 2 * t;
      let height = y_max - y_min + 1 - 2 * t;
      if width <= 0 || height <= 0 {
        break;
      }

      let rect = Rect::at(x_min + t, y_min + t).of_size(width as u32, height as u32);
      draw_hollow_rect_mut(image, rect, Rgb(color));
    }

    // 创建标签文本
    let label = format!("{}: {:.2}", detection.label, detection.confidence);
    let (text_width, text_height) = text_size(self.font_scale, &self.font, &label);
    let text_width = text_width as i32;
    let text_height = text_height as i32;

    // 标签背景位于边框上沿之上；靠近图像顶部时会越出画面，
    // 由绘制原语裁剪，不做额外钳制
    let bg_height = text_height + LABEL_BG_PADDING;
    let bg_y = y_min - bg_height;

    if text_width > 0 {
      let rect = Rect::at(x_min, bg_y).of_size(text_width as u32, bg_height as u32);
      draw_filled_rect_mut(image, rect, Rgb(color));
    }

    draw_text_mut(
      image,
      Rgb(LABEL_TEXT_COLOR),
      x_min,
      y_min - text_height - LABEL_TEXT_RAISE,
      self.font_scale,
      &self.font,
      &label,
    );
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn detection(bbox: [i32; 4]) -> Detection {
    Detection {
      label: "cat".to_string(),
      confidence: 0.8,
      bbox,
    }
  }

  #[test]
  fn box_corners_are_stroked() {
    let mut image = RgbImage::new(64, 64);
    let annotator = Annotator::default();
    annotator.draw_detections(&mut image, &[detection([30, 40, 50, 60])], [0, 0, 255]);

    assert_eq!(image.get_pixel(30, 40), &Rgb([0, 0, 255]));
    assert_eq!(image.get_pixel(50, 40), &Rgb([0, 0, 255]));
    assert_eq!(image.get_pixel(30, 60), &Rgb([0, 0, 255]));
    assert_eq!(image.get_pixel(50, 60), &Rgb([0, 0, 255]));
    // 第二圈描边
    assert_eq!(image.get_pixel(31, 41), &Rgb([0, 0, 255]));
  }

  #[test]
  fn label_near_top_edge_is_clipped_not_panicking() {
    let mut image = RgbImage::new(64, 64);
    let annotator = Annotator::default();
    annotator.draw_detections(&mut image, &[detection([2, 0, 20, 20])], [255, 0, 0]);

    assert_eq!(image.get_pixel(2, 0), &Rgb([255, 0, 0]));
  }

  #[test]
  fn degenerate_box_draws_single_pixel() {
    let mut image = RgbImage::new(64, 64);
    let annotator = Annotator::default();
    annotator.draw_detections(&mut image, &[detection([40, 40, 40, 40])], [0, 255, 0]);

    assert_eq!(image.get_pixel(40, 40), &Rgb([0, 255, 0]));
  }
}
