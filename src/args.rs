// 该文件是 Shitu （识图） 项目的一部分。
// src/args.rs - 项目参数配置
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::path::PathBuf;

use clap::Parser;

use shitu::utils::parse_hex_color;

/// Shitu 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入图片路径（*.jpg, *.jpeg, *.png），使用 "-" 从标准输入读取上传字节
  #[arg(long, value_name = "SOURCE")]
  pub input: String,

  /// 标准输入上传时使用的展示文件名
  #[arg(long, default_value = "upload.jpg", value_name = "NAME")]
  pub name: String,

  /// 外部推理导出的预测文件 (JSON)
  #[arg(long, value_name = "FILE")]
  pub predictions: PathBuf,

  /// 输出目录，标注图像保存为 detected_<原文件名>
  #[arg(long, default_value = ".", value_name = "DIR")]
  pub output: PathBuf,

  /// 置信度阈值 (0.0 - 1.0，含下界)
  #[arg(long, default_value = "0.25", value_name = "THRESHOLD")]
  pub confidence: f32,

  /// 类别过滤（不区分大小写的精确匹配，留空表示全部）
  #[arg(long, value_name = "CLASS")]
  pub filter: Option<String>,

  /// 边界框颜色 (#rrggbb)
  #[arg(long, default_value = "#2e7d32", value_parser = parse_hex_color, value_name = "COLOR")]
  pub color: [u8; 3],
}
