// 该文件是 Shitu （识图） 项目的一部分。
// src/main.rs - 项目主程序
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

mod args;

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use shitu::{
  detection::{AnnotationSpec, process},
  input::ImageSource,
  model::{Inference, PredictionFile},
  output::{encode_jpeg, format_summary, save_annotated},
  scratch::ScratchDir,
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  println!("识图目标检测演示");
  println!("================");
  println!("输入来源: {}", args.input);
  println!("预测文件: {}", args.predictions.display());
  println!("置信度阈值: {}", args.confidence);
  if let Some(filter) = &args.filter {
    println!("类别过滤: {}", filter);
  }
  println!();

  // 调用范围内的临时目录，退出时自动清理
  let scratch = ScratchDir::new().context("无法创建临时目录")?;

  let source = if args.input == "-" {
    let mut data = Vec::new();
    std::io::stdin()
      .read_to_end(&mut data)
      .context("无法从标准输入读取图片")?;
    ImageSource::InMemoryBytes {
      data,
      name: args.name.clone(),
    }
  } else {
    ImageSource::FilePath(args.input.clone().into())
  };

  if let Some(path) = source.persist_to(&scratch)? {
    info!("上传字节已保留: {}", path.display());
  }

  let decoded = source.decode().context("无法读取输入图片")?;
  println!(
    "图片: {} ({}x{})",
    decoded.file_name,
    decoded.image.width(),
    decoded.image.height()
  );

  let model = PredictionFile::load(&args.predictions).context("无法加载预测文件")?;
  let raw = model.infer(&decoded.image, args.confidence)?;
  info!("外部推理返回 {} 条原始预测", raw.len());

  let spec = AnnotationSpec::new(args.confidence, args.filter.clone(), args.color);
  let (detections, annotated) = process(&decoded.image, &raw, model.class_names(), &spec)?;

  println!();
  println!("{}", format_summary(&detections));
  println!();

  let jpeg = encode_jpeg(&annotated)?;
  let path = save_annotated(&args.output, &decoded.file_name, &jpeg)?;
  println!("输出文件: {}", path.display());

  Ok(())
}
