// 该文件是 Shitu （识图） 项目的一部分。
// src/scratch.rs - 调用范围内的临时目录
//
// 本程序遵循 GNU Affero 通用公共许可证（AGPL）许可协议。
// 本程序的发布旨在提供实用价值，但不作任何形式的担保，
// 包括但不限于对适销性或特定用途适用性的默示担保。
// 更多详情请参阅 GNU 通用公共许可证。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, ETVP

use std::{
  path::{Path, PathBuf},
  sync::atomic::{AtomicU32, Ordering},
};

use chrono::Utc;
use tracing::{debug, warn};

static SCRATCH_COUNTER: AtomicU32 = AtomicU32::new(0);

/// 单次调用范围内的临时目录。由调用方显式创建并传递，
/// 离开作用域时连同内容一并清理，不依赖进程级全局状态。
#[derive(Debug)]
pub struct ScratchDir {
  path: PathBuf,
}

impl ScratchDir {
  pub fn new() -> Result<Self, std::io::Error> {
    let id = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
    let path = std::env::temp_dir().join(format!(
      "shitu-{}-{}-{:04X}",
      std::process::id(),
      Utc::now().format("%Y%m%d-%H%M%S"),
      id
    ));
    std::fs::create_dir_all(&path)?;
    debug!("创建临时目录: {}", path.display());

    Ok(Self { path })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// 在临时目录中写入一个文件并返回其路径
  pub fn write_file(&self, name: &str, data: &[u8]) -> Result<PathBuf, std::io::Error> {
    let path = self.path.join(name);
    std::fs::write(&path, data)?;
    Ok(path)
  }
}

impl Drop for ScratchDir {
  fn drop(&mut self) {
    if let Err(e) = std::fs::remove_dir_all(&self.path) {
      warn!("清理临时目录失败: {}: {}", self.path.display(), e);
    }
  }
}
