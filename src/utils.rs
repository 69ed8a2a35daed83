// 该文件是 Shitu （识图） 项目的一部分。
// src/utils.rs - 工具函数
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

/// 将 #rrggbb 十六进制颜色转换为 RGB 三元组
pub fn parse_hex_color(hex: &str) -> Result<[u8; 3], String> {
  let digits = hex.trim_start_matches('#');
  if digits.len() != 6 || !digits.is_ascii() {
    return Err(format!("无效的颜色值: {}", hex));
  }

  let channel = |range: std::ops::Range<usize>| {
    u8::from_str_radix(&digits[range], 16).map_err(|_| format!("无效的颜色值: {}", hex))
  };

  Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}
