// 该文件是 GMAF Detect （图像目标检测批处理） 项目的一部分。
// src/input.rs - 图像集合输入
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

use std::path::PathBuf;

use image::RgbImage;
use thiserror::Error;

mod collection;
pub use self::collection::CollectionInput;

#[derive(Error, Debug)]
pub enum InputError {
  #[error("找不到图像集合目录: {}", .0.display())]
  CollectionNotFound(PathBuf),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像解码错误 {}: {}", .0.display(), .1)]
  DecodeError(PathBuf, image::ImageError),
}

/// 从集合中读取的一张图像
#[derive(Debug, Clone)]
pub struct ImageFrame {
  /// 文件名（不含目录）
  pub filename: String,
  pub path: PathBuf,
  pub image: RgbImage,
}

impl ImageFrame {
  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }
}
