// 该文件是 GMAF Detect （图像目标检测批处理） 项目的一部分。
// src/output/save_box_image.rs - 保存带边界框的图像副本
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

use std::path::{Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;
use tracing::info;

use crate::{
  input::ImageFrame,
  output::{Render, draw::Draw},
  record::Detection,
};

const BOX_IMAGE_SUFFIX: &str = ".boxes.png";

#[derive(Error, Debug)]
pub enum SaveBoxImageError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
}

/// 将检测框画在原图副本上，以 `{文件名}.boxes.png` 保存到指定目录
pub struct SaveBoxImageOutput {
  directory: PathBuf,
  draw: Draw,
}

impl SaveBoxImageOutput {
  pub fn new(directory: impl AsRef<Path>) -> Self {
    Self {
      directory: directory.as_ref().to_path_buf(),
      draw: Draw::default(),
    }
  }

  pub fn box_image_path(&self, filename: &str) -> PathBuf {
    self
      .directory
      .join(format!("{}{}", filename, BOX_IMAGE_SUFFIX))
  }
}

impl Render<ImageFrame, [Detection]> for SaveBoxImageOutput {
  type Error = SaveBoxImageError;

  fn render_result(&self, frame: &ImageFrame, result: &[Detection]) -> Result<(), Self::Error> {
    if !self.directory.as_os_str().is_empty() {
      std::fs::create_dir_all(&self.directory)?;
    }

    let image = self.draw.draw_detections(&frame.image, result);
    let path = self.box_image_path(&frame.filename);
    image.save_with_format(&path, ImageFormat::Png)?;

    info!("检测结果图像已保存: {}", path.display());
    Ok(())
  }
}
