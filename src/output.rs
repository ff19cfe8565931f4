// 该文件是 GMAF Detect （图像目标检测批处理） 项目的一部分。
// src/output.rs - 输出定义
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

use std::path::Path;

use thiserror::Error;

use crate::{input::ImageFrame, record::Detection};

pub trait Render<Frame, Output: ?Sized>: Sized {
  type Error;
  fn render_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error>;
}

impl<Frame, Output: ?Sized, R: Render<Frame, Output>> Render<Frame, Output> for &R {
  type Error = R::Error;

  fn render_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error> {
    (**self).render_result(frame, result)
  }
}

#[cfg(feature = "save_image_file")]
pub mod draw;

#[cfg(feature = "save_image_file")]
mod save_box_image;
#[cfg(feature = "save_image_file")]
pub use self::save_box_image::{SaveBoxImageError, SaveBoxImageOutput};

mod report;
pub use self::report::{ReportError, write_report};

#[derive(Error, Debug)]
pub enum OutputError {
  #[cfg(feature = "save_image_file")]
  #[error("保存边界框图像错误: {0}")]
  SaveBoxImageError(#[from] SaveBoxImageError),
  #[error("未启用边界框图像输出")]
  Unsupported,
}

/// 单张图像的渲染输出
pub enum OutputWrapper {
  #[cfg(feature = "save_image_file")]
  SaveBoxImage(SaveBoxImageOutput),
  Discard,
}

impl OutputWrapper {
  /// 根据开关选择输出方式
  pub fn with(save_boxes: bool, directory: &Path) -> Result<Self, OutputError> {
    if !save_boxes {
      return Ok(OutputWrapper::Discard);
    }

    #[cfg(feature = "save_image_file")]
    {
      Ok(OutputWrapper::SaveBoxImage(SaveBoxImageOutput::new(
        directory,
      )))
    }
    #[cfg(not(feature = "save_image_file"))]
    {
      tracing::error!("未编译 save_image_file 特性，无法保存到 {}", directory.display());
      Err(OutputError::Unsupported)
    }
  }
}

impl Render<ImageFrame, [Detection]> for OutputWrapper {
  type Error = OutputError;

  fn render_result(&self, frame: &ImageFrame, result: &[Detection]) -> Result<(), Self::Error> {
    match self {
      #[cfg(feature = "save_image_file")]
      OutputWrapper::SaveBoxImage(output) => output
        .render_result(frame, result)
        .map_err(OutputError::from),
      OutputWrapper::Discard => Ok(()),
    }
  }
}
