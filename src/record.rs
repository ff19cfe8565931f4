// 该文件是 GMAF Detect （图像目标检测批处理） 项目的一部分。
// src/record.rs - 检测结果数据模型
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

use std::time::Duration;

use chrono::{DateTime, Local};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum RecordError {
  #[error("图像尺寸必须大于零: {0}x{1}")]
  ZeroDimension(u32, u32),
  #[error("边界框分量不能为负数: {0:?}")]
  NegativeBoundingBox(BoundingBox),
  #[error("边界框分量必须是 [0, 1] 内的有限值: {0:?}")]
  BoundingBoxOutOfRange(BoundingBox),
  #[error("置信度超出 [0, 1] 范围: {0}")]
  ProbabilityOutOfRange(f64),
}

/// 归一化边界框，`x, y` 为左上角，所有分量相对于图像宽高
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
  pub x: f64,
  pub y: f64,
  pub width: f64,
  pub height: f64,
}

impl BoundingBox {
  pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
    Self {
      x,
      y,
      width,
      height,
    }
  }

  /// 由 [x_min, y_min, x_max, y_max] 形式的归一化坐标构造
  pub fn from_corners(corners: [f32; 4]) -> Self {
    let [x_min, y_min, x_max, y_max] = corners.map(f64::from);
    Self::new(x_min, y_min, x_max - x_min, y_max - y_min)
  }

  fn validate(&self) -> Result<(), RecordError> {
    let values = [self.x, self.y, self.width, self.height];
    if values.iter().any(|v| *v < 0.0) {
      return Err(RecordError::NegativeBoundingBox(*self));
    }
    if !values.iter().all(|v| v.is_finite() && *v <= 1.0) {
      return Err(RecordError::BoundingBoxOutOfRange(*self));
    }
    Ok(())
  }

  /// 换算为像素坐标 (x, y, width, height)，四舍五入（.5 远离零）
  pub fn to_pixels(&self, image_width: u32, image_height: u32) -> [u32; 4] {
    let (w, h) = (f64::from(image_width), f64::from(image_height));
    [
      self.x * w,
      self.y * h,
      self.width * w,
      self.height * h,
    ]
    .map(|v| v.round() as u32)
  }
}

/// 单个检测到的目标
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
  class_name: String,
  probability: f64,
  bounding_box: BoundingBox,
}

impl Detection {
  pub fn new(
    class_name: impl Into<String>,
    probability: f64,
    bounding_box: BoundingBox,
  ) -> Result<Self, RecordError> {
    if !(0.0..=1.0).contains(&probability) {
      return Err(RecordError::ProbabilityOutOfRange(probability));
    }
    bounding_box.validate()?;

    Ok(Self {
      class_name: class_name.into(),
      probability,
      bounding_box,
    })
  }

  pub fn class_name(&self) -> &str {
    &self.class_name
  }

  pub fn probability(&self) -> f64 {
    self.probability
  }

  pub fn bounding_box(&self) -> &BoundingBox {
    &self.bounding_box
  }
}

/// 一张图像的检测记录，构造后不可修改
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionRecord {
  filename: String,
  image_width: u32,
  image_height: u32,
  timestamp: DateTime<Local>,
  predict_duration: Option<Duration>,
  detections: Vec<Detection>,
}

impl DetectionRecord {
  /// 以当前时间作为记录时间戳
  pub fn new(
    filename: impl Into<String>,
    image_width: u32,
    image_height: u32,
    detections: Vec<Detection>,
    predict_duration: Option<Duration>,
  ) -> Result<Self, RecordError> {
    Self::with_timestamp(
      filename,
      image_width,
      image_height,
      detections,
      predict_duration,
      Local::now(),
    )
  }

  pub fn with_timestamp(
    filename: impl Into<String>,
    image_width: u32,
    image_height: u32,
    detections: Vec<Detection>,
    predict_duration: Option<Duration>,
    timestamp: DateTime<Local>,
  ) -> Result<Self, RecordError> {
    if image_width == 0 || image_height == 0 {
      return Err(RecordError::ZeroDimension(image_width, image_height));
    }

    Ok(Self {
      filename: filename.into(),
      image_width,
      image_height,
      timestamp,
      predict_duration,
      detections,
    })
  }

  pub fn filename(&self) -> &str {
    &self.filename
  }

  pub fn image_width(&self) -> u32 {
    self.image_width
  }

  pub fn image_height(&self) -> u32 {
    self.image_height
  }

  pub fn timestamp(&self) -> &DateTime<Local> {
    &self.timestamp
  }

  pub fn predict_duration(&self) -> Option<Duration> {
    self.predict_duration
  }

  pub fn predict_duration_ms(&self) -> Option<u128> {
    self.predict_duration.map(|d| d.as_millis())
  }

  pub fn detections(&self) -> &[Detection] {
    &self.detections
  }
}
