// 该文件是 GMAF Detect （图像目标检测批处理） 项目的一部分。
// src/config.rs - 批处理任务配置
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

pub const DEFAULT_COLLECTION: &str = "collection";
pub const DEFAULT_RESULT: &str = "result.xml";
pub const DEFAULT_BOXES: &str = "boxes";
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// 批处理任务配置，在构造任务时传入
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
  /// 图像集合目录
  pub collection: PathBuf,
  /// XML 结果文件
  pub result: PathBuf,
  /// 带边界框图像的输出目录
  pub boxes: PathBuf,
  /// 是否保存带边界框的图像
  pub save_boxes: bool,
  /// 单张图像失败时跳过而不是中止
  pub keep_going: bool,
}

impl Default for BatchConfig {
  fn default() -> Self {
    Self {
      collection: PathBuf::from(DEFAULT_COLLECTION),
      result: PathBuf::from(DEFAULT_RESULT),
      boxes: PathBuf::from(DEFAULT_BOXES),
      save_boxes: true,
      keep_going: false,
    }
  }
}

impl BatchConfig {
  pub fn with_collection(mut self, collection: impl AsRef<Path>) -> Self {
    self.collection = collection.as_ref().to_path_buf();
    self
  }

  pub fn with_result(mut self, result: impl AsRef<Path>) -> Self {
    self.result = result.as_ref().to_path_buf();
    self
  }

  pub fn with_boxes(mut self, boxes: impl AsRef<Path>) -> Self {
    self.boxes = boxes.as_ref().to_path_buf();
    self
  }

  pub fn with_save_boxes(mut self, save_boxes: bool) -> Self {
    self.save_boxes = save_boxes;
    self
  }

  pub fn with_keep_going(mut self, keep_going: bool) -> Self {
    self.keep_going = keep_going;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults() {
    let config = BatchConfig::default();
    assert_eq!(config.collection, PathBuf::from("collection"));
    assert_eq!(config.result, PathBuf::from("result.xml"));
    assert_eq!(config.boxes, PathBuf::from("boxes"));
    assert!(config.save_boxes);
    assert!(!config.keep_going);
  }

  #[test]
  fn builder_overrides() {
    let config = BatchConfig::default()
      .with_collection("/tmp/pictures")
      .with_result("/tmp/export.xml")
      .with_save_boxes(false);
    assert_eq!(config.collection, PathBuf::from("/tmp/pictures"));
    assert_eq!(config.result, PathBuf::from("/tmp/export.xml"));
    assert!(!config.save_boxes);
  }
}
