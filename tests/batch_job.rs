// 该文件是 GMAF Detect （图像目标检测批处理） 项目的一部分。
// tests/batch_job.rs - 批处理作业集成测试
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

use gmaf_detect::{
  config::BatchConfig,
  input::InputError,
  job::{BatchError, BatchJob},
  model::Model,
  record::{BoundingBox, Detection},
};
use image::{Rgb, RgbImage};

#[derive(Debug, thiserror::Error)]
#[error("模拟推理失败")]
struct StubError;

/// 不论输入如何，总是检测到一只猫
struct CatModel;

impl Model for CatModel {
  type Input = RgbImage;
  type Output = Vec<Detection>;
  type Error = StubError;

  fn infer(&self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
    Ok(vec![
      Detection::new("cat", 0.5, BoundingBox::new(0.1, 0.2, 0.3, 0.4)).unwrap(),
    ])
  }
}

/// 纯白图像上什么都检测不到
struct BlankModel;

impl Model for BlankModel {
  type Input = RgbImage;
  type Output = Vec<Detection>;
  type Error = StubError;

  fn infer(&self, _input: &Self::Input) -> Result<Self::Output, Self::Error> {
    Ok(Vec::new())
  }
}

fn white_image(path: &Path, width: u32, height: u32) {
  RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
    .save(path)
    .unwrap();
}

#[test]
fn collection_not_found() {
  let dir = tempfile::tempdir().unwrap();
  let result = dir.path().join("result.xml");
  let config = BatchConfig::default()
    .with_collection(dir.path().join("this/path/does/not/exist"))
    .with_result(&result)
    .with_save_boxes(false);

  let err = BatchJob::new(config).run(CatModel).unwrap_err();
  assert!(matches!(
    err,
    BatchError::Input(InputError::CollectionNotFound(_))
  ));
  assert!(err.to_string().starts_with("找不到图像集合目录"));
  assert!(!result.exists());
}

#[test]
fn white_image_with_stub_model() {
  let dir = tempfile::tempdir().unwrap();
  let collection = dir.path().join("collection1");
  std::fs::create_dir(&collection).unwrap();
  white_image(&collection.join("img001.png"), 100, 200);

  let result = dir.path().join("result.xml");
  let config = BatchConfig::default()
    .with_collection(&collection)
    .with_result(&result)
    .with_save_boxes(false);

  let summary = BatchJob::new(config).run(CatModel).unwrap();
  assert_eq!(summary.records.len(), 1);
  assert_eq!(summary.records[0].detections().len(), 1);
  assert_eq!(summary.report, result);
  assert!(summary.average_predict_time.is_some());

  let xml = std::fs::read_to_string(&result).unwrap();
  assert!(xml.starts_with("<gmaf-collection xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" xsi:noNamespaceSchemaLocation=\"gmaf_schema.xsd\">\n"));
  assert!(xml.contains("    <file>img001.png</file>\n"));
  assert!(xml.contains("          <x>10</x>\n"));
  assert!(xml.contains("          <y>40</y>\n"));
  assert!(xml.contains("          <width>30</width>\n"));
  assert!(xml.contains("          <height>80</height>\n"));
  assert!(xml.contains("        <probability>0.5</probability>\n"));
  assert!(xml.ends_with("</gmaf-collection>\n"));
  assert!(!dir.path().join("boxes").exists());
}

#[test]
fn records_in_file_name_order() {
  let dir = tempfile::tempdir().unwrap();
  let collection = dir.path().join("collection");
  std::fs::create_dir(&collection).unwrap();
  white_image(&collection.join("c.png"), 8, 8);
  white_image(&collection.join("a.png"), 8, 8);
  white_image(&collection.join("b.png"), 8, 8);

  let config = BatchConfig::default()
    .with_collection(&collection)
    .with_result(dir.path().join("result.xml"))
    .with_save_boxes(false);

  let summary = BatchJob::new(config).run(BlankModel).unwrap();
  let names: Vec<&str> = summary.records.iter().map(|r| r.filename()).collect();
  assert_eq!(names, ["a.png", "b.png", "c.png"]);

  let xml = std::fs::read_to_string(&summary.report).unwrap();
  assert_eq!(xml.matches("<gmaf-data>").count(), 3);
  assert_eq!(xml.matches("    <objects>\n    </objects>\n").count(), 3);
}

#[cfg(feature = "save_image_file")]
#[test]
fn box_images_are_saved() {
  let dir = tempfile::tempdir().unwrap();
  let collection = dir.path().join("collection");
  std::fs::create_dir(&collection).unwrap();
  white_image(&collection.join("img001.png"), 100, 200);

  let boxes = dir.path().join("boxes");
  let config = BatchConfig::default()
    .with_collection(&collection)
    .with_result(dir.path().join("result.xml"))
    .with_boxes(&boxes);

  BatchJob::new(config).run(&CatModel).unwrap();
  assert!(boxes.join("img001.png.boxes.png").is_file());
}

#[test]
fn unreadable_file_aborts_or_is_skipped() {
  let dir = tempfile::tempdir().unwrap();
  let collection = dir.path().join("collection");
  std::fs::create_dir(&collection).unwrap();
  white_image(&collection.join("a.png"), 8, 8);
  std::fs::write(collection.join("b.txt"), b"not an image").unwrap();

  let result = dir.path().join("result.xml");
  let config = BatchConfig::default()
    .with_collection(&collection)
    .with_result(&result)
    .with_save_boxes(false);

  assert!(matches!(
    BatchJob::new(config.clone()).run(BlankModel),
    Err(BatchError::Task(_))
  ));
  assert!(!result.exists());

  let summary = BatchJob::new(config.with_keep_going(true))
    .run(BlankModel)
    .unwrap();
  assert_eq!(summary.records.len(), 1);
  assert!(result.exists());
}
