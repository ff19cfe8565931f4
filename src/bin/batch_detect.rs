// 该文件是 GMAF Detect （图像目标检测批处理） 项目的一部分。
// src/bin/batch_detect.rs - 批量目标检测主程序
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

use anyhow::Result;
use clap::Parser;
use tracing::info;
use url::Url;

use gmaf_detect::{
  FromUrl,
  config::{BatchConfig, DEFAULT_BOXES, DEFAULT_COLLECTION, DEFAULT_RESULT, DEFAULT_THRESHOLD},
  job::BatchJob,
  model::ModelBuilder,
};

/// 批量目标检测：读取目录中的全部图像，结果导出为 GMAF XML
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型路径，例如 yolo26:///path/to/model.rknn（需以 model_yolo26 特性编译）
  #[arg(long, value_name = "MODEL")]
  pub model: Url,

  /// 图像集合目录
  #[arg(long, default_value = DEFAULT_COLLECTION, value_name = "DIR")]
  pub collection: PathBuf,

  /// XML 结果文件
  #[arg(long, default_value = DEFAULT_RESULT, value_name = "FILE")]
  pub result: PathBuf,

  /// 带边界框图像的输出目录
  #[arg(long, default_value = DEFAULT_BOXES, value_name = "DIR")]
  pub boxes: PathBuf,

  /// 不保存带边界框的图像
  #[arg(long)]
  pub no_boxes: bool,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value_t = DEFAULT_THRESHOLD, value_name = "THRESHOLD")]
  pub threshold: f32,

  /// 单张图像失败时跳过，继续处理其余图像
  #[arg(long)]
  pub keep_going: bool,
}

impl From<&Args> for BatchConfig {
  fn from(args: &Args) -> Self {
    BatchConfig::default()
      .with_collection(&args.collection)
      .with_result(&args.result)
      .with_boxes(&args.boxes)
      .with_save_boxes(!args.no_boxes)
      .with_keep_going(args.keep_going)
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();
  let config = BatchConfig::from(&args);

  info!("模型路径: {}", args.model);
  info!("图像集合目录: {}", config.collection.display());
  info!("结果文件: {}", config.result.display());
  if config.save_boxes {
    info!("边界框图像目录: {}", config.boxes.display());
  }
  info!("置信度阈值: {}", args.threshold);

  let model = ModelBuilder::from_url(&args.model)?
    .threshold(args.threshold)
    .build()?;

  let summary = BatchJob::new(config).run(model)?;
  info!(
    "处理完成: {} 张图像，结果已写入 {}",
    summary.records.len(),
    summary.report.display()
  );

  Ok(())
}
