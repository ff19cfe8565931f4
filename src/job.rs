// 该文件是 GMAF Detect （图像目标检测批处理） 项目的一部分。
// src/job.rs - 批处理作业
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
use std::time::Duration;

use image::RgbImage;
use thiserror::Error;
use tracing::info;

use crate::{
  config::BatchConfig,
  input::{CollectionInput, InputError},
  model::Model,
  output::{OutputError, OutputWrapper, ReportError, write_report},
  record::{Detection, DetectionRecord},
  task::{BatchTask, Task, TaskError, average_predict_time},
};

#[derive(Error, Debug)]
pub enum BatchError {
  #[error(transparent)]
  Input(#[from] InputError),
  #[error(transparent)]
  Task(#[from] TaskError),
  #[error(transparent)]
  Output(#[from] OutputError),
  #[error(transparent)]
  Report(#[from] ReportError),
}

#[derive(Debug)]
pub struct BatchSummary {
  pub records: Vec<DetectionRecord>,
  pub report: PathBuf,
  pub average_predict_time: Option<Duration>,
}

/// 读取集合目录中的全部图像，检测目标并导出 XML 结果。
///
/// 结果文件只在整批处理成功后写出。
pub struct BatchJob {
  config: BatchConfig,
}

impl BatchJob {
  pub fn new(config: BatchConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &BatchConfig {
    &self.config
  }

  pub fn run<M>(&self, model: M) -> Result<BatchSummary, BatchError>
  where
    M: Model<Input = RgbImage, Output = Vec<Detection>>,
    M::Error: std::error::Error + Send + Sync + 'static,
  {
    info!("目标检测批处理作业开始");
    let input = CollectionInput::open(&self.config.collection)?;
    let output = OutputWrapper::with(self.config.save_boxes, &self.config.boxes)?;

    let records = BatchTask::default()
      .with_keep_going(self.config.keep_going)
      .run_task(input, model, output)?;

    let average = average_predict_time(&records);
    match average {
      Some(avg) => info!("平均推理时间: {:.2?}", avg),
      None => info!("没有可统计的推理时间"),
    }

    write_report(&self.config.result, &records)?;
    info!("目标检测批处理作业结束");

    Ok(BatchSummary {
      records,
      report: self.config.result.clone(),
      average_predict_time: average,
    })
  }
}
