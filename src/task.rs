// 该文件是 GMAF Detect （图像目标检测批处理） 项目的一部分。
// src/task.rs - 批量检测任务
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

use std::time::{Duration, Instant};

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
  input::{ImageFrame, InputError},
  model::Model,
  output::Render,
  record::{Detection, DetectionRecord, RecordError},
};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

#[derive(Error, Debug)]
pub enum TaskError {
  #[error(transparent)]
  Input(#[from] InputError),
  #[error("推理失败 ({0}): {1}")]
  Infer(String, #[source] BoxError),
  #[error("渲染失败 ({0}): {1}")]
  Render(String, #[source] BoxError),
  #[error("检测记录无效 ({0}): {1}")]
  Record(String, #[source] RecordError),
}

/// 逐张读取、推理并生成记录；默认遇到错误即中止
#[derive(Default, Debug)]
pub struct BatchTask {
  keep_going: bool,
}

impl BatchTask {
  pub fn with_keep_going(mut self, keep_going: bool) -> Self {
    self.keep_going = keep_going;
    self
  }
}

fn process_frame<M, O>(
  frame: &ImageFrame,
  model: &M,
  output: &O,
) -> Result<DetectionRecord, TaskError>
where
  M: Model<Input = RgbImage, Output = Vec<Detection>>,
  M::Error: std::error::Error + Send + Sync + 'static,
  O: Render<ImageFrame, [Detection]>,
  O::Error: std::error::Error + Send + Sync + 'static,
{
  let now = Instant::now();
  let detections = model
    .infer(&frame.image)
    .map_err(|e| TaskError::Infer(frame.filename.clone(), Box::new(e)))?;
  let elapsed = now.elapsed();
  info!("{}: 推理完成，耗时: {:.2?}", frame.filename, elapsed);

  for det in &detections {
    let bbox = det.bounding_box();
    info!(
      "  - {}: {:.2}% at ({:.3}, {:.3}, {:.3}x{:.3})",
      det.class_name(),
      det.probability() * 100.0,
      bbox.x,
      bbox.y,
      bbox.width,
      bbox.height
    );
  }

  output
    .render_result(frame, &detections)
    .map_err(|e| TaskError::Render(frame.filename.clone(), Box::new(e)))?;

  DetectionRecord::new(
    frame.filename.clone(),
    frame.width(),
    frame.height(),
    detections,
    Some(elapsed),
  )
  .map_err(|e| TaskError::Record(frame.filename.clone(), e))
}

impl<I, M, O> Task<I, M, O> for BatchTask
where
  I: Iterator<Item = Result<ImageFrame, InputError>>,
  M: Model<Input = RgbImage, Output = Vec<Detection>>,
  M::Error: std::error::Error + Send + Sync + 'static,
  O: Render<ImageFrame, [Detection]>,
  O::Error: std::error::Error + Send + Sync + 'static,
{
  type Output = Vec<DetectionRecord>;
  type Error = TaskError;

  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let mut records = Vec::new();

    for (index, frame) in input.enumerate() {
      debug!("处理第 {} 个文件", index + 1);
      let result = frame
        .map_err(TaskError::from)
        .and_then(|frame| process_frame(&frame, &model, &output));

      match result {
        Ok(record) => records.push(record),
        Err(e) if self.keep_going => {
          warn!("跳过第 {} 个文件: {}", index + 1, e);
        }
        Err(e) => {
          error!("第 {} 个文件处理失败，任务中止: {}", index + 1, e);
          return Err(e);
        }
      }
    }

    info!("任务完成，共 {} 条记录", records.len());
    Ok(records)
  }
}

/// 平均推理时间；没有任何记录带耗时则返回 None
pub fn average_predict_time(records: &[DetectionRecord]) -> Option<Duration> {
  let times: Vec<Duration> = records
    .iter()
    .filter_map(DetectionRecord::predict_duration)
    .collect();
  if times.is_empty() {
    return None;
  }
  let count = u32::try_from(times.len()).ok()?;
  Some(times.iter().sum::<Duration>() / count)
}
