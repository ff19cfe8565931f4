// 该文件是 GMAF Detect （图像目标检测批处理） 项目的一部分。
// src/model.rs - 模型
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

use image::RgbImage;
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::{FromUrl, record::Detection};

/// 推理能力：输入一张图像，按推理顺序返回检测结果
pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

impl<M: Model> Model for &M {
  type Input = M::Input;
  type Output = M::Output;
  type Error = M::Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    (**self).infer(input)
  }
}

pub trait WithLabel: Sized + std::fmt::Debug {
  fn to_label_str(&self) -> String;
  fn from_label_id(id: u32) -> Self;
}

mod coco;
pub use self::coco::CocoLabel;

#[cfg(feature = "model_yolo26")]
mod yolo26;
#[cfg(feature = "model_yolo26")]
pub use self::yolo26::{Yolo26, Yolo26Builder, Yolo26Error};

#[derive(Error, Debug)]
pub enum ModelError {
  #[error("没有可用的推理后端: {0}")]
  NoBackend(String),
  #[cfg(feature = "model_yolo26")]
  #[error("YOLO26 模型错误: {0}")]
  Yolo26Error(#[from] Yolo26Error),
}

/// 模型加载参数，由 URL 的方案选择后端，例如 `yolo26:///path/model.rknn`
#[derive(Debug, Clone)]
pub struct ModelBuilder {
  url: Url,
  threshold: f32,
}

impl FromUrl for ModelBuilder {
  type Error = ModelError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    #[cfg(feature = "model_yolo26")]
    {
      use crate::FromUrlWithScheme;

      if url.scheme() == Yolo26Builder::SCHEME {
        return Ok(ModelBuilder {
          url: url.clone(),
          threshold: crate::config::DEFAULT_THRESHOLD,
        });
      }
    }

    error!("不支持的模型方案: {}", url.scheme());
    Err(ModelError::NoBackend(url.to_string()))
  }
}

impl ModelBuilder {
  pub fn threshold(mut self, threshold: f32) -> Self {
    self.threshold = threshold;
    self
  }

  /// 加载模型；失败时返回错误，不会留下未初始化的推理器
  pub fn build(self) -> Result<ModelWrapper, ModelError> {
    info!("加载模型: {} (阈值 {})", self.url, self.threshold);
    #[cfg(feature = "model_yolo26")]
    {
      let model = Yolo26Builder::from_url(&self.url)?
        .threshold(self.threshold)
        .build()?;
      Ok(ModelWrapper::Yolo26(model))
    }
    #[cfg(not(feature = "model_yolo26"))]
    {
      Err(ModelError::NoBackend(self.url.to_string()))
    }
  }
}

pub enum ModelWrapper {
  #[cfg(feature = "model_yolo26")]
  Yolo26(Yolo26),
}

impl Model for ModelWrapper {
  type Input = RgbImage;
  type Output = Vec<Detection>;
  type Error = ModelError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    #[cfg(not(feature = "model_yolo26"))]
    let _ = input;
    match *self {
      #[cfg(feature = "model_yolo26")]
      ModelWrapper::Yolo26(ref model) => model.infer(input).map_err(ModelError::from),
    }
  }
}
