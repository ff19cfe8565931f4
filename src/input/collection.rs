// 该文件是 GMAF Detect （图像目标检测批处理） 项目的一部分。
// src/input/collection.rs - 目录图像集合读取
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

use image::ImageReader;
use tracing::{debug, error, info};

use crate::input::{ImageFrame, InputError};

/// 目录中的图像集合，按文件名排序，逐张解码
pub struct CollectionInput {
  directory: PathBuf,
  files: std::vec::IntoIter<(String, PathBuf)>,
}

impl CollectionInput {
  pub fn open(directory: impl AsRef<Path>) -> Result<Self, InputError> {
    let directory = directory.as_ref().to_path_buf();
    info!("读取图像集合目录: {}", directory.display());

    let entries = match std::fs::read_dir(&directory) {
      Ok(entries) => entries,
      Err(e) => {
        error!("无法列出目录 {}: {}", directory.display(), e);
        return Err(InputError::CollectionNotFound(directory));
      }
    };

    let mut files = Vec::new();
    for entry in entries {
      let entry = entry?;
      let path = entry.path();
      if !entry.file_type()?.is_file() {
        debug!("跳过非文件条目: {}", path.display());
        continue;
      }
      let filename = entry.file_name().to_string_lossy().into_owned();
      files.push((filename, path));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    debug!("集合中共有 {} 个文件", files.len());

    Ok(CollectionInput {
      directory,
      files: files.into_iter(),
    })
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }

  fn decode(filename: String, path: PathBuf) -> Result<ImageFrame, InputError> {
    debug!("从文件读取图像: {}", path.display());
    // 解码结束后文件句柄随 reader 一起释放
    let image = ImageReader::open(&path)?
      .with_guessed_format()?
      .decode()
      .map_err(|e| InputError::DecodeError(path.clone(), e))?;

    Ok(ImageFrame {
      filename,
      path,
      image: image.into_rgb8(),
    })
  }
}

impl Iterator for CollectionInput {
  type Item = Result<ImageFrame, InputError>;

  fn next(&mut self) -> Option<Self::Item> {
    self
      .files
      .next()
      .map(|(filename, path)| Self::decode(filename, path))
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    self.files.size_hint()
  }
}
