// 该文件是 GMAF Detect （图像目标检测批处理） 项目的一部分。
// src/output/report.rs - XML 结果文件
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
use tracing::info;

use crate::{gmaf::encode_collection, record::DetectionRecord};

#[derive(Error, Debug)]
pub enum ReportError {
  #[error("写入结果文件 {} 失败: {}", .0.display(), .1)]
  WriteError(std::path::PathBuf, std::io::Error),
}

/// 以 UTF-8 写出整个 GMAF 集合
pub fn write_report(path: &Path, records: &[DetectionRecord]) -> Result<(), ReportError> {
  info!("导出 XML 格式结果到文件: {}", path.display());
  let xml = encode_collection(records);

  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .map_err(|e| ReportError::WriteError(path.to_path_buf(), e))?;
  }

  std::fs::write(path, xml).map_err(|e| ReportError::WriteError(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn writes_collection_with_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/result.xml");
    let record = DetectionRecord::new("a.png", 2, 2, Vec::new(), None).unwrap();

    write_report(&path, std::slice::from_ref(&record)).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, encode_collection(&[record]));
    assert!(written.ends_with("</gmaf-collection>\n"));
  }
}
