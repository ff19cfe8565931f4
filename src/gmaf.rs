// 该文件是 GMAF Detect （图像目标检测批处理） 项目的一部分。
// src/gmaf.rs - GMAF XML 编码
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

//! 将检测记录编码为 GMAF 集合文档。
//!
//! 编码是纯函数：相同的记录总是得到相同的字节，时间戳在记录构造时已固定。

use chrono::SecondsFormat;

use crate::record::{Detection, DetectionRecord};

const COLLECTION_OPEN: &str = "<gmaf-collection xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" xsi:noNamespaceSchemaLocation=\"gmaf_schema.xsd\">\n";
const COLLECTION_CLOSE: &str = "</gmaf-collection>\n";

/// 转义 XML 文本中的特殊字符
fn escape_text(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&apos;"),
      _ => escaped.push(ch),
    }
  }
  escaped
}

/// 编码单个目标，边界框按图像尺寸换算为像素
pub fn encode_detection(detection: &Detection, image_width: u32, image_height: u32) -> String {
  let [x, y, width, height] = detection
    .bounding_box()
    .to_pixels(image_width, image_height);

  let mut xml = String::new();
  xml.push_str("      <object>\n");
  xml.push_str(&format!(
    "        <term>{}</term>\n",
    escape_text(detection.class_name())
  ));
  xml.push_str("        <bounding-box>\n");
  xml.push_str(&format!("          <x>{}</x>\n", x));
  xml.push_str(&format!("          <y>{}</y>\n", y));
  xml.push_str(&format!("          <width>{}</width>\n", width));
  xml.push_str(&format!("          <height>{}</height>\n", height));
  xml.push_str("        </bounding-box>\n");
  // Debug 格式保证输出带小数点的最短表示，如 0.5、1.0
  xml.push_str(&format!(
    "        <probability>{:?}</probability>\n",
    detection.probability()
  ));
  xml.push_str("      </object>\n");
  xml
}

/// 编码一张图像的检测记录
pub fn encode_record(record: &DetectionRecord) -> String {
  let mut xml = String::new();
  xml.push_str("  <gmaf-data>\n");
  xml.push_str(&format!(
    "    <file>{}</file>\n",
    escape_text(record.filename())
  ));
  xml.push_str(&format!(
    "    <date>{}</date>\n",
    record.timestamp().to_rfc3339_opts(SecondsFormat::Secs, false)
  ));
  xml.push_str("    <objects>\n");
  for detection in record.detections() {
    xml.push_str(&encode_detection(
      detection,
      record.image_width(),
      record.image_height(),
    ));
  }
  xml.push_str("    </objects>\n");
  xml.push_str("  </gmaf-data>\n");
  xml
}

/// 编码整个集合，记录顺序与输入一致
pub fn encode_collection(records: &[DetectionRecord]) -> String {
  let mut xml = String::from(COLLECTION_OPEN);
  for record in records {
    xml.push_str(&encode_record(record));
  }
  xml.push_str(COLLECTION_CLOSE);
  xml
}

#[cfg(test)]
mod tests {
  use chrono::{Local, TimeZone};

  use super::*;
  use crate::record::BoundingBox;

  fn cat() -> Detection {
    Detection::new("cat", 0.5, BoundingBox::new(0.1, 0.2, 0.3, 0.4)).unwrap()
  }

  fn record(filename: &str, detections: Vec<Detection>) -> DetectionRecord {
    let timestamp = Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
    DetectionRecord::with_timestamp(filename, 100, 200, detections, None, timestamp).unwrap()
  }

  #[test]
  fn detection_block() {
    let expected = concat!(
      "      <object>\n",
      "        <term>cat</term>\n",
      "        <bounding-box>\n",
      "          <x>10</x>\n",
      "          <y>40</y>\n",
      "          <width>30</width>\n",
      "          <height>80</height>\n",
      "        </bounding-box>\n",
      "        <probability>0.5</probability>\n",
      "      </object>\n",
    );
    assert_eq!(encode_detection(&cat(), 100, 200), expected);
  }

  #[test]
  fn probability_keeps_raw_value() {
    let whole = Detection::new("dog", 1.0, BoundingBox::new(0.0, 0.0, 1.0, 1.0)).unwrap();
    assert!(encode_detection(&whole, 10, 10).contains("<probability>1.0</probability>"));

    let fine = Detection::new("dog", 0.875, BoundingBox::new(0.0, 0.0, 1.0, 1.0)).unwrap();
    assert!(encode_detection(&fine, 10, 10).contains("<probability>0.875</probability>"));
  }

  #[test]
  fn empty_objects_still_emitted() {
    let xml = encode_record(&record("white.png", Vec::new()));
    assert!(xml.contains("    <objects>\n    </objects>\n"));
    assert!(!xml.contains("<object>"));
  }

  #[test]
  fn record_block() {
    let rec = record("img001.png", vec![cat()]);
    let date = rec.timestamp().to_rfc3339_opts(SecondsFormat::Secs, false);
    let expected = format!(
      "  <gmaf-data>\n    <file>img001.png</file>\n    <date>{}</date>\n    <objects>\n{}    </objects>\n  </gmaf-data>\n",
      date,
      encode_detection(&cat(), 100, 200)
    );
    assert_eq!(encode_record(&rec), expected);
  }

  #[test]
  fn collection_wraps_records_in_order() {
    let records = vec![
      record("a.png", Vec::new()),
      record("b.png", vec![cat()]),
      record("c.png", Vec::new()),
    ];
    let xml = encode_collection(&records);

    assert!(xml.starts_with(COLLECTION_OPEN));
    assert!(xml.ends_with(COLLECTION_CLOSE));
    assert_eq!(xml.matches("<gmaf-collection ").count(), 1);
    assert_eq!(xml.matches("<gmaf-data>").count(), 3);

    let a = xml.find("<file>a.png</file>").unwrap();
    let b = xml.find("<file>b.png</file>").unwrap();
    let c = xml.find("<file>c.png</file>").unwrap();
    assert!(a < b && b < c);
  }

  #[test]
  fn empty_collection() {
    assert_eq!(
      encode_collection(&[]),
      format!("{}{}", COLLECTION_OPEN, COLLECTION_CLOSE)
    );
  }

  #[test]
  fn encoding_is_repeatable() {
    let rec = record("img001.png", vec![cat()]);
    assert_eq!(encode_record(&rec), encode_record(&rec));

    let live = DetectionRecord::new("now.png", 10, 10, vec![cat()], None).unwrap();
    assert_eq!(encode_record(&live), encode_record(&live));
  }

  #[test]
  fn text_is_escaped() {
    let odd = Detection::new("a<b>&\"c'", 0.5, BoundingBox::new(0.0, 0.0, 0.0, 0.0)).unwrap();
    let xml = encode_detection(&odd, 1, 1);
    assert!(xml.contains("<term>a&lt;b&gt;&amp;&quot;c&apos;</term>"));
  }
}
