// 该文件是 GMAF Detect （图像目标检测批处理） 项目的一部分。
// src/output/draw.rs - 目标检测结果可视化
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

use image::{Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::record::{BoundingBox, Detection};

const BOX_THICKNESS: u32 = 2;
const BOX_COLOR: [u8; 3] = [0, 0, 255]; // 蓝色

pub struct Draw {
  thickness: u32,
  color: [u8; 3],
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      thickness: BOX_THICKNESS,
      color: BOX_COLOR,
    }
  }
}

impl Draw {
  pub fn with_color(mut self, color: [u8; 3]) -> Self {
    self.color = color;
    self
  }

  // bbox 为归一化的 (x, y, width, height)
  fn draw_bbox(&self, image: &mut RgbImage, bbox: &BoundingBox) {
    let (w, h) = (image.width(), image.height());
    if w == 0 || h == 0 {
      return;
    }
    let [x, y, width, height] = bbox.to_pixels(w, h);

    let x_min = x.min(w - 1) as i32;
    let y_min = y.min(h - 1) as i32;
    let x_max = x.saturating_add(width).min(w - 1) as i32;
    let y_max = y.saturating_add(height).min(h - 1) as i32;

    if x_min >= x_max || y_min >= y_max {
      return;
    }

    // 向内加粗
    for t in 0..self.thickness as i32 {
      let rect_w = x_max - x_min + 1 - 2 * t;
      let rect_h = y_max - y_min + 1 - 2 * t;
      if rect_w <= 0 || rect_h <= 0 {
        break;
      }
      let rect = Rect::at(x_min + t, y_min + t).of_size(rect_w as u32, rect_h as u32);
      draw_hollow_rect_mut(image, rect, Rgb(self.color));
    }
  }

  /// 在图像副本上绘制所有检测框
  pub fn draw_detections(&self, image: &RgbImage, detections: &[Detection]) -> RgbImage {
    let mut canvas = image.clone();
    for detection in detections {
      self.draw_bbox(&mut canvas, detection.bounding_box());
    }
    canvas
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn outline_is_drawn_inside_box() {
    let image = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
    let det = Detection::new("cat", 0.9, BoundingBox::new(0.2, 0.2, 0.5, 0.5)).unwrap();
    let drawn = Draw::default().draw_detections(&image, &[det]);

    // 边框覆盖 (2,2)-(7,7)，两像素宽
    assert_eq!(drawn.get_pixel(2, 2), &Rgb(BOX_COLOR));
    assert_eq!(drawn.get_pixel(3, 3), &Rgb(BOX_COLOR));
    assert_eq!(drawn.get_pixel(7, 5), &Rgb(BOX_COLOR));
    assert_eq!(drawn.get_pixel(5, 5), &Rgb([255, 255, 255]));
    assert_eq!(drawn.get_pixel(0, 0), &Rgb([255, 255, 255]));
    // 原图保持不变
    assert_eq!(image.get_pixel(2, 2), &Rgb([255, 255, 255]));
  }

  #[test]
  fn degenerate_box_is_skipped() {
    let image = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
    let det = Detection::new("dot", 0.9, BoundingBox::new(0.5, 0.5, 0.0, 0.0)).unwrap();
    let drawn = Draw::default().with_color([255, 0, 0]).draw_detections(&image, &[det]);
    assert_eq!(drawn, image);
  }

  #[test]
  fn oversized_box_is_clamped() {
    let image = RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]));
    let mut canvas = image.clone();
    let draw = Draw::default();

    draw.draw_bbox(&mut canvas, &BoundingBox::new(f64::INFINITY, 0.0, 1.0, 1.0));
    assert_eq!(canvas, image);

    draw.draw_bbox(&mut canvas, &BoundingBox::new(0.0, 0.0, 1e12, 1e12));
    assert_eq!(canvas.get_pixel(0, 0), &Rgb(BOX_COLOR));
    assert_eq!(canvas.get_pixel(3, 3), &Rgb(BOX_COLOR));
  }
}
