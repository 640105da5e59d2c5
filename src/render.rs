// 该文件是 Zhenfa （诊发） 项目的一部分。
// src/render.rs - 检测结果标注渲染
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

use std::io::Cursor;

use ab_glyph::{FontVec, PxScale};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use thiserror::Error;

use crate::detector::Detection;

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 20.0;
const LABEL_TEXT_HEIGHT: i32 = 24;
const LABEL_CHAR_WIDTH: f32 = 11.0; // 每字符平均宽度（粗略估计）
const LABEL_TEXT_VERTICAL_PADDING: i32 = 2;
const LABEL_COLOR: [u8; 3] = [0, 0, 255]; // 蓝色

#[derive(Error, Debug)]
pub enum RenderError {
  #[error("图像编码错误: {0}")]
  Encode(#[from] image::ImageError),
  #[error("字体加载错误: {0}")]
  Font(#[from] ab_glyph::InvalidFont),
}

/// 标注渲染器：在图像副本上绘制检测框与标签并编码为 PNG。
///
/// 未提供字体时仅绘制边框与标签底色条；提供字体后额外绘制
/// “类别名 置信度”文本。
pub struct Renderer {
  font_size: f32,
  label_text_height: i32,
  label_char_width: f32,
  label_text_vertical_padding: i32,
  label_color: [u8; 3],
  font: Option<FontVec>,
}

impl Default for Renderer {
  fn default() -> Self {
    Self {
      font_size: LABEL_FONT_SIZE,
      label_text_height: LABEL_TEXT_HEIGHT,
      label_char_width: LABEL_CHAR_WIDTH,
      label_text_vertical_padding: LABEL_TEXT_VERTICAL_PADDING,
      label_color: LABEL_COLOR,
      font: None,
    }
  }
}

impl Renderer {
  /// 设置标签字体
  pub fn with_font_bytes(mut self, data: Vec<u8>) -> Result<Self, RenderError> {
    self.font = Some(FontVec::try_from_vec(data)?);
    Ok(self)
  }

  /// 在图像副本上绘制所有检测并编码为无损 PNG 字节。
  pub fn render(&self, image: &RgbImage, detections: &[Detection]) -> Result<Vec<u8>, RenderError> {
    let mut canvas = image.clone();
    for det in detections {
      self.draw_bbox_with_label(&mut canvas, det);
    }

    let mut buffer = Cursor::new(Vec::new());
    canvas.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
  }

  // 绘制一个检测的边框与标签，bbox 为绝对像素坐标 [x_min, y_min, x_max, y_max]
  fn draw_bbox_with_label(&self, image: &mut RgbImage, det: &Detection) {
    let (w, h) = (image.width() as i32, image.height() as i32);
    if w == 0 || h == 0 {
      return;
    }

    let mut x_min = det.bbox[0].floor() as i32;
    let mut y_min = det.bbox[1].floor() as i32;
    let mut x_max = det.bbox[2].ceil() as i32;
    let mut y_max = det.bbox[3].ceil() as i32;

    x_min = x_min.clamp(0, w - 1);
    y_min = y_min.clamp(0, h - 1);
    x_max = x_max.clamp(0, w - 1);
    y_max = y_max.clamp(0, h - 1);

    if x_min >= x_max || y_min >= y_max {
      return;
    }

    let color = Rgb(self.label_color);

    // 绘制边框（加粗为2像素）
    for thickness in 0..2 {
      let x_min_t = (x_min + thickness).min(w - 1);
      let y_min_t = (y_min + thickness).min(h - 1);
      let x_max_t = (x_max - thickness).max(0);
      let y_max_t = (y_max - thickness).max(0);

      for x in x_min_t..=x_max_t {
        image.put_pixel(x as u32, y_min_t as u32, color);
        image.put_pixel(x as u32, y_max_t as u32, color);
      }
      for y in y_min_t..=y_max_t {
        image.put_pixel(x_min_t as u32, y as u32, color);
        image.put_pixel(x_max_t as u32, y as u32, color);
      }
    }

    // 标签文本与底色条（置于边框上方，空间不足时贴边）
    let label = format!("{} {:.2}", det.class_name, det.confidence);
    let text_width = (label.len() as f32 * self.label_char_width) as i32;
    let text_height = self.label_text_height;

    let label_x = x_min.max(0);
    let label_y = (y_min - text_height).max(0);
    let max_width = (w - label_x).max(0);
    let label_width = text_width.min(max_width) as u32;
    let label_height = text_height as u32;

    if label_width == 0 || label_height == 0 {
      return;
    }

    let rect = imageproc::rect::Rect::at(label_x, label_y).of_size(label_width, label_height);
    draw_filled_rect_mut(image, rect, color);

    if let Some(font) = &self.font {
      let scale = PxScale::from(self.font_size);
      let text_color = Rgb([255u8, 255u8, 255u8]); // 白色文本
      draw_text_mut(
        image,
        text_color,
        label_x,
        label_y + self.label_text_vertical_padding,
        scale,
        font,
        &label,
      );
    }
  }
}
