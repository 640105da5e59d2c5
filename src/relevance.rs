// 该文件是 Zhenfa （诊发） 项目的一部分。
// src/relevance.rs - 内容相关性启发式
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

use crate::config::RelevanceThresholds;
use crate::detector::Detection;

/// 判断图像内容是否与主体领域相关。
///
/// 检测器给出任何结果即视为相关；仅在零检测时用全局 HSV 均值过滤
/// 明显无关的图像（近灰度的文档扫描、过暗或近白的场景）。
/// 这是一个刻意粗糙的廉价门控，不是分类器，允许出现误判；
/// 未经显式设计变更不得替换为学习模型。
pub fn is_relevant(
  image: &RgbImage,
  detections: &[Detection],
  thresholds: &RelevanceThresholds,
) -> bool {
  if !detections.is_empty() {
    return true;
  }

  let (s_mean, v_mean) = mean_saturation_value(image);
  !(s_mean < thresholds.min_saturation
    || v_mean < thresholds.min_value
    || v_mean > thresholds.max_value)
}

/// 全局平均饱和度与明度，采用 OpenCV 的 8 位 HSV 约定：
/// V = max(R,G,B)，S = 255·(max−min)/max（max 为 0 时 S 为 0）。
pub fn mean_saturation_value(image: &RgbImage) -> (f64, f64) {
  let count = u64::from(image.width()) * u64::from(image.height());
  if count == 0 {
    return (0.0, 0.0);
  }

  let mut s_sum = 0.0f64;
  let mut v_sum = 0.0f64;
  for pixel in image.pixels() {
    let max = pixel.0.iter().copied().max().unwrap_or(0);
    let min = pixel.0.iter().copied().min().unwrap_or(0);
    let v = f64::from(max);
    let s = if max == 0 {
      0.0
    } else {
      255.0 * f64::from(max - min) / v
    };
    s_sum += s;
    v_sum += v;
  }

  (s_sum / count as f64, v_sum / count as f64)
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  fn detection() -> Detection {
    Detection {
      bbox: [10.0, 10.0, 50.0, 50.0],
      confidence: 0.8,
      class_id: 0,
      class_name: "alopecia".to_string(),
    }
  }

  #[test]
  fn detections_override_color_statistics() {
    // 纯灰图像的 s_mean 为 0，但只要检测器有输出就视为相关
    let image = RgbImage::from_pixel(256, 256, Rgb([128, 128, 128]));
    let (s_mean, _) = mean_saturation_value(&image);
    assert_eq!(s_mean, 0.0);
    assert!(is_relevant(&image, &[detection()], &RelevanceThresholds::default()));
  }

  #[test]
  fn grayscale_image_without_detections_is_irrelevant() {
    let image = RgbImage::from_pixel(256, 256, Rgb([128, 128, 128]));
    assert!(!is_relevant(&image, &[], &RelevanceThresholds::default()));
  }

  #[test]
  fn dark_image_without_detections_is_irrelevant() {
    let image = RgbImage::from_pixel(256, 256, Rgb([20, 10, 5]));
    assert!(!is_relevant(&image, &[], &RelevanceThresholds::default()));
  }

  #[test]
  fn near_white_image_without_detections_is_irrelevant() {
    let image = RgbImage::from_pixel(256, 256, Rgb([250, 245, 248]));
    assert!(!is_relevant(&image, &[], &RelevanceThresholds::default()));
  }

  #[test]
  fn skin_toned_image_without_detections_is_relevant() {
    let image = RgbImage::from_pixel(256, 256, Rgb([180, 120, 100]));
    let (s_mean, v_mean) = mean_saturation_value(&image);
    assert!(s_mean >= 10.0);
    assert!((30.0..=240.0).contains(&v_mean));
    assert!(is_relevant(&image, &[], &RelevanceThresholds::default()));
  }

  #[test]
  fn saturation_follows_opencv_convention() {
    // (180, 120, 100): V = 180，S = 255 * 80 / 180
    let image = RgbImage::from_pixel(2, 2, Rgb([180, 120, 100]));
    let (s_mean, v_mean) = mean_saturation_value(&image);
    assert!((s_mean - 255.0 * 80.0 / 180.0).abs() < 1e-9);
    assert_eq!(v_mean, 180.0);
  }

  #[test]
  fn empty_image_is_irrelevant() {
    let image = RgbImage::new(0, 0);
    assert!(!is_relevant(&image, &[], &RelevanceThresholds::default()));
  }
}
