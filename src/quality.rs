// 该文件是 Zhenfa （诊发） 项目的一部分。
// src/quality.rs - 图像质量门控
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

use image::{GrayImage, RgbImage};

use crate::config::QualityThresholds;

const LOW_RESOLUTION_MESSAGE: &str =
  "The image resolution is too low. Please upload a higher quality image.";
const BLURRY_MESSAGE: &str = "Please upload a clear, well-lit image of your scalp or head.";
const TOO_DARK_MESSAGE: &str = "The image is too dark. Please upload a well-lit image.";
const OVEREXPOSED_MESSAGE: &str =
  "The image is overexposed. Please ensure proper lighting without glare.";

/// 质量门控拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityReason {
  /// 分辨率过低
  LowResolution,
  /// 图像模糊
  Blurry,
  /// 图像过暗
  TooDark,
  /// 图像过曝
  Overexposed,
}

impl std::fmt::Display for QualityReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let text = match self {
      QualityReason::LowResolution => "Low resolution",
      QualityReason::Blurry => "Image is blurry or unclear",
      QualityReason::TooDark => "Image is too dark",
      QualityReason::Overexposed => "Image is overexposed",
    };
    write!(f, "{}", text)
  }
}

/// 质量门控结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityVerdict {
  /// 图像可用
  Valid,
  /// 图像不可用，附拒绝原因与面向用户的文案
  Rejected {
    reason: QualityReason,
    message: &'static str,
  },
}

impl QualityVerdict {
  pub fn is_valid(&self) -> bool {
    matches!(self, QualityVerdict::Valid)
  }
}

/// 评估图像质量。
///
/// 按开销从低到高依次检查分辨率、清晰度、曝光，命中第一项失败即返回。
/// 对相同像素数据结论恒定，无副作用。
pub fn evaluate(image: &RgbImage, thresholds: &QualityThresholds) -> QualityVerdict {
  let (width, height) = image.dimensions();
  if height < thresholds.min_height || width < thresholds.min_width {
    return QualityVerdict::Rejected {
      reason: QualityReason::LowResolution,
      message: LOW_RESOLUTION_MESSAGE,
    };
  }

  let gray = to_gray(image);

  // 纯色图像的拉普拉斯方差为 0，必然判为模糊。这是预期行为：
  // 平坦图像不含可用细节。
  if laplacian_variance(&gray) < thresholds.blur_threshold {
    return QualityVerdict::Rejected {
      reason: QualityReason::Blurry,
      message: BLURRY_MESSAGE,
    };
  }

  let brightness = mean_intensity(&gray);
  if brightness < thresholds.dark_threshold {
    return QualityVerdict::Rejected {
      reason: QualityReason::TooDark,
      message: TOO_DARK_MESSAGE,
    };
  }
  if brightness > thresholds.bright_threshold {
    return QualityVerdict::Rejected {
      reason: QualityReason::Overexposed,
      message: OVEREXPOSED_MESSAGE,
    };
  }

  QualityVerdict::Valid
}

/// 转换为单通道灰度图，权重与 OpenCV 一致（0.299 R + 0.587 G + 0.114 B，四舍五入）。
pub fn to_gray(image: &RgbImage) -> GrayImage {
  GrayImage::from_fn(image.width(), image.height(), |x, y| {
    let pixel = image.get_pixel(x, y);
    let luma =
      0.299 * f64::from(pixel[0]) + 0.587 * f64::from(pixel[1]) + 0.114 * f64::from(pixel[2]);
    image::Luma([luma.round() as u8])
  })
}

/// 灰度图上离散拉普拉斯算子（四邻域）响应的方差。
///
/// 清晰图像含高频边缘信息，模糊会抑制它；该方差是无需模型的廉价清晰度代理。
/// 仅在内部像素上计算，不足 3x3 的图像返回 0。
pub fn laplacian_variance(gray: &GrayImage) -> f64 {
  let (width, height) = gray.dimensions();
  if width < 3 || height < 3 {
    return 0.0;
  }

  let mut responses = Vec::with_capacity(((width - 2) * (height - 2)) as usize);
  for y in 1..height - 1 {
    for x in 1..width - 1 {
      let center = i32::from(gray.get_pixel(x, y)[0]);
      let up = i32::from(gray.get_pixel(x, y - 1)[0]);
      let down = i32::from(gray.get_pixel(x, y + 1)[0]);
      let left = i32::from(gray.get_pixel(x - 1, y)[0]);
      let right = i32::from(gray.get_pixel(x + 1, y)[0]);
      responses.push(f64::from(4 * center - up - down - left - right));
    }
  }

  let count = responses.len() as f64;
  let mean = responses.iter().sum::<f64>() / count;
  responses.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / count
}

/// 灰度图全局平均亮度。
pub fn mean_intensity(gray: &GrayImage) -> f64 {
  let count = u64::from(gray.width()) * u64::from(gray.height());
  if count == 0 {
    return 0.0;
  }
  let sum: u64 = gray.pixels().map(|p| u64::from(p[0])).sum();
  sum as f64 / count as f64
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  fn flat(width: u32, height: u32, value: u8) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([value, value, value]))
  }

  fn checkerboard(width: u32, height: u32, a: u8, b: u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
      if (x + y) % 2 == 0 {
        Rgb([a, a, a])
      } else {
        Rgb([b, b, b])
      }
    })
  }

  #[test]
  fn low_resolution_rejected_regardless_of_content() {
    let thresholds = QualityThresholds::default();
    for image in [flat(64, 64, 128), checkerboard(64, 256, 0, 255), flat(256, 100, 128)] {
      let verdict = evaluate(&image, &thresholds);
      assert!(matches!(
        verdict,
        QualityVerdict::Rejected {
          reason: QualityReason::LowResolution,
          ..
        }
      ));
    }
  }

  #[test]
  fn flat_image_rejected_as_blurry() {
    // 纯色大图的拉普拉斯方差为 0，必须判为模糊而非通过
    let image = flat(256, 256, 128);
    let verdict = evaluate(&image, &QualityThresholds::default());
    assert!(matches!(
      verdict,
      QualityVerdict::Rejected {
        reason: QualityReason::Blurry,
        ..
      }
    ));
  }

  #[test]
  fn flat_image_has_zero_laplacian_variance() {
    let gray = to_gray(&flat(256, 256, 77));
    assert_eq!(laplacian_variance(&gray), 0.0);
  }

  #[test]
  fn sharp_image_passes() {
    let image = checkerboard(256, 256, 60, 180);
    assert!(evaluate(&image, &QualityThresholds::default()).is_valid());
  }

  #[test]
  fn mean_intensity_exactly_forty_passes() {
    // 0/80 棋盘格均值恰为 40，边界为开区间（< 40 失败，== 40 通过）
    let image = checkerboard(256, 256, 0, 80);
    let gray = to_gray(&image);
    assert_eq!(mean_intensity(&gray), 40.0);
    assert!(evaluate(&image, &QualityThresholds::default()).is_valid());
  }

  #[test]
  fn mean_intensity_below_forty_rejected_as_too_dark() {
    let image = checkerboard(256, 256, 0, 79);
    let verdict = evaluate(&image, &QualityThresholds::default());
    assert!(matches!(
      verdict,
      QualityVerdict::Rejected {
        reason: QualityReason::TooDark,
        ..
      }
    ));
  }

  #[test]
  fn mean_intensity_exactly_two_twenty_passes() {
    let image = checkerboard(256, 256, 185, 255);
    let gray = to_gray(&image);
    assert_eq!(mean_intensity(&gray), 220.0);
    assert!(evaluate(&image, &QualityThresholds::default()).is_valid());
  }

  #[test]
  fn mean_intensity_above_two_twenty_rejected_as_overexposed() {
    let image = checkerboard(256, 256, 187, 255);
    let verdict = evaluate(&image, &QualityThresholds::default());
    assert!(matches!(
      verdict,
      QualityVerdict::Rejected {
        reason: QualityReason::Overexposed,
        ..
      }
    ));
  }

  #[test]
  fn evaluate_is_idempotent() {
    let thresholds = QualityThresholds::default();
    for image in [flat(64, 64, 128), flat(256, 256, 128), checkerboard(256, 256, 60, 180)] {
      assert_eq!(evaluate(&image, &thresholds), evaluate(&image, &thresholds));
    }
  }

  #[test]
  fn resolution_check_precedes_sharpness() {
    // 小尺寸纯色图先命中分辨率检查，而不是模糊检查
    let verdict = evaluate(&flat(100, 100, 128), &QualityThresholds::default());
    assert!(matches!(
      verdict,
      QualityVerdict::Rejected {
        reason: QualityReason::LowResolution,
        ..
      }
    ));
  }
}
