// 该文件是 Zhenfa （诊发） 项目的一部分。
// src/config.rs - 管线阈值与领域配置
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

/// 质量门控阈值。
///
/// 这些数值是行为基准的一部分，默认值不应重新推导或“优化”。
#[derive(Debug, Clone)]
pub struct QualityThresholds {
  /// 最小宽度（像素）
  pub min_width: u32,
  /// 最小高度（像素）
  pub min_height: u32,
  /// 拉普拉斯方差下限，低于该值判定为模糊
  pub blur_threshold: f64,
  /// 平均亮度下限，低于该值判定为过暗
  pub dark_threshold: f64,
  /// 平均亮度上限，高于该值判定为过曝
  pub bright_threshold: f64,
}

impl Default for QualityThresholds {
  fn default() -> Self {
    Self {
      min_width: 128,
      min_height: 128,
      blur_threshold: 20.0,
      dark_threshold: 40.0,
      bright_threshold: 220.0,
    }
  }
}

/// 内容相关性启发式阈值（HSV 全局均值）。
#[derive(Debug, Clone)]
pub struct RelevanceThresholds {
  /// 平均饱和度下限，低于该值视为近灰度图像
  pub min_saturation: f64,
  /// 平均明度下限，低于该值视为过暗图像
  pub min_value: f64,
  /// 平均明度上限，高于该值视为近白图像
  pub max_value: f64,
}

impl Default for RelevanceThresholds {
  fn default() -> Self {
    Self {
      min_saturation: 10.0,
      min_value: 30.0,
      max_value: 240.0,
    }
  }
}

/// 主体领域配置：面向用户的固定文案。
///
/// 默认值为头皮/脱发场景，替换该配置即可将管线用于其他主体领域。
#[derive(Debug, Clone)]
pub struct DomainProfile {
  /// 内容不相关时的拒绝文案
  pub irrelevant_message: String,
  /// 无检测结果时的诊断名称
  pub negative_diagnosis: String,
  /// 无检测结果时的文案
  pub negative_message: String,
}

impl Default for DomainProfile {
  fn default() -> Self {
    Self {
      irrelevant_message: "The uploaded image does not appear to be a head or scalp. \
         Please upload a valid scalp image."
        .to_string(),
      negative_diagnosis: "No Alopecia Detected".to_string(),
      negative_message: "The scalp and hair appear normal. No signs of alopecia were detected."
        .to_string(),
    }
  }
}

/// 管线整体配置。
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
  pub quality: QualityThresholds,
  pub relevance: RelevanceThresholds,
  pub domain: DomainProfile,
}
