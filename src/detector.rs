// 该文件是 Zhenfa （诊发） 项目的一部分。
// src/detector.rs - 检测器接口
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

use image::RgbImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// 检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
  /// 边界框 [x_min, y_min, x_max, y_max]，绝对像素坐标
  pub bbox: [f32; 4],
  /// 置信度，范围 [0, 1]
  pub confidence: f32,
  /// 类别索引
  pub class_id: u32,
  /// 类别名称
  pub class_name: String,
}

/// 外部检测器能力接口。
///
/// 管线不实现检测，只要求返回已通过给定置信度阈值的检测列表，
/// 顺序由检测器定义并原样保留。空列表与非空列表同为正常结果，
/// “未检出”不是错误。
pub trait Detector {
  type Error: std::error::Error + Send + Sync + 'static;

  fn detect(
    &self,
    image: &RgbImage,
    confidence_threshold: f32,
  ) -> Result<Vec<Detection>, Self::Error>;
}

#[derive(Error, Debug)]
pub enum ReplayDetectorError {
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("JSON 解析错误: {0}")]
  Json(#[from] serde_json::Error),
}

/// 回放检测器：从 JSON 文件载入固定的检测列表。
///
/// 供命令行与测试在没有模型运行时的情况下驱动完整管线。
#[derive(Debug, Clone, Default)]
pub struct ReplayDetector {
  detections: Vec<Detection>,
}

impl ReplayDetector {
  pub fn new(detections: Vec<Detection>) -> Self {
    Self { detections }
  }

  /// 从 JSON 文件载入检测列表
  pub fn from_path(path: &Path) -> Result<Self, ReplayDetectorError> {
    let data = std::fs::read_to_string(path)?;
    let detections: Vec<Detection> = serde_json::from_str(&data)?;
    info!("载入回放检测列表: {} 条, 来自 {}", detections.len(), path.display());
    Ok(Self { detections })
  }
}

impl Detector for ReplayDetector {
  type Error = std::convert::Infallible;

  fn detect(
    &self,
    _image: &RgbImage,
    confidence_threshold: f32,
  ) -> Result<Vec<Detection>, Self::Error> {
    Ok(
      self
        .detections
        .iter()
        .filter(|det| det.confidence >= confidence_threshold)
        .cloned()
        .collect(),
    )
  }
}
