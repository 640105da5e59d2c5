// 该文件是 Zhenfa （诊发） 项目的一部分。
// src/pipeline.rs - 质量门控与诊断决策管线
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
use tracing::{debug, info};

use crate::config::{DomainProfile, PipelineConfig};
use crate::detector::{Detection, Detector};
use crate::quality::{self, QualityVerdict};
use crate::relevance;
use crate::render::{RenderError, Renderer};

/// 内容不相关时的拒绝原因代码
pub const INVALID_CONTENT_REASON: &str = "Invalid image content";

/// 管线终态输出，每次调用恰好产生一个变体。
#[derive(Debug, Clone)]
pub enum Decision {
  /// 质量或相关性拒绝
  Rejected { reason: String, message: String },
  /// 图像可用且相关，但无检测结果
  Negative { message: String },
  /// 至少一个检测结果，附标注图像的 PNG 字节
  Positive {
    detections: Vec<Detection>,
    annotated_image: Vec<u8>,
  },
}

/// 管线错误。拒绝是数据（`Decision::Rejected`），不走错误通道；
/// 这里只承载真正的异常条件。
#[derive(Error, Debug)]
pub enum PipelineError<E>
where
  E: std::error::Error + Send + Sync + 'static,
{
  /// 图像字节无法解码，对请求是致命的，绝不降级为质量拒绝
  #[error("图像解码失败: {0}")]
  Decode(#[from] image::ImageError),
  /// 外部检测器失败，与“未检出”严格区分
  #[error("检测器错误: {0}")]
  Detector(E),
  /// 阳性路径的标注图像产出失败，检测结果存在但产物缺失
  #[error("标注渲染错误: {0}")]
  Render(#[from] RenderError),
}

/// 决策状态机：按优先级将质量结论、相关性与检测结果映射为终态。
///
/// 质量失败优先级最高；随后是相关性拒绝、零检测阴性；
/// 仅在阳性分支调用 `render` 产出标注图像。
pub fn classify<F>(
  verdict: QualityVerdict,
  detections: Vec<Detection>,
  relevant: bool,
  domain: &DomainProfile,
  render: F,
) -> Result<Decision, RenderError>
where
  F: FnOnce(&[Detection]) -> Result<Vec<u8>, RenderError>,
{
  if let QualityVerdict::Rejected { reason, message } = verdict {
    return Ok(Decision::Rejected {
      reason: reason.to_string(),
      message: message.to_string(),
    });
  }

  if !relevant {
    return Ok(Decision::Rejected {
      reason: INVALID_CONTENT_REASON.to_string(),
      message: domain.irrelevant_message.clone(),
    });
  }

  if detections.is_empty() {
    return Ok(Decision::Negative {
      message: domain.negative_message.clone(),
    });
  }

  let annotated_image = render(&detections)?;
  Ok(Decision::Positive {
    detections,
    annotated_image,
  })
}

/// 诊断决策管线。
///
/// 每次调用严格同步地执行 解码 → 质量门控 → 检测 → 相关性 → 决策，
/// 不持有跨请求可变状态；并发由调用方在各自的调用上组织。
pub struct Pipeline<D: Detector> {
  config: PipelineConfig,
  detector: D,
  renderer: Renderer,
}

impl<D: Detector> Pipeline<D> {
  pub fn new(config: PipelineConfig, detector: D, renderer: Renderer) -> Self {
    Self {
      config,
      detector,
      renderer,
    }
  }

  /// 对原始图像字节运行完整管线。
  pub fn run(
    &self,
    raw: &[u8],
    confidence_threshold: f32,
  ) -> Result<Decision, PipelineError<D::Error>> {
    let image = image::load_from_memory(raw)?.to_rgb8();
    debug!("图像解码完成: {}x{}", image.width(), image.height());
    self.run_decoded(&image, confidence_threshold)
  }

  /// 对已解码的图像运行质量门控之后的管线阶段。
  pub fn run_decoded(
    &self,
    image: &RgbImage,
    confidence_threshold: f32,
  ) -> Result<Decision, PipelineError<D::Error>> {
    let verdict = quality::evaluate(image, &self.config.quality);

    // 质量不合格时不再触发检测器，直接进入决策
    if let QualityVerdict::Rejected { reason, .. } = &verdict {
      info!("质量门控未通过: {}", reason);
      return Ok(classify(verdict, Vec::new(), true, &self.config.domain, |_| {
        unreachable!("质量拒绝分支不渲染")
      })?);
    }

    let detections = self
      .detector
      .detect(image, confidence_threshold)
      .map_err(PipelineError::Detector)?;
    info!("检测完成: {} 条结果", detections.len());

    let relevant = relevance::is_relevant(image, &detections, &self.config.relevance);
    if !relevant {
      info!("内容相关性检查未通过");
    }

    Ok(classify(verdict, detections, relevant, &self.config.domain, |dets| {
      self.renderer.render(image, dets)
    })?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::DomainProfile;
  use crate::quality::QualityReason;

  fn detection() -> Detection {
    Detection {
      bbox: [10.0, 10.0, 50.0, 50.0],
      confidence: 0.8,
      class_id: 0,
      class_name: "alopecia".to_string(),
    }
  }

  #[test]
  fn classify_quality_rejection_takes_precedence() {
    // 质量失败时即使有检测结果也必须拒绝，且不触发渲染
    let verdict = QualityVerdict::Rejected {
      reason: QualityReason::Blurry,
      message: "blurry",
    };
    let decision = classify(
      verdict,
      vec![detection()],
      false,
      &DomainProfile::default(),
      |_| panic!("不应渲染"),
    )
    .unwrap();
    assert!(matches!(
      decision,
      Decision::Rejected { ref reason, .. } if reason == "Image is blurry or unclear"
    ));
  }

  #[test]
  fn classify_irrelevant_content_is_rejected() {
    let decision = classify(
      QualityVerdict::Valid,
      Vec::new(),
      false,
      &DomainProfile::default(),
      |_| panic!("不应渲染"),
    )
    .unwrap();
    assert!(matches!(
      decision,
      Decision::Rejected { ref reason, .. } if reason == INVALID_CONTENT_REASON
    ));
  }

  #[test]
  fn classify_no_detections_is_negative() {
    let domain = DomainProfile::default();
    let decision = classify(QualityVerdict::Valid, Vec::new(), true, &domain, |_| {
      panic!("不应渲染")
    })
    .unwrap();
    assert!(matches!(
      decision,
      Decision::Negative { ref message } if *message == domain.negative_message
    ));
  }

  #[test]
  fn classify_renders_only_in_the_positive_branch() {
    let decision = classify(
      QualityVerdict::Valid,
      vec![detection()],
      true,
      &DomainProfile::default(),
      |dets| {
        assert_eq!(dets.len(), 1);
        Ok(vec![1, 2, 3])
      },
    )
    .unwrap();
    match decision {
      Decision::Positive {
        detections,
        annotated_image,
      } => {
        assert_eq!(detections, vec![detection()]);
        assert_eq!(annotated_image, vec![1, 2, 3]);
      }
      other => panic!("期望阳性结果, 实际为 {:?}", other),
    }
  }
}
