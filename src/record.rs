// 该文件是 Zhenfa （诊发） 项目的一部分。
// src/record.rs - 决策结果的结构化记录
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

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::config::DomainProfile;
use crate::detector::Detection;
use crate::pipeline::Decision;

/// 决策的可序列化记录，供调用方持久化或在线返回。
///
/// `status` 只取 `rejected` 或 `success`；`diagnosis` 仅在
/// “无检测结果”的阴性情形出现；标注图像以 base64 编码的 PNG 传递。
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
  pub status: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reason: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub diagnosis: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub detections: Option<Vec<Detection>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub annotated_image: Option<String>,
}

impl Decision {
  /// 转换为结构化记录。
  pub fn into_record(self, domain: &DomainProfile) -> DecisionRecord {
    match self {
      Decision::Rejected { reason, message } => DecisionRecord {
        status: "rejected",
        reason: Some(reason),
        message: Some(message),
        diagnosis: None,
        detections: None,
        annotated_image: None,
      },
      Decision::Negative { message } => DecisionRecord {
        status: "success",
        reason: None,
        message: Some(message),
        diagnosis: Some(domain.negative_diagnosis.clone()),
        detections: None,
        annotated_image: None,
      },
      Decision::Positive {
        detections,
        annotated_image,
      } => DecisionRecord {
        status: "success",
        reason: None,
        message: None,
        diagnosis: None,
        detections: Some(detections),
        annotated_image: Some(STANDARD.encode(annotated_image)),
      },
    }
  }
}
