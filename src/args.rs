// 该文件是 Zhenfa （诊发） 项目的一部分。
// src/args.rs - 项目参数配置
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

use std::path::PathBuf;

use clap::Parser;

/// Zhenfa 项目参数配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入图像文件路径
  #[arg(long, value_name = "FILE")]
  pub input: PathBuf,

  /// 检测结果回放 JSON 文件（缺省为无检测）
  #[arg(long, value_name = "FILE")]
  pub detections: Option<PathBuf>,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.25", value_name = "THRESHOLD")]
  pub confidence: f32,

  /// 标签字体文件路径（缺省时仅绘制边框与标签底色条）
  #[arg(long, value_name = "FILE")]
  pub font: Option<PathBuf>,

  /// 标注图像输出路径（仅在阳性结果时写出）
  #[arg(long, value_name = "OUTPUT")]
  pub output: Option<PathBuf>,

  /// 最小分辨率（宽与高，像素）
  #[arg(long, default_value = "128", value_name = "PIXELS")]
  pub min_resolution: u32,

  /// 模糊判定阈值（拉普拉斯方差下限）
  #[arg(long, default_value = "20.0", value_name = "THRESHOLD")]
  pub blur_threshold: f64,

  /// 过暗判定阈值（平均亮度下限）
  #[arg(long, default_value = "40.0", value_name = "THRESHOLD")]
  pub dark_threshold: f64,

  /// 过曝判定阈值（平均亮度上限）
  #[arg(long, default_value = "220.0", value_name = "THRESHOLD")]
  pub bright_threshold: f64,
}
