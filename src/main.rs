// 该文件是 Zhenfa （诊发） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use zhenfa::{
  Decision, Pipeline, PipelineConfig, QualityThresholds, ReplayDetector, Renderer,
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("输入图像: {}", args.input.display());
  info!("置信度阈值: {}", args.confidence);

  let config = PipelineConfig {
    quality: QualityThresholds {
      min_width: args.min_resolution,
      min_height: args.min_resolution,
      blur_threshold: args.blur_threshold,
      dark_threshold: args.dark_threshold,
      bright_threshold: args.bright_threshold,
    },
    ..PipelineConfig::default()
  };

  let detector = match &args.detections {
    Some(path) => ReplayDetector::from_path(path)
      .with_context(|| format!("无法载入检测回放文件: {}", path.display()))?,
    None => ReplayDetector::default(),
  };

  let mut renderer = Renderer::default();
  if let Some(path) = &args.font {
    let data =
      std::fs::read(path).with_context(|| format!("无法读取字体文件: {}", path.display()))?;
    renderer = renderer.with_font_bytes(data)?;
  }

  let raw = std::fs::read(&args.input)
    .with_context(|| format!("无法读取输入图像: {}", args.input.display()))?;

  let domain = config.domain.clone();
  let pipeline = Pipeline::new(config, detector, renderer);

  info!("开始处理...");
  let now = std::time::Instant::now();
  let decision = pipeline.run(&raw, args.confidence)?;
  info!("处理完成，耗时: {:.2?}", now.elapsed());

  if let (Decision::Positive { annotated_image, .. }, Some(output)) = (&decision, &args.output) {
    std::fs::write(output, annotated_image)
      .with_context(|| format!("无法写出标注图像: {}", output.display()))?;
    info!("标注图像已写出: {}", output.display());
  }

  let record = decision.into_record(&domain);
  println!("{}", serde_json::to_string_pretty(&record)?);

  Ok(())
}
