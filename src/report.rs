use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::AnalysisConfig;
use crate::results::{RunResults, VideoAnalysis};

/// 单个视频的汇总统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportStatistics {
    pub people_detected: u32,
    pub objects_detected: u32,
    pub animals_detected: u32,
    pub medical_regions: u32,
}

impl ReportStatistics {
    pub fn from_analysis(analysis: &VideoAnalysis) -> Self {
        Self {
            people_detected: analysis.people_count(),
            objects_detected: analysis.objects_count(),
            animals_detected: analysis.animals_count(),
            medical_regions: analysis.medical_region_count(),
        }
    }
}

/// 单视频报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoReport {
    pub video_name: String,
    pub analysis_timestamp: String,
    pub statistics: ReportStatistics,
    pub results: VideoAnalysis,
}

/// 跨视频汇总报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    pub total_videos: usize,
    pub analysis_timestamp: String,
    pub succeeded: usize,
    pub failed: usize,
    pub results: BTreeMap<String, VideoAnalysis>,
}

/// JSON 报告生成器
pub struct ReportGenerator {
    reports_dir: PathBuf,
    frames_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let reports_dir = config.video.output_path.join("reports");
        fs::create_dir_all(&reports_dir)
            .with_context(|| format!("创建报告目录失败: {}", reports_dir.display()))?;

        Ok(Self {
            reports_dir,
            frames_dir: config.video.output_path.join("frames"),
        })
    }

    /// 生成单视频 JSON 报告
    pub fn generate_report(&self, analysis: &VideoAnalysis) -> Result<PathBuf> {
        let report = VideoReport {
            video_name: analysis.meta.video_name.clone(),
            analysis_timestamp: Local::now().to_rfc3339(),
            statistics: ReportStatistics::from_analysis(analysis),
            results: analysis.clone(),
        };

        let report_path = self
            .reports_dir
            .join(format!("{}_report.json", analysis.meta.video_name));
        write_json(&report_path, &report)?;
        info!("📊 分析报告已生成: {}", report_path.display());
        Ok(report_path)
    }

    /// 生成跨视频汇总报告
    pub fn generate_consolidated_report(&self, results: &RunResults) -> Result<PathBuf> {
        let succeeded = results
            .values()
            .filter(|a| a.meta.analysis_success)
            .count();
        let report = ConsolidatedReport {
            total_videos: results.len(),
            analysis_timestamp: Local::now().to_rfc3339(),
            succeeded,
            failed: results.len() - succeeded,
            results: results.clone(),
        };

        let report_path = self.reports_dir.join(format!(
            "consolidated_report_{}.json",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        write_json(&report_path, &report)?;
        info!("📊 汇总报告已生成: {}", report_path.display());
        Ok(report_path)
    }

    /// 在视频帧目录下生成摘要文件，便于就近查看
    pub fn generate_video_summary(&self, analysis: &VideoAnalysis) -> Result<PathBuf> {
        let video_dir = self.frames_dir.join(&analysis.meta.video_name);
        fs::create_dir_all(&video_dir)
            .with_context(|| format!("创建帧目录失败: {}", video_dir.display()))?;

        let statistics = ReportStatistics::from_analysis(analysis);
        let detection_timeline: Vec<serde_json::Value> = analysis
            .human
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "frame": entry.frame,
                    "timestamp": entry.timestamp,
                    "people_detected": entry.data.people_detected,
                })
            })
            .collect();

        let summary = serde_json::json!({
            "analysis_summary": {
                "video_name": analysis.meta.video_name,
                "video_path": analysis.meta.video_path,
                "analysis_success": analysis.meta.analysis_success,
                "analysis_start_time": analysis.meta.analysis_start_time,
                "analysis_end_time": analysis.meta.analysis_end_time,
            },
            "frame_statistics": {
                "total_frames_processed": analysis.meta.total_frames_processed,
                "statistics": statistics,
            },
            "detection_timeline": detection_timeline,
        });

        let summary_path = video_dir.join("video_summary.json");
        write_json(&summary_path, &summary)?;
        Ok(summary_path)
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("序列化报告失败")?;
    fs::write(path, json).with_context(|| format!("写入报告失败: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::human::HumanAnalyzer;
    use crate::analyzers::objects::ObjectDetector;
    use crate::frame_extractor::Frame;
    use crate::results::FrameObservations;

    fn analyzed_video(name: &str, config: &AnalysisConfig) -> VideoAnalysis {
        let human = HumanAnalyzer::new(config);
        let objects = ObjectDetector::new(config);
        let path = PathBuf::from(format!("videos/input/{}.mp4", name));
        let mut analysis = VideoAnalysis::new(&path, config.analysis.clone());

        for i in 0..3 {
            let frame = Frame {
                index: i,
                width: 4,
                height: 4,
                image: image::RgbImage::new(4, 4),
            };
            let observations = FrameObservations {
                human: Some(human.analyze_frame(&frame)),
                objects: Some(objects.detect_objects(&frame)),
                ..Default::default()
            };
            analysis.accumulate(i, observations);
        }
        analysis.finish(3);
        analysis
    }

    #[test]
    fn test_report_round_trips_losslessly() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AnalysisConfig::default();
        config.video.output_path = dir.path().to_path_buf();

        let analysis = analyzed_video("demo", &config);
        let generator = ReportGenerator::new(&config).unwrap();
        let report_path = generator.generate_report(&analysis).unwrap();

        let json = std::fs::read_to_string(&report_path).unwrap();
        let parsed: VideoReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.results, analysis);
        assert_eq!(parsed.statistics.people_detected, 3);
        assert_eq!(parsed.statistics.objects_detected, 9);
    }

    #[test]
    fn test_consolidated_report_counts_failures() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AnalysisConfig::default();
        config.video.output_path = dir.path().to_path_buf();

        let mut results = RunResults::new();
        results.insert("ok".to_string(), analyzed_video("ok", &config));
        results.insert(
            "broken".to_string(),
            VideoAnalysis::failed(
                Path::new("videos/input/broken.mp4"),
                config.analysis.clone(),
                "帧提取失败",
            ),
        );

        let generator = ReportGenerator::new(&config).unwrap();
        let report_path = generator.generate_consolidated_report(&results).unwrap();

        let json = std::fs::read_to_string(&report_path).unwrap();
        let parsed: ConsolidatedReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total_videos, 2);
        assert_eq!(parsed.succeeded, 1);
        assert_eq!(parsed.failed, 1);
        assert_eq!(parsed.results, results);
    }

    #[test]
    fn test_video_summary_written_next_to_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AnalysisConfig::default();
        config.video.output_path = dir.path().to_path_buf();

        let analysis = analyzed_video("demo", &config);
        let generator = ReportGenerator::new(&config).unwrap();
        let summary_path = generator.generate_video_summary(&analysis).unwrap();

        assert_eq!(
            summary_path,
            dir.path().join("frames").join("demo").join("video_summary.json")
        );
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&summary_path).unwrap()).unwrap();
        assert_eq!(parsed["analysis_summary"]["video_name"], "demo");
        assert_eq!(parsed["detection_timeline"].as_array().unwrap().len(), 3);
    }
}
