use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::analyzers::{
    AnimalDetector, BehaviorAnalyzer, EnvironmentAnalyzer, HumanAnalyzer, MedicalAnalyzer,
    ObjectDetector,
};
use crate::annotator::FrameAnnotator;
use crate::config::AnalysisConfig;
use crate::frame_extractor::{Frame, FrameExtractor};
use crate::report::ReportGenerator;
use crate::results::{FrameObservations, RunResults, VideoAnalysis};
use crate::visualization::VisualizationManager;

/// 一次批处理运行的汇总
#[derive(Debug)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// 是否因中断信号提前停止
    pub interrupted: bool,
    pub results: RunResults,
    /// 汇总报告路径（仅在分析了多个视频时生成）
    pub consolidated_report: Option<PathBuf>,
}

/// 视频分析流水线
///
/// 串起提取、逐帧分析、行为分析、标注、报告和图表各环节。
/// 错误分三级处理：单帧失败记日志后跳过；单视频失败记为降级结果继续批处理；
/// 只有输入目录不可读这类环境问题才让整次运行失败。
pub struct AnalysisPipeline {
    config: AnalysisConfig,
    extractor: FrameExtractor,
    human: HumanAnalyzer,
    objects: ObjectDetector,
    animals: AnimalDetector,
    environment: EnvironmentAnalyzer,
    medical: MedicalAnalyzer,
    behavior: BehaviorAnalyzer,
    annotator: FrameAnnotator,
    reports: ReportGenerator,
    visualizer: VisualizationManager,
    interrupted: Arc<AtomicBool>,
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        Self::setup_directories(&config)?;

        Ok(Self {
            extractor: FrameExtractor::new(&config)?,
            human: HumanAnalyzer::new(&config),
            objects: ObjectDetector::new(&config),
            animals: AnimalDetector::new(&config),
            environment: EnvironmentAnalyzer::new(&config),
            medical: MedicalAnalyzer::new(&config),
            behavior: BehaviorAnalyzer::new(&config),
            annotator: FrameAnnotator::new(&config)?,
            reports: ReportGenerator::new(&config)?,
            visualizer: VisualizationManager::new(&config)?,
            interrupted: Arc::new(AtomicBool::new(false)),
            config,
        })
    }

    /// 中断标志。置位后流水线在下一个视频开始前停止
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    /// 创建输入目录与输出目录树
    fn setup_directories(config: &AnalysisConfig) -> Result<()> {
        fs::create_dir_all(&config.video.input_path).with_context(|| {
            format!("创建输入目录失败: {}", config.video.input_path.display())
        })?;
        for subdir in ["reports", "frames", "visualizations", "metadata"] {
            let dir = config.video.output_path.join(subdir);
            fs::create_dir_all(&dir)
                .with_context(|| format!("创建输出目录失败: {}", dir.display()))?;
        }
        Ok(())
    }

    /// 扫描输入目录中受支持的视频文件，按文件名排序
    pub fn discover_videos(&self) -> Result<Vec<PathBuf>> {
        let input_dir = &self.config.video.input_path;
        let entries = fs::read_dir(input_dir)
            .with_context(|| format!("读取输入目录失败: {}", input_dir.display()))?;

        let formats: Vec<String> = self
            .config
            .video
            .supported_formats
            .iter()
            .map(|f| f.to_lowercase())
            .collect();

        let mut videos = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("读取输入目录失败: {}", input_dir.display()))?
                .path();
            if !path.is_file() {
                continue;
            }
            let Some(extension) = path.extension() else {
                continue;
            };
            let dotted = format!(".{}", extension.to_string_lossy().to_lowercase());
            if formats.contains(&dotted) {
                videos.push(path);
            }
        }

        videos.sort();
        videos.dedup();
        Ok(videos)
    }

    /// 运行整个批处理
    pub async fn run(&self) -> Result<RunSummary> {
        let videos = self.discover_videos()?;
        if videos.is_empty() {
            warn!(
                "⚠️ 输入目录中没有受支持的视频文件: {}",
                self.config.video.input_path.display()
            );
        } else {
            info!("📋 发现 {} 个视频文件", videos.len());
        }

        let mut results = RunResults::new();
        let mut interrupted = false;

        for video in &videos {
            if self.interrupted.load(Ordering::SeqCst) {
                warn!("⚠️ 收到中断信号，停止处理剩余视频");
                interrupted = true;
                break;
            }

            info!("🎬 开始分析视频: {}", video.display());
            let analysis = self.analyze_video(video).await;
            self.emit_video_outputs(&analysis);

            if analysis.meta.analysis_success {
                info!(
                    "✅ 视频分析完成: {} ({} 帧)",
                    analysis.meta.video_name, analysis.meta.total_frames_processed
                );
            } else {
                error!(
                    "❌ 视频分析失败: {}: {}",
                    analysis.meta.video_name,
                    analysis.meta.error_message.as_deref().unwrap_or("未知错误")
                );
            }
            results.insert(analysis.meta.video_name.clone(), analysis);
        }

        let succeeded = results
            .values()
            .filter(|a| a.meta.analysis_success)
            .count();
        let failed = results.len() - succeeded;

        // 成功的视频超过一个才值得汇总；中断时也尽量把已有结果汇总出去
        let consolidated_report = if succeeded > 1 {
            match self.reports.generate_consolidated_report(&results) {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("⚠️ 汇总报告生成失败: {:#}", e);
                    None
                }
            }
        } else {
            None
        };
        info!("📊 批处理结束: 成功 {} 个，失败 {} 个", succeeded, failed);

        Ok(RunSummary {
            succeeded,
            failed,
            interrupted,
            results,
            consolidated_report,
        })
    }

    /// 分析单个视频。任何失败都转化为降级结果，不中断批处理
    pub async fn analyze_video(&self, video_path: &Path) -> VideoAnalysis {
        let toggles = self.config.analysis.clone();

        let frames = match self.extractor.extract_frames(video_path) {
            Ok(frames) => frames,
            Err(e) => {
                error!("❌ 帧提取失败: {}: {:#}", video_path.display(), e);
                return VideoAnalysis::failed(video_path, toggles, &format!("{:#}", e));
            }
        };

        let mut analysis = VideoAnalysis::new(video_path, toggles);
        match self.extractor.video_info(video_path) {
            Ok(info) => analysis.video_info = Some(info),
            Err(e) => warn!("⚠️ 视频信息收集失败: {:#}", e),
        }

        // 没有帧可分析时直接按成功收尾，各类别保持为空
        if frames.is_empty() {
            analysis.finish(0);
            return analysis;
        }

        let video_name = analysis.meta.video_name.clone();
        for frame in &frames {
            if let Err(e) = self.process_frame(frame, &video_name, &mut analysis) {
                warn!("⚠️ 第 {} 帧处理失败，已跳过: {:#}", frame.index, e);
            }
        }

        if self.config.analysis.behavior_analysis {
            analysis.behavior = Some(self.behavior.analyze_behavior(&frames, &analysis));
        }

        analysis.finish(frames.len());
        analysis
    }

    /// 按开关运行各分析器并保存标注帧
    fn process_frame(
        &self,
        frame: &Frame,
        video_name: &str,
        analysis: &mut VideoAnalysis,
    ) -> Result<()> {
        let toggles = &self.config.analysis;
        let mut observations = FrameObservations::default();

        if toggles.human_detection {
            observations.human = Some(self.human.analyze_frame(frame));
        }
        if toggles.object_detection {
            observations.objects = Some(self.objects.detect_objects(frame));
        }
        if toggles.animal_detection {
            observations.animals = Some(self.animals.detect_animals(frame));
        }
        if toggles.environment_analysis {
            observations.environment = Some(self.environment.analyze_environment(frame));
        }
        if toggles.medical_analysis {
            observations.medical = Some(self.medical.analyze_anatomical_region(frame));
        }

        if self.config.output.save_frames {
            self.annotator
                .save_annotated_frame(frame, &observations, video_name)?;
        }

        analysis.accumulate(frame.index, observations);
        Ok(())
    }

    /// 报告与图表均为非致命产物，失败只记日志
    fn emit_video_outputs(&self, analysis: &VideoAnalysis) {
        if self.config.output.generate_report {
            if let Err(e) = self.reports.generate_report(analysis) {
                warn!("⚠️ 报告生成失败: {}: {:#}", analysis.meta.video_name, e);
            }
            if let Err(e) = self.reports.generate_video_summary(analysis) {
                warn!("⚠️ 视频摘要生成失败: {}: {:#}", analysis.meta.video_name, e);
            }
        }

        if self.config.output.create_visualizations && analysis.meta.analysis_success {
            if let Err(e) = self.visualizer.create_analysis_dashboard(analysis) {
                warn!("⚠️ 仪表盘生成失败: {}: {:#}", analysis.meta.video_name, e);
            }
            if let Err(e) = self.visualizer.create_detection_heatmap(analysis) {
                warn!("⚠️ 热力图生成失败: {}: {:#}", analysis.meta.video_name, e);
            }
            if let Err(e) = self.visualizer.create_medical_analysis_chart(analysis) {
                warn!("⚠️ 医学分析图生成失败: {}: {:#}", analysis.meta.video_name, e);
            }
            if let Err(e) = self.visualizer.create_summary_infographic(analysis) {
                warn!("⚠️ 摘要信息图生成失败: {}: {:#}", analysis.meta.video_name, e);
            }
        }
    }
}
