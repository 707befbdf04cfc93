use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::analyzers::animals::AnimalDetection;
use crate::analyzers::behavior::BehaviorAnalysis;
use crate::analyzers::environment::EnvironmentAnalysis;
use crate::analyzers::human::HumanAnalysis;
use crate::analyzers::medical::MedicalAnalysis;
use crate::analyzers::objects::ObjectDetection;
use crate::config::AnalysisToggles;

/// 统一假定帧率：真实帧率未知时，时间戳一律按该帧率推导
pub const ASSUMED_FPS: f64 = 30.0;

/// 单个分析类别在某一帧上的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameEntry<T> {
    /// 帧编号（从 0 开始）
    pub frame: usize,
    /// 推导时间戳（秒）＝ 帧编号 / 假定帧率
    pub timestamp: f64,
    /// 该类别的分析载荷
    pub data: T,
}

impl<T> FrameEntry<T> {
    pub fn new(frame: usize, data: T) -> Self {
        Self {
            frame,
            timestamp: frame as f64 / ASSUMED_FPS,
            data,
        }
    }
}

/// 视频分辨率
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// 视频文件信息：文件系统事实 + 基于文件大小的粗略估计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub file_path: String,
    pub file_name: String,
    pub file_extension: String,
    pub file_size_bytes: u64,
    pub file_size_mb: f64,
    pub modification_time: String,
    /// 文件前 1MiB 的 SHA-1，读取失败时为 "unknown"
    pub file_hash: String,
    /// 估计时长（秒），由文件大小推算，限定在 5~300 秒
    pub duration_seconds: f64,
    pub fps: f64,
    pub total_frames: u64,
    pub resolution: Resolution,
    pub codec: String,
    pub bitrate_kbps: u64,
    pub aspect_ratio: String,
    /// 提取方式标记（当前恒为 simulated）
    pub extraction_method: String,
    pub frame_skip: u32,
}

/// 单次分析的元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMeta {
    pub analysis_start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_end_time: Option<String>,
    pub video_path: String,
    pub video_name: String,
    pub analysis_config: AnalysisToggles,
    pub total_frames_processed: usize,
    pub analysis_success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// 单帧各类别的分析结果集合，由流水线逐帧填充后并入 [`VideoAnalysis`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct FrameObservations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub human: Option<HumanAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objects: Option<ObjectDetection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animals: Option<AnimalDetection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical: Option<MedicalAnalysis>,
}

/// 单个视频的完整分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_info: Option<VideoInfo>,
    pub human: Vec<FrameEntry<HumanAnalysis>>,
    pub objects: Vec<FrameEntry<ObjectDetection>>,
    pub animals: Vec<FrameEntry<AnimalDetection>>,
    pub environment: Vec<FrameEntry<EnvironmentAnalysis>>,
    pub medical: Vec<FrameEntry<MedicalAnalysis>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<BehaviorAnalysis>,
    pub meta: AnalysisMeta,
}

impl VideoAnalysis {
    /// 创建一次新分析的空结果结构
    pub fn new(video_path: &Path, analysis_config: AnalysisToggles) -> Self {
        Self {
            video_info: None,
            human: Vec::new(),
            objects: Vec::new(),
            animals: Vec::new(),
            environment: Vec::new(),
            medical: Vec::new(),
            behavior: None,
            meta: AnalysisMeta {
                analysis_start_time: Local::now().to_rfc3339(),
                analysis_end_time: None,
                video_path: video_path.to_string_lossy().to_string(),
                video_name: video_stem(video_path),
                analysis_config,
                total_frames_processed: 0,
                analysis_success: false,
                error_message: None,
            },
        }
    }

    /// 视频级失败的降级结果：标记失败并记录错误信息，不中断批处理
    pub fn failed(video_path: &Path, analysis_config: AnalysisToggles, error: &str) -> Self {
        let mut analysis = Self::new(video_path, analysis_config);
        analysis.meta.analysis_end_time = Some(Local::now().to_rfc3339());
        analysis.meta.analysis_success = false;
        analysis.meta.error_message = Some(error.to_string());
        analysis
    }

    /// 将单帧结果按类别并入，保持帧顺序
    pub fn accumulate(&mut self, frame_index: usize, observations: FrameObservations) {
        if let Some(data) = observations.human {
            self.human.push(FrameEntry::new(frame_index, data));
        }
        if let Some(data) = observations.objects {
            self.objects.push(FrameEntry::new(frame_index, data));
        }
        if let Some(data) = observations.animals {
            self.animals.push(FrameEntry::new(frame_index, data));
        }
        if let Some(data) = observations.environment {
            self.environment.push(FrameEntry::new(frame_index, data));
        }
        if let Some(data) = observations.medical {
            self.medical.push(FrameEntry::new(frame_index, data));
        }
    }

    /// 标记分析成功完成
    pub fn finish(&mut self, total_frames: usize) {
        self.meta.analysis_end_time = Some(Local::now().to_rfc3339());
        self.meta.total_frames_processed = total_frames;
        self.meta.analysis_success = true;
    }

    /// 累计检出人数
    pub fn people_count(&self) -> u32 {
        self.human.iter().map(|e| e.data.people_detected).sum()
    }

    /// 累计检出物体数
    pub fn objects_count(&self) -> u32 {
        self.objects.iter().map(|e| e.data.total_objects).sum()
    }

    /// 累计检出动物数
    pub fn animals_count(&self) -> u32 {
        self.animals.iter().map(|e| e.data.total_animals).sum()
    }

    /// 检出解剖区域的帧数
    pub fn medical_region_count(&self) -> u32 {
        self.medical
            .iter()
            .filter(|e| e.data.region_detected)
            .count() as u32
    }
}

/// 一次批处理运行中所有视频的结果，键为视频文件名（不含扩展名）
pub type RunResults = BTreeMap<String, VideoAnalysis>;

/// 视频文件名（不含扩展名），无法解析时回退为完整路径
pub fn video_stem(video_path: &Path) -> String {
    video_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| video_path.to_string_lossy().to_string())
}
