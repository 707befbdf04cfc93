use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::frame_extractor::Frame;
use crate::results::{VideoAnalysis, ASSUMED_FPS};

/// 行为时间线上的一个采样点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub timestamp: f64,
    pub frame_index: usize,
    pub activity_level: f64,
    pub interaction_count: u32,
}

/// 跨帧行为分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorAnalysis {
    pub behavior_timeline: Vec<TimelinePoint>,
    pub rhythm_detected: bool,
    pub average_velocity: f64,
    pub individual_behaviors: BTreeMap<String, f64>,
    pub dominant_emotions: BTreeMap<String, f64>,
    pub detected_activities: Vec<String>,
    pub statistical_anomalies: Vec<String>,
}

/// 行为分析器（占位实现）
///
/// 与逐帧分析器不同，行为分析跨整段视频运行一次。时间线从人体分析的
/// 逐帧记录推导；视频没有人体记录时退化为按帧编号采样。
pub struct BehaviorAnalyzer;

impl BehaviorAnalyzer {
    pub fn new(_config: &AnalysisConfig) -> Self {
        Self
    }

    /// 占位实现：时间线取自已累积的人体记录，聚合指标为固定字面量
    pub fn analyze_behavior(&self, frames: &[Frame], analysis: &VideoAnalysis) -> BehaviorAnalysis {
        let behavior_timeline: Vec<TimelinePoint> = if analysis.human.is_empty() {
            frames
                .iter()
                .map(|frame| TimelinePoint {
                    timestamp: frame.index as f64 / ASSUMED_FPS,
                    frame_index: frame.index,
                    activity_level: 0.5,
                    interaction_count: 1,
                })
                .collect()
        } else {
            analysis
                .human
                .iter()
                .map(|entry| TimelinePoint {
                    timestamp: entry.timestamp,
                    frame_index: entry.frame,
                    activity_level: 0.5,
                    interaction_count: 1,
                })
                .collect()
        };

        let mut individual_behaviors = BTreeMap::new();
        individual_behaviors.insert("standing".to_string(), 0.8);

        let mut dominant_emotions = BTreeMap::new();
        dominant_emotions.insert("neutral".to_string(), 0.7);

        BehaviorAnalysis {
            behavior_timeline,
            rhythm_detected: false,
            average_velocity: 0.2,
            individual_behaviors,
            dominant_emotions,
            detected_activities: Vec::new(),
            statistical_anomalies: Vec::new(),
        }
    }
}
