//! 批量视频分析流水线。
//!
//! 对输入目录中的每个视频：提取帧、运行各类别分析器、保存标注帧、
//! 生成 JSON 报告与图表，最后跨视频汇总。当前各分析器为占位实现，
//! 返回结构稳定的固定载荷，帧提取按文件大小合成噪声帧。

pub mod analyzers;
pub mod annotator;
pub mod config;
pub mod frame_extractor;
pub mod pipeline;
pub mod report;
pub mod results;
pub mod visualization;

pub use config::{AnalysisConfig, ConfigLoader};
pub use frame_extractor::{Frame, FrameExtractor};
pub use pipeline::{AnalysisPipeline, RunSummary};
pub use results::{RunResults, VideoAnalysis};
