use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::frame_extractor::Frame;

/// 单只动物的明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedAnimal {
    pub species: String,
    pub bbox: [u32; 4],
    pub confidence: f64,
}

/// 动物检测结果：占位基线为「未检出任何动物」
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimalDetection {
    pub total_animals: u32,
    pub species_detected: Vec<String>,
    pub detailed_animals: Vec<DetectedAnimal>,
    pub behavior_notes: Vec<String>,
}

/// 动物检测器（占位实现）
pub struct AnimalDetector;

impl AnimalDetector {
    pub fn new(_config: &AnalysisConfig) -> Self {
        Self
    }

    /// 占位实现：返回固定载荷，不读取帧内容
    pub fn detect_animals(&self, _frame: &Frame) -> AnimalDetection {
        AnimalDetection {
            total_animals: 0,
            species_detected: Vec::new(),
            detailed_animals: Vec::new(),
            behavior_notes: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_is_empty() {
        let detector = AnimalDetector::new(&AnalysisConfig::default());
        let frame = Frame {
            index: 3,
            width: 8,
            height: 8,
            image: image::RgbImage::new(8, 8),
        };

        let result = detector.detect_animals(&frame);
        assert_eq!(result.total_animals, 0);
        assert!(result.species_detected.is_empty());
        assert!(result.detailed_animals.is_empty());
        assert_eq!(result, detector.detect_animals(&frame));
    }
}
