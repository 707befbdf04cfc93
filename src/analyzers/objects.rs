use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::frame_extractor::Frame;

/// 按类别归档的物体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedObject {
    pub name: String,
    pub confidence: f64,
}

/// 带边界框的物体明细，bbox 为 [x, y, 宽, 高]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub class_name: String,
    pub bbox: [u32; 4],
    pub confidence: f64,
}

/// 空间分布分析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialAnalysis {
    pub density: String,
}

/// 场景上下文
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneContext {
    pub environment: String,
}

/// 物体检测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectDetection {
    pub total_objects: u32,
    pub categories: BTreeMap<String, Vec<CategorizedObject>>,
    pub detailed_objects: Vec<DetectedObject>,
    pub spatial_analysis: SpatialAnalysis,
    pub object_interactions: Vec<String>,
    pub scene_context: SceneContext,
}

/// 物体检测器（占位实现）
pub struct ObjectDetector;

impl ObjectDetector {
    pub fn new(_config: &AnalysisConfig) -> Self {
        Self
    }

    /// 占位实现：返回固定载荷，不读取帧内容
    pub fn detect_objects(&self, _frame: &Frame) -> ObjectDetection {
        let mut categories = BTreeMap::new();
        categories.insert(
            "furniture".to_string(),
            vec![CategorizedObject {
                name: "chair".to_string(),
                confidence: 0.9,
            }],
        );
        categories.insert(
            "electronics".to_string(),
            vec![CategorizedObject {
                name: "computer".to_string(),
                confidence: 0.8,
            }],
        );
        categories.insert(
            "miscellaneous".to_string(),
            vec![CategorizedObject {
                name: "unknown".to_string(),
                confidence: 0.5,
            }],
        );

        ObjectDetection {
            total_objects: 3,
            categories,
            detailed_objects: vec![
                DetectedObject {
                    class_name: "chair".to_string(),
                    bbox: [100, 100, 50, 80],
                    confidence: 0.9,
                },
                DetectedObject {
                    class_name: "computer".to_string(),
                    bbox: [200, 150, 60, 40],
                    confidence: 0.8,
                },
                DetectedObject {
                    class_name: "unknown".to_string(),
                    bbox: [300, 200, 30, 30],
                    confidence: 0.5,
                },
            ],
            spatial_analysis: SpatialAnalysis {
                density: "moderate".to_string(),
            },
            object_interactions: Vec::new(),
            scene_context: SceneContext {
                environment: "office".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_schema_is_fixed() {
        let detector = ObjectDetector::new(&AnalysisConfig::default());
        let frame = Frame {
            index: 0,
            width: 8,
            height: 8,
            image: image::RgbImage::new(8, 8),
        };

        let a = detector.detect_objects(&frame);
        let b = detector.detect_objects(&frame);
        assert_eq!(a, b);
        assert_eq!(a.total_objects, 3);
        assert_eq!(a.detailed_objects.len(), 3);
        assert_eq!(a.categories.len(), 3);
        assert_eq!(a.detailed_objects[0].class_name, "chair");
        assert_eq!(a.scene_context.environment, "office");
    }
}
