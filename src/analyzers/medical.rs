use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::frame_extractor::Frame;

/// 解剖结构定位结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDetection {
    pub detected: bool,
    pub center_x: u32,
    pub center_y: u32,
    pub confidence: f64,
}

/// 形态分析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeAnalysis {
    pub shape_type: String,
    pub symmetry_score: f64,
    pub proportion_score: f64,
    pub contour_regularity: f64,
}

/// 皮肤评估
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinAssessment {
    pub condition_score: f64,
    pub condition_category: String,
    pub texture_quality: String,
    pub moles_detected: u32,
    pub lesions_detected: bool,
    pub redness_detected: bool,
}

/// 对称性分析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetryAnalysis {
    pub bilateral_symmetry: f64,
    pub size_symmetry: f64,
    pub shape_symmetry: f64,
    pub position_symmetry: f64,
    pub overall_symmetry_score: f64,
}

/// 定量测量（隐私模式下不输出）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub nipple_diameter_mm: f64,
    pub areola_diameter_mm: f64,
    pub symmetry_index: f64,
}

/// 健康评估
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAssessment {
    pub overall_health_score: f64,
    pub health_category: String,
    pub risk_level: String,
    pub normal_indicators: Vec<String>,
    pub attention_indicators: Vec<String>,
    pub concern_indicators: Vec<String>,
}

/// 医学分析的元信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalMeta {
    pub analysis_version: String,
    pub analysis_type: String,
    pub detail_level: String,
    pub privacy_mode: bool,
}

/// 医学分析结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalAnalysis {
    pub region_detected: bool,
    pub detection_confidence: f64,
    pub nipple: RegionDetection,
    pub areola: RegionDetection,
    pub shape_analysis: ShapeAnalysis,
    pub skin_analysis: SkinAssessment,
    pub symmetry_analysis: SymmetryAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Measurements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_assessment: Option<HealthAssessment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_observations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
    pub analysis_metadata: MedicalMeta,
}

/// 医学分析器（占位实现）
///
/// 细节设置决定输出哪些可选部分：
/// - `analysis_detail_level = basic` 时省略逐条观察记录
/// - `privacy_mode` 开启时省略定量测量
/// - `generate_recommendations` 控制建议列表
pub struct MedicalAnalyzer {
    detail_level: String,
    health_assessment: bool,
    privacy_mode: bool,
    medical_terminology: bool,
    generate_recommendations: bool,
}

impl MedicalAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            detail_level: config.medical.analysis_detail_level.clone(),
            health_assessment: config.medical.health_assessment,
            privacy_mode: config.medical.privacy_mode,
            medical_terminology: config.medical.medical_terminology,
            generate_recommendations: config.medical.generate_recommendations,
        }
    }

    /// 占位实现：返回固定载荷，不读取帧内容
    pub fn analyze_anatomical_region(&self, _frame: &Frame) -> MedicalAnalysis {
        let measurements = if self.privacy_mode {
            None
        } else {
            Some(Measurements {
                nipple_diameter_mm: 12.3,
                areola_diameter_mm: 34.7,
                symmetry_index: 0.91,
            })
        };

        let health_assessment = if self.health_assessment {
            Some(HealthAssessment {
                overall_health_score: 0.92,
                health_category: "normal_healthy".to_string(),
                risk_level: "low".to_string(),
                normal_indicators: vec![
                    "symmetric_shape".to_string(),
                    "normal_skin_color_and_texture".to_string(),
                    "no_visible_abnormalities".to_string(),
                    "no_discharge_detected".to_string(),
                    "no_lesions_detected".to_string(),
                ],
                attention_indicators: vec!["routine_monitoring_recommended".to_string()],
                concern_indicators: Vec::new(),
            })
        } else {
            None
        };

        let detailed_observations = if self.detail_level == "comprehensive" {
            Some(self.observations())
        } else {
            None
        };

        let recommendations = if self.generate_recommendations {
            Some(vec![
                "continue_monthly_self_examinations".to_string(),
                "maintain_regular_medical_checkups".to_string(),
                "follow_age_appropriate_screening_guidelines".to_string(),
                "report_any_new_symptoms_promptly".to_string(),
            ])
        } else {
            None
        };

        MedicalAnalysis {
            region_detected: true,
            detection_confidence: 0.87,
            nipple: RegionDetection {
                detected: true,
                center_x: 320,
                center_y: 280,
                confidence: 0.91,
            },
            areola: RegionDetection {
                detected: true,
                center_x: 320,
                center_y: 280,
                confidence: 0.88,
            },
            shape_analysis: ShapeAnalysis {
                shape_type: "normal_teardrop".to_string(),
                symmetry_score: 0.92,
                proportion_score: 0.88,
                contour_regularity: 0.91,
            },
            skin_analysis: SkinAssessment {
                condition_score: 0.91,
                condition_category: "healthy".to_string(),
                texture_quality: "smooth".to_string(),
                moles_detected: 2,
                lesions_detected: false,
                redness_detected: false,
            },
            symmetry_analysis: SymmetryAnalysis {
                bilateral_symmetry: 0.91,
                size_symmetry: 0.89,
                shape_symmetry: 0.93,
                position_symmetry: 0.87,
                overall_symmetry_score: 0.90,
            },
            measurements,
            health_assessment,
            detailed_observations,
            recommendations,
            analysis_metadata: MedicalMeta {
                analysis_version: "1.0.0".to_string(),
                analysis_type: "comprehensive_anatomical".to_string(),
                detail_level: self.detail_level.clone(),
                privacy_mode: self.privacy_mode,
            },
        }
    }

    fn observations(&self) -> Vec<String> {
        if self.medical_terminology {
            vec![
                "bilateral_anatomy_within_normal_limits".to_string(),
                "nipple_areola_complex_intact".to_string(),
                "overlying_skin_unremarkable".to_string(),
                "structural_integrity_maintained".to_string(),
            ]
        } else {
            vec![
                "anatomy_appears_normal".to_string(),
                "skin_appears_healthy".to_string(),
                "no_unusual_findings".to_string(),
            ]
        }
    }
}
