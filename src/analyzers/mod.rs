//! 各分析类别的占位分析器。
//!
//! 每个分析器对外呈现真实检测器的接口，但返回固定的字面量载荷，
//! 不读取帧的实际内容。载荷结构是稳定的：同一配置下任意两帧的结果完全相同。

pub mod animals;
pub mod behavior;
pub mod environment;
pub mod human;
pub mod medical;
pub mod objects;

pub use animals::{AnimalDetection, AnimalDetector};
pub use behavior::{BehaviorAnalysis, BehaviorAnalyzer};
pub use environment::{EnvironmentAnalysis, EnvironmentAnalyzer};
pub use human::{HumanAnalysis, HumanAnalyzer};
pub use medical::{MedicalAnalysis, MedicalAnalyzer};
pub use objects::{ObjectDetection, ObjectDetector};
