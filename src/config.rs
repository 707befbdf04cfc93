use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// 视频输入输出配置
#[derive(Debug, Clone)]
pub struct VideoConfig {
    /// 视频输入目录
    pub input_path: PathBuf,
    /// 输出根目录
    pub output_path: PathBuf,
    /// 支持的视频文件扩展名（带点，小写）
    pub supported_formats: Vec<String>,
    /// 帧跳采样间隔
    pub frame_skip: u32,
}

/// 各分析类别的开关
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisToggles {
    pub human_detection: bool,
    pub pose_estimation: bool,
    pub facial_analysis: bool,
    pub behavior_analysis: bool,
    pub object_detection: bool,
    pub animal_detection: bool,
    pub environment_analysis: bool,
    pub medical_analysis: bool,
}

/// 输出产物开关
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// 是否生成 JSON 报告
    pub generate_report: bool,
    /// 是否保存标注帧
    pub save_frames: bool,
    /// 是否生成图表可视化
    pub create_visualizations: bool,
    /// 详细日志（info 级别），关闭时仅 warn 及以上
    pub detailed_logging: bool,
}

/// 医学分析细节设置
#[derive(Debug, Clone)]
pub struct MedicalSettings {
    /// 分析细节级别：basic 或 comprehensive
    pub analysis_detail_level: String,
    /// 关注的解剖区域
    pub anatomical_regions: Vec<String>,
    /// 是否输出健康评估
    pub health_assessment: bool,
    /// 隐私模式：开启时不输出定量测量数据
    pub privacy_mode: bool,
    /// 是否使用医学术语描述
    pub medical_terminology: bool,
    /// 是否生成建议列表
    pub generate_recommendations: bool,
}

/// 完整分析配置
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    pub video: VideoConfig,
    pub analysis: AnalysisToggles,
    pub output: OutputConfig,
    pub medical: MedicalSettings,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("videos/input"),
            output_path: PathBuf::from("output"),
            supported_formats: [".mp4", ".avi", ".mov", ".mkv", ".wmv"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            frame_skip: 1,
        }
    }
}

impl Default for AnalysisToggles {
    fn default() -> Self {
        Self {
            human_detection: true,
            pose_estimation: true,
            facial_analysis: true,
            behavior_analysis: true,
            object_detection: true,
            animal_detection: true,
            environment_analysis: true,
            medical_analysis: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            generate_report: true,
            save_frames: true,
            create_visualizations: true,
            detailed_logging: true,
        }
    }
}

impl Default for MedicalSettings {
    fn default() -> Self {
        Self {
            analysis_detail_level: "comprehensive".to_string(),
            anatomical_regions: vec!["breast".to_string(), "general".to_string()],
            health_assessment: true,
            privacy_mode: true,
            medical_terminology: true,
            generate_recommendations: true,
        }
    }
}

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从多个源加载配置，优先级：命令行参数 > 环境变量 > 配置文件 > 默认值
    ///
    /// 配置文件缺失或不可读时静默回退到默认配置，不返回错误
    pub fn load(
        config_file: Option<&Path>,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
    ) -> AnalysisConfig {
        // 1. 先加载配置文件（如果存在且可读）
        let mut config = if let Some(config_path) = config_file {
            Self::load_from_file(config_path).unwrap_or_else(|e| {
                eprintln!("⚠️  读取配置文件失败，使用默认配置: {}", e);
                AnalysisConfig::default()
            })
        } else {
            Self::load_from_default_locations().unwrap_or_default()
        };

        // 2. 环境变量覆盖
        Self::apply_env(&mut config);

        // 3. 命令行参数覆盖
        if let Some(input) = input {
            config.video.input_path = input;
        }
        if let Some(output) = output {
            config.video.output_path = output;
        }

        config
    }

    /// 应用 VIDEO_ANALYZE_* 环境变量
    fn apply_env(config: &mut AnalysisConfig) {
        if let Some(input) = env::var_os("VIDEO_ANALYZE_INPUT_PATH") {
            config.video.input_path = PathBuf::from(input);
        }
        if let Some(output) = env::var_os("VIDEO_ANALYZE_OUTPUT_PATH") {
            config.video.output_path = PathBuf::from(output);
        }
        if let Ok(level) = env::var("VIDEO_ANALYZE_MEDICAL_DETAIL") {
            if !level.is_empty() {
                config.medical.analysis_detail_level = level;
            }
        }
    }

    /// 从INI配置文件加载配置
    fn load_from_file(config_path: &Path) -> Result<AnalysisConfig> {
        if !config_path.exists() {
            return Err(anyhow::anyhow!("配置文件不存在: {}", config_path.display()));
        }

        let mut ini = configparser::ini::Ini::new();
        ini.load(config_path)
            .map_err(|e| anyhow::anyhow!("读取配置文件失败: {}: {}", config_path.display(), e))?;

        let defaults = AnalysisConfig::default();

        let get_bool = |section: &str, key: &str, default: bool| -> bool {
            ini.getbool(section, key).ok().flatten().unwrap_or(default)
        };
        let get_list = |section: &str, key: &str| -> Option<Vec<String>> {
            ini.get(section, key).filter(|v| !v.is_empty()).map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
        };

        let video = VideoConfig {
            input_path: ini
                .get("video", "input_path")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.video.input_path),
            output_path: ini
                .get("video", "output_path")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.video.output_path),
            supported_formats: get_list("video", "supported_formats")
                .unwrap_or(defaults.video.supported_formats),
            frame_skip: ini
                .getuint("video", "frame_skip")
                .ok()
                .flatten()
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(defaults.video.frame_skip),
        };

        let analysis = AnalysisToggles {
            human_detection: get_bool("analysis", "human_detection", true),
            pose_estimation: get_bool("analysis", "pose_estimation", true),
            facial_analysis: get_bool("analysis", "facial_analysis", true),
            behavior_analysis: get_bool("analysis", "behavior_analysis", true),
            object_detection: get_bool("analysis", "object_detection", true),
            animal_detection: get_bool("analysis", "animal_detection", true),
            environment_analysis: get_bool("analysis", "environment_analysis", true),
            medical_analysis: get_bool("analysis", "medical_analysis", true),
        };

        let output = OutputConfig {
            generate_report: get_bool("output", "generate_report", true),
            save_frames: get_bool("output", "save_frames", true),
            create_visualizations: get_bool("output", "create_visualizations", true),
            detailed_logging: get_bool("output", "detailed_logging", true),
        };

        let medical = MedicalSettings {
            analysis_detail_level: ini
                .get("medical_settings", "analysis_detail_level")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.medical.analysis_detail_level),
            anatomical_regions: get_list("medical_settings", "anatomical_regions")
                .unwrap_or(defaults.medical.anatomical_regions),
            health_assessment: get_bool("medical_settings", "health_assessment", true),
            privacy_mode: get_bool("medical_settings", "privacy_mode", true),
            medical_terminology: get_bool("medical_settings", "medical_terminology", true),
            generate_recommendations: get_bool("medical_settings", "generate_recommendations", true),
        };

        Ok(AnalysisConfig {
            video,
            analysis,
            output,
            medical,
        })
    }

    /// 从默认位置加载配置文件
    fn load_from_default_locations() -> Result<AnalysisConfig> {
        // 1. 当前目录的 video-analyze.ini
        let current_dir_config = PathBuf::from("video-analyze.ini");
        if current_dir_config.exists() {
            return Self::load_from_file(&current_dir_config);
        }

        // 2. 当前目录的 .video-analyze.ini
        let hidden_config = PathBuf::from(".video-analyze.ini");
        if hidden_config.exists() {
            return Self::load_from_file(&hidden_config);
        }

        // 3. 用户主目录的 .video-analyze.ini
        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home).join(".video-analyze.ini");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        // 4. /etc/video-analyze.ini (Linux/macOS)
        let etc_config = PathBuf::from("/etc/video-analyze.ini");
        if etc_config.exists() {
            return Self::load_from_file(&etc_config);
        }

        Err(anyhow::anyhow!("未找到配置文件"))
    }

    /// 创建默认配置文件
    pub fn create_default_config(config_path: &Path) -> Result<()> {
        let defaults = AnalysisConfig::default();
        let mut ini = configparser::ini::Ini::new();

        ini.set(
            "video",
            "input_path",
            Some(defaults.video.input_path.to_string_lossy().to_string()),
        );
        ini.set(
            "video",
            "output_path",
            Some(defaults.video.output_path.to_string_lossy().to_string()),
        );
        ini.set(
            "video",
            "supported_formats",
            Some(defaults.video.supported_formats.join(",")),
        );
        ini.set("video", "frame_skip", Some("1".to_string()));

        for key in [
            "human_detection",
            "pose_estimation",
            "facial_analysis",
            "behavior_analysis",
            "object_detection",
            "animal_detection",
            "environment_analysis",
            "medical_analysis",
        ] {
            ini.set("analysis", key, Some("true".to_string()));
        }

        for key in [
            "generate_report",
            "save_frames",
            "create_visualizations",
            "detailed_logging",
        ] {
            ini.set("output", key, Some("true".to_string()));
        }

        ini.set(
            "medical_settings",
            "analysis_detail_level",
            Some(defaults.medical.analysis_detail_level),
        );
        ini.set(
            "medical_settings",
            "anatomical_regions",
            Some(defaults.medical.anatomical_regions.join(",")),
        );
        ini.set(
            "medical_settings",
            "health_assessment",
            Some("true".to_string()),
        );
        ini.set("medical_settings", "privacy_mode", Some("true".to_string()));
        ini.set(
            "medical_settings",
            "medical_terminology",
            Some("true".to_string()),
        );
        ini.set(
            "medical_settings",
            "generate_recommendations",
            Some("true".to_string()),
        );

        ini.write(config_path)
            .map_err(|e| anyhow::anyhow!("写入配置文件失败: {}: {}", config_path.display(), e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_file_falls_back_to_defaults() {
        // 不存在的配置文件不应报错，而是回退到默认配置
        let config = ConfigLoader::load(
            Some(Path::new("/nonexistent/video-analyze.ini")),
            None,
            None,
        );
        assert_eq!(config.video.input_path, PathBuf::from("videos/input"));
        assert_eq!(config.video.supported_formats.len(), 5);
        assert!(config.analysis.medical_analysis);
        assert!(config.output.generate_report);
        assert_eq!(config.medical.analysis_detail_level, "comprehensive");
    }

    #[test]
    fn test_unreadable_config_file_falls_back_to_defaults() {
        // 非 INI 内容也应回退到默认配置，不 panic
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ini");
        std::fs::write(&path, "\u{0}\u{1}这不是配置").unwrap();

        let config = ConfigLoader::load(Some(&path), None, None);
        assert!(config.analysis.human_detection);
    }

    #[test]
    fn test_write_and_reload_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video-analyze.ini");
        ConfigLoader::create_default_config(&path).unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        let defaults = AnalysisConfig::default();
        assert_eq!(
            config.video.supported_formats,
            defaults.video.supported_formats
        );
        assert_eq!(config.analysis, defaults.analysis);
        assert_eq!(
            config.medical.anatomical_regions,
            defaults.medical.anatomical_regions
        );
    }

    #[test]
    fn test_cli_arguments_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video-analyze.ini");
        ConfigLoader::create_default_config(&path).unwrap();

        let config = ConfigLoader::load(
            Some(&path),
            Some(PathBuf::from("/tmp/in")),
            Some(PathBuf::from("/tmp/out")),
        );
        assert_eq!(config.video.input_path, PathBuf::from("/tmp/in"));
        assert_eq!(config.video.output_path, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_oversized_frame_skip_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.ini");
        // 超出 u32 的值不截断，回退为默认值
        std::fs::write(&path, "[video]\nframe_skip = 99999999999\n").unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.video.frame_skip, 1);
    }

    #[test]
    fn test_partial_config_file_keeps_defaults_for_rest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.ini");
        std::fs::write(
            &path,
            "[analysis]\nmedical_analysis = false\n[output]\nsave_frames = false\n",
        )
        .unwrap();

        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert!(!config.analysis.medical_analysis);
        assert!(!config.output.save_frames);
        // 未出现的项保持默认
        assert!(config.analysis.human_detection);
        assert!(config.output.generate_report);
    }
}
