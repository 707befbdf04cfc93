use anyhow::{Context, Result};
use image::Rgb;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::frame_extractor::Frame;
use crate::results::{FrameObservations, ASSUMED_FPS};

/// 各类别标注框的颜色
const COLOR_PERSON: Rgb<u8> = Rgb([0, 255, 0]);
const COLOR_OBJECT: Rgb<u8> = Rgb([255, 0, 0]);
const COLOR_ANIMAL: Rgb<u8> = Rgb([0, 0, 255]);
const COLOR_MEDICAL: Rgb<u8> = Rgb([255, 0, 255]);

/// 缩略图每隔多少帧生成一张
const THUMBNAIL_INTERVAL: usize = 10;

/// 标注帧保存器：把检测结果画到帧上，连同逐帧 JSON 一起落盘
pub struct FrameAnnotator {
    frames_dir: PathBuf,
}

impl FrameAnnotator {
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let frames_dir = config.video.output_path.join("frames");
        fs::create_dir_all(&frames_dir)
            .with_context(|| format!("创建帧目录失败: {}", frames_dir.display()))?;

        Ok(Self { frames_dir })
    }

    /// 单个视频的帧输出目录
    pub fn video_dir(&self, video_name: &str) -> PathBuf {
        self.frames_dir.join(video_name)
    }

    /// 保存标注帧、逐帧分析 JSON，以及周期性缩略图
    pub fn save_annotated_frame(
        &self,
        frame: &Frame,
        observations: &FrameObservations,
        video_name: &str,
    ) -> Result<()> {
        let video_dir = self.video_dir(video_name);
        fs::create_dir_all(&video_dir)
            .with_context(|| format!("创建帧目录失败: {}", video_dir.display()))?;

        let mut annotated = frame.image.clone();
        self.draw_annotations(&mut annotated, observations);

        let frame_path = video_dir.join(format!("frame_{:06}_annotated.jpg", frame.index));
        annotated
            .save(&frame_path)
            .with_context(|| format!("保存标注帧失败: {}", frame_path.display()))?;

        self.write_frame_analysis(frame, observations, video_name, &video_dir)?;

        if frame.index % THUMBNAIL_INTERVAL == 0 {
            let thumbnail = image::imageops::thumbnail(&annotated, 160, 120);
            let thumb_path = video_dir.join(format!("frame_{:06}_thumb.jpg", frame.index));
            thumbnail
                .save(&thumb_path)
                .with_context(|| format!("保存缩略图失败: {}", thumb_path.display()))?;
        }

        debug!("🖼️ 标注帧已保存: {}", frame_path.display());
        Ok(())
    }

    fn draw_annotations(&self, image: &mut image::RgbImage, observations: &FrameObservations) {
        if let Some(human) = &observations.human {
            for i in 0..human.people_detected {
                let rect = Rect::at(50 + i as i32 * 120, 60).of_size(80, 160);
                draw_hollow_rect_mut(image, rect, COLOR_PERSON);
            }
        }

        if let Some(objects) = &observations.objects {
            for obj in &objects.detailed_objects {
                let [x, y, w, h] = obj.bbox;
                if w > 0 && h > 0 {
                    let rect = Rect::at(x as i32, y as i32).of_size(w, h);
                    draw_hollow_rect_mut(image, rect, COLOR_OBJECT);
                }
            }
        }

        if let Some(animals) = &observations.animals {
            for (i, _animal) in animals.detailed_animals.iter().take(3).enumerate() {
                let rect = Rect::at(300 + i as i32 * 80, 400).of_size(70, 50);
                draw_hollow_rect_mut(image, rect, COLOR_ANIMAL);
            }
        }

        if let Some(medical) = &observations.medical {
            if medical.region_detected {
                let rect = Rect::at(400, 100).of_size(200, 200);
                draw_hollow_rect_mut(image, rect, COLOR_MEDICAL);
            }
        }
    }

    /// 逐帧分析结果写为 JSON 侧车文件
    fn write_frame_analysis(
        &self,
        frame: &Frame,
        observations: &FrameObservations,
        video_name: &str,
        video_dir: &Path,
    ) -> Result<()> {
        let analysis_path = video_dir.join(format!("frame_{:06}_analysis.json", frame.index));
        let payload = serde_json::json!({
            "frame_metadata": {
                "frame_index": frame.index,
                "video_name": video_name,
                "timestamp": frame.index as f64 / ASSUMED_FPS,
                "dimensions": {
                    "height": frame.height,
                    "width": frame.width,
                    "channels": 3,
                },
            },
            "observations": observations,
        });

        fs::write(&analysis_path, serde_json::to_string_pretty(&payload)?)
            .with_context(|| format!("写入帧分析失败: {}", analysis_path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::human::HumanAnalyzer;
    use crate::analyzers::objects::ObjectDetector;

    fn test_frame(index: usize) -> Frame {
        Frame {
            index,
            width: 640,
            height: 480,
            image: image::RgbImage::new(640, 480),
        }
    }

    #[test]
    fn test_saves_frame_and_sidecar_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AnalysisConfig::default();
        config.video.output_path = dir.path().to_path_buf();

        let annotator = FrameAnnotator::new(&config).unwrap();
        let human = HumanAnalyzer::new(&config);
        let objects = ObjectDetector::new(&config);

        let frame = test_frame(3);
        let observations = FrameObservations {
            human: Some(human.analyze_frame(&frame)),
            objects: Some(objects.detect_objects(&frame)),
            ..Default::default()
        };

        annotator
            .save_annotated_frame(&frame, &observations, "demo")
            .unwrap();

        let video_dir = dir.path().join("frames").join("demo");
        assert!(video_dir.join("frame_000003_annotated.jpg").exists());
        assert!(video_dir.join("frame_000003_analysis.json").exists());
        // 第 3 帧不在缩略图周期上
        assert!(!video_dir.join("frame_000003_thumb.jpg").exists());

        let sidecar =
            std::fs::read_to_string(video_dir.join("frame_000003_analysis.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&sidecar).unwrap();
        assert_eq!(parsed["frame_metadata"]["frame_index"], 3);
        assert_eq!(parsed["frame_metadata"]["video_name"], "demo");
        assert_eq!(
            parsed["observations"]["human"]["people_detected"],
            1
        );
    }

    #[test]
    fn test_thumbnail_on_interval_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AnalysisConfig::default();
        config.video.output_path = dir.path().to_path_buf();

        let annotator = FrameAnnotator::new(&config).unwrap();
        let frame = test_frame(10);
        annotator
            .save_annotated_frame(&frame, &FrameObservations::default(), "demo")
            .unwrap();

        let video_dir = dir.path().join("frames").join("demo");
        assert!(video_dir.join("frame_000010_thumb.jpg").exists());
    }
}
