use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::AnalysisConfig;
use crate::results::VideoAnalysis;

const CANVAS_WIDTH: u32 = 960;
const CANVAS_HEIGHT: u32 = 720;

const COLOR_BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const COLOR_FRAME: Rgb<u8> = Rgb([60, 60, 60]);
const COLOR_BAR_HUMAN: Rgb<u8> = Rgb([46, 134, 193]);
const COLOR_BAR_OBJECT: Rgb<u8> = Rgb([231, 76, 60]);
const COLOR_BAR_ANIMAL: Rgb<u8> = Rgb([39, 174, 96]);
const COLOR_BAR_MEDICAL: Rgb<u8> = Rgb([155, 89, 182]);
const COLOR_ACTIVITY: Rgb<u8> = Rgb([241, 196, 15]);

/// 图表生成器
///
/// 所有图表仅用矩形与色带绘制，不渲染文字，避免捆绑字体文件。
/// 图表的含义由文件名与报告中的统计数字对应。
pub struct VisualizationManager {
    viz_dir: PathBuf,
}

impl VisualizationManager {
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let viz_dir = config.video.output_path.join("visualizations");
        fs::create_dir_all(&viz_dir)
            .with_context(|| format!("创建可视化目录失败: {}", viz_dir.display()))?;

        Ok(Self { viz_dir })
    }

    /// 分析仪表盘：四类检测总量的柱状图 + 底部活动强度条带
    pub fn create_analysis_dashboard(&self, analysis: &VideoAnalysis) -> Result<PathBuf> {
        let mut canvas = blank_canvas();

        let counts = [
            (analysis.people_count(), COLOR_BAR_HUMAN),
            (analysis.objects_count(), COLOR_BAR_OBJECT),
            (analysis.animals_count(), COLOR_BAR_ANIMAL),
            (analysis.medical_region_count(), COLOR_BAR_MEDICAL),
        ];
        let max_count = counts.iter().map(|(c, _)| *c).max().unwrap_or(0).max(1);

        // 柱状图区域：上方 2/3
        let chart_bottom = 480i32;
        let bar_width = 120u32;
        for (i, (count, color)) in counts.iter().enumerate() {
            let height = (*count as f64 / max_count as f64 * 400.0) as u32;
            let x = 100 + i as i32 * 200;
            if height > 0 {
                let rect = Rect::at(x, chart_bottom - height as i32).of_size(bar_width, height);
                draw_filled_rect_mut(&mut canvas, rect, *color);
            }
            let outline = Rect::at(x, chart_bottom - 400).of_size(bar_width, 400);
            draw_hollow_rect_mut(&mut canvas, outline, COLOR_FRAME);
        }

        // 活动强度条带：每帧一格，按行为时间线的活动水平填充高度
        if let Some(behavior) = &analysis.behavior {
            let points = &behavior.behavior_timeline;
            if !points.is_empty() {
                let cell_width = (CANVAS_WIDTH - 120) / points.len().max(1) as u32;
                for (i, point) in points.iter().enumerate() {
                    let height = (point.activity_level.clamp(0.0, 1.0) * 120.0) as u32;
                    if height > 0 && cell_width > 0 {
                        let rect = Rect::at(60 + i as i32 * cell_width as i32, 680 - height as i32)
                            .of_size(cell_width.max(1), height);
                        draw_filled_rect_mut(&mut canvas, rect, COLOR_ACTIVITY);
                    }
                }
            }
        }

        draw_hollow_rect_mut(
            &mut canvas,
            Rect::at(0, 0).of_size(CANVAS_WIDTH, CANVAS_HEIGHT),
            COLOR_FRAME,
        );

        let path = self
            .viz_dir
            .join(format!("{}_dashboard.png", analysis.meta.video_name));
        save_canvas(&canvas, &path)?;
        info!("📈 仪表盘已生成: {}", path.display());
        Ok(path)
    }

    /// 检测热力图：时间分桶 × 检测类别的网格，颜色从黄到红表示密度
    ///
    /// 没有任何逐帧记录时返回 `None`
    pub fn create_detection_heatmap(&self, analysis: &VideoAnalysis) -> Result<Option<PathBuf>> {
        let max_frame = [
            analysis.human.last().map(|e| e.frame),
            analysis.objects.last().map(|e| e.frame),
            analysis.animals.last().map(|e| e.frame),
            analysis.medical.last().map(|e| e.frame),
        ]
        .into_iter()
        .flatten()
        .max();

        let max_frame = match max_frame {
            Some(f) => f,
            None => return Ok(None),
        };

        const BUCKETS: usize = 10;
        let bucket_of = |frame: usize| -> usize {
            (frame * BUCKETS / (max_frame + 1)).min(BUCKETS - 1)
        };

        // 行依次为人体、物体、动物、医学
        let mut grid = [[0u32; BUCKETS]; 4];
        for entry in &analysis.human {
            grid[0][bucket_of(entry.frame)] += entry.data.people_detected;
        }
        for entry in &analysis.objects {
            grid[1][bucket_of(entry.frame)] += entry.data.total_objects;
        }
        for entry in &analysis.animals {
            grid[2][bucket_of(entry.frame)] += entry.data.total_animals;
        }
        for entry in &analysis.medical {
            if entry.data.region_detected {
                grid[3][bucket_of(entry.frame)] += 1;
            }
        }
        let max_cell = grid.iter().flatten().copied().max().unwrap_or(0).max(1);

        let mut canvas = blank_canvas();
        let cell_width = (CANVAS_WIDTH - 120) / BUCKETS as u32;
        let cell_height = 120u32;
        for (row, categories) in grid.iter().enumerate() {
            for (col, &value) in categories.iter().enumerate() {
                let x = 60 + col as i32 * cell_width as i32;
                let y = 80 + row as i32 * (cell_height as i32 + 20);
                let rect = Rect::at(x, y).of_size(cell_width, cell_height);
                if value > 0 {
                    draw_filled_rect_mut(
                        &mut canvas,
                        rect,
                        heat_color(value as f64 / max_cell as f64),
                    );
                }
                draw_hollow_rect_mut(&mut canvas, rect, COLOR_FRAME);
            }
        }

        let path = self
            .viz_dir
            .join(format!("{}_detection_heatmap.png", analysis.meta.video_name));
        save_canvas(&canvas, &path)?;
        info!("📈 热力图已生成: {}", path.display());
        Ok(Some(path))
    }

    /// 医学分析图：健康评分柱 + 逐帧置信度条带
    ///
    /// 没有医学记录时返回 `None`
    pub fn create_medical_analysis_chart(
        &self,
        analysis: &VideoAnalysis,
    ) -> Result<Option<PathBuf>> {
        if analysis.medical.is_empty() {
            return Ok(None);
        }

        let mut canvas = blank_canvas();

        // 取首帧的医学载荷画评分柱（载荷恒定，任意帧等价）
        let first = &analysis.medical[0].data;
        let mut scores = vec![
            first.detection_confidence,
            first.shape_analysis.symmetry_score,
            first.skin_analysis.condition_score,
            first.symmetry_analysis.overall_symmetry_score,
        ];
        if let Some(health) = &first.health_assessment {
            scores.push(health.overall_health_score);
        }

        let bar_width = 100u32;
        let chart_bottom = 440i32;
        for (i, score) in scores.iter().enumerate() {
            let height = (score.clamp(0.0, 1.0) * 360.0) as u32;
            let x = 80 + i as i32 * 160;
            if height > 0 {
                let rect = Rect::at(x, chart_bottom - height as i32).of_size(bar_width, height);
                draw_filled_rect_mut(&mut canvas, rect, COLOR_BAR_MEDICAL);
            }
            let outline = Rect::at(x, chart_bottom - 360).of_size(bar_width, 360);
            draw_hollow_rect_mut(&mut canvas, outline, COLOR_FRAME);
        }

        // 逐帧检测置信度条带
        let cell_width = (CANVAS_WIDTH - 120) / analysis.medical.len().max(1) as u32;
        for (i, entry) in analysis.medical.iter().enumerate() {
            let height = (entry.data.detection_confidence.clamp(0.0, 1.0) * 160.0) as u32;
            if height > 0 && cell_width > 0 {
                let rect = Rect::at(60 + i as i32 * cell_width as i32, 660 - height as i32)
                    .of_size(cell_width.max(1), height);
                draw_filled_rect_mut(&mut canvas, rect, heat_color(entry.data.detection_confidence));
            }
        }

        let path = self
            .viz_dir
            .join(format!("{}_medical_analysis.png", analysis.meta.video_name));
        save_canvas(&canvas, &path)?;
        info!("📈 医学分析图已生成: {}", path.display());
        Ok(Some(path))
    }

    /// 摘要信息图：四类统计的带框色块，块的填充比例对应相对数量
    pub fn create_summary_infographic(&self, analysis: &VideoAnalysis) -> Result<PathBuf> {
        let mut canvas = blank_canvas();

        let counts = [
            (analysis.people_count(), COLOR_BAR_HUMAN),
            (analysis.objects_count(), COLOR_BAR_OBJECT),
            (analysis.animals_count(), COLOR_BAR_ANIMAL),
            (analysis.medical_region_count(), COLOR_BAR_MEDICAL),
        ];
        let max_count = counts.iter().map(|(c, _)| *c).max().unwrap_or(0).max(1);

        for (i, (count, color)) in counts.iter().enumerate() {
            let row = i as i32 / 2;
            let col = i as i32 % 2;
            let x = 80 + col * 440;
            let y = 80 + row * 320;

            let block = Rect::at(x, y).of_size(360, 240);
            draw_hollow_rect_mut(&mut canvas, block, COLOR_FRAME);

            let fill_width = (*count as f64 / max_count as f64 * 352.0) as u32;
            if fill_width > 0 {
                let fill = Rect::at(x + 4, y + 4).of_size(fill_width, 232);
                draw_filled_rect_mut(&mut canvas, fill, *color);
            }
        }

        let path = self
            .viz_dir
            .join(format!("{}_infographic.png", analysis.meta.video_name));
        save_canvas(&canvas, &path)?;
        info!("📈 摘要信息图已生成: {}", path.display());
        Ok(path)
    }
}

fn blank_canvas() -> RgbImage {
    RgbImage::from_pixel(CANVAS_WIDTH, CANVAS_HEIGHT, COLOR_BACKGROUND)
}

fn save_canvas(canvas: &RgbImage, path: &Path) -> Result<()> {
    canvas
        .save(path)
        .with_context(|| format!("保存图表失败: {}", path.display()))
}

/// 黄到红的颜色渐变，t 取 0~1
fn heat_color(t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    let start = (255.0, 237.0, 160.0);
    let end = (189.0, 0.0, 38.0);
    Rgb([
        (start.0 + (end.0 - start.0) * t) as u8,
        (start.1 + (end.1 - start.1) * t) as u8,
        (start.2 + (end.2 - start.2) * t) as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::human::HumanAnalyzer;
    use crate::analyzers::medical::MedicalAnalyzer;
    use crate::analyzers::objects::ObjectDetector;
    use crate::frame_extractor::Frame;
    use crate::results::FrameObservations;
    use std::path::PathBuf;

    fn analyzed_video(config: &AnalysisConfig) -> VideoAnalysis {
        let human = HumanAnalyzer::new(config);
        let objects = ObjectDetector::new(config);
        let medical = MedicalAnalyzer::new(config);
        let mut analysis = VideoAnalysis::new(
            &PathBuf::from("videos/input/demo.mp4"),
            config.analysis.clone(),
        );

        for i in 0..5 {
            let frame = Frame {
                index: i,
                width: 4,
                height: 4,
                image: image::RgbImage::new(4, 4),
            };
            let observations = FrameObservations {
                human: Some(human.analyze_frame(&frame)),
                objects: Some(objects.detect_objects(&frame)),
                medical: Some(medical.analyze_anatomical_region(&frame)),
                ..Default::default()
            };
            analysis.accumulate(i, observations);
        }
        analysis.finish(5);
        analysis
    }

    #[test]
    fn test_dashboard_and_infographic_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AnalysisConfig::default();
        config.video.output_path = dir.path().to_path_buf();

        let analysis = analyzed_video(&config);
        let viz = VisualizationManager::new(&config).unwrap();

        let dashboard = viz.create_analysis_dashboard(&analysis).unwrap();
        assert!(dashboard.exists());
        assert_eq!(
            dashboard,
            dir.path().join("visualizations").join("demo_dashboard.png")
        );

        let infographic = viz.create_summary_infographic(&analysis).unwrap();
        assert!(infographic.exists());
    }

    #[test]
    fn test_heatmap_skipped_without_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AnalysisConfig::default();
        config.video.output_path = dir.path().to_path_buf();

        let empty = VideoAnalysis::new(
            &PathBuf::from("videos/input/empty.mp4"),
            config.analysis.clone(),
        );
        let viz = VisualizationManager::new(&config).unwrap();
        assert!(viz.create_detection_heatmap(&empty).unwrap().is_none());
        assert!(viz.create_medical_analysis_chart(&empty).unwrap().is_none());
    }

    #[test]
    fn test_heatmap_and_medical_chart_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AnalysisConfig::default();
        config.video.output_path = dir.path().to_path_buf();

        let analysis = analyzed_video(&config);
        let viz = VisualizationManager::new(&config).unwrap();

        let heatmap = viz.create_detection_heatmap(&analysis).unwrap();
        assert!(heatmap.unwrap().exists());
        let medical = viz.create_medical_analysis_chart(&analysis).unwrap();
        assert!(medical.unwrap().exists());
    }
}
