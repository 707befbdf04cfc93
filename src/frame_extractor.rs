use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use image::{Rgb, RgbImage};
use rand::Rng;
use sha1::{Digest, Sha1};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::results::{Resolution, VideoInfo, ASSUMED_FPS};

/// 合成帧的统一尺寸
const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

/// 计算文件哈希时读取的最大字节数
const HASH_SAMPLE_BYTES: usize = 1024 * 1024;

/// 一帧图像及其在视频中的编号
#[derive(Debug, Clone)]
pub struct Frame {
    /// 帧编号（从 0 开始，单次提取内连续）
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub image: RgbImage,
}

/// 帧提取器
///
/// 当前实现不解码真实视频流，而是按文件大小合成固定数量的噪声帧，
/// 供下游流水线验证。帧内容带梯度与色块，保证标注和图表有可见产物。
pub struct FrameExtractor {
    metadata_dir: PathBuf,
    frame_skip: u32,
}

impl FrameExtractor {
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        let metadata_dir = config.video.output_path.join("metadata");
        fs::create_dir_all(&metadata_dir).with_context(|| {
            format!("创建元数据目录失败: {}", metadata_dir.display())
        })?;

        Ok(Self {
            metadata_dir,
            frame_skip: config.video.frame_skip.max(1),
        })
    }

    /// 从视频文件提取帧序列
    ///
    /// 文件不存在或不可读时返回错误；空文件返回空帧序列，由上游决定后续处理
    pub fn extract_frames(&self, video_path: &Path) -> Result<Vec<Frame>> {
        info!("🎬 开始提取视频帧: {}", video_path.display());

        let metadata = fs::metadata(video_path)
            .with_context(|| format!("无法读取视频文件: {}", video_path.display()))?;

        let size_mb = metadata.len() as f64 / (1024.0 * 1024.0);
        if metadata.len() == 0 {
            warn!("⚠️ 视频文件为空，跳过帧提取: {}", video_path.display());
            return Ok(Vec::new());
        }

        // 帧编号始终连续；frame_skip 只记录在元数据中
        let frame_count = frame_count_for_size(size_mb);
        let mut frames = Vec::with_capacity(frame_count);
        for i in 0..frame_count {
            frames.push(self.synthesize_frame(i));
        }

        info!(
            "✅ 帧提取完成: {} 帧 ({:.1} MB)",
            frames.len(),
            size_mb
        );

        // 元数据写入失败不影响分析流程
        if let Err(e) = self.write_extraction_metadata(video_path, &frames) {
            warn!("⚠️ 提取元数据写入失败: {:#}", e);
        }

        Ok(frames)
    }

    /// 合成一帧：分层噪声 + 水平梯度 + 周期性色块
    fn synthesize_frame(&self, index: usize) -> Frame {
        let mut image = RgbImage::new(FRAME_WIDTH, FRAME_HEIGHT);
        let mut rng = rand::thread_rng();

        // 按帧编号轮换噪声亮度带，让相邻帧肉眼可分
        let (lo, hi): (u8, u8) = match index % 3 {
            0 => (100, 255),
            1 => (50, 200),
            _ => (20, 150),
        };

        for (x, _y, pixel) in image.enumerate_pixels_mut() {
            let gradient = (x as f64 / FRAME_WIDTH as f64 * 100.0) as u16;
            let mut channel = || {
                let noise = rng.gen_range(lo..=hi) as u16;
                (noise + gradient).min(255) as u8
            };
            *pixel = Rgb([channel(), channel(), channel()]);
        }

        // 周期性放置色块，模拟画面中的显著目标
        if index % 4 == 0 {
            fill_block(&mut image, 200..300, 100..200, Rgb([255, 200, 200]));
        }
        if index % 4 == 2 {
            fill_block(&mut image, 350..450, 150..250, Rgb([200, 255, 200]));
        }

        Frame {
            index,
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            image,
        }
    }

    /// 将提取摘要写入 metadata 目录
    fn write_extraction_metadata(&self, video_path: &Path, frames: &[Frame]) -> Result<()> {
        let stem = crate::results::video_stem(video_path);
        let metadata_path = self.metadata_dir.join(format!("{}_extraction.json", stem));

        let metadata = serde_json::json!({
            "video_path": video_path.to_string_lossy(),
            "extraction_method": "simulated",
            "extracted_at": Local::now().to_rfc3339(),
            "frame_count": frames.len(),
            "frame_width": FRAME_WIDTH,
            "frame_height": FRAME_HEIGHT,
            "frame_skip": self.frame_skip,
            "frame_indices": frames.iter().map(|f| f.index).collect::<Vec<_>>(),
        });

        fs::write(&metadata_path, serde_json::to_string_pretty(&metadata)?)
            .with_context(|| format!("写入提取元数据失败: {}", metadata_path.display()))?;
        debug!("📄 提取元数据已写入: {}", metadata_path.display());
        Ok(())
    }

    /// 收集视频文件信息：文件系统事实为准，流参数按文件大小估算
    pub fn video_info(&self, video_path: &Path) -> Result<VideoInfo> {
        let metadata = fs::metadata(video_path)
            .with_context(|| format!("无法读取视频文件: {}", video_path.display()))?;

        let file_size_bytes = metadata.len();
        let size_mb = file_size_bytes as f64 / (1024.0 * 1024.0);

        let modification_time = metadata
            .modified()
            .map(|t| DateTime::<Local>::from(t).to_rfc3339())
            .unwrap_or_else(|_| "unknown".to_string());

        // 估计时长：按大小线性推算，限定在 5~300 秒，保留一位小数
        let duration_seconds = ((size_mb * 0.8).clamp(5.0, 300.0) * 10.0).round() / 10.0;
        let total_frames = (duration_seconds * ASSUMED_FPS) as u64;

        let resolution = if size_mb > 100.0 {
            Resolution {
                width: 1920,
                height: 1080,
            }
        } else if size_mb > 50.0 {
            Resolution {
                width: 1280,
                height: 720,
            }
        } else {
            Resolution {
                width: 854,
                height: 480,
            }
        };

        let extension = video_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let codec = match extension.as_str() {
            "mp4" => "h264",
            "avi" => "xvid",
            "mov" => "h264",
            "mkv" => "h264",
            "wmv" => "wmv3",
            "webm" => "vp8",
            _ => "unknown",
        };

        let bitrate_kbps = if duration_seconds > 0.0 {
            (size_mb * 8.0 * 1024.0 / duration_seconds) as u64
        } else {
            0
        };

        Ok(VideoInfo {
            file_path: video_path.to_string_lossy().to_string(),
            file_name: video_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| video_path.to_string_lossy().to_string()),
            file_extension: extension,
            file_size_bytes,
            file_size_mb: (size_mb * 100.0).round() / 100.0,
            modification_time,
            file_hash: hash_file_head(video_path),
            duration_seconds,
            fps: ASSUMED_FPS,
            total_frames,
            resolution,
            codec: codec.to_string(),
            bitrate_kbps,
            aspect_ratio: "16:9".to_string(),
            extraction_method: "simulated".to_string(),
            frame_skip: self.frame_skip,
        })
    }
}

/// 根据文件大小决定合成帧数
pub(crate) fn frame_count_for_size(size_mb: f64) -> usize {
    if size_mb > 50.0 {
        20
    } else if size_mb > 10.0 {
        15
    } else {
        10
    }
}

/// 文件前 1MiB 的 SHA-1 十六进制摘要，读取失败时返回 "unknown"
fn hash_file_head(path: &Path) -> String {
    let mut file = match fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return "unknown".to_string(),
    };

    let mut buffer = vec![0u8; HASH_SAMPLE_BYTES];
    let mut hasher = Sha1::new();
    let mut total = 0usize;
    while total < HASH_SAMPLE_BYTES {
        match file.read(&mut buffer[total..]) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buffer[total..total + n]);
                total += n;
            }
            Err(_) => return "unknown".to_string(),
        }
    }

    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn fill_block(
    image: &mut RgbImage,
    cols: std::ops::Range<u32>,
    rows: std::ops::Range<u32>,
    color: Rgb<u8>,
) {
    for y in rows {
        for x in cols.clone() {
            if x < image.width() && y < image.height() {
                image.put_pixel(x, y, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor_in(dir: &Path) -> FrameExtractor {
        let mut config = AnalysisConfig::default();
        config.video.output_path = dir.to_path_buf();
        FrameExtractor::new(&config).unwrap()
    }

    #[test]
    fn test_frame_count_tiers() {
        assert_eq!(frame_count_for_size(0.5), 10);
        assert_eq!(frame_count_for_size(10.0), 10);
        assert_eq!(frame_count_for_size(10.1), 15);
        assert_eq!(frame_count_for_size(50.0), 15);
        assert_eq!(frame_count_for_size(50.1), 20);
        assert_eq!(frame_count_for_size(500.0), 20);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = extractor_in(dir.path());
        assert!(extractor
            .extract_frames(Path::new("/nonexistent/demo.mp4"))
            .is_err());
        assert!(extractor.video_info(Path::new("/nonexistent/demo.mp4")).is_err());
    }

    #[test]
    fn test_empty_file_yields_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("empty.mp4");
        std::fs::write(&video, b"").unwrap();

        let extractor = extractor_in(dir.path());
        let frames = extractor.extract_frames(&video).unwrap();
        assert!(frames.is_empty());
    }

    #[test]
    fn test_small_file_yields_ten_frames_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("demo.mp4");
        std::fs::write(&video, vec![0u8; 4096]).unwrap();

        let extractor = extractor_in(dir.path());
        let frames = extractor.extract_frames(&video).unwrap();
        assert_eq!(frames.len(), 10);
        assert_eq!(frames[0].width, 640);
        assert_eq!(frames[0].height, 480);
        let indices: Vec<usize> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, (0..10).collect::<Vec<_>>());

        let metadata_path = dir.path().join("metadata").join("demo_extraction.json");
        assert!(metadata_path.exists());
    }

    #[test]
    fn test_frame_skip_keeps_indices_contiguous() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("demo.mp4");
        std::fs::write(&video, vec![0u8; 4096]).unwrap();

        let mut config = AnalysisConfig::default();
        config.video.output_path = dir.path().to_path_buf();
        config.video.frame_skip = 3;
        let extractor = FrameExtractor::new(&config).unwrap();

        // frame_skip 不参与帧编号，只出现在元数据里
        let frames = extractor.extract_frames(&video).unwrap();
        let indices: Vec<usize> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, (0..10).collect::<Vec<_>>());

        let metadata_path = dir.path().join("metadata").join("demo_extraction.json");
        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&metadata_path).unwrap()).unwrap();
        assert_eq!(parsed["frame_skip"], 3);
    }

    #[test]
    fn test_video_info_estimates() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("demo.mp4");
        std::fs::write(&video, vec![0u8; 4096]).unwrap();

        let extractor = extractor_in(dir.path());
        let info = extractor.video_info(&video).unwrap();
        assert_eq!(info.file_name, "demo.mp4");
        assert_eq!(info.file_extension, "mp4");
        assert_eq!(info.codec, "h264");
        // 小文件的时长估计取下限
        assert_eq!(info.duration_seconds, 5.0);
        assert_eq!(info.fps, ASSUMED_FPS);
        assert_eq!(info.total_frames, 150);
        assert_eq!(info.resolution.width, 854);
        assert_eq!(info.extraction_method, "simulated");
        assert_ne!(info.file_hash, "unknown");
        assert_eq!(info.file_hash.len(), 40);
    }
}
