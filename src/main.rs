use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use video_analyze::config::{AnalysisConfig, ConfigLoader};
use video_analyze::pipeline::AnalysisPipeline;

#[derive(Parser)]
#[command(name = "video-analyze")]
#[command(about = "批量视频分析流水线：帧提取、多类别分析、标注、报告与图表")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 扫描输入目录并分析所有受支持的视频
    Run {
        /// 视频输入目录（覆盖配置文件）
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// 输出根目录（覆盖配置文件）
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 配置文件路径，缺省时按默认位置查找
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// 生成默认配置文件
    InitConfig {
        /// 配置文件写入路径
        #[arg(default_value = "video-analyze.ini")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            output,
            config,
        } => run_analysis(config, input, output).await,
        Commands::InitConfig { path } => {
            ConfigLoader::create_default_config(&path)?;
            println!("✅ 默认配置已写入: {}", path.display());
            Ok(())
        }
    }
}

async fn run_analysis(
    config_file: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = ConfigLoader::load(config_file.as_deref(), input, output);

    // 日志文件落在输出目录下，所以要先建目录再初始化日志
    std::fs::create_dir_all(&config.video.output_path).with_context(|| {
        format!("创建输出目录失败: {}", config.video.output_path.display())
    })?;
    init_logging(&config)?;

    info!("🚀 视频分析流水线启动");
    info!("📂 输入目录: {}", config.video.input_path.display());
    info!("📂 输出目录: {}", config.video.output_path.display());

    let pipeline = AnalysisPipeline::new(config)?;

    let interrupt = pipeline.interrupt_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("⚠️ 收到 Ctrl-C，当前视频完成后停止");
            interrupt.store(true, Ordering::SeqCst);
        }
    });

    let summary = pipeline.run().await?;

    if summary.interrupted {
        warn!("⚠️ 批处理被中断，已保留完成部分的结果");
    }
    info!(
        "🏁 运行结束: 共 {} 个视频，成功 {} 个，失败 {} 个",
        summary.results.len(),
        summary.succeeded,
        summary.failed
    );
    if let Some(report) = &summary.consolidated_report {
        info!("📊 汇总报告: {}", report.display());
    }

    Ok(())
}

/// 初始化日志：控制台 + 输出目录下的 analysis.log
fn init_logging(config: &AnalysisConfig) -> Result<()> {
    let default_level = if config.output.detailed_logging {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_path = config.video.output_path.join("analysis.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("打开日志文件失败: {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(
            fmt::layer()
                .with_writer(std::sync::Mutex::new(log_file))
                .with_ansi(false),
        )
        .init();

    Ok(())
}
