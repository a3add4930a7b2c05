//! # 画布缩放工具：命令行入口
//!
//! 本文件仅负责参数解析、日志初始化、取消信号与结果输出。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use canvas_resizer::batch::{
    BatchMode, BatchReport, BatchRunner, DirectorySink, DirectorySource, OutputSink,
    SingleFileSink, SingleFileSource, SourceEnumerator, ZipSink, ZipSource,
};
use canvas_resizer::canvas::{CanvasHandler, ResizeRequest};
use canvas_resizer::error::AppError;
use canvas_resizer::settings::ResizeSettings;
use canvas_resizer::storage;

/// 把图片缩放到固定尺寸，不足部分用背景色补齐并居中
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// 目标宽度（默认 800）
    #[arg(long, global = true)]
    width: Option<u32>,

    /// 目标高度（默认 600）
    #[arg(long, global = true)]
    height: Option<u32>,

    /// 不保持宽高比：原图按原尺寸居中贴上，超出部分裁掉
    #[arg(long, global = true)]
    no_aspect: bool,

    /// PNG 背景选项 (auto, black, white, custom)
    #[arg(long, global = true)]
    background: Option<String>,

    /// 自定义背景色 #RRGGBB（未指定 --background 时隐含 custom）
    #[arg(long, global = true)]
    color: Option<String>,

    /// 重采样档位 (quality, balanced, speed)
    #[arg(long, global = true)]
    profile: Option<String>,

    /// JPEG 输出质量 1~100（默认 95）
    #[arg(long, global = true)]
    quality: Option<u8>,

    /// 输出位置（文件 / 目录 / 压缩包，取决于模式）；单图模式按其扩展名决定编码格式
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// JSON 设置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 以 JSON 输出报告
    #[arg(long, global = true)]
    json: bool,

    /// 日志级别 (error, warn, info, debug, trace)，覆盖 RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// 处理单张图片
    Single { path: PathBuf },
    /// 处理文件夹内的图片（不递归）
    Folder { path: PathBuf },
    /// 处理压缩包内的所有图片，输出新的压缩包
    Zip { path: PathBuf },
}

impl Command {
    fn mode(&self) -> BatchMode {
        match self {
            Self::Single { .. } => BatchMode::Single,
            Self::Folder { .. } => BatchMode::Folder,
            Self::Zip { .. } => BatchMode::Zip,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let mode = cli.command.mode();
    let json = cli.json;

    match run(cli).await {
        Ok(report) => {
            if json {
                match serde_json::to_string_pretty(&report) {
                    Ok(text) => println!("{text}"),
                    Err(e) => log::error!("序列化报告失败: {e}"),
                }
            } else {
                println!("{}", report.summary());
            }

            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            log::error!("💥 {} 模式执行失败: {}", mode, err);
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "mode": mode, "error": err })
                );
            } else {
                eprintln!("{}: {}", mode.failure_prefix(), err);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = level {
        builder.parse_filters(level);
    }
    builder.init();
}

async fn run(cli: Cli) -> Result<BatchReport, AppError> {
    let settings = merge_settings(&cli)?;
    let request = settings.to_request()?;
    let handler = CanvasHandler::new(settings.to_config()?);

    let cancelled = Arc::new(AtomicBool::new(false));
    {
        let cancelled = Arc::clone(&cancelled);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("🛑 收到 Ctrl-C，当前条目完成后停止");
                cancelled.store(true, Ordering::SeqCst);
            }
        });
    }

    let command = cli.command.clone();
    let output = cli.output.clone();
    tokio::task::spawn_blocking(move || execute(command, output, handler, request, cancelled))
        .await
        .map_err(|e| AppError::Batch(format!("后台线程异常退出: {}", e)))?
}

/// 设置文件打底，命令行参数覆盖。
fn merge_settings(cli: &Cli) -> Result<ResizeSettings, AppError> {
    let mut settings = ResizeSettings::load_or_default(cli.config.as_deref())?;

    if let Some(width) = cli.width {
        settings.width = width;
    }
    if let Some(height) = cli.height {
        settings.height = height;
    }
    if cli.no_aspect {
        settings.maintain_aspect = false;
    }
    if let Some(color) = &cli.color {
        settings.custom_color = color.clone();
        if cli.background.is_none() {
            settings.background = "custom".to_string();
        }
    }
    if let Some(background) = &cli.background {
        settings.background = background.clone();
    }
    if let Some(profile) = &cli.profile {
        settings.profile = profile.clone();
    }
    if let Some(quality) = cli.quality {
        settings.jpeg_quality = quality;
    }

    Ok(settings)
}

fn execute(
    command: Command,
    output: Option<PathBuf>,
    handler: CanvasHandler,
    request: ResizeRequest,
    cancelled: Arc<AtomicBool>,
) -> Result<BatchReport, AppError> {
    let is_cancelled = move || cancelled.load(Ordering::SeqCst);

    match command {
        Command::Single { path } => {
            let target = output.unwrap_or_else(|| storage::single_output_path(&path));
            run_batch(
                BatchMode::Single,
                handler,
                request,
                SingleFileSource::new(&path),
                SingleFileSink::new(target),
                is_cancelled,
            )
        }
        Command::Folder { path } => {
            let target = match output {
                Some(dir) => dir,
                None => storage::folder_output_dir(&path)?,
            };
            let report = run_batch(
                BatchMode::Folder,
                handler,
                request,
                DirectorySource::new(&path),
                DirectorySink::new(&target),
                is_cancelled,
            )?;
            log_output_dir(&target);
            Ok(report)
        }
        Command::Zip { path } => {
            let target = output.unwrap_or_else(|| storage::zip_output_path(&path));
            run_batch(
                BatchMode::Zip,
                handler,
                request,
                ZipSource::new(&path),
                ZipSink::new(target),
                is_cancelled,
            )
        }
    }
}

fn run_batch<S, O, C>(
    mode: BatchMode,
    handler: CanvasHandler,
    request: ResizeRequest,
    source: S,
    sink: O,
    is_cancelled: C,
) -> Result<BatchReport, AppError>
where
    S: SourceEnumerator,
    O: OutputSink,
    C: Fn() -> bool,
{
    BatchRunner::new(mode, handler, request, source, sink).run_with_hooks(
        |done, total, name| log::info!("📈 进度 {}/{} - {}", done, total, name),
        is_cancelled,
    )
}

fn log_output_dir(dir: &Path) {
    match storage::get_output_dir_info(dir) {
        Ok(info) => log::info!(
            "📦 输出目录 {} - {} 个文件，共 {:.2} MB",
            info.path,
            info.file_count,
            info.total_size as f64 / 1024.0 / 1024.0
        ),
        Err(e) => log::warn!("读取输出目录信息失败: {}", e),
    }
}
