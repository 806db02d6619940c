//! # IACAM 图表截图筛查 — 命令行入口
//!
//! 用法：`iacam [--settings <file>] [--json] <image>...`
//!
//! 本文件仅负责参数解析、服务初始化与结果输出，业务逻辑见 `lib.rs` 架构文档。

use std::path::PathBuf;
use std::process::ExitCode;

use iacam::error::AppError;
use iacam::settings::AppSettings;
use iacam::storage::ChartStore;
use iacam::upload::{UploadService, UploadSource};
use serde::Serialize;

const USAGE: &str = "用法: iacam [--settings <file>] [--json] <image>...";

struct CliArgs {
    settings_path: Option<PathBuf>,
    json: bool,
    images: Vec<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut settings_path = None;
    let mut json = false;
    let mut images = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => {
                let path = args.next().ok_or("--settings 需要文件路径")?;
                settings_path = Some(PathBuf::from(path));
            }
            "--json" => json = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ => images.push(arg),
        }
    }

    if images.is_empty() {
        return Err(USAGE.to_string());
    }

    Ok(CliArgs {
        settings_path,
        json,
        images,
    })
}

/// 单个文件的筛查报告（`--json` 输出）。
#[derive(Debug, Serialize)]
struct ScreeningReport {
    source: String,
    accepted: bool,
    width: Option<u32>,
    height: Option<u32>,
    stored_path: Option<String>,
    code: Option<&'static str>,
    message: Option<&'static str>,
    detail: Option<String>,
}

fn build_service(settings: &AppSettings) -> Result<UploadService, AppError> {
    let config = settings.to_upload_config()?;

    let store = if settings.persist_accepted {
        let data_root = std::env::current_dir()?.join("iacam-data");
        Some(ChartStore::open(&data_root, settings.images_dir.as_deref())?)
    } else {
        None
    };

    Ok(UploadService::with_config(config, store)?)
}

async fn screen_file(service: &UploadService, path: String) -> ScreeningReport {
    match service.screen_upload(UploadSource::FilePath(path.clone())).await {
        Ok(outcome) => ScreeningReport {
            source: path,
            accepted: true,
            width: Some(outcome.chart.bitmap.width()),
            height: Some(outcome.chart.bitmap.height()),
            stored_path: outcome
                .stored_path
                .map(|p| p.to_string_lossy().to_string()),
            code: None,
            message: None,
            detail: None,
        },
        Err(err) => {
            log::warn!("图片未通过筛查 - {}: {}", path, err);
            ScreeningReport {
                source: path,
                accepted: false,
                width: None,
                height: None,
                stored_path: None,
                code: Some(err.code()),
                message: Some(err.user_message()),
                detail: Some(err.to_string()),
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    let settings = match args.settings_path.as_deref() {
        Some(path) => AppSettings::load(path),
        None => Ok(AppSettings::default()),
    };

    let service = match settings.and_then(|settings| build_service(&settings)) {
        Ok(service) => service,
        Err(err) => {
            log::error!("服务初始化失败: {}", err);
            eprintln!("{}", err);
            return ExitCode::from(2);
        }
    };

    let mut all_accepted = true;
    for path in args.images {
        let report = screen_file(&service, path).await;
        all_accepted &= report.accepted;

        if args.json {
            match serde_json::to_string(&report) {
                Ok(line) => println!("{}", line),
                Err(err) => log::error!("报告序列化失败: {}", err),
            }
        } else if report.accepted {
            println!("✅ {} - 识别为蜡烛图", report.source);
        } else {
            println!(
                "❌ {} - {}",
                report.source,
                report.message.unwrap_or("未通过筛查")
            );
        }
    }

    if all_accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
