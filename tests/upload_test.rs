// End-to-end upload screening through files on disk and the async service.
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use iacam::error::AppError;
use iacam::settings::AppSettings;
use iacam::storage::ChartStore;
use iacam::upload::{UploadConfig, UploadError, UploadHandler, UploadService, UploadSource};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("iacam-upload-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create scratch dir failed");
    dir
}

/// 白底、黑色网格线、红绿蜡烛的简化图表。
fn candlestick_png(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        if y % 10 == 0 || x % 25 == 0 {
            Rgba([20u8, 20, 20, 255])
        } else if x % 25 == 7 && y > height / 3 {
            Rgba([38, 166, 91, 255])
        } else if x % 25 == 15 && y < height / 2 {
            Rgba([229, 57, 53, 255])
        } else {
            Rgba([245, 245, 245, 255])
        }
    });

    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("failed to encode chart");
    cursor.into_inner()
}

/// 蓝/橙配色图表：已知会被拒绝。
fn blue_orange_png(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, _| match x % 3 {
        0 => Rgba([30u8, 90, 220, 255]),
        1 => Rgba([250, 150, 30, 255]),
        _ => Rgba([15, 15, 15, 255]),
    });

    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("failed to encode chart");
    cursor.into_inner()
}

#[test]
fn test_file_chart_is_accepted() {
    let dir = scratch_dir("accept");
    let path = dir.join("chart.png");
    fs::write(&path, candlestick_png(200, 120)).expect("write chart failed");

    let handler = UploadHandler::new(UploadConfig::default()).expect("handler init failed");
    let chart = handler
        .screen(UploadSource::FilePath(path.to_string_lossy().to_string()))
        .expect("chart should be accepted");

    assert_eq!(chart.source_hint, "file");
    assert_eq!((chart.bitmap.width(), chart.bitmap.height()), (200, 120));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_unusual_color_scheme_is_rejected() {
    let handler = UploadHandler::new(UploadConfig::default()).expect("handler init failed");

    let result = handler.screen(UploadSource::Bytes {
        bytes: blue_orange_png(30, 30),
        content_type: Some("image/png".to_string()),
    });

    assert!(matches!(result, Err(UploadError::NotAChart(_))));
}

#[test]
fn test_text_file_is_rejected_as_invalid_format() {
    let dir = scratch_dir("text");
    let path = dir.join("notes.png");
    fs::write(&path, "just some text pretending to be a png").expect("write failed");

    let handler = UploadHandler::new(UploadConfig::default()).expect("handler init failed");
    let result = handler.screen(UploadSource::FilePath(path.to_string_lossy().to_string()));

    let err = result.err().expect("text file must be rejected");
    assert_eq!(err.code(), "invalid_format");
    assert_eq!(err.user_message(), "请上传有效的图片文件。");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_oversized_file_is_rejected_before_decode() {
    let dir = scratch_dir("oversized");
    let path = dir.join("big.png");
    let png = candlestick_png(200, 120);
    fs::write(&path, &png).expect("write failed");

    let mut config = UploadConfig::default();
    config.max_file_size = (png.len() - 1) as u64;
    let handler = UploadHandler::new(config).expect("handler init failed");
    let result = handler.screen(UploadSource::FilePath(path.to_string_lossy().to_string()));

    assert!(matches!(result, Err(UploadError::ResourceLimit(_))));
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_service_persists_accepted_preview() {
    let dir = scratch_dir("persist");
    let store = ChartStore::open(&dir, None).expect("open store failed");
    let mut config = UploadConfig::default();
    config.preview_max_dimension = 100;
    let service = UploadService::with_config(config, Some(store.clone())).expect("service init failed");

    let outcome = service
        .screen_upload(UploadSource::Bytes {
            bytes: candlestick_png(400, 200),
            content_type: Some("image/png".to_string()),
        })
        .await
        .expect("chart should be accepted");

    let stored = outcome.stored_path.expect("stored path expected");
    let saved = image::open(&stored).expect("stored image should open");
    assert_eq!((saved.width(), saved.height()), (100, 50));
    assert_eq!(outcome.chart.bitmap.width(), 400);
    assert_eq!(store.info().expect("info failed").file_count, 1);
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_service_does_not_persist_rejected_upload() {
    let dir = scratch_dir("reject");
    let store = ChartStore::open(&dir, None).expect("open store failed");
    let service =
        UploadService::with_config(UploadConfig::default(), Some(store.clone())).expect("service init failed");

    let result = service
        .screen_upload(UploadSource::Bytes {
            bytes: blue_orange_png(12, 12),
            content_type: None,
        })
        .await;

    assert!(matches!(result, Err(AppError::Upload(UploadError::NotAChart(_)))));
    assert_eq!(store.info().expect("info failed").file_count, 0);
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_settings_drive_service_configuration() {
    let settings = AppSettings::from_json(r#"{ "max_file_size_mb": 1, "preview_max_dimension": 640 }"#)
        .expect("settings should parse");
    let config = settings.to_upload_config().expect("valid settings");
    let service = UploadService::with_config(config, None).expect("service init failed");

    let snapshot = service.handler().config_snapshot().expect("snapshot failed");

    assert_eq!(snapshot.max_file_size, 1024 * 1024);
    assert_eq!(snapshot.preview_max_dimension, 640);
}
