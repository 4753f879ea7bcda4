//! End-to-end download tests against local mock servers

mod common;

use std::time::Duration;

use tempfile::TempDir;

use cloud_downloader::app::{ClientConfig, CloudDownloader, SchedulerConfig};
use cloud_downloader::auth::Credentials;
use cloud_downloader::cli::{handle_download, DownloadArgs, GlobalArgs};
use cloud_downloader::config::AppConfig;
use cloud_downloader::errors::{AppError, DownloadError, FetchError};

use common::{sample_file, Cloud, MockServer, Part, Route};

const INDEX_CREDENTIALS: &str = "alice:secret";

fn downloader(scheduler: SchedulerConfig) -> CloudDownloader {
    let client = ClientConfig::default().with_read_timeout(Duration::from_millis(500));
    CloudDownloader::new(client, scheduler)
}

fn quiet() -> GlobalArgs {
    GlobalArgs {
        quiet: true,
        ..Default::default()
    }
}

fn download_args(index_url: String, credentials: &str, output_dir: &TempDir) -> DownloadArgs {
    DownloadArgs {
        index_url: Some(index_url),
        credentials: Some(credentials.to_string()),
        output_dir: Some(output_dir.path().to_path_buf()),
        ..Default::default()
    }
}

/// Three overlapping copies; the first answers last
fn overlapping_parts() -> Vec<Part> {
    vec![
        Part::new(0, 99, "bob:pw-a").delayed(Duration::from_millis(300)),
        Part::new(50, 149, "carol:pw-b").delayed(Duration::from_millis(150)),
        Part::new(130, 199, "dave:pw:c"),
    ]
}

#[tokio::test]
async fn test_overlapping_parts_reassemble_exactly() {
    let original = sample_file(200);
    let cloud = Cloud::start("movie.mp4", &original, &overlapping_parts(), INDEX_CREDENTIALS).await;

    let file = downloader(SchedulerConfig::default().with_worker_count(3))
        .download(
            &cloud.index_url(),
            &Credentials::parse(INDEX_CREDENTIALS).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(file.filename, "movie.mp4");
    assert_eq!(file.declared_size, "200");
    assert_eq!(file.sources, 3);
    assert_eq!(file.data, original);
    assert_eq!(file.size_mismatch(), None);
    assert_eq!(cloud.part_connections(), 3);
}

#[tokio::test]
async fn test_sequential_and_concurrent_are_identical() {
    let original = sample_file(200);
    let cloud = Cloud::start("movie.mp4", &original, &overlapping_parts(), INDEX_CREDENTIALS).await;
    let credentials = Credentials::parse(INDEX_CREDENTIALS).unwrap();

    let concurrent = downloader(SchedulerConfig::default())
        .download(&cloud.index_url(), &credentials)
        .await
        .unwrap();
    let sequential = downloader(SchedulerConfig::default().sequential())
        .download(&cloud.index_url(), &credentials)
        .await
        .unwrap();

    assert_eq!(concurrent.data, sequential.data);
    assert_eq!(sequential.data, original);
}

#[tokio::test]
async fn test_single_worker_pool_still_completes() {
    let original = sample_file(200);
    let cloud = Cloud::start("movie.mp4", &original, &overlapping_parts(), INDEX_CREDENTIALS).await;

    let file = downloader(SchedulerConfig::default().with_worker_count(1))
        .download(
            &cloud.index_url(),
            &Credentials::parse(INDEX_CREDENTIALS).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(file.data, original);
}

#[tokio::test]
async fn test_rejected_index_aborts_before_any_source() {
    let original = sample_file(200);
    let cloud = Cloud::start("movie.mp4", &original, &overlapping_parts(), INDEX_CREDENTIALS).await;
    let output_dir = TempDir::new().unwrap();

    let args = download_args(cloud.index_url(), "alice:wrong", &output_dir);
    let result = handle_download(&quiet(), args, AppConfig::default()).await;

    match result {
        Err(AppError::Download(DownloadError::Index { source, .. })) => {
            assert!(matches!(
                source,
                FetchError::UnexpectedStatus { status: 401, .. }
            ));
        }
        other => panic!("Expected index rejection, got {:?}", other),
    }
    assert_eq!(cloud.part_connections(), 0);
    assert_eq!(std::fs::read_dir(output_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_failed_source_fails_the_run() {
    let original = sample_file(100);
    let good = MockServer::single("/a", Route::new(original[..60].to_vec(), "u:p")).await;
    // Wrong credentials for the second source
    let bad = MockServer::single("/b", Route::new(original[40..].to_vec(), "u:other")).await;

    let index = format!(
        "data.bin\n100\n{}\nu:p\n0-59\n{}\nu:p\n40-99\n",
        good.url("/a"),
        bad.url("/b")
    );
    let index_server = MockServer::single("/index", Route::new(index, INDEX_CREDENTIALS)).await;
    let output_dir = TempDir::new().unwrap();

    let args = download_args(index_server.url("/index"), INDEX_CREDENTIALS, &output_dir);
    let result = handle_download(&quiet(), args, AppConfig::default()).await;

    match result {
        Err(AppError::Download(DownloadError::SourcesFailed { total, failures })) => {
            assert_eq!(total, 2);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].index, 1);
            assert!(failures[0].error.contains("401"));
        }
        other => panic!("Expected SourcesFailed, got {:?}", other),
    }
    // The healthy sibling still ran
    assert_eq!(good.connections(), 1);
    assert!(!output_dir.path().join("data.bin").exists());
}

#[tokio::test]
async fn test_zero_sources_write_empty_file() {
    let index_server =
        MockServer::single("/index", Route::new("empty.bin\n0\n", INDEX_CREDENTIALS)).await;
    let output_dir = TempDir::new().unwrap();

    let args = download_args(index_server.url("/index"), INDEX_CREDENTIALS, &output_dir);
    handle_download(&quiet(), args, AppConfig::default())
        .await
        .unwrap();

    let written = std::fs::read(output_dir.path().join("empty.bin")).unwrap();
    assert!(written.is_empty());
}

#[tokio::test]
async fn test_source_without_content_length_reads_until_close() {
    let original = sample_file(120);
    let part = MockServer::single(
        "/whole",
        Route::new(original.clone(), "u:p").without_content_length(),
    )
    .await;
    let index = format!("whole.bin\n120\n{}\nu:p\n0-119\n", part.url("/whole"));
    let index_server = MockServer::single("/index", Route::new(index, INDEX_CREDENTIALS)).await;

    let file = downloader(SchedulerConfig::default())
        .download(
            &index_server.url("/index"),
            &Credentials::parse(INDEX_CREDENTIALS).unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(file.data, original);
}

#[tokio::test]
async fn test_cli_writes_file_and_refuses_overwrite() {
    let original = sample_file(200);
    let cloud = Cloud::start("movie.mp4", &original, &overlapping_parts(), INDEX_CREDENTIALS).await;
    let output_dir = TempDir::new().unwrap();

    let args = download_args(cloud.index_url(), INDEX_CREDENTIALS, &output_dir);
    handle_download(&quiet(), args.clone(), AppConfig::default())
        .await
        .unwrap();
    assert_eq!(
        std::fs::read(output_dir.path().join("movie.mp4")).unwrap(),
        original
    );

    let result = handle_download(&quiet(), args.clone(), AppConfig::default()).await;
    assert!(matches!(
        result,
        Err(AppError::Download(DownloadError::FileExists { .. }))
    ));

    let forced = DownloadArgs {
        force: true,
        ..args
    };
    handle_download(&quiet(), forced, AppConfig::default())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unsafe_index_filename_is_not_written() {
    let index_server = MockServer::single(
        "/index",
        Route::new("../escape.bin\n0\n", INDEX_CREDENTIALS),
    )
    .await;
    let output_dir = TempDir::new().unwrap();

    let args = download_args(index_server.url("/index"), INDEX_CREDENTIALS, &output_dir);
    let result = handle_download(&quiet(), args, AppConfig::default()).await;

    assert!(matches!(
        result,
        Err(AppError::Download(DownloadError::UnsafeFilename { .. }))
    ));
}
