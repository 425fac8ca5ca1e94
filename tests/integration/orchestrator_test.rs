// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 用shell脚本替身驱动真实的子进程启动路径。
//! 脚本遵守运行器契约：五个位置参数、交接文件环境变量、
//! stdout成功标记、stderr错误标记。

use carcrawl::application::usecases::run_scrape::RunScrapeUseCase;
use carcrawl::application::dto::scrape_request::ScrapeRequestDto;
use carcrawl::config::settings::ScraperSettings;
use carcrawl::domain::models::scrape_result::ScrapeStatus;
use carcrawl::engines::stagehand::StagehandEngine;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn scraper_settings(handoff_dir: &Path, script: &str, timeout_secs: u64) -> ScraperSettings {
    ScraperSettings {
        runner_command: "sh".to_string(),
        // sh -c <script> <argv0>: the five positional job arguments land in $1..$5.
        runner_args: vec!["-c".to_string(), script.to_string(), "runner".to_string()],
        job_timeout_secs: timeout_secs,
        settle_secs: 0,
        handoff_dir: handoff_dir.display().to_string(),
        model_name: "test-model".to_string(),
        engine_url: "http://127.0.0.1:1".to_string(),
    }
}

fn orchestrator(handoff_dir: &Path, script: &str, timeout_secs: u64) -> RunScrapeUseCase {
    let settings = scraper_settings(handoff_dir, script, timeout_secs);
    let engine = Arc::new(StagehandEngine::new(settings.clone()));
    RunScrapeUseCase::from_settings(engine, &settings)
}

fn request() -> ScrapeRequestDto {
    ScrapeRequestDto {
        url: "https://example.test/search".to_string(),
        brand: "Toyota".to_string(),
        model: "Corolla".to_string(),
        year: 2020,
        api_key: "k1".to_string(),
    }
}

fn handoff_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|rd| {
            rd.filter(|e| {
                e.as_ref()
                    .map(|e| e.file_name().to_string_lossy().ends_with(".json"))
                    .unwrap_or(false)
            })
            .count()
        })
        .unwrap_or(0)
}

#[tokio::test]
async fn test_successful_run_normalizes_records() {
    let dir = tempfile::tempdir().unwrap();
    let script = r#"
printf '[{"brand":"%s","model":"%s","year":%s,"km":45000,"price":15000,"currency":"USD","title":"%s %s %s"}]' \
    "$1" "$2" "$3" "$1" "$2" "$3" > "$CARCRAWL_HANDOFF_FILE"
echo EXTRACTION_COMPLETE
"#;
    let uc = orchestrator(dir.path(), script, 10);

    let result = uc.execute(&request()).await;
    assert_eq!(result.status, ScrapeStatus::Success);
    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];
    assert_eq!(record.brand, "Toyota");
    assert_eq!(record.model, "Corolla");
    assert_eq!(record.year, Some(2020));
    assert_eq!(record.km, Some(45000));
    assert_eq!(record.price, 15000.0);
    assert_eq!(record.title.as_deref(), Some("Toyota Corolla 2020"));

    // No handoff file survives the job.
    assert_eq!(handoff_files(dir.path()), 0);
}

#[tokio::test]
async fn test_empty_extraction_is_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let script = r#"
printf '[]' > "$CARCRAWL_HANDOFF_FILE"
echo EXTRACTION_COMPLETE
"#;
    let uc = orchestrator(dir.path(), script, 10);

    let result = uc.execute(&request()).await;
    assert_eq!(result.status, ScrapeStatus::EmptyResult);
    assert!(result.records.is_empty());
    assert_eq!(handoff_files(dir.path()), 0);
}

#[tokio::test]
async fn test_crash_with_error_marker() {
    let dir = tempfile::tempdir().unwrap();
    let script = r#"
echo "CRITICAL_ERROR: network failure" >&2
exit 1
"#;
    let uc = orchestrator(dir.path(), script, 10);

    let result = uc.execute(&request()).await;
    assert_eq!(result.status, ScrapeStatus::CrashError);
    assert!(result.records.is_empty());
    assert_eq!(handoff_files(dir.path()), 0);
}

#[tokio::test]
async fn test_clean_exit_without_marker_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    // The script fulfills everything except the completion marker.
    let script = r#"
printf '[{"brand":"Toyota","model":"Corolla","price":1}]' > "$CARCRAWL_HANDOFF_FILE"
"#;
    let uc = orchestrator(dir.path(), script, 10);

    let result = uc.execute(&request()).await;
    assert_eq!(result.status, ScrapeStatus::MalformedOutput);
    assert_eq!(handoff_files(dir.path()), 0);
}

#[tokio::test]
async fn test_marker_without_file_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let script = "echo EXTRACTION_COMPLETE";
    let uc = orchestrator(dir.path(), script, 10);

    let result = uc.execute(&request()).await;
    assert_eq!(result.status, ScrapeStatus::MalformedOutput);
}

#[tokio::test]
async fn test_unknown_runner_command_is_crash() {
    let dir = tempfile::tempdir().unwrap();
    let settings = ScraperSettings {
        runner_command: "/nonexistent/carcrawl-runner".to_string(),
        runner_args: vec![],
        job_timeout_secs: 5,
        settle_secs: 0,
        handoff_dir: dir.path().display().to_string(),
        model_name: "test-model".to_string(),
        engine_url: "http://127.0.0.1:1".to_string(),
    };
    let engine = Arc::new(StagehandEngine::new(settings.clone()));
    let uc = RunScrapeUseCase::from_settings(engine, &settings);

    let result = uc.execute(&request()).await;
    assert_eq!(result.status, ScrapeStatus::CrashError);
}

#[cfg(unix)]
#[tokio::test]
async fn test_timeout_kills_process_tree() {
    let dir = tempfile::tempdir().unwrap();
    // The runner stand-in spawns its own child, the way a browser engine
    // would, and records the grandchild pid for the assertion below.
    let script = r#"
sleep 30 &
echo $! > "${CARCRAWL_HANDOFF_FILE}.pid"
wait
"#;
    let uc = orchestrator(dir.path(), script, 1);

    let result = uc.execute(&request()).await;
    assert_eq!(result.status, ScrapeStatus::Timeout);
    assert!(result.records.is_empty());

    // The grandchild must be gone too, not just the direct child.
    let pid_file = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .find(|e| e.file_name().to_string_lossy().ends_with(".pid"))
        .expect("runner stand-in recorded the grandchild pid");
    let pid: i32 = std::fs::read_to_string(pid_file.path())
        .unwrap()
        .trim()
        .parse()
        .unwrap();

    let mut alive = true;
    for _ in 0..20 {
        alive = Path::new(&format!("/proc/{}", pid)).exists();
        if !alive {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(!alive, "grandchild process {} survived the timeout", pid);
}

#[tokio::test]
async fn test_stale_handoff_from_previous_run_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    // A crashed prior run left a file exactly where this job writes. The
    // script writes nothing, so a trusted stale read would look like data.
    let script = "echo EXTRACTION_COMPLETE";
    let settings = scraper_settings(dir.path(), script, 10);
    let engine = Arc::new(StagehandEngine::new(settings.clone()));
    let uc = RunScrapeUseCase::from_settings(engine, &settings);

    // Job ids are unique per run, so pre-seeding every possible path is
    // impossible; seed the directory and verify nothing gets picked up.
    std::fs::write(
        dir.path().join("scrape-00000000-0000-0000-0000-000000000000.json"),
        r#"[{"brand":"Stale","model":"Data","price":1}]"#,
    )
    .unwrap();

    let result = uc.execute(&request()).await;
    assert_eq!(result.status, ScrapeStatus::MalformedOutput);
    assert!(result.records.is_empty());
}
