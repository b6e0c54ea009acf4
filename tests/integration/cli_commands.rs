//! CLI command execution against real repositories

use super::test_utils::GitFixture;
use blobtrace::cli::{
    exit_code_for_error, Commands, RunContext, EXIT_ERROR, EXIT_FOUND, EXIT_NOT_FOUND,
};
use blobtrace::config::BlobtraceConfig;
use blobtrace::error::ApiError;
use tempfile::TempDir;

fn context(fixture: &GitFixture) -> RunContext {
    RunContext::with_config(fixture.path().to_path_buf(), BlobtraceConfig::default())
}

fn find(hash: &str, path: &str, format: &str) -> Commands {
    Commands::Find {
        hash: hash.to_string(),
        path: path.to_string(),
        format: format.to_string(),
        limit_to_path: false,
    }
}

#[tokio::test]
async fn test_find_prints_text_entry() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    let commit = fixture.commit(&[("conf/app.toml", "name = \"app\"\n")], "config");
    let hash = fixture.blob_hash("name = \"app\"\n").to_hex();

    let output = context(&fixture)
        .execute(&find(&hash, "conf/app.toml", "text"))
        .await
        .unwrap();

    assert_eq!(output.exit_code, EXIT_FOUND);
    assert!(output.text.contains(&format!("revision  {}", commit)));
    assert!(output.text.contains("path      conf/app.toml"));
}

#[tokio::test]
async fn test_find_prints_json_entry() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    let commit = fixture.commit(&[("a.txt", "json\n")], "first");
    let hash = fixture.blob_hash("json\n").to_hex();

    let output = context(&fixture)
        .execute(&find(&hash, "a.txt", "json"))
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&output.text).unwrap();

    assert_eq!(output.exit_code, EXIT_FOUND);
    assert_eq!(value["found"], true);
    assert_eq!(value["entry"]["revision"], commit.as_str());
    assert_eq!(value["entry"]["hash"], hash.as_str());
    assert_eq!(value["entry"]["kind"], "blob");
}

#[tokio::test]
async fn test_find_without_match_exits_not_found() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    fixture.commit(&[("a.txt", "a\n")], "first");
    let hash = fixture.blob_hash("b\n").to_hex();

    let text = context(&fixture)
        .execute(&find(&hash, "a.txt", "text"))
        .await
        .unwrap();
    let json = context(&fixture)
        .execute(&find(&hash, "a.txt", "json"))
        .await
        .unwrap();

    assert_eq!(text.exit_code, EXIT_NOT_FOUND);
    assert!(text.text.contains(&hash));
    assert_eq!(json.exit_code, EXIT_NOT_FOUND);
    let value: serde_json::Value = serde_json::from_str(&json.text).unwrap();
    assert_eq!(value["found"], false);
    assert!(value["entry"].is_null());
}

#[tokio::test]
async fn test_find_rejects_bad_arguments() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    fixture.commit(&[("a.txt", "a\n")], "first");
    let hash = fixture.blob_hash("a\n").to_hex();
    let context = context(&fixture);

    let bad_hash = context.execute(&find("xyz", "a.txt", "text")).await;
    let bad_path = context.execute(&find(&hash, "../a.txt", "text")).await;
    let bad_format = context.execute(&find(&hash, "a.txt", "yaml")).await;

    assert!(matches!(bad_hash, Err(ApiError::InvalidHash(_))));
    assert!(matches!(bad_path, Err(ApiError::InvalidPath(_))));
    assert!(matches!(bad_format, Err(ApiError::ConfigError(_))));
    assert_eq!(exit_code_for_error(&bad_hash.unwrap_err()), EXIT_ERROR);
}

#[tokio::test]
async fn test_exists_reports_presence() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    let commit = fixture.commit(&[("a.txt", "a\n")], "first");
    let context = context(&fixture);

    let present = context
        .execute(&Commands::Exists { object: commit })
        .await
        .unwrap();
    let absent = context
        .execute(&Commands::Exists {
            object: "0000000000000000000000000000000000000001".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(present.text, "true");
    assert_eq!(present.exit_code, EXIT_FOUND);
    assert_eq!(absent.text, "false");
    assert_eq!(absent.exit_code, EXIT_NOT_FOUND);
}

#[tokio::test]
async fn test_find_outside_repository_fails() {
    let Some(_fixture) = GitFixture::new() else {
        return;
    };
    let plain = TempDir::new().unwrap();
    let context = RunContext::with_config(plain.path().to_path_buf(), BlobtraceConfig::default());

    let result = context
        .execute(&find(&"ab".repeat(20), "a.txt", "text"))
        .await;

    assert!(matches!(result, Err(ApiError::NotARepository(_))));
}
