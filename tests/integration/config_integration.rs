//! Integration tests for the layered configuration

use super::test_utils::with_isolated_env;
use blobtrace::config::{ConfigLoader, REPOSITORY_CONFIG_FILE};
use blobtrace::error::ApiError;
use tempfile::TempDir;

#[test]
fn test_defaults_without_any_config_files() {
    let temp_dir = TempDir::new().unwrap();
    let repo = temp_dir.path().join("repo");
    std::fs::create_dir_all(&repo).unwrap();

    let config = with_isolated_env(&temp_dir, &[], || ConfigLoader::load(&repo).unwrap());

    assert_eq!(config.search.pipe_capacity, 64 * 1024);
    assert!(!config.search.limit_to_path);
    assert_eq!(config.search.git_binary, "git");
    assert_eq!(config.repository.as_deref(), Some(repo.as_path()));
    assert_eq!(config.logging.output, "stderr");
}

#[test]
fn test_repository_file_overrides_global_file() {
    let temp_dir = TempDir::new().unwrap();
    let repo = temp_dir.path().join("repo");
    std::fs::create_dir_all(&repo).unwrap();
    let global_dir = temp_dir.path().join("config").join("blobtrace");
    std::fs::create_dir_all(&global_dir).unwrap();

    std::fs::write(
        global_dir.join("config.toml"),
        r#"
[search]
pipe_capacity = 1024
limit_to_path = true

[logging]
level = "debug"
"#,
    )
    .unwrap();
    std::fs::write(
        repo.join(REPOSITORY_CONFIG_FILE),
        r#"
[search]
pipe_capacity = 2048
"#,
    )
    .unwrap();

    let config = with_isolated_env(&temp_dir, &[], || ConfigLoader::load(&repo).unwrap());

    assert_eq!(config.search.pipe_capacity, 2048);
    assert!(config.search.limit_to_path);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_environment_overrides_files() {
    let temp_dir = TempDir::new().unwrap();
    let repo = temp_dir.path().join("repo");
    std::fs::create_dir_all(&repo).unwrap();
    std::fs::write(
        repo.join(REPOSITORY_CONFIG_FILE),
        "[search]\npipe_capacity = 2048\n",
    )
    .unwrap();

    let config = with_isolated_env(
        &temp_dir,
        &[
            ("BLOBTRACE_SEARCH__PIPE_CAPACITY", "512"),
            ("BLOBTRACE_SEARCH__GIT_BINARY", "/usr/local/bin/git"),
        ],
        || ConfigLoader::load(&repo).unwrap(),
    );

    assert_eq!(config.search.pipe_capacity, 512);
    assert_eq!(config.search.git_binary, "/usr/local/bin/git");
}

#[test]
fn test_invalid_values_fail_validation() {
    let temp_dir = TempDir::new().unwrap();
    let repo = temp_dir.path().join("repo");
    std::fs::create_dir_all(&repo).unwrap();
    std::fs::write(
        repo.join(REPOSITORY_CONFIG_FILE),
        "[search]\npipe_capacity = 0\n\n[logging]\nformat = \"xml\"\n",
    )
    .unwrap();

    let result = with_isolated_env(&temp_dir, &[], || ConfigLoader::load(&repo));

    match result {
        Err(ApiError::ConfigError(message)) => {
            assert!(message.contains("pipe_capacity"), "{}", message);
            assert!(message.contains("xml"), "{}", message);
        }
        other => panic!("expected config error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_load_from_explicit_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("custom.toml");
    std::fs::write(
        &config_file,
        r#"
repository = "/srv/repos/widgets"

[search]
limit_to_path = true
"#,
    )
    .unwrap();

    let config = with_isolated_env(&temp_dir, &[], || {
        ConfigLoader::load_from_file(&config_file).unwrap()
    });

    assert!(config.search.limit_to_path);
    assert_eq!(
        config.repository.as_deref(),
        Some(std::path::Path::new("/srv/repos/widgets"))
    );
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.toml");

    let result = ConfigLoader::load_from_file(&missing);

    assert!(matches!(result, Err(ApiError::ConfigError(_))));
}
