//! Searches against real git repositories

use super::test_utils::GitFixture;
use blobtrace::config::SearchConfig;
use blobtrace::error::{ApiError, ObjectError, SearchError, SourceFailure};
use blobtrace::history::{EntryLocator, GitRepository, SnapshotResolver};
use blobtrace::search::{SearchCoordinator, SearchOutcome};
use blobtrace::{ContentHash, EntryPath, ObjectType, Repository, RevisionId};
use std::sync::Arc;
use tempfile::TempDir;

fn path(raw: &str) -> EntryPath {
    EntryPath::parse(raw).unwrap()
}

async fn open(fixture: &GitFixture, config: SearchConfig) -> Repository {
    Repository::open(fixture.path(), config).await.unwrap()
}

#[tokio::test]
async fn test_finds_revision_holding_blob() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    fixture.commit(&[("docs/notes.txt", "one\n")], "first");
    let second = fixture.commit(&[("docs/notes.txt", "two\n")], "second");
    fixture.commit(&[("docs/notes.txt", "three\n")], "third");
    let target = fixture.blob_hash("two\n");

    let repository = open(&fixture, SearchConfig::default()).await;
    let entry = repository
        .blob_in_path(&target.to_hex(), "docs/notes.txt")
        .await
        .unwrap();

    assert_eq!(entry.revision.as_str(), second);
    assert_eq!(entry.path.as_str(), "docs/notes.txt");
    assert_eq!(entry.kind, ObjectType::Blob);
    assert_eq!(entry.mode, "100644");
    assert_eq!(entry.hash, target);
}

#[tokio::test]
async fn test_latest_listed_revision_wins_when_blob_persists() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    fixture.commit(&[("a.txt", "same\n")], "introduce");
    fixture.commit(&[("b.txt", "other\n")], "unrelated");
    let head = fixture.commit(&[("c.txt", "more\n")], "unrelated again");

    let repository = open(&fixture, SearchConfig::default()).await;
    let outcome = repository
        .find(fixture.blob_hash("same\n"), &path("a.txt"))
        .await;

    // rev-list lists newest first, so the first match is the tip.
    assert_eq!(outcome.entry().unwrap().revision.as_str(), head);
}

#[tokio::test]
async fn test_revisions_without_the_path_are_skipped() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    let introduced = fixture.commit(&[("src/main.rs", "fn main() {}\n")], "add main");
    fixture.remove("src/main.rs", "remove main");
    fixture.commit(&[("README", "readme\n")], "add readme");

    let repository = open(&fixture, SearchConfig::default()).await;
    let outcome = repository
        .find(fixture.blob_hash("fn main() {}\n"), &path("src/main.rs"))
        .await;

    assert_eq!(outcome.entry().unwrap().revision.as_str(), introduced);
}

#[tokio::test]
async fn test_unknown_blob_is_not_found() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    fixture.commit(&[("a.txt", "a\n")], "first");
    fixture.commit(&[("a.txt", "b\n")], "second");

    let repository = open(&fixture, SearchConfig::default()).await;
    let err = repository
        .blob_in_path(&fixture.blob_hash("never committed\n").to_hex(), "a.txt")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::SearchError(SearchError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_repository_without_commits_is_not_found() {
    let Some(fixture) = GitFixture::new() else {
        return;
    };

    let repository = open(&fixture, SearchConfig::default()).await;
    let outcome = repository
        .find(fixture.blob_hash("x\n"), &path("a.txt"))
        .await;

    assert!(matches!(outcome, SearchOutcome::NotFound));
}

#[tokio::test]
async fn test_directory_at_path_never_matches_blob() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    fixture.commit(&[("dir/inner.txt", "inner\n")], "nested");

    let repository = open(&fixture, SearchConfig::default()).await;
    let outcome = repository
        .find(fixture.blob_hash("inner\n"), &path("dir"))
        .await;

    assert!(matches!(outcome, SearchOutcome::NotFound));
}

#[tokio::test]
async fn test_limit_to_path_still_finds_blob() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    let introduced = fixture.commit(&[("lib/util.rs", "pub fn util() {}\n")], "util");
    for index in 0..5 {
        let noise = format!("noise{}.txt", index);
        fixture.commit(&[(noise.as_str(), "noise\n")], "noise");
    }
    fixture.commit(&[("lib/util.rs", "pub fn util2() {}\n")], "change util");

    let config = SearchConfig {
        limit_to_path: true,
        ..SearchConfig::default()
    };
    let repository = open(&fixture, config).await;
    let outcome = repository
        .find(fixture.blob_hash("pub fn util() {}\n"), &path("lib/util.rs"))
        .await;

    assert_eq!(outcome.entry().unwrap().revision.as_str(), introduced);
}

#[tokio::test]
async fn test_match_at_tip_with_tiny_pipe_is_found() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    for index in 0..40 {
        let content = format!("{}\n", index);
        fixture.commit(&[("counter.txt", content.as_str())], "bump");
    }
    let head = fixture.git(&["rev-parse", "HEAD"]);

    let config = SearchConfig {
        pipe_capacity: 8,
        ..SearchConfig::default()
    };
    let repository = open(&fixture, config).await;
    let outcome = repository
        .find(fixture.blob_hash("39\n"), &path("counter.txt"))
        .await;

    assert_eq!(outcome.entry().unwrap().revision.as_str(), head);
}

#[tokio::test]
async fn test_listing_outside_repository_reports_diagnostics() {
    let Some(_fixture) = GitFixture::new() else {
        return;
    };
    let not_a_repo = TempDir::new().unwrap();
    let git = Arc::new(GitRepository::new(not_a_repo.path()));
    let coordinator =
        SearchCoordinator::new(git.clone(), git.clone(), git, SearchConfig::default());

    let outcome = coordinator
        .search(ContentHash::Sha1([1; 20]), &path("a.txt"))
        .await;

    match outcome {
        SearchOutcome::Failed(SearchError::Source {
            failure,
            diagnostics,
        }) => {
            assert!(matches!(failure, SourceFailure::Exited { .. }));
            assert!(!diagnostics.trim().is_empty());
        }
        other => panic!("expected source failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_open_rejects_plain_directory() {
    let Some(_fixture) = GitFixture::new() else {
        return;
    };
    let plain = TempDir::new().unwrap();

    let result = Repository::open(plain.path(), SearchConfig::default()).await;

    assert!(matches!(result, Err(ApiError::NotARepository(_))));
}

#[tokio::test]
async fn test_resolve_unknown_revision() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    fixture.commit(&[("a.txt", "a\n")], "first");
    let git = GitRepository::new(fixture.path());

    let missing = RevisionId::parse("0123456789abcdef0123456789abcdef01234567").unwrap();
    let err = git.resolve_snapshot(&missing).await.unwrap_err();

    assert!(matches!(err, ObjectError::RevisionNotFound(_)));
}

#[tokio::test]
async fn test_locate_entry_in_nested_tree() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    let commit = fixture.commit(
        &[("a/b/c.txt", "deep\n"), ("a/b/c.txt.bak", "backup\n")],
        "nested",
    );
    let git = GitRepository::new(fixture.path());

    let snapshot = git
        .resolve_snapshot(&RevisionId::parse(&commit).unwrap())
        .await
        .unwrap();
    let entry = git.locate_entry(&snapshot, &path("a/b/c.txt")).await.unwrap();
    let missing = git.locate_entry(&snapshot, &path("a/b/c")).await.unwrap_err();

    assert_eq!(snapshot.tree.to_hex(), fixture.git(&["rev-parse", "HEAD^{tree}"]));
    assert_eq!(entry.hash, fixture.blob_hash("deep\n"));
    assert!(matches!(missing, ObjectError::PathNotFound(_)));
}

#[tokio::test]
async fn test_object_exists() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    let commit = fixture.commit(&[("a.txt", "present\n")], "first");

    let repository = open(&fixture, SearchConfig::default()).await;

    assert!(repository.object_exists(&commit).await);
    assert!(
        repository
            .object_exists(&fixture.blob_hash("present\n").to_hex())
            .await
    );
    assert!(
        !repository
            .object_exists(&fixture.blob_hash("absent\n").to_hex())
            .await
    );
}

#[tokio::test]
async fn test_finds_blob_whose_name_starts_with_colon() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    let commit = fixture.commit(&[(":odd.txt", "x\n"), ("odd.txt", "y\n")], "colon name");
    let target = fixture.blob_hash("x\n");

    for limit_to_path in [false, true] {
        let config = SearchConfig {
            limit_to_path,
            ..SearchConfig::default()
        };
        let repository = open(&fixture, config).await;
        let entry = repository
            .blob_in_path(&target.to_hex(), ":odd.txt")
            .await
            .unwrap();

        assert_eq!(entry.revision.as_str(), commit);
        assert_eq!(entry.path.as_str(), ":odd.txt");
        assert_eq!(entry.hash, target);
    }
}

#[tokio::test]
async fn test_option_like_revision_is_not_an_option() {
    let Some(mut fixture) = GitFixture::new() else {
        return;
    };
    fixture.commit(&[("a.txt", "a\n")], "first");
    let git = GitRepository::new(fixture.path());

    let revision = RevisionId::parse("--git-dir").unwrap();
    let err = git.resolve_snapshot(&revision).await.unwrap_err();

    assert!(matches!(err, ObjectError::RevisionNotFound(ref r) if r.as_str() == "--git-dir"));
}
