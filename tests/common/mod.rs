// Shared test fixtures for integration tests
// Functions here are used across different test files
#![allow(dead_code)]

use git2::{Oid, Repository, Signature, Time};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const MINUTE: i64 = 60;
pub const HOUR: i64 = 60 * MINUTE;
pub const DAY: i64 = 24 * HOUR;

/// Fixed starting point so fixtures are reproducible
pub const T0: i64 = 1_700_000_000;

/// Create a temporary git repository
pub fn create_test_repo() -> (TempDir, PathBuf, Repository) {
    let dir = TempDir::new().unwrap();
    let repo_path = dir.path().to_path_buf();
    let repo = Repository::init(&repo_path).unwrap();

    // Configure git user for commits
    let mut config = repo.config().unwrap();
    config.set_str("user.name", "Test User").unwrap();
    config.set_str("user.email", "test@example.com").unwrap();

    (dir, repo_path, repo)
}

fn signature_at(timestamp: i64) -> Signature<'static> {
    Signature::new("Test User", "test@example.com", &Time::new(timestamp, 0)).unwrap()
}

/// Newline-terminated file body from lines
pub fn body(lines: &[&str]) -> Vec<u8> {
    let mut text = lines.join("\n");
    if !lines.is_empty() {
        text.push('\n');
    }
    text.into_bytes()
}

/// Write files, stage them and commit on top of HEAD at `timestamp`
pub fn add_commit(repo: &Repository, timestamp: i64, files: &[(&str, &[&str])]) -> Oid {
    let mut index = repo.index().unwrap();

    for (path, lines) in files {
        // Write file to working directory
        let full_path = repo.workdir().unwrap().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&full_path, body(lines)).unwrap();

        index.add_path(Path::new(path)).unwrap();
    }

    index.write().unwrap();
    commit_index(repo, timestamp, &format!("commit at {timestamp}"))
}

/// Remove a file and commit at `timestamp`
pub fn remove_file_commit(repo: &Repository, timestamp: i64, path: &str) -> Oid {
    let full_path = repo.workdir().unwrap().join(path);
    if full_path.exists() {
        std::fs::remove_file(&full_path).unwrap();
    }

    let mut index = repo.index().unwrap();
    index.remove_path(Path::new(path)).unwrap();
    index.write().unwrap();
    commit_index(repo, timestamp, &format!("remove {path}"))
}

fn commit_index(repo: &Repository, timestamp: i64, message: &str) -> Oid {
    let sig = signature_at(timestamp);
    let mut index = repo.index().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}

/// Commit the current HEAD tree again with an extra parent, producing a
/// merge commit
pub fn merge_commit(repo: &Repository, timestamp: i64, other_parent: Oid) -> Oid {
    let sig = signature_at(timestamp);
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    let other = repo.find_commit(other_parent).unwrap();
    let tree = head.tree().unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "merge", &tree, &[&head, &other])
        .unwrap()
}
