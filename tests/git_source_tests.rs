// GitSource integration tests
// Runs the history source and the full analysis against temporary repositories

mod common;

use common::{DAY, MINUTE, T0};
use linefate::analysis::TrajectoryLabel;
use linefate::model::TouchKind;
use linefate::repository::{GitSource, HistorySource, NoopProgress};
use linefate::{AnalysisConfig, AnalysisError};

#[test]
fn test_commits_are_listed_oldest_first() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    let first = common::add_commit(&repo, T0, &[("a.txt", &["one"])]);
    let second = common::add_commit(&repo, T0 + MINUTE, &[("a.txt", &["one", "two"])]);

    let source = GitSource::open(&repo_path).unwrap();
    let commits = source.commits().unwrap();
    assert_eq!(commits.len(), 2);
    assert_eq!(commits[0].id, first.to_string());
    assert_eq!(commits[1].id, second.to_string());
    assert_eq!(commits[0].timestamp, T0);
    assert_eq!(commits[0].parent_count, 0);
    assert_eq!(commits[1].parent_count, 1);
    assert_eq!(source.head_id(), second.to_string());
}

#[test]
fn test_touches_carry_line_contents() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    common::add_commit(&repo, T0, &[("src/lib.rs", &["fn a() {}", "fn b() {}"])]);
    common::add_commit(&repo, T0 + MINUTE, &[("src/lib.rs", &["fn a() {}", "fn c() {}"])]);
    common::remove_file_commit(&repo, T0 + 2 * MINUTE, "src/lib.rs");

    let source = GitSource::open(&repo_path).unwrap();
    let commits = source.commits().unwrap();

    let added = source.touches(&commits[0]).unwrap();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].path, "src/lib.rs");
    assert_eq!(added[0].kind, TouchKind::Added);
    assert_eq!(added[0].added_lines, vec!["fn a() {}", "fn b() {}"]);

    let modified = &source.touches(&commits[1]).unwrap()[0];
    assert_eq!(modified.kind, TouchKind::Modified);
    assert_eq!(modified.added_lines, vec!["fn c() {}"]);
    assert_eq!(modified.removed_lines, vec!["fn b() {}"]);

    let deleted = &source.touches(&commits[2]).unwrap()[0];
    assert_eq!(deleted.kind, TouchKind::Deleted);
    assert_eq!(deleted.removed_lines.len(), 2);
}

#[test]
fn test_content_and_final_state() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    common::add_commit(&repo, T0, &[("docs/guide.md", &["# Guide"]), ("tmp.txt", &["x"])]);
    common::add_commit(&repo, T0 + MINUTE, &[("docs/guide.md", &["# Guide", "more"])]);
    common::remove_file_commit(&repo, T0 + 2 * MINUTE, "tmp.txt");

    let source = GitSource::open(&repo_path).unwrap();
    let commits = source.commits().unwrap();

    assert_eq!(
        source.content_at(&commits[0], "docs/guide.md").unwrap(),
        Some(vec!["# Guide".to_string()])
    );
    assert_eq!(source.content_at(&commits[2], "tmp.txt").unwrap(), None);
    assert_eq!(source.final_paths().unwrap(), vec!["docs/guide.md"]);
    assert_eq!(source.final_content("docs/guide.md").unwrap(), vec!["# Guide", "more"]);
    assert!(source.final_content("tmp.txt").is_err());
}

#[test]
fn test_blame_attributes_each_line() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    let first = common::add_commit(&repo, T0, &[("f.txt", &["a", "b"])]);
    let second = common::add_commit(&repo, T0 + MINUTE, &[("f.txt", &["a", "x", "b"])]);

    let source = GitSource::open(&repo_path).unwrap();
    let blame = source.blame("f.txt").unwrap();
    let origins: Vec<String> = blame.iter().map(|r| r.commit_id.clone()).collect();
    assert_eq!(
        origins,
        vec![first.to_string(), second.to_string(), first.to_string()]
    );
    assert_eq!(blame[1].content, "x");
    assert_eq!(blame[1].line_no, 2);
}

#[test]
fn test_survival_over_git_history() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    let old: Vec<String> = (1..=10).map(|i| format!("L{i}")).collect();
    let new: Vec<String> = (1..=10).map(|i| format!("F{i}")).collect();
    let old: Vec<&str> = old.iter().map(String::as_str).collect();
    let new: Vec<&str> = new.iter().map(String::as_str).collect();

    common::add_commit(&repo, T0, &[("a.txt", &old)]);
    let middle: Vec<&str> = new.iter().chain(&old[5..]).copied().collect();
    common::add_commit(&repo, T0 + DAY, &[("a.txt", &middle)]);
    common::add_commit(&repo, T0 + 2 * DAY, &[("a.txt", &new)]);

    let source = GitSource::open(&repo_path).unwrap();
    let report =
        linefate::analyze(&source, AnalysisConfig::default(), &NoopProgress).unwrap();

    let survived: Vec<usize> = report.survival.commits.iter().map(|c| c.survived).collect();
    assert_eq!(survived, vec![0, 10, 0]);
    assert_eq!(report.survival.overall_rate, 0.5);
    assert_eq!(report.survival.zero_survival_commits, 1);
    assert_eq!(report.trajectory.files[0].samples.last().unwrap().distance, 0.0);
    assert_eq!(report.trajectory.files[0].classification.label, TrajectoryLabel::Learning);
}

#[test]
fn test_merge_commit_aborts_the_run() {
    let (_dir, repo_path, repo) = common::create_test_repo();
    let first = common::add_commit(&repo, T0, &[("a.txt", &["1"])]);
    common::add_commit(&repo, T0 + MINUTE, &[("a.txt", &["2"])]);
    let merge = common::merge_commit(&repo, T0 + 2 * MINUTE, first);

    let source = GitSource::open(&repo_path).unwrap();
    let result = linefate::analyze(&source, AnalysisConfig::default(), &NoopProgress);
    match result {
        Err(AnalysisError::HistoryIncomplete { location, .. }) => {
            assert_eq!(location, merge.to_string());
        }
        other => panic!("expected HistoryIncomplete, got {other:?}"),
    }
}

#[test]
fn test_open_rejects_non_repository() {
    let dir = tempfile::TempDir::new().unwrap();
    assert!(GitSource::open(dir.path()).is_err());
}
