//! Survival Analyzer
//!
//! A line added by commit `c` to path `p` survives when the final blame of
//! `p` still holds a line with the same content attributed to `c`. Identity
//! is content, not line number, and each blamed line can be claimed once, so
//! `survived <= added` holds per commit.

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::{phase_ranges, ratio};
use crate::config::AnalysisConfig;
use crate::model::{CommitIndex, FileCategory, History, PathId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitSurvival {
    pub commit: CommitIndex,
    pub id: String,
    pub timestamp: i64,
    pub added: usize,
    pub survived: usize,
    /// 0 when the commit added nothing
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSurvival {
    pub phase: usize,
    /// First commit of the phase, inclusive
    pub start: CommitIndex,
    /// One past the last commit of the phase
    pub end: CommitIndex,
    pub added: usize,
    pub survived: usize,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySurvival {
    pub category: FileCategory,
    pub added: usize,
    pub survived: usize,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurvivalReport {
    pub total_added: usize,
    pub total_survived: usize,
    /// 0 when nothing was added
    pub overall_rate: f64,
    /// Lines written that did not make it to the final snapshot
    pub exploration_cost: usize,
    pub zero_survival_commits: usize,
    pub commits: Vec<CommitSurvival>,
    pub phases: Vec<PhaseSurvival>,
    /// Only categories that had lines added
    pub by_category: Vec<CategorySurvival>,
}

impl SurvivalReport {
    pub fn phase_rates(&self) -> Vec<f64> {
        self.phases.iter().map(|p| p.rate).collect()
    }
}

pub fn analyze(history: &History, config: &AnalysisConfig) -> SurvivalReport {
    // Unclaimed blamed lines keyed by (path, origin commit, content)
    let mut unclaimed: FxHashMap<(PathId, CommitIndex, &str), usize> = FxHashMap::default();
    for (path, file) in history.blame().iter() {
        for (content, origin) in file.iter() {
            *unclaimed.entry((path, origin, content)).or_insert(0) += 1;
        }
    }

    let mut by_category: FxHashMap<FileCategory, (usize, usize)> = FxHashMap::default();
    let mut commits = Vec::with_capacity(history.commit_count());
    for commit in history.commits() {
        let mut survived = 0;
        for touch in &commit.touches {
            let mut kept = 0;
            for line in &touch.added_lines {
                if let Some(left) = unclaimed.get_mut(&(touch.path, commit.index, line.as_str())) {
                    if *left > 0 {
                        *left -= 1;
                        kept += 1;
                    }
                }
            }
            let category = history.lifecycle(touch.path).category;
            let entry = by_category.entry(category).or_insert((0, 0));
            entry.0 += touch.lines_added;
            entry.1 += kept;
            survived += kept;
        }
        let added = commit.lines_added();
        commits.push(CommitSurvival {
            commit: commit.index,
            id: commit.id.clone(),
            timestamp: commit.timestamp,
            added,
            survived,
            rate: ratio(survived, added),
        });
    }

    let total_added: usize = commits.iter().map(|c| c.added).sum();
    let total_survived: usize = commits.iter().map(|c| c.survived).sum();
    let zero_survival_commits = commits
        .iter()
        .filter(|c| c.added > 0 && c.survived == 0)
        .count();

    let phases = phase_ranges(commits.len(), config.phase_count)
        .into_iter()
        .enumerate()
        .map(|(phase, range)| {
            let slice = &commits[range.clone()];
            let added = slice.iter().map(|c| c.added).sum();
            let survived = slice.iter().map(|c| c.survived).sum();
            PhaseSurvival {
                phase,
                start: range.start,
                end: range.end,
                added,
                survived,
                rate: ratio(survived, added),
            }
        })
        .collect();

    let by_category = FileCategory::ALL
        .iter()
        .filter_map(|category| {
            let &(added, survived) = by_category.get(category)?;
            (added > 0).then(|| CategorySurvival {
                category: *category,
                added,
                survived,
                rate: ratio(survived, added),
            })
        })
        .collect();

    tracing::debug!(total_added, total_survived, "survival computed");

    SurvivalReport {
        total_added,
        total_survived,
        overall_rate: ratio(total_survived, total_added),
        exploration_cost: total_added - total_survived,
        zero_survival_commits,
        commits,
        phases,
        by_category,
    }
}
