//! Coordination Analyzer
//!
//! Looks at consecutive touches of the same path, ordered by commit
//! timestamp. A short gap is a thrash incident; a very short gap where the
//! second touch removes most of what the first one added is additionally a
//! rapid overwrite. Every rapid overwrite is also counted as a thrash
//! incident.

use rustc_hash::FxHashMap;
use serde::Serialize;

use super::phase_of;
use crate::config::AnalysisConfig;
use crate::model::{CommitIndex, FileCategory, FileLifecycle, FileTouch, History};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncidentKind {
    Adjacent,
    RapidOverwrite,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThrashIncident {
    pub path: String,
    pub category: FileCategory,
    pub commit_a: CommitIndex,
    pub commit_b: CommitIndex,
    pub gap_secs: i64,
    pub kind: IncidentKind,
    /// Lines added by the first touch
    pub lines_added_a: usize,
    /// Lines removed by the second touch
    pub lines_removed_b: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hotspot {
    pub path: String,
    pub category: FileCategory,
    pub incidents: usize,
    pub rapid_overwrites: usize,
    pub touches: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryIncidents {
    pub category: FileCategory,
    pub incidents: usize,
    pub rapid_overwrites: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinationReport {
    pub total_touches: usize,
    pub thrash_incidents: usize,
    pub rapid_overwrites: usize,
    /// Sorted by path, then by second commit
    pub incidents: Vec<ThrashIncident>,
    /// Top files by incident count
    pub hotspots: Vec<Hotspot>,
    pub by_category: Vec<CategoryIncidents>,
    /// Incidents per phase of the second commit
    pub by_phase: Vec<usize>,
}

impl CoordinationReport {
    /// Incidents per touch; 0 for an empty history
    pub fn thrash_rate(&self) -> f64 {
        super::ratio(self.thrash_incidents, self.total_touches)
    }
}

pub fn analyze(history: &History, config: &AnalysisConfig) -> CoordinationReport {
    let mut incidents = Vec::new();
    let mut total_touches = 0;
    for lifecycle in history.lifecycles() {
        total_touches += lifecycle.touches.len();
        path_incidents(history, lifecycle, config, &mut incidents);
    }
    incidents.sort_by(|a, b| a.path.cmp(&b.path).then(a.commit_b.cmp(&b.commit_b)));

    let thrash_incidents = incidents.len();
    let rapid_overwrites = incidents
        .iter()
        .filter(|i| i.kind == IncidentKind::RapidOverwrite)
        .count();

    let mut per_file: FxHashMap<&str, Hotspot> = FxHashMap::default();
    let mut per_category: FxHashMap<FileCategory, (usize, usize)> = FxHashMap::default();
    let mut by_phase = vec![0usize; config.phase_count];
    for incident in &incidents {
        let rapid = usize::from(incident.kind == IncidentKind::RapidOverwrite);
        let hotspot = per_file.entry(&incident.path).or_insert_with(|| Hotspot {
            path: incident.path.clone(),
            category: incident.category,
            incidents: 0,
            rapid_overwrites: 0,
            touches: history
                .path_id(&incident.path)
                .map_or(0, |id| history.lifecycle(id).touches.len()),
        });
        hotspot.incidents += 1;
        hotspot.rapid_overwrites += rapid;

        let entry = per_category.entry(incident.category).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += rapid;

        by_phase[phase_of(incident.commit_b, history.commit_count(), config.phase_count)] += 1;
    }

    let mut hotspots: Vec<Hotspot> = per_file.into_values().collect();
    hotspots.sort_by(|a, b| b.incidents.cmp(&a.incidents).then_with(|| a.path.cmp(&b.path)));
    hotspots.truncate(config.hotspot_limit);

    let by_category = FileCategory::ALL
        .iter()
        .filter_map(|category| {
            per_category
                .get(category)
                .map(|&(incidents, rapid_overwrites)| CategoryIncidents {
                    category: *category,
                    incidents,
                    rapid_overwrites,
                })
        })
        .collect();

    tracing::debug!(thrash_incidents, rapid_overwrites, "coordination computed");

    CoordinationReport {
        total_touches,
        thrash_incidents,
        rapid_overwrites,
        incidents,
        hotspots,
        by_category,
        by_phase,
    }
}

fn path_incidents(
    history: &History,
    lifecycle: &FileLifecycle,
    config: &AnalysisConfig,
    out: &mut Vec<ThrashIncident>,
) {
    let mut touches: Vec<&FileTouch> = history.touches_of(lifecycle).collect();
    // Stable: equal timestamps keep commit order
    touches.sort_by_key(|t| history.commit(t.commit).timestamp);

    for pair in touches.windows(2) {
        let (first, second) = (pair[0], pair[1]);
        let gap_secs =
            history.commit(second.commit).timestamp - history.commit(first.commit).timestamp;
        if gap_secs >= config.thrash_gap_secs {
            continue;
        }
        let kind = if is_rapid_overwrite(first, second, gap_secs, config) {
            IncidentKind::RapidOverwrite
        } else {
            IncidentKind::Adjacent
        };
        out.push(ThrashIncident {
            path: history.path(lifecycle.path).to_string(),
            category: lifecycle.category,
            commit_a: first.commit,
            commit_b: second.commit,
            gap_secs,
            kind,
            lines_added_a: first.lines_added,
            lines_removed_b: second.lines_removed,
        });
    }
}

fn is_rapid_overwrite(
    first: &FileTouch,
    second: &FileTouch,
    gap_secs: i64,
    config: &AnalysisConfig,
) -> bool {
    gap_secs < config.rapid_overwrite_gap_secs
        && first.lines_added > 0
        && second.lines_removed as f64 > config.rapid_overwrite_ratio * first.lines_added as f64
}
