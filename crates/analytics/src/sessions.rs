use crate::error::AnalyticsError;
use configuration::{AnalysisConfig, HourWindow, NamedOverlap, SessionDefinition};
use serde::Serialize;
use std::collections::HashSet;

/// A half-open `[start, end)` range of UTC hours that never wraps,
/// `0 <= start < end <= 24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct HourInterval {
    pub start: u32,
    pub end: u32,
}

impl HourInterval {
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start && hour < self.end
    }

    pub fn intersect(&self, other: &HourInterval) -> Option<HourInterval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(HourInterval { start, end })
    }
}

/// A configured session with its windows flattened into sorted,
/// non-wrapping, non-adjacent intervals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub name: String,
    pub intervals: Vec<HourInterval>,
}

impl Session {
    pub fn from_definition(definition: &SessionDefinition) -> Self {
        let intervals = definition.windows.iter().flat_map(split_window).collect();
        Self {
            name: definition.name.clone(),
            intervals: merge(intervals),
        }
    }

    pub fn contains(&self, hour: u32) -> bool {
        self.intervals.iter().any(|i| i.contains(hour))
    }
}

/// The intersection of two or more sessions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionOverlap {
    pub name: String,
    /// Participating session names, sorted. This is the overlap's identity.
    pub sessions: Vec<String>,
    pub intervals: Vec<HourInterval>,
    /// True when the combination was declared in the configuration rather than enumerated.
    pub declared: bool,
}

impl SessionOverlap {
    pub fn contains(&self, hour: u32) -> bool {
        self.intervals.iter().any(|i| i.contains(hour))
    }
}

/// Maps entry hours to sessions and session overlaps.
///
/// Built once per analysis; all lookups are read-only.
#[derive(Debug, Clone)]
pub struct SessionCalendar {
    sessions: Vec<Session>,
    overlaps: Vec<SessionOverlap>,
}

impl SessionCalendar {
    pub fn new(
        definitions: &[SessionDefinition],
        declared: &[NamedOverlap],
    ) -> Result<Self, AnalyticsError> {
        let sessions: Vec<Session> = definitions.iter().map(Session::from_definition).collect();
        let overlaps = compute_overlaps(&sessions, declared)?;

        tracing::debug!(
            sessions = sessions.len(),
            overlaps = overlaps.len(),
            "Built session calendar"
        );

        Ok(Self { sessions, overlaps })
    }

    pub fn from_config(config: &AnalysisConfig) -> Result<Self, AnalyticsError> {
        Self::new(&config.sessions, &config.named_overlaps)
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn overlaps(&self) -> &[SessionOverlap] {
        &self.overlaps
    }

    /// Every session whose window contains `hour`, in configuration order.
    pub fn sessions_for_hour(&self, hour: u32) -> Vec<&str> {
        self.sessions
            .iter()
            .filter(|s| s.contains(hour))
            .map(|s| s.name.as_str())
            .collect()
    }

    pub fn overlaps_for_hour(&self, hour: u32) -> Vec<&SessionOverlap> {
        self.overlaps.iter().filter(|o| o.contains(hour)).collect()
    }
}

/// Enumerates every intersecting pair of sessions, then applies the declared
/// combinations.
///
/// A declared combination over the same sessions as an enumerated pair
/// renames that pair. Combinations of three or more sessions are appended in
/// declaration order.
pub fn compute_overlaps(
    sessions: &[Session],
    declared: &[NamedOverlap],
) -> Result<Vec<SessionOverlap>, AnalyticsError> {
    let mut overlaps = Vec::new();

    for (i, first) in sessions.iter().enumerate() {
        for second in &sessions[i + 1..] {
            let intervals = intersect(&first.intervals, &second.intervals);
            if intervals.is_empty() {
                continue;
            }
            let mut names = vec![first.name.clone(), second.name.clone()];
            names.sort();
            overlaps.push(SessionOverlap {
                name: names.join("/"),
                sessions: names,
                intervals,
                declared: false,
            });
        }
    }

    let mut seen = HashSet::new();
    for combination in declared {
        let mut names: Vec<String> = combination.sessions.clone();
        names.sort();
        names.dedup();
        if names.len() < 2 {
            return Err(AnalyticsError::Calendar(format!(
                "overlap '{}' must combine at least two distinct sessions",
                combination.name
            )));
        }
        if !seen.insert(names.clone()) {
            return Err(AnalyticsError::Calendar(format!(
                "overlap '{}' declares the same sessions as an earlier overlap",
                combination.name
            )));
        }

        let mut intervals = vec![HourInterval { start: 0, end: 24 }];
        for name in &names {
            let session = sessions.iter().find(|s| &s.name == name).ok_or_else(|| {
                AnalyticsError::Calendar(format!(
                    "overlap '{}' references unknown session '{}'",
                    combination.name, name
                ))
            })?;
            intervals = intersect(&intervals, &session.intervals);
        }
        if intervals.is_empty() {
            return Err(AnalyticsError::Calendar(format!(
                "sessions of overlap '{}' never trade at the same time",
                combination.name
            )));
        }

        match overlaps.iter_mut().find(|o| o.sessions == names) {
            Some(pair) => {
                pair.name = combination.name.clone();
                pair.declared = true;
            }
            None => overlaps.push(SessionOverlap {
                name: combination.name.clone(),
                sessions: names,
                intervals,
                declared: true,
            }),
        }
    }

    Ok(overlaps)
}

/// A wrapping window becomes `[start, 24)` plus `[0, end)`.
fn split_window(window: &HourWindow) -> Vec<HourInterval> {
    if window.start_hour < window.end_hour {
        return vec![HourInterval {
            start: window.start_hour,
            end: window.end_hour,
        }];
    }
    let mut intervals = vec![HourInterval {
        start: window.start_hour,
        end: 24,
    }];
    if window.end_hour > 0 {
        intervals.push(HourInterval {
            start: 0,
            end: window.end_hour,
        });
    }
    intervals
}

/// Sorts and merges overlapping or adjacent intervals.
fn merge(mut intervals: Vec<HourInterval>) -> Vec<HourInterval> {
    intervals.sort();
    let mut merged: Vec<HourInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => last.end = last.end.max(interval.end),
            _ => merged.push(interval),
        }
    }
    merged
}

fn intersect(a: &[HourInterval], b: &[HourInterval]) -> Vec<HourInterval> {
    let pieces = a
        .iter()
        .flat_map(|x| b.iter().filter_map(move |y| x.intersect(y)))
        .collect();
    merge(pieces)
}
