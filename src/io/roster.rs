use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};

use crate::heuristics::titleize;
use crate::models::{LegislatorRecord, RosterIndex, ServiceInterval};

/// One entry of a legislator or executive registry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryEntry {
    #[serde(default)]
    pub id: RegistryId,
    #[serde(default)]
    pub name: RegistryName,
    #[serde(default)]
    pub terms: Vec<RegistrySpan>,
    #[serde(default)]
    pub positions: Vec<RegistrySpan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryId {
    #[serde(default)]
    pub wikipedia: Option<String>,
    #[serde(default)]
    pub bioguide: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryName {
    #[serde(default)]
    pub first: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrySpan {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

impl RegistryEntry {
    /// Title-cased Wikipedia name, else "First Last"
    pub fn canonical_name(&self) -> String {
        if let Some(wiki) = self.id.wikipedia.as_deref().filter(|w| !w.trim().is_empty()) {
            return titleize(wiki.trim());
        }
        let first = self.name.first.as_deref().unwrap_or_default();
        let last = self.name.last.as_deref().unwrap_or_default();
        titleize(format!("{} {}", first, last).trim())
    }

    /// Terms then positions as service intervals. Spans with unparsable
    /// dates are skipped; an entry left with none serves all time.
    fn intervals(&self, name: &str) -> Vec<ServiceInterval> {
        let mut intervals = Vec::new();
        for span in self.terms.iter().chain(&self.positions) {
            match (parse_bound(span.start.as_deref()), parse_bound(span.end.as_deref())) {
                (Ok(start), Ok(end)) => intervals.push(ServiceInterval { start, end }),
                _ => warn!(
                    "Skipping unparsable service span for {}: {:?} to {:?}",
                    name, span.start, span.end
                ),
            }
        }
        if intervals.is_empty() {
            intervals.push(ServiceInterval::open());
        }
        intervals
    }

    fn into_record(self, source: &str) -> LegislatorRecord {
        let name = self.canonical_name();
        LegislatorRecord {
            intervals: self.intervals(&name),
            source: source.to_string(),
            bioguide: self.id.bioguide.filter(|b| !b.is_empty()),
            name,
        }
    }
}

fn parse_bound(raw: Option<&str>) -> Result<Option<NaiveDate>, chrono::ParseError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map(Some),
        None => Ok(None),
    }
}

/// Registry label: the file stem, e.g. "legislators-current"
pub fn registry_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Parse one registry's JSON array into records
pub fn parse_registry_json(json: &str, source: &str) -> Result<Vec<LegislatorRecord>> {
    let entries: Vec<RegistryEntry> =
        serde_json::from_str(json).with_context(|| format!("Failed to parse registry {}", source))?;
    Ok(entries.into_iter().map(|e| e.into_record(source)).collect())
}

/// Load and merge registries in the given order
pub fn load_roster(paths: &[impl AsRef<Path>]) -> Result<RosterIndex> {
    let mut records = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read roster file: {:?}", path))?;
        records.extend(parse_registry_json(&content, &registry_label(path))?);
    }

    let roster = RosterIndex::from_records(records);
    info!(
        "Roster: {} term rows, {} unique people",
        roster.term_rows(),
        roster.unique_people()
    );
    Ok(roster)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"[
        {"id": {"bioguide": "S000001", "wikipedia": "john smith (politician)"},
         "name": {"first": "Johnny", "last": "Smith"},
         "terms": [{"start": "1991-01-03", "end": "1993-01-03", "state": "TX"},
                   {"start": "not a date", "end": "1995-01-03"}]},
        {"id": {}, "name": {"first": "MARY", "last": "JONES"}},
        {"id": {}, "name": {}, "terms": [{"start": "2001-01-03", "end": "2003-01-03"}]},
        {"id": {}, "name": {"first": "Ann", "last": "Lee"},
         "positions": [{"start": "bad", "end": "bad"}]}
    ]"#;

    #[test]
    fn test_parse_registry() {
        let records = parse_registry_json(REGISTRY, "legislators-historical").unwrap();
        assert_eq!(records.len(), 4);

        assert_eq!(records[0].name, "John Smith (Politician)");
        assert_eq!(records[0].bioguide.as_deref(), Some("S000001"));
        assert_eq!(records[0].intervals.len(), 1);
        assert_eq!(
            records[0].intervals[0].start,
            NaiveDate::from_ymd_opt(1991, 1, 3)
        );

        assert_eq!(records[1].name, "Mary Jones");
        assert_eq!(records[1].intervals, vec![ServiceInterval::open()]);
        assert_eq!(records[3].intervals, vec![ServiceInterval::open()]);
    }

    #[test]
    fn test_load_roster_drops_nameless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legislators-historical.json");
        std::fs::write(&path, REGISTRY).unwrap();

        let roster = load_roster(&[path]).unwrap();
        assert_eq!(roster.unique_people(), 3);
        let meta = roster.metadata("Mary Jones").unwrap();
        assert_eq!(meta.source, "legislators-historical");
    }

    #[test]
    fn test_missing_roster_is_error() {
        assert!(load_roster(&["/nonexistent/roster.json"]).is_err());
    }
}
