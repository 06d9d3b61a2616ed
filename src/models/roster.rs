use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

/// A period of service; `None` bounds are open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceInterval {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ServiceInterval {
    /// Interval covering all time
    pub fn open() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Whether the date falls inside the interval (inclusive on both ends)
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| s <= date) && self.end.is_none_or(|e| date <= e)
    }
}

/// One person from a legislator or executive registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegislatorRecord {
    /// Canonical display name, e.g. "John Smith"
    pub name: String,
    /// Service intervals in registry order
    pub intervals: Vec<ServiceInterval>,
    /// Registry the record came from (e.g. "legislators-current")
    pub source: String,
    /// External bioguide identifier, when the registry has one
    pub bioguide: Option<String>,
}

impl LegislatorRecord {
    pub fn serves_on(&self, date: NaiveDate) -> bool {
        self.intervals.iter().any(|i| i.contains(date))
    }
}

/// Metadata joined onto clean output rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterMeta {
    pub source: String,
    pub bioguide: Option<String>,
    pub first_interval: ServiceInterval,
}

/// Merged registries, built once at startup and read-only afterwards
#[derive(Debug, Default)]
pub struct RosterIndex {
    records: Vec<LegislatorRecord>,
    meta: HashMap<String, RosterMeta>,
}

impl RosterIndex {
    /// Build the index, dropping records whose canonical name is empty
    pub fn from_records(records: impl IntoIterator<Item = LegislatorRecord>) -> Self {
        let records: Vec<LegislatorRecord> = records
            .into_iter()
            .filter(|r| !r.name.trim().is_empty())
            .map(|mut r| {
                if r.intervals.is_empty() {
                    r.intervals.push(ServiceInterval::open());
                }
                r
            })
            .collect();

        let mut meta = HashMap::new();
        for record in &records {
            meta.entry(record.name.clone()).or_insert_with(|| RosterMeta {
                source: record.source.clone(),
                bioguide: record.bioguide.clone(),
                first_interval: record.intervals[0],
            });
        }

        Self { records, meta }
    }

    pub fn records(&self) -> &[LegislatorRecord] {
        &self.records
    }

    /// Number of flat (name, start, end) rows
    pub fn term_rows(&self) -> usize {
        self.records.iter().map(|r| r.intervals.len()).sum()
    }

    /// Number of distinct canonical names
    pub fn unique_people(&self) -> usize {
        self.meta.len()
    }

    /// Metadata for a display name, first occurrence wins
    pub fn metadata(&self, name: &str) -> Option<&RosterMeta> {
        self.meta.get(name)
    }

    /// Records active on the given date, or the whole roster when none are
    pub fn snapshot(&self, date: NaiveDate) -> RosterSnapshot<'_> {
        let active: Vec<&LegislatorRecord> =
            self.records.iter().filter(|r| r.serves_on(date)).collect();

        if active.is_empty() {
            RosterSnapshot::new(date, self.records.iter().collect(), true)
        } else {
            RosterSnapshot::new(date, active, false)
        }
    }
}

/// Roster slice for one document's date
#[derive(Debug, Clone)]
pub struct RosterSnapshot<'a> {
    date: NaiveDate,
    records: Vec<&'a LegislatorRecord>,
    is_fallback: bool,
}

impl<'a> RosterSnapshot<'a> {
    fn new(date: NaiveDate, records: Vec<&'a LegislatorRecord>, is_fallback: bool) -> Self {
        Self {
            date,
            records,
            is_fallback,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// True when nobody served on the date and the full roster was used instead
    pub fn is_fallback(&self) -> bool {
        self.is_fallback
    }

    /// Distinct display names in roster order
    pub fn names(&self) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.name.as_str())
            .filter(|n| seen.insert(*n))
            .collect()
    }
}
