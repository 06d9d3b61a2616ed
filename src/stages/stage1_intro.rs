use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::AttributionError;
use crate::heuristics::{
    is_all_caps, name_parts, surname_of, surname_token, titleize, IntroPatterns,
};
use crate::models::{IdentityMap, Role, RoleBindings, RosterSnapshot, PLACEHOLDER};
use crate::pipeline::Deadline;

/// Compiled size ceiling for the per-document roster-name pattern. A full
/// roster fallback alternates over every legislator ever seated.
const ROSTER_PATTERN_SIZE_LIMIT: usize = 256 * (1 << 20);

/// Configuration for Stage 1
#[derive(Debug, Clone)]
pub struct IntroConfig {
    /// Number of leading words treated as the intro window
    pub window_words: usize,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self { window_words: 2000 }
    }
}

/// What the intro window tells us about a document's participants
#[derive(Debug, Clone, Default)]
pub struct IntroResolution {
    /// Roster-name and state-fallback hits
    pub hits: usize,
    /// Surnames whose cues start attributed spans (placeholder included)
    pub keep: BTreeSet<String>,
    pub roles: RoleBindings,
    /// Participants mentioned in the intro whose cues are not kept
    pub drop: Vec<String>,
}

/// First `words` whitespace-separated words, joined by single spaces
pub fn intro_window(text: &str, words: usize) -> String {
    text.split_whitespace()
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Case-insensitive "first [Middle ...] last [suffix]" alternation over the
/// snapshot names. Single-word names contribute nothing; `None` when no name
/// qualifies.
pub fn roster_name_pattern(names: &[&str]) -> Result<Option<Regex>, regex::Error> {
    let pieces: Vec<String> = names
        .iter()
        .filter_map(|name| name_parts(name))
        .map(|(first, last)| {
            format!(
                r"{}(?-i:\s+[A-Z][A-Za-z'\-.]*)*\s+{}(?:\s+(?:Jr\.?|Sr\.?|II|III|IV|V))?",
                regex::escape(first),
                regex::escape(last)
            )
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if pieces.is_empty() {
        return Ok(None);
    }

    let pattern = format!(r"(?i)\b(?:{})\b", pieces.join("|"));
    let regex = RegexBuilder::new(&pattern)
        .size_limit(ROSTER_PATTERN_SIZE_LIMIT)
        .dfa_size_limit(ROSTER_PATTERN_SIZE_LIMIT)
        .build()?;
    Ok(Some(regex))
}

/// Perform Stage 1: resolve participants from the intro window.
///
/// Roster names and `STATE, SURNAME` mentions count as intro hits. Role
/// introductions (`CHAIRMAN JOHN SMITH,`) bind roles and seed the identity
/// map; a bare fuzzy-chair mention is consulted only when no chair was bound.
pub fn resolve_intro(
    intro: &str,
    body: &str,
    snapshot: &RosterSnapshot<'_>,
    identities: &mut IdentityMap,
    patterns: &IntroPatterns,
    deadline: &Deadline,
) -> Result<IntroResolution, AttributionError> {
    let mut resolution = IntroResolution::default();

    if let Some(roster_re) = roster_name_pattern(&snapshot.names())? {
        for m in roster_re.find_iter(intro) {
            if let Some(surname) = surname_of(m.as_str()) {
                resolution.keep.insert(surname);
                resolution.hits += 1;
            }
        }
    }
    deadline.check()?;

    for caps in patterns.state_fallback.captures_iter(intro) {
        let name = &caps["caps"];
        if is_all_caps(name) {
            resolution.keep.insert(surname_token(name));
            resolution.hits += 1;
        }
    }

    for caps in patterns.role_intro.captures_iter(intro) {
        let role = Role::classify(&caps["role"]);
        let full = caps["full"].trim();
        let Some(surname) = surname_of(full) else {
            continue;
        };
        identities.insert_if_absent(surname.clone(), titleize(full));
        resolution.roles.bind(role, surname.clone());
        resolution.keep.insert(surname);
    }

    if resolution.roles.get(Role::Chair).is_none() {
        if let Some(caps) = patterns.fallback_chair.captures(intro) {
            let surname = caps["surname"].to_uppercase();
            identities.insert_if_absent(surname.clone(), format!("Chair {}", titleize(&surname)));
            resolution.roles.bind(Role::Chair, surname.clone());
            resolution.keep.insert(surname);
        }
    }

    resolution.keep.insert(PLACEHOLDER.to_string());
    deadline.check()?;

    resolution.drop = drop_candidates(intro, body, &resolution.keep, patterns);

    debug!(
        "Intro: {} hits, {} kept surnames, roles {:?}, {} drop candidates",
        resolution.hits,
        resolution.keep.len(),
        resolution.roles.sorted(),
        resolution.drop.len()
    );

    Ok(resolution)
}

/// All-caps inline mentions in the body that are not kept but whose
/// title-cased form appears as a word of the intro
fn drop_candidates(
    intro: &str,
    body: &str,
    keep: &BTreeSet<String>,
    patterns: &IntroPatterns,
) -> Vec<String> {
    let intro_words: BTreeSet<&str> = patterns.word.find_iter(intro).map(|m| m.as_str()).collect();

    patterns
        .inline_mention
        .captures_iter(body)
        .map(|caps| caps["last"].to_uppercase())
        .filter(|last| !keep.contains(last))
        .filter(|last| intro_words.contains(titleize(last).as_str()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{LegislatorRecord, RosterIndex, ServiceInterval};

    fn roster(names: &[&str]) -> RosterIndex {
        RosterIndex::from_records(names.iter().map(|name| LegislatorRecord {
            name: name.to_string(),
            intervals: vec![ServiceInterval::open()],
            source: "legislators-current".to_string(),
            bioguide: None,
        }))
    }

    fn resolve(intro: &str, body: &str, names: &[&str]) -> (IntroResolution, IdentityMap) {
        let roster = roster(names);
        let snapshot = roster.snapshot(NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
        let mut identities = IdentityMap::from_snapshot(&snapshot);
        let patterns = IntroPatterns::new().unwrap();
        let resolution = resolve_intro(
            intro,
            body,
            &snapshot,
            &mut identities,
            &patterns,
            &Deadline::none(),
        )
        .unwrap();
        (resolution, identities)
    }

    #[test]
    fn test_intro_window() {
        assert_eq!(intro_window("a  b\n c d", 3), "a b c");
    }

    #[test]
    fn test_roster_hits_allow_middle_names() {
        let (res, _) = resolve(
            "Present: Senators John Q. Smith and Mary Jones Jr., and others",
            "",
            &["John Smith", "Mary Jones", "Cher"],
        );

        assert_eq!(res.hits, 2);
        assert!(res.keep.contains("SMITH"));
        assert!(res.keep.contains("JONES"));
        assert!(res.keep.contains(PLACEHOLDER));
    }

    #[test]
    fn test_state_fallback_counts_as_hit() {
        let (res, _) = resolve("Senators from Ohio, BROWN, and from Maine, collins", "", &[]);
        assert_eq!(res.hits, 1);
        assert!(res.keep.contains("BROWN"));
        assert!(!res.keep.contains("COLLINS"));
    }

    #[test]
    fn test_role_introduction_binds_and_seeds() {
        let (res, identities) = resolve(
            "Hon. CHAIRMAN JOHN WALKER, presiding. RANKING MEMBER Ann Lee, present.",
            "",
            &[],
        );

        assert_eq!(res.hits, 0);
        assert_eq!(res.roles.get(Role::Chair), Some("WALKER"));
        assert_eq!(res.roles.get(Role::RankingMember), Some("LEE"));
        assert_eq!(identities.resolve("WALKER"), Some("John Walker"));
        assert!(res.keep.contains("LEE"));
    }

    #[test]
    fn test_fallback_chair_only_without_binding() {
        let (res, identities) = resolve("The CHAIRMAN, Mr. DOLE. We begin.", "", &[]);
        assert_eq!(res.roles.get(Role::Chair), Some("DOLE"));
        assert_eq!(identities.resolve("DOLE"), Some("Chair Dole"));
    }

    #[test]
    fn test_drop_candidates_are_reported() {
        let (res, _) = resolve(
            "Witness panel with Mr. Green present",
            "Mr. GREEN. My testimony. Mr. DOE. Hi.",
            &[],
        );
        assert_eq!(res.drop, vec!["GREEN".to_string()]);
    }
}
