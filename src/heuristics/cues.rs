use regex::{Captures, Regex};

use super::names::{surname_of, surname_token};
use super::patterns::{institutional_alternation, title_alternation, BULLET, NAME_TOKEN};
use crate::models::{Cue, Role};

/// Words that, standing alone after an honorific, address a role rather than
/// name a speaker ("Mr. Chairman.", "Madam President:")
const ADDRESS_WORDS: &[&str] = &[
    "CHAIR",
    "CHAIRMAN",
    "CHAIRWOMAN",
    "CHAIRPERSON",
    "PRESIDENT",
    "SPEAKER",
    "SECRETARY",
    "SENATOR",
    "CLERK",
];

/// Recognizes speaker-turn boundaries in prepared text
pub trait CueDetection: Send + Sync {
    /// Every cue in the text, in document order
    fn detect(&self, text: &str) -> Vec<Cue>;

    /// Start offset of the first cue beginning at or after `from`
    fn next_cue_start(&self, text: &str, from: usize) -> Option<usize>;

    /// Whether a label names the chair
    fn is_chair_cue(&self, label: &str) -> bool;
}

/// High-recall detector that tolerates OCR damage in honorifics and the
/// CHAIRMAN token
#[derive(Debug, Clone)]
pub struct FuzzyCueDetector {
    speaker: Regex,
    chair_prefix: Regex,
}

impl FuzzyCueDetector {
    pub fn new() -> Result<Self, regex::Error> {
        let pattern = format!(
            concat!(
                r"{bullet}?\s*\b(?P<n>",
                r"(?:{titles})\s+(?P<who>{name}(?:[ \t]+{name})*)",
                r"(?:\s+(?i:of)\s+(?P<state>[A-Z][A-Za-z]*(?:[ \t]+[A-Z][A-Za-z]*){{0,2}}))?",
                r"|{institutional})",
                r"(?:\s*\([^)\n]{{1,80}}\))?\s*[:.]\s+",
            ),
            bullet = BULLET,
            titles = title_alternation(),
            name = NAME_TOKEN,
            institutional = institutional_alternation(),
        );

        Ok(Self {
            speaker: Regex::new(&pattern)?,
            chair_prefix: Regex::new(r"(?i)^(?:THE\s+)?(?:ACTING\s+)?CHAIR")?,
        })
    }

    fn cue_from(&self, caps: &Captures<'_>) -> Option<Cue> {
        let whole = caps.get(0)?;
        let label = caps.name("n")?.as_str();
        let who = caps.name("who").map(|m| m.as_str());

        if who.is_some_and(is_address_only) {
            return None;
        }

        let text = label.split_whitespace().collect::<Vec<_>>().join(" ");
        let surname = who
            .and_then(surname_of)
            .unwrap_or_else(|| surname_token(&text));
        let is_chair = self.is_chair_cue(&text);

        Some(Cue {
            start: whole.start(),
            end: whole.end(),
            role: cue_role(&text, is_chair),
            text,
            surname,
            named: who.is_some(),
            is_chair,
        })
    }
}

impl CueDetection for FuzzyCueDetector {
    fn detect(&self, text: &str) -> Vec<Cue> {
        self.speaker
            .captures_iter(text)
            .filter_map(|caps| self.cue_from(&caps))
            .collect()
    }

    fn next_cue_start(&self, text: &str, mut from: usize) -> Option<usize> {
        while from <= text.len() {
            let caps = self.speaker.captures_at(text, from)?;
            if let Some(cue) = self.cue_from(&caps) {
                return Some(cue.start);
            }
            from = caps.get(0)?.end();
        }
        None
    }

    fn is_chair_cue(&self, label: &str) -> bool {
        self.chair_prefix.is_match(label.trim_start())
    }
}

fn is_address_only(who: &str) -> bool {
    who.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_uppercase())
        .all(|w| ADDRESS_WORDS.contains(&w.as_str()))
}

fn cue_role(label: &str, is_chair: bool) -> Option<Role> {
    let upper = label.to_uppercase();
    if upper.contains("VICE") && upper.contains("CHAIR") {
        Some(Role::ViceChair)
    } else if upper.contains("RANKING") {
        Some(Role::RankingMember)
    } else if is_chair {
        Some(Role::Chair)
    } else {
        None
    }
}
