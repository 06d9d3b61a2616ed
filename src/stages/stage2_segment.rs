use std::collections::BTreeSet;

use crate::error::AttributionError;
use crate::heuristics::{titleize, CueDetection, ScrubPatterns, SegmentPatterns};
use crate::models::{Cue, IdentityMap, Role, RoleBindings, PLACEHOLDER};
use crate::pipeline::Deadline;

use super::stage0_scrub::{clean_segment, truncate_at_closing};

/// A span of body text attributed to one display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributedSpan {
    pub speaker: String,
    pub text: String,
}

/// Result of the Stage 2 cue scan
#[derive(Debug, Clone, Default)]
pub struct SegmentScan {
    pub spans: Vec<AttributedSpan>,
    /// Cues that opened an attributed span
    pub kept_cues: usize,
}

/// Truncate at the closing marker and cut each `STATEMENTS OF <NAMES>`
/// heading through the next cue (or the end of the text when none follows)
pub fn prepare_body(text: &str, patterns: &SegmentPatterns, detector: &dyn CueDetection) -> String {
    let mut body = truncate_at_closing(text).to_string();
    let mut cursor = 0;

    while let Some((start, end)) = patterns
        .statements
        .find_at(&body, cursor)
        .map(|heading| (heading.start(), heading.end()))
    {
        let resume = detector.next_cue_start(&body, end).unwrap_or(body.len());
        body.replace_range(start..resume, "");
        cursor = start;
    }

    body
}

/// Perform Stage 2: walk the cues once, attributing the text between a kept
/// cue and the next cue to that cue's speaker.
///
/// Text before the first cue is never attributed. A non-kept cue closes the
/// open span without opening another.
pub fn extract_segments(
    body: &str,
    cues: &[Cue],
    keep: &BTreeSet<String>,
    roles: &RoleBindings,
    identities: &mut IdentityMap,
    scrub: &ScrubPatterns,
    deadline: &Deadline,
) -> Result<SegmentScan, AttributionError> {
    let mut scan = SegmentScan::default();
    let mut active: Option<String> = None;
    let mut pending = 0;

    for cue in cues {
        deadline.check()?;

        if let Some(speaker) = active.take() {
            flush(&body[pending..cue.start], &speaker, identities, scrub, &mut scan);
        }

        if keep.contains(&cue.surname) || cue.is_chair {
            let key = speaker_key(cue, keep, roles, identities);
            if !identities.contains(&key) {
                identities.insert_if_absent(key.clone(), titleize(&cue.text));
            }
            active = Some(key);
            scan.kept_cues += 1;
        }

        pending = cue.end;
    }

    if let Some(speaker) = active {
        flush(&body[pending..], &speaker, identities, scrub, &mut scan);
    }

    Ok(scan)
}

/// Identity key for a kept cue. Chair cues that name nobody we know fall back
/// to the bound chair, then to the placeholder.
fn speaker_key(cue: &Cue, keep: &BTreeSet<String>, roles: &RoleBindings, identities: &IdentityMap) -> String {
    let known = identities.contains(&cue.surname);
    if !cue.is_chair || known || (cue.named && keep.contains(&cue.surname)) {
        return cue.surname.clone();
    }

    roles
        .get(Role::Chair)
        .filter(|surname| identities.contains(surname))
        .unwrap_or(PLACEHOLDER)
        .to_string()
}

fn flush(
    raw: &str,
    speaker: &str,
    identities: &IdentityMap,
    scrub: &ScrubPatterns,
    scan: &mut SegmentScan,
) {
    let text = clean_segment(raw.trim(), scrub);
    if text.is_empty() {
        return;
    }
    let speaker = identities.resolve(speaker).unwrap_or(speaker).to_string();
    scan.spans.push(AttributedSpan { speaker, text });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristics::PatternLibrary;

    fn keep(surnames: &[&str]) -> BTreeSet<String> {
        let mut keep: BTreeSet<String> = surnames.iter().map(|s| s.to_string()).collect();
        keep.insert(PLACEHOLDER.to_string());
        keep
    }

    fn scan(
        body: &str,
        keep: &BTreeSet<String>,
        roles: &RoleBindings,
        identities: &mut IdentityMap,
    ) -> Vec<(String, String)> {
        let library = PatternLibrary::new().unwrap();
        let cues = library.detector().detect(body);
        extract_segments(body, &cues, keep, roles, identities, &library.scrub, &Deadline::none())
            .unwrap()
            .spans
            .into_iter()
            .map(|s| (s.speaker, s.text))
            .collect()
    }

    #[test]
    fn test_two_speakers() {
        let mut identities = IdentityMap::default();
        identities.insert_if_absent("SMITH", "Smith");
        identities.insert_if_absent("JONES", "Jones");

        let spans = scan(
            "Mr. SMITH. Hello there. Mr. JONES. Goodbye now.",
            &keep(&["SMITH", "JONES"]),
            &RoleBindings::default(),
            &mut identities,
        );

        assert_eq!(
            spans,
            vec![
                ("Smith".to_string(), "Hello there.".to_string()),
                ("Jones".to_string(), "Goodbye now.".to_string()),
            ]
        );
    }

    #[test]
    fn test_unbound_chair_is_placeholder() {
        let mut identities = IdentityMap::default();
        let spans = scan(
            "THE CHAIRMAN. The committee will come to order.",
            &keep(&[]),
            &RoleBindings::default(),
            &mut identities,
        );
        assert_eq!(
            spans,
            vec![("Unknown Chair".to_string(), "The committee will come to order.".to_string())]
        );
    }

    #[test]
    fn test_chair_uses_binding() {
        let mut identities = IdentityMap::default();
        identities.insert_if_absent("WALKER", "John Walker");
        let mut roles = RoleBindings::default();
        roles.bind(Role::Chair, "WALKER");

        let spans = scan(
            "THE CHAIRMAN. We begin. The ACTING CHAIRMAN. We continue.",
            &keep(&["WALKER"]),
            &roles,
            &mut identities,
        );
        assert_eq!(spans.len(), 2);
        assert!(spans.iter().all(|(speaker, _)| speaker == "John Walker"));
    }

    #[test]
    fn test_unkept_cue_ends_attribution() {
        let mut identities = IdentityMap::default();
        let spans = scan(
            "Preamble text. Mr. SMITH. First. Mr. NOBODY. Ignored. Mr. SMITH. Second.",
            &keep(&["SMITH"]),
            &RoleBindings::default(),
            &mut identities,
        );

        assert_eq!(
            spans,
            vec![
                ("Mr. Smith".to_string(), "First.".to_string()),
                ("Mr. Smith".to_string(), "Second.".to_string()),
            ]
        );
        assert_eq!(identities.resolve("SMITH"), Some("Mr. Smith"));
    }

    #[test]
    fn test_empty_spans_are_dropped() {
        let mut identities = IdentityMap::default();
        let spans = scan(
            "Mr. SMITH. [Laughter.] Mr. SMITH. Real words.",
            &keep(&["SMITH"]),
            &RoleBindings::default(),
            &mut identities,
        );
        assert_eq!(spans, vec![("Mr. Smith".to_string(), "Real words.".to_string())]);
    }

    #[test]
    fn test_expired_deadline_aborts_scan() {
        let library = PatternLibrary::new().unwrap();
        let body = "Mr. SMITH. Hello.";
        let cues = library.detector().detect(body);
        let result = extract_segments(
            body,
            &cues,
            &keep(&["SMITH"]),
            &RoleBindings::default(),
            &mut IdentityMap::default(),
            &library.scrub,
            &Deadline::after(std::time::Duration::ZERO),
        );
        assert!(matches!(result, Err(AttributionError::Timeout)));
    }

    #[test]
    fn test_prepare_body_removes_statement_headings() {
        let library = PatternLibrary::new().unwrap();
        let text = "Intro. STATEMENTS OF JOHN SMITH AND witness list Mr. DOE. Testimony. [Whereupon, adjourned.]";
        let body = prepare_body(text, &library.segment, library.detector());
        assert_eq!(body, "Intro.  Mr. DOE. Testimony. ");
    }
}
