use tracing::debug;

use crate::error::AttributionError;
use crate::heuristics::PatternLibrary;
use crate::models::{
    HearingDocument, IdentityMap, IntroDiagnostics, ParseOutcome, RosterIndex, SpeakerSegment,
    REASON_NO_SEGMENTS,
};
use crate::stages::{
    extract_segments, intro_window, prepare_body, resolve_intro, scrub_document, IntroConfig,
};

use super::Deadline;

/// Segments and diagnostics for one document
#[derive(Debug, Clone)]
pub struct Attribution {
    pub segments: Vec<SpeakerSegment>,
    pub diagnostics: IntroDiagnostics,
}

impl Attribution {
    /// Clean or Discarded, plus NoIntro when the intro window matched nobody
    pub fn into_outcomes(self) -> Vec<ParseOutcome> {
        let no_intro = self.diagnostics.intro_hits == 0;
        let mut outcomes = vec![if self.segments.is_empty() {
            ParseOutcome::Discarded(REASON_NO_SEGMENTS.to_string())
        } else {
            ParseOutcome::Clean(self.segments)
        }];
        if no_intro {
            outcomes.push(ParseOutcome::NoIntro(self.diagnostics));
        }
        outcomes
    }
}

/// Run Stages 0 through 2 on one document: scrub, prepare the body, resolve
/// the intro against the roster slice for the document date, then scan cues.
pub fn attribute_document(
    doc: &HearingDocument,
    roster: &RosterIndex,
    patterns: &PatternLibrary,
    intro_config: &IntroConfig,
    deadline: &Deadline,
) -> Result<Attribution, AttributionError> {
    let snapshot = roster.snapshot(doc.date);
    if snapshot.is_fallback() {
        debug!("{}: nobody in service on {}, using full roster", doc.file_id, doc.date);
    }
    let mut identities = IdentityMap::from_snapshot(&snapshot);
    deadline.check()?;

    let scrubbed = scrub_document(&doc.text, &patterns.scrub);
    let body = prepare_body(&scrubbed, &patterns.segment, patterns.detector());
    deadline.check()?;

    let intro = intro_window(&body, intro_config.window_words);
    let resolution = resolve_intro(
        &intro,
        &body,
        &snapshot,
        &mut identities,
        &patterns.intro,
        deadline,
    )?;

    let cues = patterns.detector().detect(&body);
    deadline.check()?;

    let scan = extract_segments(
        &body,
        &cues,
        &resolution.keep,
        &resolution.roles,
        &mut identities,
        &patterns.scrub,
        deadline,
    )?;

    let diagnostics = IntroDiagnostics {
        intro_hits: resolution.hits,
        cues_found: cues.len(),
        keep_size: resolution.keep.len(),
        kept_cues: scan.kept_cues,
        role_bindings: resolution
            .roles
            .sorted()
            .into_iter()
            .map(|(role, surname)| (role, surname.to_string()))
            .collect(),
        drop_candidates: resolution.drop,
    };

    debug!(
        "[PARSE] {}: intro_hits={} keep={} cues_found={} kept={} segs={}",
        doc.file_id,
        diagnostics.intro_hits,
        diagnostics.keep_size,
        diagnostics.cues_found,
        diagnostics.kept_cues,
        scan.spans.len()
    );

    let segments = scan
        .spans
        .into_iter()
        .map(|span| SpeakerSegment {
            date: doc.date,
            file_id: doc.file_id.clone(),
            title: doc.title.clone(),
            speaker: span.speaker,
            text: span.text,
        })
        .collect();

    Ok(Attribution {
        segments,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{LegislatorRecord, ServiceInterval};

    fn roster() -> RosterIndex {
        let person = |name: &str, start: (i32, u32, u32), end: (i32, u32, u32)| LegislatorRecord {
            name: name.to_string(),
            intervals: vec![ServiceInterval {
                start: NaiveDate::from_ymd_opt(start.0, start.1, start.2),
                end: NaiveDate::from_ymd_opt(end.0, end.1, end.2),
            }],
            source: "legislators-historical".to_string(),
            bioguide: None,
        };
        RosterIndex::from_records(vec![
            person("Ben Nelson", (2001, 1, 3), (2013, 1, 3)),
            person("Bill Nelson", (2001, 1, 3), (2019, 1, 3)),
            person("Joe Biden", (1973, 1, 3), (2009, 1, 15)),
        ])
    }

    fn document(text: &str) -> HearingDocument {
        HearingDocument {
            file_id: "h1.xml".to_string(),
            date: NaiveDate::from_ymd_opt(2005, 3, 1).unwrap(),
            title: "Oversight Hearing".to_string(),
            text: text.to_string(),
            word_count: text.split_whitespace().count(),
        }
    }

    fn attribute(text: &str) -> Result<Attribution, AttributionError> {
        let patterns = PatternLibrary::new().unwrap();
        attribute_document(
            &document(text),
            &roster(),
            &patterns,
            &IntroConfig::default(),
            &Deadline::none(),
        )
    }

    #[test]
    fn test_attributes_roster_members() {
        let attribution = attribute(
            "Present: Senators Joe Biden and Ben Nelson.\n\
             STATEMENTS OF WITNESSES LIST Some front matter.\n\
             The CHAIRMAN. The hearing will come to order.\n\
             Senator NELSON. Thank you.\n\
             Senator BIDEN. I agree.\n\
             [Whereupon, the committee adjourned.]",
        )
        .unwrap();

        let spans: Vec<(&str, &str)> = attribution
            .segments
            .iter()
            .map(|s| (s.speaker.as_str(), s.text.as_str()))
            .collect();
        assert_eq!(
            spans,
            vec![
                ("Unknown Chair", "The hearing will come to order."),
                ("Ben Nelson", "Thank you."),
                ("Joe Biden", "I agree."),
            ]
        );
        assert_eq!(attribution.diagnostics.intro_hits, 2);
        assert_eq!(attribution.diagnostics.cues_found, 3);

        let outcomes = attribution.into_outcomes();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].is_clean());
    }

    #[test]
    fn test_no_intro_and_no_segments() {
        let outcomes = attribute("Nothing here resembles a speaker label.")
            .unwrap()
            .into_outcomes();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            outcomes[0],
            ParseOutcome::Discarded(REASON_NO_SEGMENTS.to_string())
        );
        assert!(matches!(&outcomes[1], ParseOutcome::NoIntro(d) if d.intro_hits == 0));
    }

    #[test]
    fn test_expired_deadline() {
        let patterns = PatternLibrary::new().unwrap();
        let result = attribute_document(
            &document("Mr. SMITH. Hello."),
            &roster(),
            &patterns,
            &IntroConfig::default(),
            &Deadline::after(std::time::Duration::ZERO),
        );
        assert!(matches!(result, Err(AttributionError::Timeout)));
    }
}
