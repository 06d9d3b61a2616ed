use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::io::CleanRow;
use crate::models::{RosterIndex, SpeakerSegment};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Execute Stage 3: merge segments per (document, speaker) and join roster
/// metadata.
///
/// Rows come out ordered by file id, then date and title, then speaker name.
/// Texts of one speaker are joined with single spaces in document order.
/// Speakers missing from the roster (placeholder, in-document names) get
/// empty metadata columns.
pub fn render_clean_rows(segments: &[SpeakerSegment], roster: &RosterIndex) -> Vec<CleanRow> {
    let mut grouped: BTreeMap<(&str, NaiveDate, &str, &str), Vec<&str>> = BTreeMap::new();
    for segment in segments {
        grouped
            .entry((
                segment.file_id.as_str(),
                segment.date,
                segment.title.as_str(),
                segment.speaker.as_str(),
            ))
            .or_default()
            .push(segment.text.as_str());
    }

    grouped
        .into_iter()
        .map(|((file, date, title, name), texts)| {
            let meta = roster.metadata(name);
            let bound = |d: Option<NaiveDate>| {
                d.map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default()
            };
            CleanRow {
                date: date.format(DATE_FORMAT).to_string(),
                file: file.to_string(),
                title: title.to_string(),
                name: name.to_string(),
                text: texts.join(" "),
                source: meta.map(|m| m.source.clone()).unwrap_or_default(),
                bioguide: meta.and_then(|m| m.bioguide.clone()).unwrap_or_default(),
                term_start: bound(meta.and_then(|m| m.first_interval.start)),
                term_end: bound(meta.and_then(|m| m.first_interval.end)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LegislatorRecord, ServiceInterval};

    fn segment(file: &str, speaker: &str, text: &str) -> SpeakerSegment {
        SpeakerSegment {
            date: NaiveDate::from_ymd_opt(2001, 2, 3).unwrap(),
            file_id: file.to_string(),
            title: "Hearing".to_string(),
            speaker: speaker.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_merges_and_joins_metadata() {
        let roster = RosterIndex::from_records(vec![LegislatorRecord {
            name: "John Smith".to_string(),
            intervals: vec![ServiceInterval {
                start: NaiveDate::from_ymd_opt(1999, 1, 3),
                end: None,
            }],
            source: "legislators-current".to_string(),
            bioguide: Some("S000001".to_string()),
        }]);

        let rows = render_clean_rows(
            &[
                segment("b.xml", "John Smith", "Later file."),
                segment("a.xml", "Unknown Chair", "Order."),
                segment("a.xml", "John Smith", "First."),
                segment("a.xml", "John Smith", "Second."),
            ],
            &roster,
        );

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].file, "a.xml");
        assert_eq!(rows[0].name, "John Smith");
        assert_eq!(rows[0].text, "First. Second.");
        assert_eq!(rows[0].bioguide, "S000001");
        assert_eq!(rows[0].term_start, "1999-01-03");
        assert_eq!(rows[0].term_end, "");
        assert_eq!(rows[1].name, "Unknown Chair");
        assert_eq!(rows[1].source, "");
        assert_eq!(rows[2].file, "b.xml");
        assert_eq!(rows[2].date, "2001-02-03");
    }
}
