use regex::Regex;

use crate::heuristics::ScrubPatterns;

/// Closing boilerplate; everything from the first marker on is dropped
pub const CLOSING_MARKERS: &[&str] = &["[Whereupon,"];

const VERDATE: &str = "VerDate";

/// Stage 0 document pass: strip print-date boilerplate, roll-call annotations
/// and procedural sentences, then truncate at the closing marker. Repeats
/// until the text stops changing.
pub fn scrub_document(text: &str, patterns: &ScrubPatterns) -> String {
    fixed_point(text, |t| scrub_document_once(t, patterns))
}

/// Stage 0 segment pass, run on each attributed span
pub fn clean_segment(text: &str, patterns: &ScrubPatterns) -> String {
    fixed_point(text, |t| clean_segment_once(t, patterns))
}

/// Text before the first closing marker
pub fn truncate_at_closing(text: &str) -> &str {
    let cut = CLOSING_MARKERS
        .iter()
        .filter_map(|m| text.find(m))
        .min()
        .unwrap_or(text.len());
    &text[..cut]
}

fn fixed_point(text: &str, pass: impl Fn(&str) -> String) -> String {
    let mut current = pass(text);
    loop {
        let next = pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn scrub_document_once(text: &str, patterns: &ScrubPatterns) -> String {
    let text = strip_verdate(text, &patterns.verdate_resume);
    let text = patterns.rollcall.replace_all(&text, "");
    let text = patterns.procedural.replace_all(&text, "");
    truncate_at_closing(&text).to_string()
}

fn clean_segment_once(text: &str, patterns: &ScrubPatterns) -> String {
    let text = patterns.bracket.replace_all(text, "");
    let text = patterns.hyphen_wrap.replace_all(&text, "${1}${2}");
    let text = patterns.intra_hyphen.replace_all(&text, "${1}${2}");
    let text = patterns.dash_run.replace_all(&text, " ");
    let text = patterns.caps_block.replace_all(&text, " ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Delete from each `VerDate` up to the next lower-case word of five or more
/// letters. Without such a word the remainder is left alone.
fn strip_verdate(text: &str, resume: &Regex) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(VERDATE) {
        match resume.find_at(rest, pos + VERDATE.len()) {
            Some(word) => {
                out.push_str(&rest[..pos]);
                rest = &rest[word.start()..];
            }
            None => break,
        }
    }

    out.push_str(rest);
    out
}
