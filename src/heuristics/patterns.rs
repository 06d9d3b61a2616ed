use regex::Regex;

use super::cues::{CueDetection, FuzzyCueDetector};
use super::names::{titleize, US_STATES};

/// Bullet glyphs (and the OCR placeholder for them) that may precede a speaker label
pub(crate) const BULLET: &str = r"(?:<bullet>|[*•●])";

// Honorifics tolerate one stray character between the leading letter and the
// core; the terminal period is required.
pub(crate) const FUZZY_MR: &str = r"[Mm]\w?[Rr]\s*\.";
pub(crate) const FUZZY_MRS: &str = r"[Mm]\w?[Rr][Ss]\s*\.";
pub(crate) const FUZZY_MS: &str = r"[Mm]\w?[Ss]\s*\.";
pub(crate) const FUZZY_DR: &str = r"[Dd]\w?[Rr]\s*\.";

/// CHAIRMAN as it survives OCR: clean spellings in either case, then
/// increasingly loose upper-case shapes.
pub(crate) const FUZZY_CHAIR: &str = concat!(
    r"(?:CHAIR(?:MAN|WOMAN|PERSON)?",
    r"|Chair(?:man|woman|person)?",
    r"|[Cc][Hh][Aa][Ii1l][Rr]{1,2}[Mm][Aa][Nn]",
    r"|CHAIRMA[NM]",
    r"|[Cc][Hh][Aa1i][Rr][Mm][Aa][Nn]",
    r"|CH[A-Z]{1,3}MAN",
    r"|CHAIRMA[A-Z]",
    r"|CH[A-Z]{4,7}",
    r"|C[A-Z]{5,8}",
    r"|CHA?I?R?M?A?N?)"
);

/// A capitalized name word or a single initial
pub(crate) const NAME_TOKEN: &str = r"(?:[A-Z][A-Za-z'’\-]*|[A-Z]\.)";

const ABBREVIATED_TITLES: &[&str] = &["Prof", "Hon", "Rev", "Mx"];

const TITLE_WORDS: &[&str] = &[
    "Vice Chairman",
    "Vice Chairwoman",
    "Vice Chair",
    "Ranking Member",
    "Miss",
    "Judge",
    "Justice",
    "Pastor",
    "Senator",
    "Representative",
    "General",
    "Colonel",
    "President",
    "Lieutenant",
    "Captain",
    "Corporal",
    "The Honorable",
    "Professor",
    "Admiral",
    "Major",
    "Sergeant",
    "Congressman",
    "Congresswoman",
    "Delegate",
    "Chairman",
    "Chairwoman",
    "Chairperson",
    "Chair",
    "Secretary",
];

const PROCEDURAL_SENTENCES: &[&str] = &[
    r"The (?:assistant )?legislative clerk read as follows",
    r"The nomination considered and confirmed is as follows",
    r"The nomination was confirmed",
    r"The (?:assistant )?legislative clerk",
    r"There being no objection,",
    r"The resolution [^\n]*?was agreed to\.",
    r"The preamble was agreed to\.",
    r"The resolution [^\n]*?reads as follows",
    r"The assistant editor [^\n]*?proceeded to call the roll",
    r"The bill clerk (?:proceeded to )?call(?:ed)? the roll\.?",
    r"The motion was agreed to\.",
    r"The question was taken(?:;|\.)",
    r"The yeas and nays (?:were ordered|resulted[^\n]*?, as follows:)",
    r"The result was announced[^\n]*?, as follows:",
    r"Amendment No\. \d+[^\n]*?is as follows:",
    r"The text of the[^\n]*?is as follows",
    r"amended(?: to read)? as follows:",
    r"The material (?:previously )?referred to (?:by[^\n]*?)?is as follows:",
    r"There was no objection",
    r"The amendment[^\n]*?was agreed to",
    r"The motion to table was ",
    r"The following bills and joint resolutions were introduced",
    r"The vote was taken by electronic device",
    r"A recorded vote was ordered",
];

/// `(?:WORD|Word)` for each word of a phrase, joined by whitespace
pub(crate) fn caps_or_title(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|w| format!("(?:{}|{})", w.to_uppercase(), titleize(w)))
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// Alternation of every honorific or title that can open a speaker label
pub(crate) fn title_alternation() -> String {
    let mut parts = vec![
        FUZZY_MRS.to_string(),
        FUZZY_MR.to_string(),
        FUZZY_MS.to_string(),
        FUZZY_DR.to_string(),
    ];
    parts.extend(
        ABBREVIATED_TITLES
            .iter()
            .map(|t| format!(r"{}\.?", caps_or_title(t))),
    );
    parts.extend(TITLE_WORDS.iter().map(|t| caps_or_title(t)));
    parts.join("|")
}

/// Fixed institutional speaker labels
pub(crate) fn institutional_alternation() -> String {
    let the = caps_or_title("the");
    let acting = caps_or_title("acting");
    let pro_tempore = r"(?:\s+(?i:pro\s+tempore))?";

    [
        format!(
            r"{the}\s+(?:{vice}\s+)?{president}{pro_tempore}",
            vice = caps_or_title("vice"),
            president = caps_or_title("president"),
        ),
        format!(r"(?:VICE\s+)?PRESIDENT{pro_tempore}"),
        format!(
            r"{the}\s+(?:{acting}\s+)?{speaker}{pro_tempore}",
            speaker = caps_or_title("speaker"),
        ),
        format!(r"{the}\s+(?:{acting}\s+)?{chair}", chair = FUZZY_CHAIR),
        format!(r"{the}\s+{}", caps_or_title("presiding officer")),
        format!(r"{the}\s+{}", caps_or_title("clerk")),
        format!(r"{the}\s+{}", caps_or_title("chief justice")),
        format!(r"{mr}\s+{}\s+[A-Z]+", caps_or_title("counsel"), mr = FUZZY_MR),
    ]
    .join("|")
}

/// Passes used by the artifact scrubber
#[derive(Debug, Clone)]
pub struct ScrubPatterns {
    /// Where `VerDate` boilerplate ends: the next lower-case word of 5+ letters
    pub(crate) verdate_resume: Regex,
    pub(crate) rollcall: Regex,
    pub(crate) procedural: Regex,
    pub(crate) bracket: Regex,
    pub(crate) hyphen_wrap: Regex,
    pub(crate) intra_hyphen: Regex,
    pub(crate) dash_run: Regex,
    pub(crate) caps_block: Regex,
}

impl ScrubPatterns {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            verdate_resume: Regex::new(r"\b[a-z]{5,}")?,
            rollcall: Regex::new(r"(?i)\[Roll(?:call)?(?:\s+Vote)?\s+No\.\s+\d+[^\]\n]*\]")?,
            procedural: Regex::new(&format!(
                r"(?im)^\s+(?:{})[^\n]*",
                PROCEDURAL_SENTENCES.join("|")
            ))?,
            bracket: Regex::new(r"\[\s*[A-Za-z]+\.*\s*\]")?,
            hyphen_wrap: Regex::new(r"(\w)[-–—][ \t]*\r?\n\s*(\w)")?,
            intra_hyphen: Regex::new(r"([A-Za-z])[-–]([a-z])")?,
            dash_run: Regex::new(r"\s*[-–—]+\s*")?,
            caps_block: Regex::new(
                r"(?:\b\d+[,\s]+)?\b[A-Z]{2,}\b(?:,?\s+[A-Z]{2,}\b){2,}(?:[,.]?\s*\d+\b)?",
            )?,
        })
    }
}

/// Patterns run over the intro window and body by the intro resolver
#[derive(Debug, Clone)]
pub struct IntroPatterns {
    pub(crate) state_fallback: Regex,
    pub(crate) role_intro: Regex,
    pub(crate) fallback_chair: Regex,
    pub(crate) inline_mention: Regex,
    pub(crate) word: Regex,
}

impl IntroPatterns {
    pub fn new() -> Result<Self, regex::Error> {
        let states = US_STATES
            .iter()
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(r"\s+"))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            state_fallback: Regex::new(&format!(
                r"\b(?i:{states})\b,?\s+(?P<caps>[A-Z][A-Z'.\-]+(?:[ \t]+[A-Z][A-Z'.\-]+){{0,3}})"
            ))?,
            role_intro: Regex::new(concat!(
                r"\b(?i:THE\s+)?",
                r"(?P<role>(?i:VICE\s+CHAIR(?:MAN|WOMAN|PERSON)?|RANKING\s+(?:MINORITY\s+)?MEMBER|CHAIR(?:MAN|WOMAN|PERSON)?))\b",
                r"[<>\[\]()*_~\s]*",
                r"(?P<full>[A-Z][\w.'’\-]*(?:\s+[A-Z][\w.'’\-]*){0,4}?)\s*,",
            ))?,
            fallback_chair: Regex::new(&format!(
                r"\b{chair},?\s+(?:(?:{mrs}|{mr}|{ms})\s+)?(?P<surname>[A-Z][A-Z'\-]+)[:.]",
                chair = FUZZY_CHAIR,
                mrs = FUZZY_MRS,
                mr = FUZZY_MR,
                ms = FUZZY_MS,
            ))?,
            inline_mention: Regex::new(r"\b(?P<last>[A-Z][A-Z'\-]+)\s*[:.]\s+")?,
            word: Regex::new(r"[\w'’\-]+")?,
        })
    }
}

/// Patterns used while preparing the body for the scan
#[derive(Debug, Clone)]
pub struct SegmentPatterns {
    /// Front-matter witness list heading
    pub(crate) statements: Regex,
}

impl SegmentPatterns {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            statements: Regex::new(r"STATEMENTS? OF\s+[A-Z][A-Z'\-]+(?:\s+[A-Z][A-Z'\-]+){0,2}")?,
        })
    }
}

/// Every compiled pattern the pipeline needs, built once and shared read-only
pub struct PatternLibrary {
    detector: Box<dyn CueDetection>,
    pub scrub: ScrubPatterns,
    pub intro: IntroPatterns,
    pub segment: SegmentPatterns,
}

impl PatternLibrary {
    /// Compile the default library with the fuzzy cue detector
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            detector: Box::new(FuzzyCueDetector::new()?),
            scrub: ScrubPatterns::new()?,
            intro: IntroPatterns::new()?,
            segment: SegmentPatterns::new()?,
        })
    }

    /// Swap in a different cue detection strategy
    pub fn with_detector(mut self, detector: impl CueDetection + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn detector(&self) -> &dyn CueDetection {
        self.detector.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps_or_title() {
        assert_eq!(caps_or_title("the"), "(?:THE|The)");
        assert_eq!(
            caps_or_title("presiding officer"),
            r"(?:PRESIDING|Presiding)\s+(?:OFFICER|Officer)"
        );
    }

    #[test]
    fn test_library_compiles() {
        let library = PatternLibrary::new().unwrap();
        assert!(library.segment.statements.is_match("STATEMENTS OF JOHN SMITH"));
    }

    #[test]
    fn test_fuzzy_chair_variants() {
        let chair = Regex::new(&format!("^{FUZZY_CHAIR}$")).unwrap();
        for variant in ["CHAIRMAN", "Chairman", "CHAIRMAM", "CHA1RMAN", "Chairwoman", "CHRMAN", "CHAIRRMAN"] {
            assert!(chair.is_match(variant), "{variant} should match");
        }
        assert!(!chair.is_match("committee"));
    }

    #[test]
    fn test_state_fallback_requires_caps() {
        let intro = IntroPatterns::new().unwrap();
        let caps = intro.state_fallback.captures("from New York, SCHUMER and").unwrap();
        assert_eq!(&caps["caps"], "SCHUMER");
        assert!(intro.state_fallback.captures("from Texas, who spoke").is_none());
    }
}
