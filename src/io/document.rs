use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::DocumentError;
use crate::models::HearingDocument;

/// Configuration for document extraction
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Documents dated before this are rejected
    pub earliest_date: NaiveDate,
    /// Word count below which a document is flagged in the logs
    pub min_words: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            earliest_date: NaiveDate::from_ymd_opt(1873, 1, 1).unwrap_or_default(),
            min_words: 500,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Text,
    NumericDate,
    Title,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"Text" => Some(Field::Text),
            b"NumericDate" => Some(Field::NumericDate),
            b"Title" => Some(Field::Title),
            _ => None,
        }
    }
}

/// `*.xml` files in a directory, sorted by path
pub fn list_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in
        std::fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))?
    {
        let path = entry?.path();
        let is_xml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if is_xml && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// File name used as the ledger key
pub fn file_id(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Stream a hearing document from disk
pub fn extract_document(path: &Path, config: &ExtractConfig) -> Result<HearingDocument, DocumentError> {
    let file = File::open(path).map_err(|e| DocumentError::io(path, e))?;
    extract_from_reader(BufReader::new(file), &file_id(path), config)
}

/// Stream `Text`, `NumericDate` and `Title` content out of an XML source.
///
/// One event buffer is reused for the whole document and only the captured
/// element content is retained. The last `NumericDate` wins; the first
/// non-empty `Title` wins.
pub fn extract_from_reader<R: BufRead>(
    source: R,
    file_id: &str,
    config: &ExtractConfig,
) -> Result<HearingDocument, DocumentError> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut capture: Option<(Field, usize)> = None;
    let mut current = String::new();

    let mut chunks: Vec<String> = Vec::new();
    let mut word_count = 0;
    let mut raw_date: Option<String> = None;
    let mut title: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                if capture.is_none() {
                    if let Some(field) = Field::from_tag(e.local_name().as_ref()) {
                        capture = Some((field, depth));
                        current.clear();
                    }
                }
            }
            Ok(Event::End(_)) => {
                if let Some((field, at)) = capture {
                    if at == depth {
                        match field {
                            Field::Text => {
                                if !current.trim().is_empty() {
                                    word_count += current.split_whitespace().count();
                                    chunks.push(std::mem::take(&mut current));
                                }
                            }
                            Field::NumericDate => {
                                if !current.trim().is_empty() {
                                    raw_date = Some(current.trim().to_string());
                                }
                            }
                            Field::Title => {
                                if title.is_none() && !current.trim().is_empty() {
                                    title = Some(current.trim().to_string());
                                }
                            }
                        }
                        capture = None;
                        current.clear();
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(t)) => {
                if capture.is_some() {
                    let text = t
                        .unescape()
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned().into());
                    current.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if capture.is_some() {
                    current.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::Eof) => {
                if depth != 0 {
                    return Err(DocumentError::structure(format!(
                        "unexpected end of document with {} open elements",
                        depth
                    )));
                }
                break;
            }
            Ok(_) => {}
            Err(e) => {
                return Err(DocumentError::structure(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )));
            }
        }
        buf.clear();
    }

    let raw_date = raw_date.ok_or(DocumentError::MissingDate)?;
    let date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d")
        .map_err(|_| DocumentError::InvalidDate(raw_date.clone()))?;
    if date < config.earliest_date {
        return Err(DocumentError::TooEarly {
            date,
            earliest: config.earliest_date,
        });
    }

    Ok(HearingDocument {
        file_id: file_id.to_string(),
        date,
        title: title.unwrap_or_default(),
        text: chunks.join(" "),
        word_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(xml: &str) -> Result<HearingDocument, DocumentError> {
        extract_from_reader(xml.as_bytes(), "h1.xml", &ExtractConfig::default())
    }

    #[test]
    fn test_extracts_fields() {
        let doc = extract(
            "<Doc><Title>  </Title><Title>Budget Hearing</Title><Title>Other</Title>\
             <NumericDate>1999-01-01</NumericDate><Body><Text>Mr. SMITH. Hello &amp; welcome.</Text>\
             <Skip>ignored words</Skip><Text><![CDATA[Second chunk]]></Text></Body>\
             <NumericDate>2001-02-03</NumericDate></Doc>",
        )
        .unwrap();

        assert_eq!(doc.file_id, "h1.xml");
        assert_eq!(doc.title, "Budget Hearing");
        assert_eq!(doc.date, NaiveDate::from_ymd_opt(2001, 2, 3).unwrap());
        assert_eq!(doc.text, "Mr. SMITH. Hello & welcome. Second chunk");
        assert_eq!(doc.word_count, 7);
    }

    #[test]
    fn test_malformed_xml_is_structural() {
        let err = extract("<Doc><Text>open<NumericDate>2001-02-03</NumericDate></Doc>").unwrap_err();
        assert!(err.is_structural());

        let err = extract("<Doc><Text>never closed").unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_date_validation() {
        assert!(matches!(
            extract("<Doc><Text>words</Text></Doc>"),
            Err(DocumentError::MissingDate)
        ));
        assert!(matches!(
            extract("<Doc><NumericDate>2001-02-30</NumericDate></Doc>"),
            Err(DocumentError::InvalidDate(d)) if d == "2001-02-30"
        ));
        assert!(matches!(
            extract("<Doc><NumericDate>1850-06-01</NumericDate></Doc>"),
            Err(DocumentError::TooEarly { .. })
        ));
    }

    #[test]
    fn test_list_documents_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.xml", "a.XML", "notes.txt"] {
            std::fs::write(dir.path().join(name), "<Doc/>").unwrap();
        }

        let ids: Vec<String> = list_documents(dir.path())
            .unwrap()
            .iter()
            .map(|p| file_id(p))
            .collect();
        assert_eq!(ids, vec!["a.XML", "b.xml"]);
    }
}
