//! Heading-based section detection for extracted paper text.
//!
//! Parsers that cannot report structure can run the detector to produce the
//! markers the section and hybrid strategies need.
use regex::Regex;

use crate::types::{SectionLabel, SectionMarker};

const HEADING_PREFIX: &str = r"(?mi)^[ \t]*(?:\d+(?:\.\d+)*\.?[ \t]+|[IVX]+\.[ \t]+)?";
const HEADING_SUFFIX: &str = r"[ \t]*[.:]?[ \t]*\r?$";

pub struct SectionDetector {
    patterns: Vec<(SectionLabel, Regex)>,
}

impl SectionDetector {
    pub fn new() -> Result<Self, regex::Error> {
        let headings = [
            (SectionLabel::Abstract, r"abstract\b[ \t]*(?:[.:\u{2014}-]|\r?$)"),
            (SectionLabel::Introduction, r"introduction\b"),
            (SectionLabel::RelatedWork, r"related[ \t]+work\b"),
            (SectionLabel::Methods, r"(?:methodology|methods|approach)\b"),
            (SectionLabel::Experiments, r"(?:experiments|experimental[ \t]+results)\b"),
            (SectionLabel::Results, r"results\b"),
            (SectionLabel::Discussion, r"discussion\b"),
            (SectionLabel::Conclusion, r"conclusions?\b"),
            (SectionLabel::References, r"(?:references|bibliography)\b"),
        ];
        let mut patterns = Vec::with_capacity(headings.len());
        for (label, heading) in headings {
            let suffix = if label == SectionLabel::Abstract { "" } else { HEADING_SUFFIX };
            patterns.push((label, Regex::new(&format!("{HEADING_PREFIX}{heading}{suffix}"))?));
        }
        Ok(Self { patterns })
    }

    /// First heading line per known label, sorted by position.
    ///
    /// Marker offsets are character offsets; two labels matching the same line
    /// keep the one listed first.
    pub fn detect(&self, text: &str) -> Vec<SectionMarker> {
        let mut found: Vec<(usize, SectionLabel)> = Vec::new();
        for (label, pattern) in &self.patterns {
            if let Some(m) = pattern.find(text) {
                if found.iter().any(|(start, _)| *start == m.start()) { continue; }
                found.push((m.start(), label.clone()));
            }
        }
        found.sort_by_key(|(start, _)| *start);
        found
            .into_iter()
            .map(|(byte_start, label)| SectionMarker::new(label, text[..byte_start].chars().count()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_must_lead_the_line() {
        let detector = SectionDetector::new().unwrap();
        let text = "Title\nWe discuss results here.\n\n4 Results\nNumbers.";
        let markers = detector.detect(text);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].label, SectionLabel::Results);
        assert_eq!(markers[0].start, text.find("4 Results").unwrap());
    }

    #[test]
    fn experimental_results_is_not_results() {
        let detector = SectionDetector::new().unwrap();
        let markers = detector.detect("5. Experimental Results\nTable 1.");
        let labels: Vec<_> = markers.iter().map(|m| m.label.clone()).collect();
        assert_eq!(labels, vec![SectionLabel::Experiments]);
    }
}
