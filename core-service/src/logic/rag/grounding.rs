//! Grounding check
//!
//! Evidence must quote a retrieved chunk verbatim and cite it by id.
//! Items that fail are removed from the answer and reported.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{Evidence, GroundingIssue, RetrievedChunk, StructuredAnswer};

static CITATION_TAG: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\[C\d+\]").ok());
static TRAILING_TAG: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\s*\[(C\d+)\]\s*$").ok());

/// "[c2]" / " C2 " → "C2"
pub fn normalize_citation(citation: &str) -> String {
    citation
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
        .to_uppercase()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a trailing "[Ck]" off a quote; returns (quote, tag)
fn split_trailing_tag(quote: &str) -> (String, Option<String>) {
    if let Some(re) = TRAILING_TAG.as_ref() {
        if let Some(caps) = re.captures(quote) {
            let tag = caps.get(1).map(|m| m.as_str().to_string());
            let start = caps.get(0).map_or(quote.len(), |m| m.start());
            return (quote[..start].to_string(), tag);
        }
    }
    (quote.to_string(), None)
}

fn clean_quote(quote: &str) -> String {
    quote
        .trim()
        .trim_matches(|c| c == '"' || c == '\u{201c}' || c == '\u{201d}')
        .trim()
        .to_string()
}

fn has_citation_tag(text: &str) -> bool {
    CITATION_TAG.as_ref().is_some_and(|re| re.is_match(text))
}

/// Drop ungrounded evidence in place; report everything that was wrong
pub fn check_grounding(answer: &mut StructuredAnswer, chunks: &[RetrievedChunk]) -> Vec<GroundingIssue> {
    let mut issues = Vec::new();
    let mut kept = Vec::with_capacity(answer.evidence.len());

    for item in answer.evidence.drain(..) {
        let (quote, tag) = split_trailing_tag(&item.quote);
        let quote = clean_quote(&quote);
        let citation = match normalize_citation(&item.citation) {
            c if c.is_empty() => tag.unwrap_or_default(),
            c => c,
        };

        let Some(chunk) = chunks.iter().find(|c| c.citation_id == citation) else {
            log::warn!("Evidence removed: unknown citation '{}'", citation);
            issues.push(GroundingIssue::UnknownCitation { citation, quote });
            continue;
        };

        let needle = collapse_whitespace(&quote);
        if needle.is_empty() || !collapse_whitespace(&chunk.text).contains(&needle) {
            log::warn!("Evidence removed: quote not found in {}", citation);
            issues.push(GroundingIssue::QuoteNotFound { citation, quote });
            continue;
        }

        kept.push(Evidence { quote, citation });
    }
    answer.evidence = kept;

    for (section, lines) in [
        ("explanation", &answer.explanation),
        ("recommended_mitigation", &answer.recommended_mitigation),
    ] {
        for line in lines.iter().filter(|l| has_citation_tag(l)) {
            issues.push(GroundingIssue::CitationOutsideEvidence {
                section: section.to_string(),
                text: line.clone(),
            });
        }
    }

    issues
}
