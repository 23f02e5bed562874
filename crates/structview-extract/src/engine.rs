// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Regex-driven feature extraction engine.

use std::collections::BTreeMap;

use structview_config::model::ExtractionConfig;
use structview_core::{
    ExtractionRequest, FeatureExtractor, FeatureSet, FeatureValue, StructviewError,
};
use tracing::debug;

use crate::detectors::{Detector, builtin_detectors};
use crate::fields::extract_fields;
use crate::keywords::top_keywords;

/// Feature names produced by the engine itself. Custom patterns may not reuse them.
pub const BUILTIN_FEATURES: &[&str] = &[
    "char_count",
    "word_count",
    "line_count",
    "sentence_count",
    "emails",
    "urls",
    "phone_numbers",
    "prices",
    "percentages",
    "dates",
    "hashtags",
    "top_keywords",
    "page_host",
];

/// Deterministic extractor built from compiled regex detectors.
///
/// All state is fixed at construction, so one instance can serve concurrent
/// requests.
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    detectors: Vec<Detector>,
    max_input_bytes: usize,
    max_fields: usize,
    max_field_name_len: usize,
    top_keywords: usize,
    min_keyword_len: usize,
}

impl RegexExtractor {
    /// Builds the extractor, compiling built-in and configured patterns.
    ///
    /// Fails with a `Config` error when a custom pattern does not compile or
    /// reuses a built-in feature name.
    pub fn new(config: &ExtractionConfig) -> Result<Self, StructviewError> {
        let mut detectors = builtin_detectors()
            .map_err(|e| StructviewError::Internal(format!("built-in pattern failed: {e}")))?;

        for pattern in &config.patterns {
            if BUILTIN_FEATURES.contains(&pattern.name.as_str()) {
                return Err(StructviewError::Config(format!(
                    "custom pattern `{}` shadows a built-in feature",
                    pattern.name
                )));
            }
            let detector = Detector::custom(pattern).map_err(|e| {
                StructviewError::Config(format!("custom pattern `{}`: {e}", pattern.name))
            })?;
            detectors.push(detector);
        }

        debug!(
            detectors = detectors.len(),
            custom = config.patterns.len(),
            "feature extractor ready"
        );

        Ok(Self {
            detectors,
            max_input_bytes: config.max_input_bytes,
            max_fields: config.max_fields,
            max_field_name_len: config.max_field_name_len,
            top_keywords: config.top_keywords,
            min_keyword_len: config.min_keyword_len,
        })
    }

    /// Validates the raw bytes and returns them as text.
    fn decode<'a>(&self, raw: &'a [u8]) -> Result<&'a str, StructviewError> {
        if raw.len() > self.max_input_bytes {
            return Err(StructviewError::InvalidInput(format!(
                "input is {} bytes, limit is {}",
                raw.len(),
                self.max_input_bytes
            )));
        }
        let text = std::str::from_utf8(raw).map_err(|e| {
            StructviewError::InvalidInput(format!(
                "input is not valid UTF-8 (at byte {})",
                e.valid_up_to()
            ))
        })?;
        if let Some(pos) = text.find('\0') {
            return Err(StructviewError::InvalidInput(format!(
                "input contains a NUL byte at offset {pos}"
            )));
        }
        Ok(text)
    }

    /// Each requested field costs a scan of the whole text, so both the count
    /// and the name length are capped.
    fn check_fields(&self, fields: &[String]) -> Result<(), StructviewError> {
        if fields.len() > self.max_fields {
            return Err(StructviewError::InvalidInput(format!(
                "{} fields requested, limit is {}",
                fields.len(),
                self.max_fields
            )));
        }
        if let Some(long) = fields
            .iter()
            .map(|f| f.trim())
            .find(|f| f.len() > self.max_field_name_len)
        {
            return Err(StructviewError::InvalidInput(format!(
                "field name is {} bytes, limit is {}",
                long.len(),
                self.max_field_name_len
            )));
        }
        Ok(())
    }
}

impl FeatureExtractor for RegexExtractor {
    fn name(&self) -> &str {
        "regex"
    }

    fn extract(&self, request: &ExtractionRequest) -> Result<FeatureSet, StructviewError> {
        let text = self.decode(&request.text)?;
        self.check_fields(&request.fields)?;
        if text.trim().is_empty() {
            return Ok(FeatureSet::default());
        }

        let mut features = BTreeMap::new();
        features.insert("char_count".to_string(), count(text.chars().count()));
        features.insert(
            "word_count".to_string(),
            count(text.split_whitespace().count()),
        );
        features.insert(
            "line_count".to_string(),
            count(text.lines().filter(|l| !l.trim().is_empty()).count()),
        );
        features.insert("sentence_count".to_string(), count(sentence_count(text)));

        for detector in &self.detectors {
            let found = detector.find_all(text);
            if !found.is_empty() {
                features.insert(detector.name().to_string(), FeatureValue::List(found));
            }
        }

        let keywords = top_keywords(text, self.top_keywords, self.min_keyword_len);
        if !keywords.is_empty() {
            features.insert("top_keywords".to_string(), FeatureValue::List(keywords));
        }

        if let Some(host) = request.page_url.as_deref().and_then(page_host) {
            features.insert("page_host".to_string(), FeatureValue::Text(host));
        }

        let fields = extract_fields(text, &request.fields)?;

        Ok(FeatureSet {
            features,
            fields,
            error: None,
        })
    }
}

fn count(n: usize) -> FeatureValue {
    FeatureValue::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}

/// Counts runs of text ended by `.`, `!` or `?` followed by whitespace or
/// the end of input. A trailing unterminated run counts as a sentence.
fn sentence_count(text: &str) -> usize {
    let mut sentences = 0;
    let mut in_sentence = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        let terminator = matches!(c, '.' | '!' | '?');
        if terminator && chars.peek().is_none_or(|next| next.is_whitespace()) {
            if in_sentence {
                sentences += 1;
                in_sentence = false;
            }
        } else if !terminator && !c.is_whitespace() {
            in_sentence = true;
        }
    }
    if in_sentence {
        sentences += 1;
    }
    sentences
}

/// Lowercased host of an absolute URL, without credentials or port.
fn page_host(url: &str) -> Option<String> {
    let (_, rest) = url.trim().split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit('@').next()?;
    let host = if host_port.starts_with('[') {
        host_port.split_inclusive(']').next()?
    } else {
        host_port.split(':').next()?
    };
    (!host.is_empty()).then(|| host.to_ascii_lowercase())
}
