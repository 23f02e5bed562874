// SPDX-FileCopyrightText: 2026 Structview Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Regex detectors for list-valued features.
//!
//! A detector reports every distinct match in first-occurrence order. When
//! its pattern has a capture group and group 1 participated in the match,
//! group 1 is reported instead of the whole match.

use regex::Regex;

use structview_config::model::PatternConfig;

/// Post-processing applied to a raw match. Returning `None` drops the match.
type Refine = fn(&str) -> Option<String>;

/// A named, compiled list detector.
#[derive(Debug, Clone)]
pub struct Detector {
    name: String,
    regex: Regex,
    refine: Refine,
}

impl Detector {
    fn builtin(name: &str, pattern: &str, refine: Refine) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.to_string(),
            regex: Regex::new(pattern)?,
            refine,
        })
    }

    /// Compiles a configured custom detector.
    pub fn custom(config: &PatternConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            name: config.name.clone(),
            regex: Regex::new(&config.pattern)?,
            refine: keep,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct matches in `text`, in order of first occurrence.
    pub fn find_all(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for caps in self.regex.captures_iter(text) {
            let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
                continue;
            };
            let Some(value) = (self.refine)(m.as_str()).filter(|v| !v.is_empty()) else {
                continue;
            };
            if !found.contains(&value) {
                found.push(value);
            }
        }
        found
    }
}

const EMAIL: &str = r"(?i)\b[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}\b";

const URL: &str = r#"(?i)\bhttps?://[^\s<>"'(){}\[\]]+"#;

// Group 1 is the number; the prefix keeps it from starting inside a longer digit run.
const PHONE: &str =
    r"(?:^|[^\w+(])((?:\+\d{1,3}[ .-]?)?(?:\(\d{2,4}\) ?|\d{2,4}[ .-])\d{3,4}(?:[ .-]?\d{3,4})?)\b";

const PRICE: &str = r"(?i)(?:[$€£¥]\s?\d+(?:,\d{3})*(?:\.\d{1,2})?|\b\d+(?:,\d{3})*(?:\.\d{1,2})?\s?(?:USD|EUR|GBP|JPY)\b)";

const PERCENTAGE: &str = r"\b\d+(?:\.\d+)?\s?%";

const DATE: &str = r"(?i)\b(?:\d{4}-\d{2}-\d{2}|(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.? \d{1,2}, \d{4})\b";

const HASHTAG: &str = r"(?:^|\s)(#[A-Za-z][A-Za-z0-9_]*)";

/// The built-in list detectors, in a fixed order.
pub fn builtin_detectors() -> Result<Vec<Detector>, regex::Error> {
    Ok(vec![
        Detector::builtin("emails", EMAIL, lowercase)?,
        Detector::builtin("urls", URL, trim_url)?,
        Detector::builtin("phone_numbers", PHONE, phone)?,
        Detector::builtin("prices", PRICE, keep)?,
        Detector::builtin("percentages", PERCENTAGE, keep)?,
        Detector::builtin("dates", DATE, keep)?,
        Detector::builtin("hashtags", HASHTAG, keep)?,
    ])
}

fn keep(raw: &str) -> Option<String> {
    Some(raw.trim().to_string())
}

fn lowercase(raw: &str) -> Option<String> {
    Some(raw.to_ascii_lowercase())
}

fn trim_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim_end_matches(['.', ',', ';', ':', '!', '?']);
    (!trimmed.ends_with("://")).then(|| trimmed.to_string())
}

/// Phone numbers carry between 7 and 15 digits.
fn phone(raw: &str) -> Option<String> {
    let digits = raw.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits).then(|| raw.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(name: &str) -> Detector {
        builtin_detectors()
            .unwrap()
            .into_iter()
            .find(|d| d.name() == name)
            .unwrap()
    }

    #[test]
    fn builtin_patterns_compile() {
        assert_eq!(builtin_detectors().unwrap().len(), 7);
    }

    #[test]
    fn emails_are_distinct_and_lowercased() {
        let found = detector("emails")
            .find_all("Mail Sales@Example.com or sales@example.com, ops@corp.co.uk.");
        assert_eq!(found, vec!["sales@example.com", "ops@corp.co.uk"]);
    }

    #[test]
    fn urls_lose_trailing_punctuation() {
        let found = detector("urls")
            .find_all("See https://example.com/a?b=1. Also (http://x.io/path), done");
        assert_eq!(found, vec!["https://example.com/a?b=1", "http://x.io/path"]);
    }

    #[test]
    fn phones_need_seven_digits() {
        let found =
            detector("phone_numbers").find_all("Call (555) 123-4567 or 555-1234, not 12-345.");
        assert_eq!(found, vec!["(555) 123-4567", "555-1234"]);
    }

    #[test]
    fn phones_do_not_start_inside_digit_runs() {
        let phones = detector("phone_numbers");
        assert!(
            phones
                .find_all("Serial 123456789 0123 and invoice 20240115 9876")
                .is_empty()
        );
        assert_eq!(
            phones.find_all("Ring +1 555-123-4567,(020) 7946-0018"),
            vec!["+1 555-123-4567", "(020) 7946-0018"]
        );
    }

    #[test]
    fn iso_dates_are_not_phone_numbers() {
        assert!(detector("phone_numbers").find_all("on 2024-01-15").is_empty());
    }

    #[test]
    fn prices_in_several_notations() {
        let found = detector("prices").find_all("Now $1,299.99 was €5 or 12.50 USD");
        assert_eq!(found, vec!["$1,299.99", "€5", "12.50 USD"]);
    }

    #[test]
    fn percentages_and_dates() {
        assert_eq!(
            detector("percentages").find_all("up 12% and 3.5 % down"),
            vec!["12%", "3.5 %"]
        );
        assert_eq!(
            detector("dates").find_all("From 2024-03-01 to March 5, 2024 and Dec. 1, 2023"),
            vec!["2024-03-01", "March 5, 2024", "Dec. 1, 2023"]
        );
    }

    #[test]
    fn hashtags_use_capture_group() {
        let found = detector("hashtags").find_all("#rust is fun #Rust #1 a#b #rust");
        assert_eq!(found, vec!["#rust", "#Rust"]);
    }

    #[test]
    fn custom_pattern_prefers_group_one() {
        let grouped = Detector::custom(&PatternConfig {
            name: "sku".into(),
            pattern: r"SKU-(\d+)".into(),
        })
        .unwrap();
        assert_eq!(grouped.find_all("SKU-12 SKU-7 SKU-12"), vec!["12", "7"]);

        let whole = Detector::custom(&PatternConfig {
            name: "isbn".into(),
            pattern: r"97[89]-\d{10}".into(),
        })
        .unwrap();
        assert_eq!(whole.find_all("isbn 978-0306406157"), vec!["978-0306406157"]);
    }

    #[test]
    fn empty_matches_are_dropped() {
        let maybe = Detector::custom(&PatternConfig {
            name: "maybe".into(),
            pattern: "x*".into(),
        })
        .unwrap();
        assert!(maybe.find_all("abc").is_empty());
        assert_eq!(maybe.find_all("a xx b"), vec!["xx"]);
    }
}
