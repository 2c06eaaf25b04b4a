// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::modules::settings::cli::Settings;

#[cfg(test)]
mod tests;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
pub enum EmailCategory {
    #[serde(rename = "TYPE_A")]
    TypeA,
    #[serde(rename = "TYPE_B")]
    TypeB,
    #[serde(rename = "TYPE_C")]
    TypeC,
    #[serde(rename = "DEFAULT")]
    Default,
}

impl fmt::Display for EmailCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmailCategory::TypeA => write!(f, "TYPE_A"),
            EmailCategory::TypeB => write!(f, "TYPE_B"),
            EmailCategory::TypeC => write!(f, "TYPE_C"),
            EmailCategory::Default => write!(f, "DEFAULT"),
        }
    }
}

/// Keywords and destination override of one routing category.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CategoryRule {
    pub category: EmailCategory,
    /// Trimmed, lower-cased, never empty.
    pub keywords: Vec<String>,
    pub destination: Option<String>,
}

impl CategoryRule {
    pub fn new(category: EmailCategory, keywords: Option<&str>, destination: Option<&str>) -> Self {
        Self {
            category,
            keywords: keywords.map(parse_keywords).unwrap_or_default(),
            destination: destination
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from),
        }
    }

    /// `subject_lower` must already be lower-cased.
    pub fn matches(&self, subject_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| subject_lower.contains(keyword.as_str()))
    }
}

/// Process-wide routing table, built once at start-up and never mutated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoutingConfig {
    rules: Vec<CategoryRule>,
    default_destination: String,
}

impl RoutingConfig {
    /// Rules are evaluated in category order (A, B, C) whatever order they are given in.
    pub fn new(default_destination: impl Into<String>, rules: Vec<CategoryRule>) -> Self {
        let mut rules: Vec<CategoryRule> = rules
            .into_iter()
            .filter(|rule| {
                if rule.category == EmailCategory::Default {
                    warn!("Ignoring routing rule for the DEFAULT category");
                    false
                } else {
                    true
                }
            })
            .collect();
        rules.sort_by_key(|rule| rule.category);
        Self {
            rules,
            default_destination: default_destination.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let config = Self::new(
            settings.forward_email_default.clone(),
            vec![
                CategoryRule::new(
                    EmailCategory::TypeA,
                    settings.subject_keywords_type_a.as_deref(),
                    settings.forward_email_type_a.as_deref(),
                ),
                CategoryRule::new(
                    EmailCategory::TypeB,
                    settings.subject_keywords_type_b.as_deref(),
                    settings.forward_email_type_b.as_deref(),
                ),
                CategoryRule::new(
                    EmailCategory::TypeC,
                    settings.subject_keywords_type_c.as_deref(),
                    settings.forward_email_type_c.as_deref(),
                ),
            ],
        );
        for rule in &config.rules {
            info!(
                category = %rule.category,
                keywords = ?rule.keywords,
                destination = rule.destination.as_deref().unwrap_or("<inherited>"),
                "Routing rule loaded"
            );
        }
        config
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn default_destination(&self) -> &str {
        &self.default_destination
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub category: EmailCategory,
    pub destination: String,
}

/// Classifies a resolved subject by case-insensitive keyword matching.
///
/// Every category is checked, in order, and each match overwrites the previous
/// one: when keywords of both TYPE_A and TYPE_C match, the result is TYPE_C.
/// A matching category without a destination override keeps the destination
/// selected so far.
pub fn classify(subject: &str, config: &RoutingConfig) -> ClassificationResult {
    let subject_lower = subject.to_lowercase();
    let mut result = ClassificationResult {
        category: EmailCategory::Default,
        destination: config.default_destination.clone(),
    };

    // NOTE: last match wins. Do not short-circuit on the first matching rule.
    for rule in &config.rules {
        if rule.matches(&subject_lower) {
            debug!(category = %rule.category, "Subject matched category keywords");
            result.category = rule.category;
            if let Some(destination) = &rule.destination {
                result.destination = destination.clone();
            }
        }
    }

    info!(
        category = %result.category,
        forward_to = %result.destination,
        "Classified subject \"{}\"",
        subject
    );
    result
}

/// Splits a comma-separated keyword list; entries are trimmed and lower-cased.
pub fn parse_keywords(list: &str) -> Vec<String> {
    list.split(',')
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}
