// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use crate::modules::bounce::parser::extract_header;
use crate::modules::bounce::BounceDetails;
use crate::modules::inbound::InboundEmailPayload;
use crate::modules::subject::decoder::decode_mime_subject;

/// Lower-case phrases marking a subject as the bounce notification itself.
pub const BOUNCE_SUBJECT_PHRASES: [&str; 4] = [
    "undelivered",
    "returned to sender",
    "delivery failure",
    "mail delivery failed",
];

pub const FORWARDED_MESSAGE_MARKER: &str = "---------- Forwarded message ----------";

static SUBJECT_LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Subject:\s*([^\r\n]+)\r?\n").unwrap());

static FORWARDED_SUBJECT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{}[\s\S]*?Subject:\s*([^\r\n]+)\r?\n",
        regex::escape(FORWARDED_MESSAGE_MARKER)
    ))
    .unwrap()
});

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubjectSource {
    /// Subject of a message forwarded or embedded inside this one.
    Forwarded,
    /// Subject of the original message reported by a bounce.
    Original,
    /// Top-level subject of the inbound message.
    Current,
    /// No subject anywhere; classified as the empty string.
    #[serde(rename = "NONE")]
    Empty,
}

impl fmt::Display for SubjectSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectSource::Forwarded => write!(f, "FORWARDED"),
            SubjectSource::Original => write!(f, "ORIGINAL"),
            SubjectSource::Current => write!(f, "CURRENT"),
            SubjectSource::Empty => write!(f, "NONE"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResolvedSubject {
    pub text: String,
    pub source: SubjectSource,
}

impl ResolvedSubject {
    fn new(text: impl Into<String>, source: SubjectSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// Picks the subject used for classification.
///
/// Priority: forwarded subject from the embedded message, forwarded subject
/// from the raw body (only without an embedded message), the original subject
/// of the embedded message, the top-level subject, and finally the empty string.
pub fn resolve_subject(
    payload: &InboundEmailPayload,
    bounce: Option<&BounceDetails>,
) -> ResolvedSubject {
    let forwarded = match payload.embedded_message.as_deref() {
        Some(embedded) => find_embedded_subject(embedded),
        None => payload
            .raw_forwarded_block
            .as_deref()
            .and_then(find_forwarded_block_subject),
    };

    let resolved = if let Some(subject) = forwarded {
        ResolvedSubject::new(subject, SubjectSource::Forwarded)
    } else if let Some(subject) = original_subject(payload, bounce) {
        ResolvedSubject::new(subject, SubjectSource::Original)
    } else if let Some(subject) = payload.subject.as_deref().filter(|s| !s.is_empty()) {
        ResolvedSubject::new(subject, SubjectSource::Current)
    } else {
        ResolvedSubject::new(String::new(), SubjectSource::Empty)
    };

    info!(
        source = %resolved.source,
        "Subject used for classification: \"{}\"",
        resolved.text
    );
    resolved
}

/// First `Subject:` header of the embedded message, taken from the bounce
/// report when one was parsed. Not decoded.
fn original_subject(
    payload: &InboundEmailPayload,
    bounce: Option<&BounceDetails>,
) -> Option<String> {
    bounce
        .and_then(|b| b.original_subject.clone())
        .or_else(|| {
            payload
                .embedded_message
                .as_deref()
                .and_then(|embedded| extract_header(embedded, "Subject"))
        })
}

/// Scans every `Subject:` line of the embedded message.
///
/// The first decoded subject that is not a bounce notification wins. When all
/// of them are bounce notifications and there are at least two, the last one is
/// used anyway.
pub fn find_embedded_subject(embedded_message: &str) -> Option<String> {
    let candidates: Vec<&str> = SUBJECT_LINE_PATTERN
        .captures_iter(embedded_message)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect();

    if candidates.is_empty() {
        debug!("No Subject line found in embedded message");
        return None;
    }
    debug!("Found {} Subject line(s) in embedded message", candidates.len());

    for (index, raw) in candidates.iter().enumerate() {
        let decoded = decode_mime_subject(raw);
        debug!("Subject {} raw: \"{}\", decoded: \"{}\"", index + 1, raw, decoded);
        if !is_bounce_subject(&decoded) {
            debug!("Using Subject {} as forwarded subject", index + 1);
            return Some(decoded);
        }
    }

    if candidates.len() > 1 {
        let last = candidates.last().map(|raw| decode_mime_subject(raw));
        debug!("Every Subject line is a bounce notice, using the last one: {:?}", last);
        return last;
    }

    debug!("No suitable subject found in embedded message");
    None
}

/// Subject line following a `---------- Forwarded message ----------` marker.
pub fn find_forwarded_block_subject(raw: &str) -> Option<String> {
    let subject = FORWARDED_SUBJECT_PATTERN
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(decode_mime_subject);
    if let Some(subject) = &subject {
        debug!("Found forwarded subject in raw body: \"{}\"", subject);
    }
    subject
}

pub fn is_bounce_subject(subject: &str) -> bool {
    let lower = subject.to_lowercase();
    BOUNCE_SUBJECT_PHRASES
        .iter()
        .any(|phrase| lower.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> InboundEmailPayload {
        InboundEmailPayload::default()
    }

    #[test]
    fn forwarded_subject_beats_current_subject() {
        let mut p = payload();
        p.subject = Some("Fwd: something".into());
        p.embedded_message = Some("From: a@x.com\nSubject: Invoice #7\n\nbody\n".into());
        let resolved = resolve_subject(&p, None);
        assert_eq!(resolved, ResolvedSubject::new("Invoice #7", SubjectSource::Forwarded));
    }

    #[test]
    fn bounce_subject_beats_current_subject() {
        let mut p = payload();
        p.subject = Some("Current".into());
        let bounce = BounceDetails {
            original_subject: Some("=?utf-8?Q?Original?=".into()),
            ..Default::default()
        };
        let resolved = resolve_subject(&p, Some(&bounce));
        // The original subject is used as is, without decoding.
        assert_eq!(
            resolved,
            ResolvedSubject::new("=?utf-8?Q?Original?=", SubjectSource::Original)
        );
    }

    #[test]
    fn current_subject_when_nothing_else() {
        let mut p = payload();
        p.subject = Some("Hello".into());
        assert_eq!(
            resolve_subject(&p, None),
            ResolvedSubject::new("Hello", SubjectSource::Current)
        );
    }

    #[test]
    fn empty_when_no_subject_anywhere() {
        assert_eq!(
            resolve_subject(&payload(), None),
            ResolvedSubject::new("", SubjectSource::Empty)
        );
    }

    #[test]
    fn bounce_phrase_subject_is_skipped_for_later_candidate() {
        let embedded = "Subject: Undelivered Mail Returned to Sender\n\
                        Final-Recipient: rfc822; a@x.com\n\
                        Subject: Invoice #4\n";
        assert_eq!(find_embedded_subject(embedded).as_deref(), Some("Invoice #4"));
    }

    #[test]
    fn last_candidate_is_used_when_all_are_bounces() {
        let embedded = "Subject: Mail delivery failed\n\
                        Subject: Undelivered Mail Returned to Sender\n";
        assert_eq!(
            find_embedded_subject(embedded).as_deref(),
            Some("Undelivered Mail Returned to Sender")
        );
    }

    #[test]
    fn single_bounce_candidate_is_rejected() {
        let embedded = "Subject: Undelivered Mail Returned to Sender\n";
        assert!(find_embedded_subject(embedded).is_none());
    }

    #[test]
    fn first_acceptable_candidate_wins() {
        let embedded = "Subject: First\nSubject: Second\n";
        assert_eq!(find_embedded_subject(embedded).as_deref(), Some("First"));
    }

    #[test]
    fn embedded_candidates_are_decoded_before_rejection() {
        // "Undelivered Mail" encoded as base64
        let embedded = "Subject: =?utf-8?B?VW5kZWxpdmVyZWQgTWFpbA==?=\n\
                        Subject: =?utf-8?Q?Caf=C3=A9_order?=\n";
        assert_eq!(find_embedded_subject(embedded).as_deref(), Some("Café order"));
    }

    #[test]
    fn rejected_single_candidate_falls_back_to_bounce_subject() {
        let mut p = payload();
        p.subject = Some("Current".into());
        p.embedded_message = Some("Subject: Undelivered Mail Returned to Sender\n".into());
        let bounce = BounceDetails {
            original_subject: Some("Undelivered Mail Returned to Sender".into()),
            ..Default::default()
        };
        let resolved = resolve_subject(&p, Some(&bounce));
        assert_eq!(resolved.source, SubjectSource::Original);
    }

    #[test]
    fn lone_bounce_candidate_is_used_without_delivery_report() {
        let mut p = payload();
        p.subject = Some("Hello".into());
        p.embedded_message = Some(
            "Received: from mx\n\
             Subject: Undelivered Mail Returned to Sender\n\
             \n\
             body\n"
                .into(),
        );
        assert_eq!(
            resolve_subject(&p, None),
            ResolvedSubject::new("Undelivered Mail Returned to Sender", SubjectSource::Original)
        );
    }

    #[test]
    fn raw_forwarded_block_is_used_without_embedded_message() {
        let mut p = payload();
        p.subject = Some("Fwd: =?utf-8?Q?hi?=".into());
        p.raw_forwarded_block = Some(
            "Hi,\n\n---------- Forwarded message ----------\n\
             From: a@x.com\n\
             Subject: =?utf-8?Q?Payment_due?=\n\nbody\n"
                .into(),
        );
        assert_eq!(
            resolve_subject(&p, None),
            ResolvedSubject::new("Payment due", SubjectSource::Forwarded)
        );
    }

    #[test]
    fn raw_forwarded_block_is_ignored_when_embedded_message_present() {
        let mut p = payload();
        p.subject = Some("Current".into());
        p.embedded_message = Some("no subject lines here".into());
        p.raw_forwarded_block =
            Some("---------- Forwarded message ----------\nSubject: From raw\n".into());
        assert_eq!(
            resolve_subject(&p, None),
            ResolvedSubject::new("Current", SubjectSource::Current)
        );
    }

    #[test]
    fn raw_block_without_marker_is_ignored() {
        assert!(find_forwarded_block_subject("Subject: plain\n").is_none());
    }

    #[test]
    fn empty_source_is_labelled_none() {
        assert_eq!(SubjectSource::Empty.to_string(), "NONE");
        assert_eq!(
            serde_json::to_value(SubjectSource::Empty).unwrap(),
            serde_json::json!("NONE")
        );
        assert_eq!(
            serde_json::to_value(SubjectSource::Forwarded).unwrap(),
            serde_json::json!("FORWARDED")
        );
    }

    #[test]
    fn bounce_phrases_match_case_insensitively() {
        assert!(is_bounce_subject("Mail Delivery Failed: returning message"));
        assert!(is_bounce_subject("DELIVERY FAILURE"));
        assert!(!is_bounce_subject("Invoice #4"));
    }
}
