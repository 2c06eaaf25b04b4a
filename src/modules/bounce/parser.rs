// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::modules::bounce::models::{BounceDetails, FailureBlock};

static FAILURE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Action: failed[\s\S]*?Status: ([\d.]+)[\s\S]*?Diagnostic-Code: ([^\r\n]+)\r?\n")
        .unwrap()
});

static FINAL_RECIPIENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Final-Recipient: rfc822; ([^\r\n]+)\r?\n").unwrap());

static HEADER_LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([A-Za-z][A-Za-z0-9-]*): ([^\r\n]+)\r?\n").unwrap());

static PLAIN_TEXT_BODY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Content-Type: text/plain[\s\S]*?\r?\n\r?\n([\s\S]*?)(?:--\w+|$)").unwrap()
});

static SMTP_CODE_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\s+").unwrap());

/// Extracts delivery failure details from the raw source of an embedded message.
///
/// Returns `None` unless the text carries an `Action: failed` block or a
/// `Final-Recipient:` line, even when original headers were found.
pub fn parse_bounce_report(embedded_message: &str) -> Option<BounceDetails> {
    let failure = extract_failure(embedded_message);
    let failed_recipient = extract_final_recipient(embedded_message);

    if failure.is_none() && failed_recipient.is_none() {
        debug!("Embedded message carries no delivery failure signal");
        return None;
    }

    let (status, reason) = match failure {
        Some(FailureBlock { status, reason }) => (Some(status), reason),
        None => (None, None),
    };

    let details = BounceDetails {
        failed_recipient,
        status,
        reason,
        original_from: extract_header(embedded_message, "From"),
        original_to: extract_header(embedded_message, "To"),
        original_subject: extract_header(embedded_message, "Subject"),
        original_date: extract_header(embedded_message, "Date"),
        original_body: extract_plain_text_body(embedded_message),
    };
    debug!(?details, "Parsed delivery failure report");
    Some(details)
}

/// `Action: failed`, then `Status:` and `Diagnostic-Code:` later in the text.
pub fn extract_failure(text: &str) -> Option<FailureBlock> {
    let caps = FAILURE_PATTERN.captures(text)?;
    let status = caps.get(1)?.as_str().to_string();
    let diagnostic = caps.get(2)?.as_str();
    let reason = SMTP_CODE_PREFIX.replace(diagnostic, "");
    Some(FailureBlock {
        status,
        reason: non_empty(&reason),
    })
}

/// `Final-Recipient: rfc822; <address>`.
pub fn extract_final_recipient(text: &str) -> Option<String> {
    FINAL_RECIPIENT_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| non_empty(m.as_str()))
}

/// Value of the first line starting with `<name>: `. Header names are case sensitive.
pub fn extract_header(text: &str, name: &str) -> Option<String> {
    HEADER_LINE_PATTERN
        .captures_iter(text)
        .find(|caps| &caps[1] == name)
        .and_then(|caps| caps.get(2))
        .and_then(|m| non_empty(m.as_str()))
}

/// Body of the first `text/plain` section, up to the next MIME boundary or end of input.
pub fn extract_plain_text_body(text: &str) -> Option<String> {
    PLAIN_TEXT_BODY_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| non_empty(m.as_str().trim()))
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
