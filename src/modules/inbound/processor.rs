// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, enabled, info, trace, Level};

use crate::modules::bounce::{parse_bounce_report, BounceDetails};
use crate::modules::forward::builder::build_forward_payload;
use crate::modules::forward::ForwardPayload;
use crate::modules::inbound::InboundEmailPayload;
use crate::modules::routing::{classify, ClassificationResult, EmailCategory, RoutingConfig};
use crate::modules::subject::decoder::decode_optional;
use crate::modules::subject::resolver::{resolve_subject, ResolvedSubject};
use crate::modules::utils::truncate_chars;

const HTML_PREVIEW_CHARS: usize = 500;
const RFC822_PREVIEW_LINES: usize = 20;

/// Everything derived from one inbound email.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessedEmail {
    pub bounce: Option<BounceDetails>,
    pub resolved: ResolvedSubject,
    pub classification: ClassificationResult,
    pub forward: ForwardPayload,
}

/// Runs bounce parsing, subject resolution, classification and forward
/// assembly for one request. Holds only read-only, process-wide state.
#[derive(Clone, Debug)]
pub struct InboundProcessor {
    routing: Arc<RoutingConfig>,
    sender: String,
}

impl InboundProcessor {
    pub fn new(routing: Arc<RoutingConfig>, sender: impl Into<String>) -> Self {
        Self {
            routing,
            sender: sender.into(),
        }
    }

    pub fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    pub fn process(&self, payload: &InboundEmailPayload) -> ProcessedEmail {
        log_summary(payload);

        let bounce = payload
            .embedded_message
            .as_deref()
            .and_then(parse_bounce_report);
        if let Some(details) = &bounce {
            info!(
                failed_recipient = details.failed_recipient.as_deref().unwrap_or("N/A"),
                reason = details.reason.as_deref().unwrap_or("N/A"),
                "Delivery failure report detected"
            );
        }

        let resolved = resolve_subject(payload, bounce.as_ref());
        let classification = classify(&resolved.text, &self.routing);
        on_category(classification.category);

        let forward = build_forward_payload(
            payload,
            bounce.as_ref(),
            &resolved,
            &classification,
            &self.sender,
        );

        ProcessedEmail {
            bounce,
            resolved,
            classification,
            forward,
        }
    }
}

/// Per-category hook. Every category is currently only logged.
fn on_category(category: EmailCategory) {
    match category {
        EmailCategory::TypeA => info!("Processing as TYPE_A"),
        EmailCategory::TypeB => info!("Processing as TYPE_B"),
        EmailCategory::TypeC => info!("Processing as TYPE_C"),
        EmailCategory::Default => info!("Processing as DEFAULT type"),
    }
}

fn log_summary(payload: &InboundEmailPayload) {
    info!(
        received_at = %payload.received_at,
        from = payload.from.as_deref().unwrap_or("N/A"),
        to = payload.to.as_deref().unwrap_or("N/A"),
        cc = payload.cc.as_deref().unwrap_or("N/A"),
        bcc = payload.bcc.as_deref().unwrap_or("N/A"),
        subject = payload.subject.as_deref().unwrap_or("N/A"),
        "Inbound email received"
    );
    if let Some(decoded) = decode_optional(payload.subject.as_deref())
        .filter(|decoded| payload.subject.as_deref() != Some(decoded.as_str()))
    {
        info!("Decoded subject: \"{}\"", decoded);
    }
    info!(
        dkim = payload.dkim.as_deref().unwrap_or("N/A"),
        spf = payload.spf.as_deref().unwrap_or("N/A"),
        "Security"
    );
    match (&payload.envelope, &payload.raw_envelope) {
        (Some(envelope), _) => info!(
            from = envelope.from.as_deref().unwrap_or("N/A"),
            to = %envelope.to.join(", "),
            "Envelope"
        ),
        (None, Some(raw)) => info!(raw = %raw, "Envelope"),
        (None, None) => info!("Envelope: N/A"),
    }

    if enabled!(Level::DEBUG) {
        if let Some(headers) = &payload.headers {
            for line in headers.lines().filter(|l| !l.trim().is_empty()) {
                debug!("Header: {}", line);
            }
        }
        match &payload.text {
            Some(text) => debug!("Text content:\n{}", text),
            None => debug!("No text content"),
        }
        match &payload.html {
            Some(html) if html.chars().count() > HTML_PREVIEW_CHARS => debug!(
                length = html.len(),
                "HTML content too long, showing first {} chars:\n{}...",
                HTML_PREVIEW_CHARS,
                truncate_chars(html, HTML_PREVIEW_CHARS)
            ),
            Some(html) => debug!(length = html.len(), "HTML content:\n{}", html),
            None => debug!("No HTML content"),
        }
    }

    if payload.attachments.is_empty() {
        info!("No attachments");
    }
    for (index, attachment) in payload.attachments.iter().enumerate() {
        info!(
            index = index + 1,
            name = %attachment.name,
            mime_type = %attachment.mime_type,
            size = attachment.size_bytes,
            "Attachment"
        );
        if attachment.is_rfc822() && enabled!(Level::DEBUG) {
            let content = String::from_utf8_lossy(&attachment.content);
            let preview: Vec<&str> = content.lines().take(RFC822_PREVIEW_LINES).collect();
            let truncated = content.lines().count() > RFC822_PREVIEW_LINES;
            debug!(
                "Forwarded email attachment preview:\n{}{}",
                preview.join("\n"),
                if truncated { "\n... [truncated]" } else { "" }
            );
        }
    }

    if enabled!(Level::TRACE) {
        match serde_json::to_string_pretty(payload) {
            Ok(dump) => trace!("Full payload dump:\n{}", dump),
            Err(e) => trace!("Failed to serialize payload: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::routing::CategoryRule;
    use crate::modules::subject::resolver::SubjectSource;

    fn processor() -> InboundProcessor {
        let routing = RoutingConfig::new(
            "default@example.com",
            vec![
                CategoryRule::new(
                    EmailCategory::TypeA,
                    Some("invoice"),
                    Some("billing@example.com"),
                ),
                CategoryRule::new(EmailCategory::TypeB, Some("support"), Some("help@example.com")),
                CategoryRule::new(
                    EmailCategory::TypeC,
                    Some("delivery failure"),
                    Some("bounces@example.com"),
                ),
            ],
        );
        InboundProcessor::new(Arc::new(routing), "support@example.com")
    }

    #[test]
    fn bounced_invoice_is_routed_to_type_a() {
        let mut payload = InboundEmailPayload::default();
        payload.subject = Some("Re: Invoice #4 — Undelivered Mail Returned to Sender".into());
        payload.embedded_message = Some(
            "Reporting-MTA: dns; mx.example.net\n\
             Subject: Undelivered Mail Returned to Sender\n\
             \n\
             Final-Recipient: rfc822; a@x.com\n\
             Action: failed\n\
             Status: 5.1.1\n\
             Diagnostic-Code: 550 user unknown\n\
             \n\
             From: billing@example.com\n\
             Subject: Invoice #4\n\
             \n\
             Please pay.\n"
                .into(),
        );

        let processed = processor().process(&payload);

        let bounce = processed.bounce.unwrap();
        assert_eq!(bounce.failed_recipient.as_deref(), Some("a@x.com"));
        assert_eq!(bounce.reason.as_deref(), Some("user unknown"));
        assert_eq!(processed.resolved.text, "Invoice #4");
        assert_eq!(processed.resolved.source, SubjectSource::Forwarded);
        assert_eq!(processed.classification.category, EmailCategory::TypeA);
        assert_eq!(processed.forward.destination, "billing@example.com");
        assert_eq!(
            processed.forward.subject_line,
            "[Forwarded] Re: Invoice #4 — Undelivered Mail Returned to Sender"
        );
        assert_eq!(processed.forward.attachments.len(), 1);
        assert!(processed.forward.html_body.contains("Delivery Failure Details"));
    }

    #[test]
    fn plain_mail_without_embedded_message_uses_current_subject() {
        let mut payload = InboundEmailPayload::default();
        payload.subject = Some("Support needed".into());
        payload.text = Some("help".into());

        let processed = processor().process(&payload);

        assert!(processed.bounce.is_none());
        assert_eq!(processed.resolved.source, SubjectSource::Current);
        assert_eq!(processed.classification.category, EmailCategory::TypeB);
        assert_eq!(processed.forward.destination, "help@example.com");
        assert!(processed.forward.attachments.is_empty());
    }

    #[test]
    fn empty_payload_degrades_to_default() {
        let processed = processor().process(&InboundEmailPayload::default());
        assert_eq!(processed.resolved.source, SubjectSource::Empty);
        assert_eq!(processed.classification.category, EmailCategory::Default);
        assert_eq!(processed.forward.destination, "default@example.com");
        assert_eq!(processed.forward.subject_line, "[Forwarded] No Subject");
    }

    #[test]
    fn lone_bounce_subject_without_report_classifies_by_that_subject() {
        let mut payload = InboundEmailPayload::default();
        payload.subject = Some("Hello".into());
        payload.embedded_message =
            Some("Received: from mx\nSubject: Delivery failure notice\n\nbody\n".into());

        let processed = processor().process(&payload);

        assert!(processed.bounce.is_none());
        assert_eq!(processed.resolved.text, "Delivery failure notice");
        assert_eq!(processed.resolved.source, SubjectSource::Original);
        assert_eq!(processed.classification.category, EmailCategory::TypeC);
        assert_eq!(processed.forward.destination, "bounces@example.com");
        assert!(!processed.forward.html_body.contains("Delivery Failure Details"));
    }

    #[test]
    fn embedded_message_without_failure_has_no_bounce_but_is_attached() {
        let mut payload = InboundEmailPayload::default();
        payload.embedded_message =
            Some("From: a@example.com\nTo: b@example.com\nSubject: Invoice 9\n\nbody\n".into());
        let processed = processor().process(&payload);
        assert!(processed.bounce.is_none());
        assert_eq!(processed.classification.category, EmailCategory::TypeA);
        assert_eq!(processed.forward.attachments[0].filename, "original_email.eml");
    }
}
