// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt::Write;

use chrono::SecondsFormat;
use html_escape::encode_text;

use crate::modules::bounce::BounceDetails;
use crate::modules::forward::{
    ForwardPayload, OutboundAttachment, FORWARD_SUBJECT_PREFIX, NO_SUBJECT,
    ORIGINAL_EMAIL_FILENAME,
};
use crate::modules::inbound::{InboundEmailPayload, RFC822_MIME_TYPE};
use crate::modules::routing::ClassificationResult;
use crate::modules::subject::resolver::ResolvedSubject;

const NOT_AVAILABLE: &str = "N/A";

/// Assembles the forwarded message. Pure: missing data only drops sections.
pub fn build_forward_payload(
    payload: &InboundEmailPayload,
    bounce: Option<&BounceDetails>,
    resolved: &ResolvedSubject,
    classification: &ClassificationResult,
    sender: &str,
) -> ForwardPayload {
    let mut attachments: Vec<OutboundAttachment> =
        payload.attachments.iter().map(OutboundAttachment::from).collect();
    if let Some(embedded) = &payload.embedded_message {
        attachments.push(OutboundAttachment {
            filename: ORIGINAL_EMAIL_FILENAME.to_string(),
            mime_type: RFC822_MIME_TYPE.to_string(),
            content: embedded.as_bytes().to_vec(),
        });
    }

    ForwardPayload {
        destination: classification.destination.clone(),
        sender: sender.to_string(),
        subject_line: forward_subject_line(payload.subject.as_deref()),
        html_body: render_html_body(payload, bounce, resolved, classification),
        attachments,
    }
}

/// The outbound subject keeps the top-level subject, not the resolved one.
pub fn forward_subject_line(subject: Option<&str>) -> String {
    let subject = subject.filter(|s| !s.is_empty()).unwrap_or(NO_SUBJECT);
    format!("{} {}", FORWARD_SUBJECT_PREFIX, subject)
}

fn render_html_body(
    payload: &InboundEmailPayload,
    bounce: Option<&BounceDetails>,
    resolved: &ResolvedSubject,
    classification: &ClassificationResult,
) -> String {
    let mut html = String::from(r#"<div style="font-family: Arial, sans-serif;">"#);

    write_metadata(&mut html, payload, resolved, classification);
    if let Some(bounce) = bounce {
        write_bounce_details(&mut html, bounce);
    }

    if let Some(body) = payload.html.as_deref() {
        html.push_str(
            r#"<div style="border-left: 3px solid #ccc; padding-left: 10px; margin-top: 20px;">"#,
        );
        html.push_str(body);
        html.push_str("</div>");
    } else if let Some(text) = payload.text.as_deref() {
        html.push_str(
            r#"<div style="border-left: 3px solid #ccc; padding-left: 10px; margin-top: 20px;">"#,
        );
        let _ = write!(
            html,
            r#"<pre style="white-space: pre-wrap; word-wrap: break-word;">{}</pre>"#,
            encode_text(text)
        );
        html.push_str("</div>");
    }

    if payload.embedded_message.is_some() {
        let _ = write!(
            html,
            r#"<div style="margin-top: 20px; padding: 10px; background: #f9f9f9; border: 1px solid #ddd;"><strong>Note:</strong> The complete raw email data has been attached as '{}'</div>"#,
            ORIGINAL_EMAIL_FILENAME
        );
    }

    html.push_str("</div>");
    html
}

fn write_metadata(
    html: &mut String,
    payload: &InboundEmailPayload,
    resolved: &ResolvedSubject,
    classification: &ClassificationResult,
) {
    html.push_str(
        r#"<div style="background: #f0f0f0; padding: 10px; margin-bottom: 20px;">"#,
    );
    html.push_str("<strong>Forwarded Email from Inbound Parse</strong><br/>");
    write_field(html, "Original From", payload.from.as_deref());
    write_field(html, "Original To", payload.to.as_deref());
    write_field(html, "Original Subject", payload.subject.as_deref());
    let received = payload
        .received_at
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    write_field(html, "Received", Some(received.as_str()));
    if payload.cc.is_some() {
        write_field(html, "CC", payload.cc.as_deref());
    }
    if payload.bcc.is_some() {
        write_field(html, "BCC", payload.bcc.as_deref());
    }
    if !resolved.text.is_empty() {
        let detected = format!("{} ({})", resolved.text, resolved.source);
        write_field(html, "Detected Subject", Some(detected.as_str()));
    }
    let category = classification.category.to_string();
    write_field(html, "Email Type", Some(category.as_str()));
    html.push_str("</div>");
}

fn write_bounce_details(html: &mut String, bounce: &BounceDetails) {
    html.push_str(
        r#"<div style="background: #ffebee; padding: 15px; margin: 20px 0; border-left: 4px solid #f44336;">"#,
    );
    html.push_str(
        r#"<h3 style="color: #d32f2f; margin-top: 0;">Delivery Failure Details</h3>"#,
    );
    write_field(html, "Failed Recipient", bounce.failed_recipient.as_deref());
    write_field(html, "Failure Reason", bounce.reason.as_deref());
    if bounce.original_from.is_some() {
        html.push_str("<br/><strong>Original Message Details:</strong><br/>");
        write_field(html, "From", bounce.original_from.as_deref());
        write_field(html, "To", bounce.original_to.as_deref());
        write_field(html, "Subject", bounce.original_subject.as_deref());
        write_field(html, "Date", bounce.original_date.as_deref());
    }
    html.push_str("</div>");

    if let Some(body) = bounce.original_body.as_deref() {
        html.push_str(
            r#"<div style="background: #f5f5f5; padding: 15px; margin: 20px 0; border-left: 4px solid #2196F3;">"#,
        );
        html.push_str(r#"<h4 style="margin-top: 0;">Original Message Content:</h4>"#);
        let _ = write!(
            html,
            r#"<pre style="white-space: pre-wrap; word-wrap: break-word; font-family: monospace;">{}</pre>"#,
            encode_text(body)
        );
        html.push_str("</div>");
    }
}

fn write_field(html: &mut String, label: &str, value: Option<&str>) {
    let _ = write!(
        html,
        "<strong>{}:</strong> {}<br/>",
        label,
        encode_text(value.unwrap_or(NOT_AVAILABLE))
    );
}
