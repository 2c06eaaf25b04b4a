// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub mod processor;

pub const RFC822_MIME_TYPE: &str = "message/rfc822";

/// A SendGrid Inbound Parse delivery, as decoded from the webhook form.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct InboundEmailPayload {
    pub from: Option<String>,
    pub to: Option<String>,
    pub cc: Option<String>,
    pub bcc: Option<String>,
    pub subject: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
    /// Raw header block of the inbound message.
    pub headers: Option<String>,
    pub dkim: Option<String>,
    pub spf: Option<String>,
    pub envelope: Option<Envelope>,
    /// Envelope field when it could not be read as JSON.
    pub raw_envelope: Option<String>,
    pub charsets: Option<String>,
    /// Raw source of an attached or bounced original message (form field `email`).
    pub embedded_message: Option<String>,
    /// Raw message body that may contain a forwarded-message block (form field `raw`).
    pub raw_forwarded_block: Option<String>,
    pub attachments: Vec<Attachment>,
    pub received_at: DateTime<Utc>,
}

impl InboundEmailPayload {
    pub fn new(received_at: DateTime<Utc>) -> Self {
        Self {
            received_at,
            ..Default::default()
        }
    }

    /// Assigns a text form field. Empty values are treated as absent and unknown
    /// field names are ignored. Returns `false` when the field was not recognized.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let value = if value.is_empty() { None } else { Some(value) };
        match name {
            "from" => self.from = value,
            "to" => self.to = value,
            "cc" => self.cc = value,
            "bcc" => self.bcc = value,
            "subject" => self.subject = value,
            "text" => self.text = value,
            "html" => self.html = value,
            "headers" => self.headers = value,
            "dkim" => self.dkim = value,
            "spf" => self.spf = value,
            "charsets" => self.charsets = value,
            "email" => self.embedded_message = value,
            "raw" => self.raw_forwarded_block = value,
            "envelope" => self.set_envelope(value),
            _ => return false,
        }
        true
    }

    fn set_envelope(&mut self, value: Option<String>) {
        self.envelope = None;
        self.raw_envelope = None;
        let Some(value) = value else {
            return;
        };
        match serde_json::from_str::<Envelope>(&value) {
            Ok(envelope) => self.envelope = Some(envelope),
            Err(e) => {
                warn!("Envelope is not valid JSON ({}), keeping raw value", e);
                self.raw_envelope = Some(value);
            }
        }
    }

    pub fn add_attachment(&mut self, attachment: Attachment) {
        self.attachments.push(attachment);
    }
}

/// SMTP envelope reported by SendGrid, e.g. `{"to":["a@b.com"],"from":"c@d.com"}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Envelope {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub to: Vec<String>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Nothing(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
        OneOrMany::Nothing(()) => Vec::new(),
    })
}

/// A file part of the webhook form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    #[serde(skip_serializing)]
    pub content: Vec<u8>,
}

impl Attachment {
    pub fn new(name: String, mime_type: String, content: Vec<u8>) -> Self {
        Self {
            name,
            mime_type,
            size_bytes: content.len() as u64,
            content,
        }
    }

    pub fn is_rfc822(&self) -> bool {
        self.mime_type.eq_ignore_ascii_case(RFC822_MIME_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_absent() {
        let mut payload = InboundEmailPayload::default();
        assert!(payload.set_field("subject", String::new()));
        assert!(payload.subject.is_none());
        assert!(payload.set_field("subject", "Hello".into()));
        assert_eq!(payload.subject.as_deref(), Some("Hello"));
    }

    #[test]
    fn email_and_raw_fields_map_to_embedded_sources() {
        let mut payload = InboundEmailPayload::default();
        payload.set_field("email", "Final-Recipient: rfc822; a@x.com\n".into());
        payload.set_field("raw", "---------- Forwarded message ----------\n".into());
        assert!(payload.embedded_message.is_some());
        assert!(payload.raw_forwarded_block.is_some());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut payload = InboundEmailPayload::default();
        assert!(!payload.set_field("attachment-info", "{}".into()));
        assert_eq!(payload, InboundEmailPayload::default());
    }

    #[test]
    fn envelope_accepts_list_or_single_recipient() {
        let mut payload = InboundEmailPayload::default();
        payload.set_field("envelope", r#"{"to":["a@x.com","b@x.com"],"from":"c@y.com"}"#.into());
        let envelope = payload.envelope.clone().unwrap();
        assert_eq!(envelope.to, vec!["a@x.com", "b@x.com"]);
        assert_eq!(envelope.from.as_deref(), Some("c@y.com"));

        payload.set_field("envelope", r#"{"to":"a@x.com"}"#.into());
        assert_eq!(payload.envelope.unwrap().to, vec!["a@x.com"]);
    }

    #[test]
    fn broken_envelope_is_kept_raw() {
        let mut payload = InboundEmailPayload::default();
        payload.set_field("envelope", "not json".into());
        assert!(payload.envelope.is_none());
        assert_eq!(payload.raw_envelope.as_deref(), Some("not json"));
    }

    #[test]
    fn attachment_size_follows_content() {
        let attachment = Attachment::new("a.eml".into(), "Message/RFC822".into(), b"abc".to_vec());
        assert_eq!(attachment.size_bytes, 3);
        assert!(attachment.is_rfc822());
    }
}
