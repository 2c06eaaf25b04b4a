// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use serde::Serialize;

use crate::modules::inbound::Attachment;

pub mod builder;

pub const FORWARD_SUBJECT_PREFIX: &str = "[Forwarded]";
pub const NO_SUBJECT: &str = "No Subject";
pub const ORIGINAL_EMAIL_FILENAME: &str = "original_email.eml";

/// Message handed to the mail-send collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ForwardPayload {
    pub destination: String,
    pub sender: String,
    pub subject_line: String,
    pub html_body: String,
    pub attachments: Vec<OutboundAttachment>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OutboundAttachment {
    pub filename: String,
    pub mime_type: String,
    #[serde(skip_serializing)]
    pub content: Vec<u8>,
}

impl From<&Attachment> for OutboundAttachment {
    fn from(attachment: &Attachment) -> Self {
        Self {
            filename: attachment.name.clone(),
            mime_type: attachment.mime_type.clone(),
            content: attachment.content.clone(),
        }
    }
}
