use serde::{Deserialize, Serialize};

/// Delivery failure information recovered from a bounced message.
///
/// Only built when the embedded message carries a failure signal
/// (`Action: failed` block or `Final-Recipient:` line).
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct BounceDetails {
    /// Address the reporting MTA failed to deliver to.
    pub failed_recipient: Option<String>,
    /// DSN status code, e.g. `5.1.1`.
    pub status: Option<String>,
    /// Diagnostic text with its leading SMTP reply code removed.
    pub reason: Option<String>,
    /// Headers of the original (bounced) message.
    pub original_from: Option<String>,
    pub original_to: Option<String>,
    pub original_subject: Option<String>,
    pub original_date: Option<String>,
    /// Trimmed text/plain body of the original message.
    pub original_body: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FailureBlock {
    pub status: String,
    pub reason: Option<String>,
}
