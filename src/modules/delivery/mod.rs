// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::future::Future;

use sendgrid::SendGridClient;
use tracing::{info, warn};

use crate::modules::error::RelayResult;
use crate::modules::forward::ForwardPayload;
use crate::modules::settings::cli::Settings;

pub mod sendgrid;

/// Delivers a forward payload to the outside world.
pub trait MailSender: Send + Sync + 'static {
    fn send(&self, payload: &ForwardPayload) -> impl Future<Output = RelayResult<()>> + Send;
}

pub enum Forwarder {
    SendGrid(SendGridClient),
    /// No API key configured: mail is processed and logged but not sent.
    Disabled,
}

impl Forwarder {
    pub fn from_settings(settings: &Settings) -> RelayResult<Self> {
        match settings
            .sendgrid_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
        {
            Some(api_key) => {
                let client = SendGridClient::new(api_key, &settings.sendgrid_api_url)?;
                info!(endpoint = client.endpoint(), "SendGrid API initialized");
                Ok(Forwarder::SendGrid(client))
            }
            None => {
                warn!("SENDGRID_API_KEY not configured, inbound mail will not be forwarded");
                Ok(Forwarder::Disabled)
            }
        }
    }
}

impl MailSender for Forwarder {
    async fn send(&self, payload: &ForwardPayload) -> RelayResult<()> {
        match self {
            Forwarder::SendGrid(client) => client.send(payload).await,
            Forwarder::Disabled => {
                info!(
                    forward_to = %payload.destination,
                    "Skipping email forwarding - SENDGRID_API_KEY not configured"
                );
                Ok(())
            }
        }
    }
}
