// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use crate::modules::delivery::{Forwarder, MailSender};
use crate::modules::error::RelayResult;
use crate::modules::inbound::processor::InboundProcessor;
use crate::modules::routing::RoutingConfig;
use crate::modules::settings::cli::Settings;

/// Process-wide, read-only state shared by every request.
pub struct AppState<S> {
    pub processor: InboundProcessor,
    pub sender: S,
}

impl<S: MailSender> AppState<S> {
    pub fn new(processor: InboundProcessor, sender: S) -> Arc<Self> {
        Arc::new(Self { processor, sender })
    }
}

impl AppState<Forwarder> {
    /// Builds routing and the outbound client once at startup.
    pub fn from_settings(settings: &Settings) -> RelayResult<Arc<Self>> {
        let routing = RoutingConfig::from_settings(settings);
        let processor = InboundProcessor::new(Arc::new(routing), settings.forward_sender.clone());
        let forwarder = Forwarder::from_settings(settings)?;
        Ok(Self::new(processor, forwarder))
    }
}
