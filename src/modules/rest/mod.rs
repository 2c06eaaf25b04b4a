// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;
use std::time::Duration;

use crate::modules::common::error::ErrorCapture;
use crate::modules::common::limit::BodyLimit;
use crate::modules::common::log::Tracing;
use crate::modules::context::AppState;
use crate::modules::delivery::MailSender;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::handler::error_handler;
use crate::modules::error::RelayResult;
use crate::modules::settings::cli::Settings;
use crate::modules::utils::shutdown::shutdown_signal;
use crate::raise_error;
use inbound::InboundEndpoint;
use poem::listener::TcpListener;
use poem::middleware::{CatchPanic, Compression};
use poem::{get, handler, post, Endpoint, EndpointExt, Route, Server};
use tracing::info;

pub mod inbound;

pub const HEALTH_MESSAGE: &str = "SendGrid Inbound Parse Webhook Server is running";

#[handler]
pub async fn health() -> &'static str {
    HEALTH_MESSAGE
}

pub fn create_routes<S: MailSender>(state: Arc<AppState<S>>, settings: &Settings) -> impl Endpoint {
    Route::new()
        .at("/", get(health))
        .at(
            "/inbound",
            post(InboundEndpoint::new(state, settings.relay_max_body_size)),
        )
        .with(BodyLimit::new(settings.relay_max_body_size))
        .with(ErrorCapture)
        .with(Tracing)
        .with_if(settings.relay_http_compression_enabled, Compression::new())
        .with(CatchPanic::new())
        .catch_all_error(error_handler)
}

pub async fn start_http_server<S: MailSender>(
    state: Arc<AppState<S>>,
    settings: &Settings,
) -> RelayResult<()> {
    let listener = TcpListener::bind((settings.relay_bind_ip.clone(), settings.port));
    let server = Server::new(listener)
        .name("Inbound Relay Webhook Service")
        .idle_timeout(Duration::from_secs(60))
        .run_with_graceful_shutdown(
            create_routes(state, settings),
            shutdown_signal(),
            Some(Duration::from_secs(5)),
        );
    info!(
        "Server listening on {}:{}, webhook endpoint: POST /inbound",
        settings.relay_bind_ip, settings.port
    );
    server
        .await
        .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))
}
