// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use std::{
    num::NonZeroU32,
    sync::LazyLock,
    time::{Duration, Instant},
};

use governor::{
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::InMemoryState,
    Quota, RateLimiter,
};
use poem::{
    http::header, web::RealIp, Endpoint, FromRequest, IntoResponse, Middleware, Request, Response,
    Result,
};
use tracing::{error, info, warn, Instrument};

pub type GovRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    InMemoryState,
    QuantaClock,
    NoOpMiddleware<QuantaInstant>,
>;

const ACCESS_LOG_BUDGET_PER_SECOND: u32 = 10;

static RATE_LIMITER: LazyLock<LogRateLimiter> = LazyLock::new(LogRateLimiter::new);

/// Caps access log volume. Errors cost less budget than successes, so a burst
/// of webhook traffic cannot hide server failures.
pub struct LogRateLimiter {
    limiter: GovRateLimiter,
}

impl LogRateLimiter {
    pub fn new() -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(ACCESS_LOG_BUDGET_PER_SECOND).unwrap_or(NonZeroU32::MIN),
        );
        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    pub fn should_log(&self, status: u16) -> bool {
        self.limiter.check_n(Self::cost(status)).is_ok_and(|r| r.is_ok())
    }

    fn cost(status: u16) -> NonZeroU32 {
        let cost = match status {
            500_u16.. => 1,
            400_u16..=499_u16 => 3,
            _ => 5,
        };
        NonZeroU32::new(cost).unwrap_or(NonZeroU32::MIN)
    }
}

impl Default for LogRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub struct Tracing;

impl<E: Endpoint> Middleware<E> for Tracing {
    type Output = TracingEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        TracingEndpoint { inner: ep }
    }
}

/// Endpoint for the `Tracing` middleware.
pub struct TracingEndpoint<E> {
    inner: E,
}

impl<E: Endpoint> Endpoint for TracingEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> Result<Self::Output> {
        let remote_addr = RealIp::from_request_without_body(&req)
            .await
            .ok()
            .and_then(|real_ip| real_ip.0)
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| req.remote_addr().to_string());
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok().map(|v| v.to_string()));
        let content_length = req
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok().map(|v| v.to_string()));

        let span = tracing::info_span!(
            "request",
            remote_addr = %remote_addr,
            method = %method,
            path = %path,
            content_type = ?content_type,
            content_length = ?content_length,
        );

        async move {
            let now = Instant::now();
            let res = self.inner.call(req).await;
            let duration = now.elapsed();

            match res {
                Ok(resp) => {
                    let resp = resp.into_response();
                    log_response(resp.status().as_u16(), duration);
                    Ok(resp)
                }
                Err(err) => {
                    log_response(err.status().as_u16(), duration);
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[inline]
fn log_response(status: u16, duration: Duration) {
    if !RATE_LIMITER.should_log(status) {
        return;
    }
    match status {
        500.. => error!(
            status = %status,
            duration = ?duration,
            "request completed with server error"
        ),
        400..=499 => warn!(
            status = %status,
            duration = ?duration,
            "request completed with client error"
        ),
        _ => info!(status = %status, duration = ?duration, "request completed successfully"),
    }
}
