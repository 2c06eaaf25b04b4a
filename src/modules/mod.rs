// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod bounce;
pub mod common;
pub mod context;
pub mod delivery;
pub mod error;
pub mod forward;
pub mod inbound;
pub mod logger;
pub mod rest;
pub mod routing;
pub mod settings;
pub mod subject;
pub mod utils;
