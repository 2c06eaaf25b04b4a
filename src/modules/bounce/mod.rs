// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod models;
pub mod parser;


pub use models::BounceDetails;
pub use parser::parse_bounce_report;
