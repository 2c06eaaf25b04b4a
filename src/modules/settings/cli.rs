// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use clap::{builder::ValueParser, Parser};
use std::{path::PathBuf, sync::LazyLock};

#[cfg(not(test))]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::parse);

#[cfg(test)]
pub static SETTINGS: LazyLock<Settings> = LazyLock::new(Settings::new_for_test);

#[derive(Debug, Parser)]
#[clap(
    name = "inbound-relay",
    about = "Receives SendGrid Inbound Parse webhooks, resolves the real subject of each email
    (including bounced and forwarded mail), classifies it by keyword and forwards it to the matching address.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Settings {
    /// Log level (default: "info")
    #[clap(
        long,
        default_value = "info",
        env,
        help = "Set the log level for inbound-relay"
    )]
    pub relay_log_level: String,

    /// Enable ANSI logs (default: true)
    #[clap(long, default_value = "true", env, help = "Enable ANSI formatted logs")]
    pub relay_ansi_logs: bool,

    /// Enable JSON logs (default: false)
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable JSON formatted logs"
    )]
    pub relay_json_logs: bool,

    /// Enable log file output (default: false)
    /// If false, logs will be printed to stdout
    #[clap(
        long,
        default_value = "false",
        env,
        help = "Enable log file output (otherwise logs go to stdout)"
    )]
    pub relay_log_to_file: bool,

    #[clap(
        long,
        default_value = "logs",
        env,
        help = "Directory for server log files when file logging is enabled"
    )]
    pub relay_log_dir: PathBuf,

    /// Maximum number of log files (default: 5)
    #[clap(
        long,
        default_value = "5",
        env,
        help = "Set the maximum number of server log files"
    )]
    pub relay_max_server_log_files: usize,

    /// The IP address that the server binds to, in IPv4 format (e.g., 192.168.1.1).
    #[clap(
        long,
        env,
        default_value = "0.0.0.0",
        help = "The IP address that the server binds to, in IPv4 format",
        value_parser = ValueParser::new(|s: &str| {
            if s.parse::<std::net::Ipv4Addr>().is_err() {
                return Err("The bind IP address must be a valid IPv4 address.".to_string());
            }
            Ok(s.to_string())
        })
    )]
    pub relay_bind_ip: String,

    /// HTTP port (default: 3011)
    #[clap(long, default_value = "3011", env, help = "Set the HTTP port")]
    pub port: u16,

    #[clap(
        long,
        default_value = "52428800",
        env,
        help = "Maximum accepted webhook body size in bytes",
        value_parser = clap::value_parser!(u64).range(1024..)
    )]
    pub relay_max_body_size: u64,

    #[clap(
        long,
        default_value = "true",
        env,
        help = "Enable response compression for the HTTP server"
    )]
    pub relay_http_compression_enabled: bool,

    /// SendGrid API key. When absent, inbound mail is processed and logged but not forwarded.
    #[clap(long, env, help = "SendGrid API key used to forward classified mail")]
    pub sendgrid_api_key: Option<String>,

    #[clap(
        long,
        env,
        default_value = "https://api.sendgrid.com",
        help = "Base URL of the SendGrid API",
        value_parser = ValueParser::new(validate_http_url)
    )]
    pub sendgrid_api_url: String,

    #[clap(
        long,
        env,
        default_value = "support@halapolo.com",
        help = "Sender address used for forwarded mail"
    )]
    pub forward_sender: String,

    #[clap(
        long,
        env,
        default_value = "halapolo3286@gmail.com",
        help = "Destination for mail that matches no category"
    )]
    pub forward_email_default: String,

    #[clap(long, env, help = "Destination override for TYPE_A mail")]
    pub forward_email_type_a: Option<String>,

    #[clap(long, env, help = "Destination override for TYPE_B mail")]
    pub forward_email_type_b: Option<String>,

    #[clap(long, env, help = "Destination override for TYPE_C mail")]
    pub forward_email_type_c: Option<String>,

    #[clap(long, env, help = "Comma-separated subject keywords for TYPE_A")]
    pub subject_keywords_type_a: Option<String>,

    #[clap(long, env, help = "Comma-separated subject keywords for TYPE_B")]
    pub subject_keywords_type_b: Option<String>,

    #[clap(long, env, help = "Comma-separated subject keywords for TYPE_C")]
    pub subject_keywords_type_c: Option<String>,
}

fn validate_http_url(s: &str) -> Result<String, String> {
    let trimmed = s.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(format!("Invalid URL, expected http(s)://...: {}", s));
    }
    Ok(trimmed.to_string())
}

impl Settings {
    #[cfg(test)]
    pub fn new_for_test() -> Self {
        Self {
            relay_log_level: "info".to_string(),
            relay_ansi_logs: false,
            relay_json_logs: false,
            relay_log_to_file: false,
            relay_log_dir: PathBuf::from("logs"),
            relay_max_server_log_files: 5,
            relay_bind_ip: "127.0.0.1".to_string(),
            port: 3011,
            relay_max_body_size: 52_428_800,
            relay_http_compression_enabled: false,
            sendgrid_api_key: None,
            sendgrid_api_url: "https://api.sendgrid.com".to_string(),
            forward_sender: "support@example.com".to_string(),
            forward_email_default: "default@example.com".to_string(),
            forward_email_type_a: Some("billing@example.com".to_string()),
            forward_email_type_b: Some("support@example.com".to_string()),
            forward_email_type_c: Some("bounces@example.com".to_string()),
            subject_keywords_type_a: Some("invoice, payment".to_string()),
            subject_keywords_type_b: Some("support,inquiry".to_string()),
            subject_keywords_type_c: Some("delivery failure,bounce".to_string()),
        }
    }
}
