//! Configuration module for the ERP backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// Tenant used when a request carries no `x-tenant-id` header
    pub default_tenant: String,
    /// Name shown on the root node of generated organization charts
    pub company_name: String,
    /// Lifetime of a freshly issued invitation
    pub invitation_ttl_hours: i64,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let db_path = env::var("ERP_DB_PATH")
            .unwrap_or_else(|_| "./data/erp.sqlite".to_string())
            .into();

        let bind_addr = env::var("ERP_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| format!("Invalid ERP_BIND_ADDR format: {}", e))?;

        let log_level = env::var("ERP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = match env::var("ERP_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("text") | Err(_) => LogFormat::Text,
            Ok(other) => return Err(format!("Invalid ERP_LOG_FORMAT: {}", other)),
        };

        let default_tenant =
            env::var("ERP_DEFAULT_TENANT").unwrap_or_else(|_| "default".to_string());

        let company_name = env::var("ERP_COMPANY_NAME").unwrap_or_else(|_| "Company".to_string());

        let invitation_ttl_hours = parse_positive("ERP_INVITATION_TTL_HOURS", 168)?;
        let default_page_size = parse_positive("ERP_DEFAULT_PAGE_SIZE", 50)?;
        let max_page_size = parse_positive("ERP_MAX_PAGE_SIZE", 200)?;

        if default_page_size > max_page_size {
            return Err("ERP_DEFAULT_PAGE_SIZE must not exceed ERP_MAX_PAGE_SIZE".to_string());
        }

        Ok(Self {
            db_path,
            bind_addr,
            log_level,
            log_format,
            default_tenant,
            company_name,
            invitation_ttl_hours,
            default_page_size,
            max_page_size,
        })
    }
}

fn parse_positive(key: &str, default: i64) -> Result<i64, String> {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<i64>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(format!("Invalid {}: expected a positive integer", key)),
        },
        Err(_) => Ok(default),
    }
}
