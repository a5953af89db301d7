use std::env;
use std::num::ParseIntError;
use thiserror::Error;

/// Port used for implicit-TLS SMTP when `SMTP_PORT` is not set
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// MIME text subtype used when `TEXT_SUBTYPE` is not set
pub const DEFAULT_TEXT_SUBTYPE: &str = "plain";

/// Booking widget host queried when `WIDGET_BASE_URL` is not set
pub const DEFAULT_WIDGET_BASE_URL: &str = "https://login.smoobu.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid SMTP_PORT {value:?}: {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Everything one run needs, read once from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub log_filepath: String,
    pub target_month: String,
    pub target_year: String,
    pub content: String,
    pub subtype: String,
    pub subject: String,
    pub recipients: Vec<String>,
    pub sender: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub apartment_id: String,
    pub apartment_hash: String,
    pub widget_base_url: String,
}

impl RunConfig {
    /// Load configuration from the process environment, after applying any `.env` file
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine, the variables may come from the scheduler
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// Unset values become empty strings and are left for the component
    /// that uses them to reject. Only an unparsable `SMTP_PORT` fails here.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).unwrap_or_default();

        let smtp_port = match lookup("SMTP_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => DEFAULT_SMTP_PORT,
        };

        Ok(Self {
            log_filepath: get("LOG_FILEPATH"),
            target_month: get("TARGET_MONTH"),
            target_year: get("TARGET_YEAR"),
            content: get("CONTENT"),
            subtype: lookup("TEXT_SUBTYPE").unwrap_or_else(|| DEFAULT_TEXT_SUBTYPE.to_string()),
            subject: get("SUBJECT"),
            recipients: parse_recipients(&get("RECIPIENT")),
            sender: get("SENDER"),
            smtp_host: get("SMTP_HOST"),
            smtp_port,
            smtp_user: get("SMTP_USER"),
            smtp_pass: get("SMTP_PASS"),
            apartment_id: get("APARTMENT"),
            apartment_hash: get("APARTMENT_HASH"),
            widget_base_url: lookup("WIDGET_BASE_URL")
                .unwrap_or_else(|| DEFAULT_WIDGET_BASE_URL.to_string()),
        })
    }
}

/// Split a `"a@x.com, b@x.com"` style list, keeping order
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(", ")
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}
