//! Environment and credentials
//!
//! Credentials come from the process environment, optionally seeded from a
//! `.env` file in the working directory. Variables already set in the
//! environment are never replaced by the file.

use crate::platform::install_hint;
use crate::{GeneratorError, Result};
use ini::{Ini, ParseOption};
use log::{debug, info};
use std::fmt;
use std::path::Path;
use std::process::Command;

pub const REGION_VAR: &str = "AZURE_SPEECH_REGION";
pub const KEY_VAR: &str = "AZURE_SPEECH_KEY";
pub const RESOURCE_ID_VAR: &str = "AZURE_SPEECH_RESOURCE_ID";
pub const ACCESS_TOKEN_VAR: &str = "AZURE_ACCESS_TOKEN";

/// Scope requested when fetching an Entra ID token
pub const COGNITIVE_SERVICES_RESOURCE: &str = "https://cognitiveservices.azure.com";

/// Parse `.env` contents into key/value pairs
///
/// Accepts `KEY=VALUE`, `export KEY=VALUE`, quoted values and `#` comments.
/// In an unquoted value, a `#` after whitespace starts a comment; inside
/// quotes it is kept. A leading byte order mark is ignored.
pub fn parse_dotenv(contents: &str) -> Result<Vec<(String, String)>> {
    let contents = contents.strip_prefix('\u{feff}').unwrap_or(contents);
    let opt = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_str_opt(contents, opt)
        .map_err(|e| GeneratorError::Config(format!("Failed to parse .env: {}", e)))?;

    let vars = ini
        .general_section()
        .iter()
        .map(|(key, value)| {
            let key = key.trim();
            let key = key.strip_prefix("export ").unwrap_or(key).trim();
            (key.to_string(), dotenv_value(value).to_string())
        })
        .filter(|(key, _)| !key.is_empty())
        .collect();

    Ok(vars)
}

/// Quoted values end at the closing quote; bare ones at an inline comment
fn dotenv_value(raw: &str) -> &str {
    let raw = raw.trim();
    for quote in ['"', '\''] {
        if let Some(rest) = raw.strip_prefix(quote) {
            if let Some(end) = rest.find(quote) {
                return &rest[..end];
            }
        }
    }

    let comment = raw
        .char_indices()
        .find(|&(i, c)| c == '#' && raw[..i].ends_with(char::is_whitespace));
    match comment {
        Some((i, _)) => raw[..i].trim_end(),
        None => raw,
    }
}

/// Load a `.env` file into the process environment
///
/// Returns the number of variables set. A missing file is not an error.
pub fn load_dotenv(path: &Path) -> Result<usize> {
    if !path.exists() {
        debug!("No .env file at {:?}", path);
        return Ok(0);
    }

    let contents = std::fs::read_to_string(path)?;
    let mut applied = 0;
    for (key, value) in parse_dotenv(&contents)? {
        if std::env::var_os(&key).is_some() {
            debug!("{} already set, ignoring .env value", key);
            continue;
        }
        std::env::set_var(&key, value);
        applied += 1;
    }

    info!("Loaded {} variables from {}", applied, path.display());
    Ok(applied)
}

/// How requests to the speech service authenticate
#[derive(Clone, PartialEq, Eq)]
pub enum SpeechAuth {
    /// Resource key, sent as Ocp-Apim-Subscription-Key
    SubscriptionKey(String),
    /// `aad#<resource id>#<token>`, sent as a bearer token
    AuthorizationToken(String),
}

impl fmt::Debug for SpeechAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechAuth::SubscriptionKey(_) => f.write_str("SubscriptionKey(<redacted>)"),
            SpeechAuth::AuthorizationToken(_) => f.write_str("AuthorizationToken(<redacted>)"),
        }
    }
}

/// Region and authentication for the speech service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub region: String,
    pub auth: SpeechAuth,
}

impl Credentials {
    /// Read credentials from the process environment
    ///
    /// Falls back to the Azure CLI for an access token when only a resource
    /// id is configured.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok(), fetch_cli_token)
    }

    /// Resolve credentials from an arbitrary variable source
    pub fn from_lookup<L, F>(lookup: L, fetch_token: F) -> Result<Self>
    where
        L: Fn(&str) -> Option<String>,
        F: FnOnce() -> Result<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let region = get(REGION_VAR).ok_or(GeneratorError::MissingEnv(REGION_VAR))?;

        if let Some(key) = get(KEY_VAR) {
            debug!("Using subscription key authentication");
            return Ok(Self {
                region,
                auth: SpeechAuth::SubscriptionKey(key),
            });
        }

        let resource_id = get(RESOURCE_ID_VAR).ok_or(GeneratorError::MissingEnv(RESOURCE_ID_VAR))?;
        let token = match get(ACCESS_TOKEN_VAR) {
            Some(token) => token,
            None => fetch_token()?,
        };

        debug!("Using Entra ID token authentication");
        Ok(Self {
            region,
            auth: SpeechAuth::AuthorizationToken(format!("aad#{}#{}", resource_id, token)),
        })
    }
}

/// Ask the Azure CLI for a Cognitive Services access token
fn fetch_cli_token() -> Result<String> {
    debug!("Requesting access token from Azure CLI");
    let output = Command::new("az")
        .args([
            "account",
            "get-access-token",
            "--resource",
            COGNITIVE_SERVICES_RESOURCE,
            "--query",
            "accessToken",
            "--output",
            "tsv",
        ])
        .output()
        .map_err(|e| {
            GeneratorError::Credential(format!(
                "could not run Azure CLI ({}). Set {} or {}, or install it: {}",
                e,
                ACCESS_TOKEN_VAR,
                KEY_VAR,
                install_hint("azure-cli")
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GeneratorError::Credential(format!(
            "az account get-access-token failed (try `az login`): {}",
            stderr.trim()
        )));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(GeneratorError::Credential(
            "Azure CLI returned an empty access token".to_string(),
        ));
    }

    Ok(token)
}
