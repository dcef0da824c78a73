//! Azure Speech backend
//!
//! Talks to the speech service REST endpoint with a blocking HTTP client.
//! One request per clip: POST the SSML, stream the RIFF body to disk.
//!
//! Authentication is either a resource key or an Entra ID token of the
//! form `aad#<resource id>#<access token>` (see `config::env`).

use crate::config::{Credentials, SpeechAuth};
use crate::speech::{SynthesisError, Synthesizer};
use crate::{GeneratorError, Result};
use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use std::fs::{self, File};
use std::io::{self, Write};
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";
const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const SSML_CONTENT_TYPE: &str = "application/ssml+xml";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Synthesis endpoint for a service region
pub fn endpoint_for_region(region: &str) -> String {
    format!(
        "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
        region.trim().to_lowercase()
    )
}

/// Name a failed response the way the service's cancellation codes do
pub fn cancellation_reason(status: StatusCode) -> &'static str {
    match status {
        StatusCode::BAD_REQUEST => "BadRequest",
        StatusCode::UNAUTHORIZED => "AuthenticationFailure",
        StatusCode::FORBIDDEN => "Forbidden",
        StatusCode::TOO_MANY_REQUESTS => "TooManyRequests",
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => "ServiceTimeout",
        s if s.is_server_error() => "ServiceError",
        _ => "RuntimeError",
    }
}

/// Speech synthesizer backed by the Azure Speech REST API
pub struct AzureSynthesizer {
    client: Client,
    endpoint: String,
    auth: SpeechAuth,

    /// Audio format requested from the service
    output_format: String,
}

impl AzureSynthesizer {
    /// Create a synthesizer for the credentials' region
    pub fn new(credentials: &Credentials, output_format: &str) -> Result<Self> {
        let endpoint = endpoint_for_region(&credentials.region);
        Self::with_endpoint(credentials, output_format, &endpoint)
    }

    /// Create a synthesizer that posts to `endpoint` instead of the
    /// region's public one
    pub fn with_endpoint(credentials: &Credentials, output_format: &str, endpoint: &str) -> Result<Self> {
        let url = reqwest::Url::parse(endpoint)
            .map_err(|e| GeneratorError::Http(format!("Invalid endpoint {}: {}", endpoint, e)))?;

        let mut builder = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT);
        if is_loopback(&url) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| GeneratorError::Http(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Azure speech endpoint: {}", endpoint);

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            auth: credentials.auth.clone(),
            output_format: output_format.to_string(),
        })
    }

    /// Send the request and copy the audio body into `part`
    fn request_to(&self, ssml: &str, part: &Path) -> std::result::Result<(), SynthesisError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, SSML_CONTENT_TYPE)
            .header(OUTPUT_FORMAT_HEADER, &self.output_format);

        request = match &self.auth {
            SpeechAuth::SubscriptionKey(key) => request.header(SUBSCRIPTION_KEY_HEADER, key),
            SpeechAuth::AuthorizationToken(token) => {
                request.header(AUTHORIZATION, format!("Bearer {}", token))
            }
        };

        let mut response = request
            .body(ssml.to_string())
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let details = if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                format!("HTTP {}: {}", status, body.trim())
            };
            return Err(SynthesisError::Canceled {
                reason: cancellation_reason(status).to_string(),
                details: Some(details),
            });
        }

        let mut file = File::create(part)?;
        let written = io::copy(&mut response, &mut file)
            .map_err(|e| SynthesisError::Request(format!("failed reading audio body: {}", e)))?;
        file.flush()?;

        if written == 0 {
            return Err(SynthesisError::Canceled {
                reason: "EmptyAudio".to_string(),
                details: Some("service returned no audio data".to_string()),
            });
        }

        debug!("Received {} bytes of audio", written);
        Ok(())
    }
}

impl Synthesizer for AzureSynthesizer {
    fn synthesize_to_file(&mut self, ssml: &str, dest: &Path) -> std::result::Result<(), SynthesisError> {
        let part = dest.with_extension("part");

        let result = self
            .request_to(ssml, &part)
            .and_then(|()| fs::rename(&part, dest).map_err(SynthesisError::from));

        if result.is_err() {
            if let Err(e) = fs::remove_file(&part) {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to remove partial audio {}: {}", part.display(), e);
                }
            }
        }

        result
    }
}

fn is_loopback(url: &reqwest::Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map_or(false, |ip| ip.is_loopback()),
        None => false,
    }
}

fn transport_error(e: reqwest::Error) -> SynthesisError {
    if e.is_timeout() {
        SynthesisError::Canceled {
            reason: "ServiceTimeout".to_string(),
            details: Some(e.to_string()),
        }
    } else if e.is_connect() {
        SynthesisError::Canceled {
            reason: "ConnectionFailure".to_string(),
            details: Some(e.to_string()),
        }
    } else {
        SynthesisError::Request(e.to_string())
    }
}
