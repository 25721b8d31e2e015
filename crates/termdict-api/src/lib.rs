//! WebApi: `Definer` backed by the free dictionary web service
//! (dictionaryapi.dev).
//!
//! `GET {base_url}/api/v2/entries/en/{word}` returns a JSON array of entries.
//! Only the first entry is used; each of its meanings contributes one
//! `Definition` per listed sense, in response order.

use std::time::{Duration, Instant};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use termdict_core::{normalize, DictError, Definer, Definition, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.dictionaryapi.dev";
pub const DEFAULT_ENDPOINT: &str = "/api/v2/entries/en/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Characters left unescaped in the word path segment.
const SEGMENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'\'');

// ─── API Types ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ApiEntry {
    #[serde(default)]
    meanings: Vec<ApiMeaning>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiMeaning {
    #[serde(default)]
    part_of_speech: String,
    #[serde(default)]
    definitions: Vec<ApiDefinition>,
}

#[derive(Deserialize)]
struct ApiDefinition {
    definition: String,
}

// ─── WebApi ───────────────────────────────────────────────────────

/// HTTP client for the dictionary service.
pub struct WebApi {
    /// API base URL (e.g., "https://api.dictionaryapi.dev").
    base_url: String,
    /// Path the word is appended to.
    endpoint: String,
    agent: ureq::Agent,
}

impl WebApi {
    /// Create a client for `base_url` whose requests give up after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self::with_endpoint(base_url, DEFAULT_ENDPOINT, timeout)
    }

    pub fn with_endpoint(base_url: &str, endpoint: &str, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoint: endpoint.to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for a (normalized) word.
    pub fn url_for(&self, word: &str) -> String {
        format!("{}{}{}", self.base_url, self.endpoint, encode_segment(word))
    }

    fn query(&self, word: &str) -> Result<String> {
        let url = self.url_for(word);
        let start = Instant::now();

        let mut resp = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()
            .map_err(|e| transport_error(word, e))?;

        let status = resp.status().as_u16();
        tracing::debug!(word, status, elapsed_ms = start.elapsed().as_millis() as u64, "dictionary api response");

        if status == 404 {
            return Err(DictError::not_found(word));
        }
        if !(200..300).contains(&status) {
            return Err(DictError::Unavailable {
                word: word.to_string(),
                reason: format!("unexpected HTTP status {}", status),
            });
        }

        resp.body_mut()
            .read_to_string()
            .map_err(|e| transport_error(word, e))
    }
}

impl Default for WebApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }
}

impl Definer for WebApi {
    fn define(&self, word: &str) -> Result<Vec<Definition>> {
        let word = normalize(word);
        if word.is_empty() {
            return Err(DictError::InvalidInput("word is blank".to_string()));
        }
        let body = self.query(&word)?;
        parse_definitions(&word, &body)
    }
}

// ─── Response parsing ─────────────────────────────────────────────

/// Turn a response body into definitions.
///
/// A JSON object (the service's "No Definitions Found" payload), an empty
/// array, or a first entry without senses all mean the word is unknown.
/// Anything that is not valid JSON of the expected shape means the source
/// misbehaved.
pub fn parse_definitions(word: &str, body: &str) -> Result<Vec<Definition>> {
    let unavailable = |reason: String| DictError::Unavailable {
        word: word.to_string(),
        reason,
    };

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| unavailable(format!("malformed response: {}", e)))?;

    let first = match value {
        serde_json::Value::Object(_) => return Err(DictError::not_found(word)),
        serde_json::Value::Array(mut entries) => {
            if entries.is_empty() {
                return Err(DictError::not_found(word));
            }
            entries.swap_remove(0)
        }
        other => {
            return Err(unavailable(format!(
                "unexpected response shape: {}",
                json_type(&other)
            )))
        }
    };

    let entry: ApiEntry = serde_json::from_value(first)
        .map_err(|e| unavailable(format!("malformed entry: {}", e)))?;

    let defs: Vec<Definition> = entry
        .meanings
        .into_iter()
        .flat_map(|meaning| {
            let pos = meaning.part_of_speech;
            meaning
                .definitions
                .into_iter()
                .map(move |d| Definition::new(pos.clone(), d.definition))
        })
        .collect();

    if defs.is_empty() {
        return Err(DictError::not_found(word));
    }
    Ok(defs)
}

// ─── Helpers ──────────────────────────────────────────────────────

fn transport_error(word: &str, err: ureq::Error) -> DictError {
    match err {
        ureq::Error::Timeout(t) => DictError::Cancelled {
            reason: format!("request for '{}' timed out ({:?})", word, t),
        },
        ureq::Error::Io(ref io) if io.kind() == std::io::ErrorKind::TimedOut => {
            DictError::Cancelled {
                reason: format!("request for '{}' timed out", word),
            }
        }
        other => DictError::Unavailable {
            word: word.to_string(),
            reason: other.to_string(),
        },
    }
}

/// Percent-encode a word for use as a single URL path segment.
fn encode_segment(word: &str) -> String {
    utf8_percent_encode(word, SEGMENT_SET).to_string()
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
