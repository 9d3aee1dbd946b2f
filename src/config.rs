use serde::Deserialize;
use std::collections::BTreeMap;

/// Destination settings for a single log writer, supplied by the host once at
/// startup and immutable afterwards.
///
/// The host hands this over in structured form; `Deserialize` covers config
/// files and JSON blocks alike. `tags` maps a tag name to a template string:
/// either a literal value, or a `{field_name}` reference resolved against the
/// flattened record fields at write time (see [`crate::tags`]).
#[derive(Debug, Clone, Deserialize)]
pub struct WriterConfig {
    /// Base URL of the destination, e.g. "http://127.0.0.1:8086".
    pub host: String,
    /// API token. Secret; never logged by this crate.
    pub token: String,
    pub org: String,
    pub bucket: String,
    /// Measurement every forwarded point is written under.
    pub measurement: String,
    /// Tag templates. Absent in config means no tags.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

/// Error raised when a required setting is missing at load time.
///
/// Fatal: a writer is never provisioned from an invalid config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    MissingField(&'static str),
}

impl WriterConfig {
    /// Check that every required setting is non-empty, reporting the first
    /// missing one. An absent tag map is not an error; it defaults to empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::MissingField("host"));
        }
        if self.token.is_empty() {
            return Err(ConfigError::MissingField("token"));
        }
        if self.org.is_empty() {
            return Err(ConfigError::MissingField("org"));
        }
        if self.bucket.is_empty() {
            return Err(ConfigError::MissingField("bucket"));
        }
        if self.measurement.is_empty() {
            return Err(ConfigError::MissingField("measurement"));
        }
        Ok(())
    }
}
