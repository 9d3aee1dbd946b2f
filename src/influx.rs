use crate::config::WriterConfig;
use crate::point::Point;
use crate::sink::{PointSink, SinkError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Connection settings for [`InfluxSink`].
#[derive(Clone, Debug)]
pub struct InfluxConfig {
    /// Base URL without path or query, e.g. "http://127.0.0.1:8086".
    pub host: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
}

impl From<&WriterConfig> for InfluxConfig {
    fn from(config: &WriterConfig) -> Self {
        InfluxConfig {
            host: config.host.clone(),
            token: config.token.clone(),
            org: config.org.clone(),
            bucket: config.bucket.clone(),
        }
    }
}

/// InfluxDB v2 implementation of [`PointSink`] over the HTTP write API.
///
/// Points are encoded as line protocol and POSTed to
/// `/api/v2/write?org=..&bucket=..&precision=ns`. Batching above single
/// requests is the writer's job; retries and durability are the server's.
#[derive(Clone)]
pub struct InfluxSink {
    client: Client,
    config: InfluxConfig,
}

impl InfluxSink {
    pub fn new(config: InfluxConfig) -> Self {
        let client = Client::new();
        Self { client, config }
    }

    fn write_endpoint(&self) -> String {
        format!(
            "{}/api/v2/write?org={}&bucket={}&precision=ns",
            self.config.host.trim_end_matches('/'),
            urlencoding::encode(&self.config.org),
            urlencoding::encode(&self.config.bucket),
        )
    }

    async fn post_lines(&self, body: String) -> Result<(), SinkError> {
        if body.is_empty() {
            return Ok(());
        }
        let resp = self
            .client
            .post(self.write_endpoint())
            .header("Authorization", format!("Token {}", self.config.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            Err(format!("influx write failed with status {}: {}", status, text).into())
        }
    }
}

#[async_trait]
impl PointSink for InfluxSink {
    async fn open(&self) -> Result<(), SinkError> {
        let url = format!("{}/ping", self.config.host.trim_end_matches('/'));
        let resp = self.client.get(&url).send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(format!("influx ping failed with status {}", resp.status()).into())
        }
    }

    async fn send(&self, point: &Point) -> Result<(), SinkError> {
        self.send_batch(std::slice::from_ref(point)).await
    }

    async fn send_batch(&self, points: &[Point]) -> Result<(), SinkError> {
        let mut body = String::new();
        for point in points {
            match encode_line(point) {
                Some(line) => {
                    body.push_str(&line);
                    body.push('\n');
                }
                None => {
                    // Line protocol needs at least one field.
                    tracing::debug!(
                        measurement = %point.measurement,
                        "skipping point with no fields"
                    );
                }
            }
        }
        self.post_lines(body).await
    }
}

/// Encode one point as an InfluxDB v2 line protocol line:
///
/// ```text
/// measurement,tag1=v1,tag2=v2 field1=v1,field2=v2 timestamp_ns
/// ```
///
/// Returns `None` for a point with no fields, which the protocol cannot
/// express.
pub fn encode_line(point: &Point) -> Option<String> {
    if point.fields.is_empty() {
        return None;
    }

    let mut line = escape_measurement(&point.measurement);

    for (key, value) in &point.tags {
        line.push(',');
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&escape_key(value));
    }

    line.push(' ');
    for (i, (key, value)) in point.fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape_key(key));
        line.push('=');
        line.push_str(&render_field_value(value));
    }

    line.push(' ');
    line.push_str(&point.timestamp_ns().to_string());
    Some(line)
}

/// Render a JSON field value in line protocol form: integers get an `i`
/// suffix, floats and bools are bare, strings are quoted with inner quotes
/// escaped. Arrays, objects and null survive flattening as-is, so they are
/// carried as their JSON text inside a quoted string.
fn render_field_value(value: &Value) -> String {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                format!("{}i", i)
            } else {
                n.to_string()
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::String(s) => quote_string(s),
        other => quote_string(&other.to_string()),
    }
}

fn quote_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Spaces and commas in measurement names must be backslash-escaped.
fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

/// Tag keys, tag values and field keys additionally escape `=`.
fn escape_key(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}
