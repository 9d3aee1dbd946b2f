use std::sync::Arc;

use influx_log_sink::config::WriterConfig;
use influx_log_sink::report::TracingReporter;
use influx_log_sink::writer::PointWriter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = WriterConfig {
        host: "http://127.0.0.1:8086".to_string(),
        token: "dev-token".to_string(),
        org: "dev".to_string(),
        bucket: "logs".to_string(),
        measurement: "req".to_string(),
        tags: [
            ("env".to_string(), "dev".to_string()),
            ("status".to_string(), "{status}".to_string()),
        ]
        .into_iter()
        .collect(),
    };

    let writer = PointWriter::open(config, Arc::new(TracingReporter)).expect("start writer");

    writer.write(br#"{"status":200,"meta":{"path":"/index.html"},"duration":0.013}"#);
    writer.write(b"2023-05-01T10:00:00Z\t404\thttp.log.access\trequest\t{\"status\":404,\"uri\":\"/missing\"}");
    writer.write(b"definitely not json");

    writer.close().await;
    tracing::info!("all points flushed");
}
