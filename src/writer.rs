use crate::config::{ConfigError, WriterConfig};
use crate::flatten;
use crate::point::Point;
use crate::record;
use crate::report::{ErrorReporter, ForwardError};
use crate::sink::PointSink;
use crate::tags;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

/// Buffering knobs for the background write path.
///
/// **Fields**
/// - `channel_buffer`: maximum queued [`Point`]s before new ones are dropped.
/// - `batch_size`: points per delivery to the sink.
/// - `flush_interval`: maximum time a partial batch waits before delivery.
#[derive(Clone, Debug)]
pub struct BufferConfig {
    pub channel_buffer: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 1024,
            batch_size: 128,
            flush_interval: Duration::from_secs(1),
        }
    }
}

/// Forwards raw log lines to a [`PointSink`] as timestamped points.
///
/// Each `write` runs the full pipeline on the caller's thread (parse the
/// record, flatten its attributes, resolve the configured tags, stamp a
/// point) and hands the result to a bounded channel. A background task owns
/// the sink: it opens it once, batches points, and delivers them. Network
/// I/O never touches the host's log-emission path, and `write` never fails
/// the record.
///
/// The channel doubles as the open-race gate: points written before the
/// sink's `open` completes simply queue until the task starts consuming.
/// `write` is safe from multiple concurrent log-emitting paths.
pub struct PointWriter {
    sender: mpsc::Sender<Point>,
    handle: JoinHandle<()>,
    measurement: String,
    tag_templates: BTreeMap<String, String>,
    reporter: Arc<dyn ErrorReporter>,
    /// Raw records seen, before any parsing.
    pub total_records: Arc<AtomicU64>,
    /// Points accepted into the write queue.
    pub enqueued_points: Arc<AtomicU64>,
    /// Points dropped because the queue was full.
    pub dropped_points: Arc<AtomicU64>,
}

impl PointWriter {
    /// Validate `config` and start a writer backed by the InfluxDB sink.
    #[cfg(feature = "influx")]
    pub fn open(
        config: WriterConfig,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self, ConfigError> {
        let sink = Arc::new(crate::influx::InfluxSink::new(
            crate::influx::InfluxConfig::from(&config),
        ));
        Self::with_sink(config, sink, reporter, BufferConfig::default())
    }

    /// Start a writer over an explicit sink. Entry point for tests and for
    /// hosts that bring their own backend.
    pub fn with_sink(
        config: WriterConfig,
        sink: Arc<dyn PointSink>,
        reporter: Arc<dyn ErrorReporter>,
        buffer: BufferConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        // Enforce minimal thresholds to avoid degenerate configs.
        let channel_buffer = buffer.channel_buffer.max(16);
        let batch_size = buffer.batch_size.max(1);
        let flush_interval = buffer.flush_interval.max(Duration::from_millis(10));

        let (sender, mut receiver) = mpsc::channel::<Point>(channel_buffer);

        let handle = tokio::spawn(async move {
            // Open completes before any point is consumed, so early writes
            // wait in the channel rather than race an uninitialized sink.
            if let Err(error) = sink.open().await {
                tracing::warn!(error = %error, "point sink open failed, continuing anyway");
            }

            let mut batch = Vec::with_capacity(batch_size);
            // The ticker lives outside the loop so incoming points cannot
            // re-arm it; a partial batch waits at most one flush interval
            // even under steady traffic.
            let mut ticker = interval(flush_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    received = receiver.recv() => match received {
                        Some(point) => {
                            batch.push(point);
                            if batch.len() >= batch_size {
                                deliver(&*sink, &mut batch).await;
                                ticker.reset();
                            }
                        }
                        // Channel closed and drained: the writer was closed.
                        None => break,
                    },
                    _ = ticker.tick() => {
                        if !batch.is_empty() {
                            deliver(&*sink, &mut batch).await;
                        }
                    }
                }
            }

            if !batch.is_empty() {
                deliver(&*sink, &mut batch).await;
            }
            if let Err(error) = sink.flush().await {
                tracing::warn!(error = %error, "point sink flush failed on close");
            }
        });

        Ok(Self {
            sender,
            handle,
            measurement: config.measurement,
            tag_templates: config.tags,
            reporter,
            total_records: Arc::new(AtomicU64::new(0)),
            enqueued_points: Arc::new(AtomicU64::new(0)),
            dropped_points: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Transform one raw log line into a point and enqueue it.
    ///
    /// Never fails the record: malformed attribute JSON degrades to an empty
    /// field set, a full queue drops the point, and both are reported on the
    /// error channel.
    pub fn write(&self, raw: &[u8]) {
        self.total_records.fetch_add(1, Ordering::Relaxed);

        let attributes = match record::parse_attributes(raw) {
            Ok(map) => map,
            Err(error) => {
                self.reporter.report(&ForwardError::Parse(error));
                serde_json::Map::new()
            }
        };

        let fields = flatten::flatten(&attributes);
        let resolved = tags::resolve(&self.tag_templates, &fields, self.reporter.as_ref());
        let point = Point::now(self.measurement.clone(), resolved, fields);

        match self.sender.try_send(point) {
            Ok(()) => {
                self.enqueued_points.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.dropped_points.fetch_add(1, Ordering::Relaxed);
                self.reporter.report(&ForwardError::QueueFull);
            }
        }
    }

    /// Drain the queue, flush the sink, and release it.
    ///
    /// Waits for the background task, so everything enqueued before the call
    /// is delivered first. Safe to call while `open` is still in flight: the
    /// task finishes opening, drains, then exits without deadlocking.
    pub async fn close(self) {
        drop(self.sender);
        if let Err(error) = self.handle.await {
            tracing::warn!(error = %error, "writer task failed during close");
        }
    }
}

async fn deliver(sink: &dyn PointSink, batch: &mut Vec<Point>) {
    // Delivery failures are the destination's concern; this core never
    // retries and never blocks the log path on them.
    if let Err(error) = sink.send_batch(batch).await {
        tracing::error!(
            error = %error,
            points = batch.len(),
            "point delivery failed, dropping batch"
        );
    }
    batch.clear();
}
