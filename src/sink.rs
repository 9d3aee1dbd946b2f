use crate::point::Point;
use async_trait::async_trait;
use std::error::Error;

/// Transport-level sink error. Delivery failures are the sink's own concern;
/// the writer logs them and moves on, it never retries or fails a record.
pub type SinkError = Box<dyn Error + Send + Sync>;

/// Asynchronous destination for [`Point`]s produced by the forwarding
/// pipeline.
///
/// Implementations transport points to a concrete backend (InfluxDB, a test
/// capture buffer, /dev/null). The writer calls these from a background task
/// and never awaits them on the host's log-emission path.
#[async_trait]
pub trait PointSink: Send + Sync {
    /// Establish whatever readiness the backend needs before the first
    /// write. Called exactly once by the writer's background task, before
    /// any `send`. Default is a no-op for connectionless backends.
    async fn open(&self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Deliver a single point to the backend.
    async fn send(&self, point: &Point) -> Result<(), SinkError>;

    /// Deliver a batch of points. The default loops over [`send`]; backends
    /// with a bulk write API should override it.
    ///
    /// [`send`]: PointSink::send
    async fn send_batch(&self, points: &[Point]) -> Result<(), SinkError> {
        for point in points {
            self.send(point).await?;
        }
        Ok(())
    }

    /// Flush any buffering the backend does internally. Default no-op.
    async fn flush(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// A sink that simply drops all points.
///
/// Useful for measuring the overhead of the pipeline itself without any
/// external I/O, and for unit tests that don't care about delivery.
#[derive(Clone, Default)]
pub struct NoopSink;

#[async_trait]
impl PointSink for NoopSink {
    async fn send(&self, _point: &Point) -> Result<(), SinkError> {
        Ok(())
    }
}
