pub mod config;
pub mod flatten;
pub mod point;
pub mod record;
pub mod report;
pub mod sink;
pub mod tags;
pub mod writer;

#[cfg(feature = "influx")]
pub mod influx;
