//! HTTP surface exposing the radar pipeline.

mod api;

pub use api::{radar_router, serve, AnalyzeRequest};
