//! Runtime layer for threat-feed ingestion.
//!
//! Wires the ingestion crates to their external collaborators: the relational
//! store, the chart-data sink, and the pipeline that runs a full ingestion pass.

pub mod charts;
pub mod pipeline;
pub mod repository;
pub mod store;

pub use threat_core as core;
pub use threat_data as data;
