//! Feed ingestion layer.
//!
//! Reads the threat feed, the activity log and the blacklist line by line,
//! validates each line into a typed record, classifies suspicious activity,
//! correlates threat records against the blacklist and summarises batches.

pub mod activity;
pub mod aggregator;
pub mod blacklist;
pub mod classifier;
pub mod reader;
pub mod threats;

pub use threat_core as core;
