//! Shared types and pure logic for threat-feed ingestion.
//!
//! Holds the error type, record models, the line tokenizer, the duration
//! codec, connection-credential checks and CLI settings.

pub mod credentials;
pub mod duration;
pub mod error;
pub mod models;
pub mod settings;
pub mod tokenizer;

pub use error::{Result, ThreatError};
