//! The Veille scan pipeline.
//!
//! A schedule firing creates a scan ([`scheduler`], [`runner`]); the scan is
//! fetched from the news service ([`ingestor`]); each stored result is
//! classified ([`classifier`], [`evaluator`]); new high-severity alerts are
//! emailed ([`notifier`]). Stages are chained over the event bus by
//! [`consumers`]. Reports are compiled on demand ([`report`]).

pub mod classifier;
pub mod config;
pub mod consumers;
pub mod error;
pub mod evaluator;
pub mod generation;
pub mod ingestor;
pub mod news;
pub mod notifier;
pub mod report;
pub mod runner;
pub mod scheduler;

pub use error::PipelineError;
