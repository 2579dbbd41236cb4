//! ReferralGuard scoring engine.
//!
//! Turns per-market provider rows into bounded referral-leakage risk
//! scores and a phased revenue recovery plan. Everything here is pure
//! and synchronous; the `score-runner` binary handles files and stdin.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod opportunities;
pub mod provider;
pub mod recovery;
pub mod rng;
pub mod scoring;
pub mod types;
