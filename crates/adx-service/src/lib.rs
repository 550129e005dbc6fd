//! adx-service
//!
//! Composition root for the ads auction / social-reward core.  [`AdsEngine`]
//! wires the store, ledger, lifecycle rules, auction ranker and reward
//! distributor behind the inbound operations the surrounding HTTP layer
//! calls after request validation.  No network surface of its own.

mod engine;
mod error;

pub use engine::AdsEngine;
pub use error::EngineError;
