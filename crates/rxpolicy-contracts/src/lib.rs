//! # rxpolicy-contracts
//!
//! Shared types for the rxpolicy evaluator: policy records, requests, outcome
//! cards, reason codes, audit entries, and the error type.
//!
//! No business logic lives in this crate beyond shape validation.

pub mod audit;
pub mod card;
pub mod error;
pub mod policy;
pub mod reason;
pub mod request;
