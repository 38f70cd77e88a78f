//! # strata-core
//!
//! Foundation types for the strata context compaction engine.
//!
//! This crate provides the shared vocabulary the engine crate builds on:
//!
//! - **Branded IDs**: [`ids::ItemId`] as a newtype over UUIDv7
//! - **Context items**: [`item::ContextItem`] with kind, timestamp, and score
//! - **Results**: [`result::CompactionResult`] and its audit metadata
//! - **Token estimation**: [`estimator::TokenEstimator`] trait and the
//!   character-based default
//! - **Text**: char-safe preview truncation for prompt assembly
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `strata-engine`; carries no behavior
//! beyond constructors and small pure helpers.

#![deny(unsafe_code)]

pub mod estimator;
pub mod ids;
pub mod item;
pub mod result;
pub mod text;

pub use estimator::{CHARS_PER_TOKEN, CharEstimator, TokenEstimator};
pub use ids::ItemId;
pub use item::{ContextItem, ItemKind};
pub use result::{CompactionResult, ImportanceWeights, PreservationCriteria, ResultMetadata};
