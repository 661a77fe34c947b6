//! PopStruct Core
//!
//! Core types shared by the PopStruct client crates.
//!
//! This crate contains:
//! - Domain types: entities served by the analysis backend (Job, Dataset, ResultPreview, etc.)
//! - DTOs: request and response bodies exchanged with the REST API

pub mod domain;
pub mod dto;
mod serde_util;
