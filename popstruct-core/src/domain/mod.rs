//! Core domain types
//!
//! This module contains the entities the PopStruct backend owns. The client
//! only ever reads them: jobs are mutated exclusively by the backend's job
//! service as analyses progress.

pub mod dataset;
pub mod job;
pub mod page;
pub mod result;
pub mod user;
