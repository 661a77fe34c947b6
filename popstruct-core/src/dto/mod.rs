//! Data Transfer Objects for the REST API
//!
//! Request bodies sent to the backend and the small response envelopes that
//! do not deserve a domain type of their own.

pub mod analysis;
pub mod auth;
pub mod dataset;
pub mod job;
pub mod subscription;
