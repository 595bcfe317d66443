//! Read projections from entities to response views.
//!
//! # Responsibility
//! - Convert immutable entity values into serializable view values.
//!
//! # Invariants
//! - Projections are pure: no storage access, no clock reads.
//! - Missing optional fields are rendered as `None`, never as errors.

pub mod member;
pub mod project;
pub mod sprint;
pub mod task;
