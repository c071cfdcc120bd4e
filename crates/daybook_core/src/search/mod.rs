//! Label search entry points.
//!
//! # Responsibility
//! - Expose first-match label queries scoped to an ancestor subtree.
//! - Keep search result shaping inside core.

pub mod label_query;
