//! Service layer: generation orchestration, the two execution paths that feed
//! it, read-only browsing of generated output, and the notification boundary.

pub mod generation;
pub mod jobs;
pub mod notify;
pub mod queue;
pub mod viewer;
