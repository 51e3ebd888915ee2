//! Post-interview feedback generation

pub mod generator;
pub mod messages;

pub use generator::{FeedbackGenerator, FixedFeedbackGenerator, NatsFeedbackGenerator};
pub use messages::{FeedbackRequest, FeedbackResponse};
