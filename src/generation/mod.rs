//! Interview generation
//!
//! A user describes the interview they want to practice (role, level, tech
//! stack, question count) and the request is handed to the generation
//! backend, which stores the resulting interview in the directory.

pub mod generator;
pub mod messages;

pub use generator::{FixedInterviewGenerator, InterviewGenerator, NatsInterviewGenerator};
pub use messages::{GenerateInterviewRequest, GenerateInterviewResponse, InterviewType};
