//! Answer generation domain models and traits

mod backend;
mod message;

pub use backend::{Generation, GenerationBackend};
pub use message::{last_user_message, Message, MessageRole};

#[cfg(test)]
pub use backend::MockGenerationBackend;
