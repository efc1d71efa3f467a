//! Generation backend implementations

mod openai_compatible;

pub use openai_compatible::{OpenAiCompatibleGenerator, DEFAULT_GENERATION_BASE_URL};
