// CV evaluation: upload validation, text extraction, normalization, prompt
// construction, model call, response validation and scoring.
// All model calls go through llm_client.

pub mod extract;
pub mod handlers;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod scoring;
pub mod upload;
