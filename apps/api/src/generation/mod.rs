// Document generation: request validation, prompts, synthesis, the single-document
// pipeline and bundle assembly.
// All LLM calls go through llm_client via the ContentSynthesizer seam.

pub mod bundle;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod request;
pub mod service;
pub mod synthesizer;

pub use pipeline::DocumentPipeline;
pub use service::GenerationService;
