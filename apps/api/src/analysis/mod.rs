// Resume analysis: prompt construction, the model-fallback loop, and the
// extraction pipeline that turns free-text completions into analysis objects.
// All completion calls go through llm_client::CompletionClient.

pub mod analyzer;
pub mod extraction;
pub mod handlers;
pub mod list_items;
pub mod models;
pub mod prompts;
pub mod resume_text;
