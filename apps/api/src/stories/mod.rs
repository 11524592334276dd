// Art stories: long-form pieces about traditional art forms.
// Generated through llm_client, with a canned story when generation fails.

pub mod fallback;
pub mod generator;
pub mod handlers;
pub mod prompts;
