// Task engine: prompt templating per task kind, dispatch to the generation service,
// and the HTTP handlers on top. All LLM calls go through llm_client.

pub mod dispatcher;
pub mod handlers;
pub mod kind;
pub mod prompts;
