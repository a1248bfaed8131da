// Shared prompt fragments.
// Each module that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// Closing instruction for every prompt that expects a JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    IMPORTANT: Your entire response must be ONLY the minified JSON object. \
    Do not include any text, markdown formatting like ```json, \
    or explanations outside of the JSON structure.";
