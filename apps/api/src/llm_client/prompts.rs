// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str =
    "You are a JSON-only extraction engine. Always return valid JSON.";
