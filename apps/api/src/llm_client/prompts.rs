// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it; cross-cutting instructions live here.

/// Appended to any prompt whose reply is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with a single JSON object. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Guards against score inflation in evaluation prompts.
pub const HONESTY_INSTRUCTION: &str = "Be honest, don't inflate scores.";
