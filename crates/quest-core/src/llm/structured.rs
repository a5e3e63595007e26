//! Schema-constrained completions.
//!
//! The hosted call is treated as a fallible conversion from text to a typed
//! value: the declared schema is sent with the request, and a reply that does
//! not parse into `T` (or fails its range checks) becomes
//! [`ExtractionError::SchemaValidation`].

use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use quest_types::error::ExtractionError;
use quest_types::llm::{OutputConfig, close_object_schemas};

/// JSON schema for `T` with every object closed (`additionalProperties: false`).
pub fn schema_for<T: JsonSchema>() -> serde_json::Value {
    let mut schema = schemars::schema_for!(T).to_value();
    if let Some(map) = schema.as_object_mut() {
        map.remove("$schema");
    }
    close_object_schemas(&mut schema);
    schema
}

/// `json_schema` output config named after the target type.
pub fn output_config<T: JsonSchema>(name: &str) -> OutputConfig {
    OutputConfig::json_schema(name, schema_for::<T>())
}

/// Parse a model reply into `T`.
///
/// Tolerates a surrounding Markdown code fence, which some models add even
/// under a response schema.
pub fn parse_reply<T: DeserializeOwned>(content: &str) -> Result<T, ExtractionError> {
    let body = strip_code_fence(content.trim());
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        ExtractionError::SchemaValidation(format!("{e}; raw content: {preview}"))
    })
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
