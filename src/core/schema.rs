//! Schema resolution for tool and prompt registration
//!
//! Registration accepts either a ready JSON Schema document or an opaque
//! validator. Both unify into one entry shape: a JSON Schema to advertise
//! plus an optional validator to run against incoming arguments. The
//! tagged [`SchemaSource`] keeps the two apart so call sites never sniff
//! shapes at runtime.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::core::error::{McpResult, RpcError};
use crate::protocol::types::{PromptArgument, error_codes};

/// An argument validator supplied by the embedder.
///
/// `validate` returns the validated (possibly transformed) value, or an
/// error that surfaces to the client as `INVALID_PARAMS`.
#[async_trait]
pub trait SchemaValidator: Send + Sync {
    async fn validate(&self, raw: &Value) -> McpResult<Value>;
}

/// Converts a validator into an advertisable JSON Schema.
///
/// Supplied by the embedder; invoked once per validator registration.
pub type SchemaAdapter = Arc<dyn Fn(&dyn SchemaValidator) -> Value + Send + Sync>;

/// The schema half of a tool or prompt registration
#[derive(Clone)]
pub enum SchemaSource {
    /// A JSON Schema document, advertised verbatim; arguments pass through
    /// to the handler unvalidated
    Document(Value),
    /// An opaque validator; the advertised schema comes from the adapter
    Validator(Arc<dyn SchemaValidator>),
}

impl fmt::Debug for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::Document(doc) => f.debug_tuple("Document").field(doc).finish(),
            SchemaSource::Validator(_) => f.debug_tuple("Validator").finish(),
        }
    }
}

/// Uniform outcome of schema resolution
#[derive(Clone)]
pub struct ResolvedSchema {
    /// JSON Schema object advertised in listings
    pub input_schema: Value,
    /// Validator to run against raw arguments, when one was registered
    pub validator: Option<Arc<dyn SchemaValidator>>,
}

/// The schema advertised when registration supplied none
pub fn default_input_schema() -> Value {
    json!({ "type": "object" })
}

/// Resolve a registration-time schema source into the uniform entry shape
pub fn resolve_schema(
    source: Option<SchemaSource>,
    adapter: Option<&SchemaAdapter>,
) -> ResolvedSchema {
    match source {
        None => ResolvedSchema {
            input_schema: default_input_schema(),
            validator: None,
        },
        Some(SchemaSource::Document(doc)) => ResolvedSchema {
            input_schema: doc,
            validator: None,
        },
        Some(SchemaSource::Validator(validator)) => {
            let input_schema = adapter
                .map(|adapt| adapt(validator.as_ref()))
                .unwrap_or_else(default_input_schema);
            ResolvedSchema {
                input_schema,
                validator: Some(validator),
            }
        }
    }
}

/// Coerce a validator failure into `INVALID_PARAMS`, preserving its
/// message and data
pub(crate) fn into_invalid_params(err: RpcError) -> RpcError {
    if err.code == error_codes::INVALID_PARAMS {
        err
    } else {
        RpcError {
            code: error_codes::INVALID_PARAMS,
            message: err.message,
            data: err.data,
        }
    }
}

/// Derive declared prompt arguments from an object schema's top-level
/// properties, in property insertion order.
///
/// Non-object schemas yield no arguments.
pub fn derive_prompt_arguments(schema: &Value) -> Option<Vec<PromptArgument>> {
    let object = schema.as_object()?;
    if object.get("type").and_then(Value::as_str) != Some("object") {
        return None;
    }

    let required: HashSet<&str> = object
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = object.get("properties").and_then(Value::as_object) else {
        return Some(Vec::new());
    };

    Some(
        properties
            .iter()
            .map(|(name, prop)| PromptArgument {
                name: name.clone(),
                title: prop
                    .get("title")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                description: prop
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                required: Some(required.contains(name.as_str())),
            })
            .collect(),
    )
}

/// Adapter implementing [`SchemaValidator`] from a plain function
pub struct FnValidator<F>(F);

impl<F> FnValidator<F>
where
    F: Fn(&Value) -> McpResult<Value> + Send + Sync,
{
    pub fn new(validate: F) -> Self {
        Self(validate)
    }
}

#[async_trait]
impl<F> SchemaValidator for FnValidator<F>
where
    F: Fn(&Value) -> McpResult<Value> + Send + Sync,
{
    async fn validate(&self, raw: &Value) -> McpResult<Value> {
        (self.0)(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accept_all() -> Arc<dyn SchemaValidator> {
        Arc::new(FnValidator::new(|raw| Ok(raw.clone())))
    }

    #[test]
    fn test_resolve_json_schema_is_identity() {
        let doc = json!({"type": "object", "properties": {"m": {"type": "string"}}});
        let resolved = resolve_schema(Some(SchemaSource::Document(doc.clone())), None);
        assert_eq!(resolved.input_schema, doc);
        assert!(resolved.validator.is_none());
    }

    #[test]
    fn test_resolve_missing_schema_defaults_to_object() {
        let resolved = resolve_schema(None, None);
        assert_eq!(resolved.input_schema, json!({"type": "object"}));
        assert!(resolved.validator.is_none());
    }

    #[test]
    fn test_resolve_validator_without_adapter() {
        let resolved = resolve_schema(Some(SchemaSource::Validator(accept_all())), None);
        assert_eq!(resolved.input_schema, json!({"type": "object"}));
        assert!(resolved.validator.is_some());
    }

    #[test]
    fn test_resolve_validator_with_adapter() {
        let adapter: SchemaAdapter =
            Arc::new(|_| json!({"type": "object", "properties": {"x": {"type": "number"}}}));
        let resolved = resolve_schema(Some(SchemaSource::Validator(accept_all())), Some(&adapter));
        assert_eq!(
            resolved.input_schema["properties"]["x"]["type"],
            json!("number")
        );
        assert!(resolved.validator.is_some());
    }

    #[test]
    fn test_derive_arguments_preserves_property_order() {
        let schema = json!({
            "type": "object",
            "properties": {
                "zeta": {"type": "string", "description": "last alphabetically"},
                "alpha": {"type": "string"}
            },
            "required": ["zeta"]
        });

        let arguments = derive_prompt_arguments(&schema).unwrap();
        assert_eq!(arguments.len(), 2);
        assert_eq!(arguments[0].name, "zeta");
        assert_eq!(arguments[0].required, Some(true));
        assert_eq!(
            arguments[0].description.as_deref(),
            Some("last alphabetically")
        );
        assert_eq!(arguments[1].name, "alpha");
        assert_eq!(arguments[1].required, Some(false));
    }

    #[test]
    fn test_derive_arguments_rejects_non_object_schemas() {
        assert!(derive_prompt_arguments(&json!({"type": "string"})).is_none());
        assert!(derive_prompt_arguments(&json!(17)).is_none());
    }

    #[test]
    fn test_derive_arguments_without_properties() {
        let arguments = derive_prompt_arguments(&json!({"type": "object"})).unwrap();
        assert!(arguments.is_empty());
    }

    #[test]
    fn test_into_invalid_params_preserves_existing_code() {
        let original = RpcError::invalid_params("already invalid");
        assert_eq!(into_invalid_params(original.clone()), original);

        let coerced = into_invalid_params(RpcError::internal("schema mismatch"));
        assert_eq!(coerced.code, error_codes::INVALID_PARAMS);
        assert_eq!(coerced.message, "schema mismatch");
    }
}
