//! Resource registration entries
//!
//! A resource is a URI-addressable content source: static (fixed URI) or
//! templated (URI template with variables). Template entries carry their
//! compiled matcher and optional per-variable validators.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::context::RequestContext;
use crate::core::error::McpResult;
use crate::core::schema::SchemaValidator;
use crate::protocol::messages::ReadResourceResult;
use crate::protocol::types::{Resource, ResourceTemplate};
use crate::utils::uri_template::UriTemplate;

/// The resolved location a read targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceUri {
    /// The concrete URI being read
    pub href: String,
}

/// Trait for implementing resource handlers
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Read the resource at `uri`.
    ///
    /// `variables` holds the template variables extracted from the URI
    /// (validated where validators were registered); empty for static
    /// resources.
    async fn read(
        &self,
        uri: &ResourceUri,
        variables: &HashMap<String, Value>,
        ctx: &mut RequestContext,
    ) -> McpResult<ReadResourceResult>;
}

/// Advertised metadata for a registered resource
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceMetadata {
    Static(Resource),
    Template(ResourceTemplate),
}

impl ResourceMetadata {
    /// The registry key: the URI for static entries, the template string
    /// for templated ones
    pub fn key(&self) -> &str {
        match self {
            ResourceMetadata::Static(resource) => &resource.uri,
            ResourceMetadata::Template(template) => &template.uri_template,
        }
    }
}

/// A registered resource
pub struct ResourceEntry {
    /// Advertised metadata
    pub metadata: ResourceMetadata,
    /// Handler implementing the read
    pub handler: Arc<dyn ResourceHandler>,
    /// Per-variable validators, keyed by variable name
    pub validators: HashMap<String, Arc<dyn SchemaValidator>>,
    /// Compiled matcher; present only for template entries
    pub matcher: Option<UriTemplate>,
}

impl ResourceEntry {
    pub fn is_template(&self) -> bool {
        self.matcher.is_some()
    }
}

/// Registration options for a resource
#[derive(Debug, Clone, Default)]
pub struct ResourceOptions {
    pub name: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub mime_type: Option<String>,
}

impl ResourceOptions {
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_mime_type<S: Into<String>>(mut self, mime_type: S) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}
