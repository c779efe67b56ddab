//! URI template matching for dynamic resources
//!
//! Templates use `{variable}` placeholders bounded by `/`, `?`, `#`, or
//! the end of the string. Compilation produces a regex anchored at both
//! ends plus the variable names in order of appearance; matching yields a
//! map from variable name to percent-decoded value. A variable matches a
//! single path segment and never crosses `/`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::core::error::{McpResult, RpcError};

static VARIABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([^{}]+)\}").expect("variable pattern is valid")
});

/// A compiled URI template
#[derive(Debug, Clone)]
pub struct UriTemplate {
    pattern: String,
    regex: Regex,
    variables: Vec<String>,
}

impl UriTemplate {
    /// Whether a registration string is a template (contains `{`) rather
    /// than a static URI
    pub fn is_template(pattern: &str) -> bool {
        pattern.contains('{')
    }

    /// Compile a template into an anchored matcher.
    ///
    /// Duplicate variable names are a registration error.
    pub fn compile(pattern: &str) -> McpResult<Self> {
        let mut variables: Vec<String> = Vec::new();
        let mut source = String::from("^");
        let mut literal_start = 0;

        for captures in VARIABLE_PATTERN.captures_iter(pattern) {
            let placeholder = captures.get(0).expect("match has a whole capture");
            let name = captures[1].to_string();
            if variables.contains(&name) {
                return Err(RpcError::invalid_request(format!(
                    "Duplicate template variable '{name}' in '{pattern}'"
                )));
            }

            source.push_str(&regex::escape(&pattern[literal_start..placeholder.start()]));
            source.push_str("([^/?#]+)");
            variables.push(name);
            literal_start = placeholder.end();
        }

        source.push_str(&regex::escape(&pattern[literal_start..]));
        source.push('$');

        let regex = Regex::new(&source).map_err(|e| {
            RpcError::invalid_request(format!("Cannot compile URI template '{pattern}': {e}"))
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            variables,
        })
    }

    /// Match a URI against this template.
    ///
    /// Returns the variable map with percent-decoded values, or `None`
    /// when the URI does not match (including undecodable values).
    pub fn matches(&self, uri: &str) -> Option<HashMap<String, String>> {
        let captures = self.regex.captures(uri)?;

        let mut variables = HashMap::new();
        for (index, name) in self.variables.iter().enumerate() {
            let raw = captures.get(index + 1)?.as_str();
            variables.insert(name.clone(), percent_decode(raw).ok()?);
        }

        Some(variables)
    }

    /// Render the template by substituting (percent-encoded) variable
    /// values. Every template variable must be supplied.
    pub fn render(&self, variables: &HashMap<String, String>) -> McpResult<String> {
        let mut uri = self.pattern.clone();
        for name in &self.variables {
            let value = variables.get(name).ok_or_else(|| {
                RpcError::invalid_params(format!("Missing template variable '{name}'"))
            })?;
            uri = uri.replace(&format!("{{{name}}}"), &percent_encode(value));
        }
        Ok(uri)
    }

    /// The original template pattern
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Variable names in order of appearance
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

/// Percent-decode a URI component
pub fn percent_decode(s: &str) -> McpResult<String> {
    let mut bytes = Vec::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        if ch == '%' {
            let hex: String = chars.by_ref().take(2).collect();
            if hex.len() != 2 {
                return Err(RpcError::invalid_params("Incomplete percent encoding"));
            }
            let byte = u8::from_str_radix(&hex, 16).map_err(|_| {
                RpcError::invalid_params(format!("Invalid hex in percent encoding: {hex}"))
            })?;
            bytes.push(byte);
        } else {
            let mut buf = [0u8; 4];
            bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
    }

    String::from_utf8(bytes)
        .map_err(|_| RpcError::invalid_params("Percent encoding is not valid UTF-8"))
}

/// Percent-encode a URI component, passing unreserved characters through
pub fn percent_encode(s: &str) -> String {
    let mut encoded = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
