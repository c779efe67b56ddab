//! Utility modules

pub mod uri_template;

pub use uri_template::UriTemplate;
