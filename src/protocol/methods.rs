//! MCP protocol method name constants

// Core protocol methods
pub const INITIALIZE: &str = "initialize";
pub const INITIALIZED: &str = "notifications/initialized";
pub const PING: &str = "ping";

// Tool-related methods
pub const TOOLS_LIST: &str = "tools/list";
pub const TOOLS_CALL: &str = "tools/call";
pub const TOOLS_LIST_CHANGED: &str = "notifications/tools/list_changed";

// Resource-related methods
pub const RESOURCES_LIST: &str = "resources/list";
pub const RESOURCES_TEMPLATES_LIST: &str = "resources/templates/list";
pub const RESOURCES_READ: &str = "resources/read";
pub const RESOURCES_SUBSCRIBE: &str = "resources/subscribe";
pub const RESOURCES_UNSUBSCRIBE: &str = "resources/unsubscribe";
pub const RESOURCES_UPDATED: &str = "notifications/resources/updated";
pub const RESOURCES_LIST_CHANGED: &str = "notifications/resources/list_changed";

// Prompt-related methods
pub const PROMPTS_LIST: &str = "prompts/list";
pub const PROMPTS_GET: &str = "prompts/get";
pub const PROMPTS_LIST_CHANGED: &str = "notifications/prompts/list_changed";

// Completion methods
pub const COMPLETION_COMPLETE: &str = "completion/complete";

// Logging methods
pub const LOGGING_SET_LEVEL: &str = "logging/setLevel";

// Progress and lifecycle notifications
pub const PROGRESS: &str = "notifications/progress";
pub const CANCELLED: &str = "notifications/cancelled";

/// Prefix shared by every notification method name
pub const NOTIFICATIONS_PREFIX: &str = "notifications/";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_name_consistency() {
        assert_eq!(INITIALIZE, "initialize");
        assert_eq!(INITIALIZED, "notifications/initialized");
        assert_eq!(TOOLS_CALL, "tools/call");
        assert_eq!(RESOURCES_TEMPLATES_LIST, "resources/templates/list");
        assert_eq!(PROMPTS_GET, "prompts/get");
        assert_eq!(PROGRESS, "notifications/progress");
    }

    #[test]
    fn test_notification_methods_share_prefix() {
        for method in [
            INITIALIZED,
            TOOLS_LIST_CHANGED,
            RESOURCES_UPDATED,
            RESOURCES_LIST_CHANGED,
            PROMPTS_LIST_CHANGED,
            PROGRESS,
            CANCELLED,
        ] {
            assert!(method.starts_with(NOTIFICATIONS_PREFIX), "{method}");
        }
    }
}
