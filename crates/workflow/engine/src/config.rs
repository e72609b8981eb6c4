//! Engine configuration
//!
//! Layered: built-in defaults, then an optional file, then `WORKFLOW__*`
//! environment variables (`WORKFLOW__APPROVALS__DEFAULT_APPROVER_ROLE`).

use serde::{Deserialize, Serialize};

/// Main engine configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Approval gating configuration
    #[serde(default)]
    pub approvals: ApprovalSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Approval gating configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSettings {
    /// Role placed on freshly added approval steps
    #[serde(default = "default_approver_role")]
    pub default_approver_role: String,

    /// Resource checked by the permission fallback
    #[serde(default = "default_permission_resource")]
    pub permission_resource: String,

    /// Action checked by the permission fallback
    #[serde(default = "default_permission_action")]
    pub permission_action: String,
}

impl Default for ApprovalSettings {
    fn default() -> Self {
        Self {
            default_approver_role: default_approver_role(),
            permission_resource: default_permission_resource(),
            permission_action: default_permission_action(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_approver_role() -> String {
    "board_member".to_string()
}

fn default_permission_resource() -> String {
    "workflows".to_string()
}

fn default_permission_action() -> String {
    "approve".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&EngineConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("WORKFLOW")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Parse a TOML document layered over the defaults
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&EngineConfig::default())?)
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
