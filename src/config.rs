use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::core::AssignmentStrategy;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    #[serde(default)]
    pub tables: TableSettings,
    #[serde(default)]
    pub assignment: AssignmentSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub url: String,
    pub api_key: String,
    /// When set, session tokens are verified locally instead of via the auth API
    #[serde(default)]
    pub jwt_secret: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSettings {
    #[serde(default = "default_groups_table")]
    pub groups: String,
    #[serde(default = "default_group_members_table")]
    pub group_members: String,
    #[serde(default = "default_profiles_table")]
    pub profiles: String,
    #[serde(default = "default_wishlist_items_table")]
    pub wishlist_items: String,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            groups: default_groups_table(),
            group_members: default_group_members_table(),
            profiles: default_profiles_table(),
            wishlist_items: default_wishlist_items_table(),
        }
    }
}

fn default_groups_table() -> String { "groups".to_string() }
fn default_group_members_table() -> String { "group_members".to_string() }
fn default_profiles_table() -> String { "profiles".to_string() }
fn default_wishlist_items_table() -> String { "wishlist_items".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentSettings {
    #[serde(default)]
    pub strategy: AssignmentStrategy,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for AssignmentSettings {
    fn default() -> Self {
        Self {
            strategy: AssignmentStrategy::default(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_attempts() -> u32 { 64 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SANTA__)
    /// 5. SUPABASE_URL, SUPABASE_SERVICE_ROLE_KEY, SUPABASE_JWT_SECRET
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SANTA__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SANTA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("SANTA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Apply the hosted backend's conventional environment variables on top
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    // Empty values (e.g. blank lines in .env) leave the file settings alone
    let var = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());

    if let Some(url) = var("SUPABASE_URL") {
        builder = builder.set_override("supabase.url", url)?;
    }
    if let Some(key) = var("SUPABASE_SERVICE_ROLE_KEY") {
        builder = builder.set_override("supabase.api_key", key)?;
    }
    if let Some(secret) = var("SUPABASE_JWT_SECRET") {
        builder = builder.set_override("supabase.jwt_secret", secret)?;
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_file() {
        let settings: Settings = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [supabase]
            url = "https://project.supabase.co"
            api_key = "service-key"
            "#,
        )
        .unwrap();

        assert_eq!(settings.tables.group_members, "group_members");
        assert_eq!(settings.tables.wishlist_items, "wishlist_items");
        assert_eq!(settings.assignment.strategy, AssignmentStrategy::Derangement);
        assert_eq!(settings.assignment.max_attempts, 64);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.format, "json");
        assert!(settings.supabase.jwt_secret.is_none());
    }

    #[test]
    fn test_strategy_from_file() {
        let settings: Settings = toml::from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [supabase]
            url = "https://project.supabase.co"
            api_key = "service-key"

            [assignment]
            strategy = "swap_repair"
            max_attempts = 8
            "#,
        )
        .unwrap();

        assert_eq!(settings.assignment.strategy, AssignmentStrategy::SwapRepair);
        assert_eq!(settings.assignment.max_attempts, 8);
    }
}
