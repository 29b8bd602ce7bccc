use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Top-level config (turni.toml + TURNI_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurniConfig {
    pub bot: BotConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub shifts: ShiftsConfig,
    #[serde(default)]
    pub access: AccessConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub token: String,
    #[serde(default = "default_bot_name")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftsConfig {
    #[serde(default = "default_shifts_path")]
    pub path: String,
}

impl Default for ShiftsConfig {
    fn default() -> Self {
        Self {
            path: default_shifts_path(),
        }
    }
}

/// Allow-lists. Empty `allow_users` means everyone may use the bot
/// (the original only enforced the list when the env var was set);
/// empty `admin_users` means admin commands are disabled.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccessConfig {
    #[serde(default)]
    pub allow_users: Vec<String>,
    #[serde(default)]
    pub admin_users: Vec<String>,
}

fn default_bot_name() -> String {
    "turni-bot".to_string()
}

fn default_db_path() -> String {
    "turni.db".to_string()
}

fn default_shifts_path() -> String {
    "shifts.json".to_string()
}

impl TurniConfig {
    /// Load config from a TOML file with TURNI_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ./turni.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path.unwrap_or("turni.toml");

        let config: TurniConfig = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("TURNI_").split("_"))
            .extract()
            .map_err(|e| crate::error::TurniError::Config(e.to_string()))?;

        Ok(config)
    }
}
