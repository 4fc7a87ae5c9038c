use crate::coupon::NewCoupon;
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure that can be loaded from CLI or a config file
///
/// Example configuration file content
/// # Coupon Dispenser Configuration
///
/// # Server configuration
/// listen_on_port = 3000
/// internal_port = 3001
/// trust_forwarded_for = true
/// session_cookie = "sessionId"
///
/// # Seed the built-in demo coupons
/// seed_defaults = false
///
/// # Coupons loaded at startup, in this order
/// [[coupons]]
/// code = "WELCOME5"
/// description = "5% off"
/// is_active = true
/// expires_at = "2030-01-01T00:00:00Z"
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[serde(default)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Port the public claim API listens on
    #[arg(short, long, default_value_t = 3000)]
    #[serde(default = "default_port")]
    pub listen_on_port: u16,

    /// Port the internal admin API listens on
    #[arg(long, default_value_t = 3001)]
    #[serde(default = "default_internal_port")]
    pub internal_port: u16,

    /// Take the client address from X-Forwarded-For (only behind a trusted proxy)
    #[arg(long)]
    pub trust_forwarded_for: bool,

    /// Name of the cookie holding the client session token
    #[arg(long, default_value = "sessionId")]
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,

    /// Seed the catalog with the demo coupons on startup
    #[arg(long)]
    pub seed_defaults: bool,

    /// Configuration file path
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Coupons seeded on startup (config file only)
    #[arg(skip)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coupons: Vec<SeedCoupon>,
}

/// A coupon entry from the `[[coupons]]` section of the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedCoupon {
    pub code: String,
    pub description: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<SeedCoupon> for NewCoupon {
    fn from(seed: SeedCoupon) -> Self {
        NewCoupon {
            code: seed.code,
            description: seed.description,
            is_active: seed.is_active,
            expires_at: seed.expires_at,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_on_port: default_port(),
            internal_port: default_internal_port(),
            trust_forwarded_for: false,
            session_cookie: default_session_cookie(),
            seed_defaults: false,
            config: None,
            coupons: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from CLI args, optionally merging with a config file
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Config::parse();

        if let Some(config_path) = &config.config {
            let file_config = Self::from_file(Path::new(config_path))?;
            config = config.merge_with_file(file_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Merge with file config, CLI args take precedence
    fn merge_with_file(mut self, file_config: Config) -> Self {
        // If CLI value is default, use file value
        if self.listen_on_port == default_port() {
            self.listen_on_port = file_config.listen_on_port;
        }
        if self.internal_port == default_internal_port() {
            self.internal_port = file_config.internal_port;
        }
        if self.session_cookie == default_session_cookie() {
            self.session_cookie = file_config.session_cookie;
        }

        // Flags can only be switched on
        self.trust_forwarded_for |= file_config.trust_forwarded_for;
        self.seed_defaults |= file_config.seed_defaults;

        if self.coupons.is_empty() {
            self.coupons = file_config.coupons;
        }

        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.listen_on_port != 0 && self.listen_on_port == self.internal_port {
            return Err(anyhow::anyhow!(
                "listen_on_port and internal_port must differ, both are {}",
                self.listen_on_port
            ));
        }

        if self.session_cookie.is_empty()
            || self
                .session_cookie
                .contains(|c: char| c.is_whitespace() || c == '=' || c == ';')
        {
            return Err(anyhow::anyhow!(
                "Invalid session cookie name '{}'",
                self.session_cookie
            ));
        }

        for (index, coupon) in self.coupons.iter().enumerate() {
            if coupon.code.trim().is_empty() {
                return Err(anyhow::anyhow!("coupons[{index}]: code cannot be empty"));
            }
            if coupon.description.trim().is_empty() {
                return Err(anyhow::anyhow!(
                    "coupons[{index}] ({}): description cannot be empty",
                    coupon.code
                ));
            }
        }

        Ok(())
    }
}

// Default value functions
fn default_port() -> u16 {
    3000
}

fn default_internal_port() -> u16 {
    3001
}

fn default_session_cookie() -> String {
    "sessionId".to_string()
}

fn default_active() -> bool {
    true
}
