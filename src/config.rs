use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub auth: AuthConfig,
    pub links: LinkConfig,
    pub server: ServerConfig,
    /// Enables dangerous operations like purge. Must never be true in production.
    pub test_mode: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub data_dir: String,
    /// Reject sensitive routes unless the proxy reports https, and mark cookies `Secure`
    pub require_https: bool,
}

#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Public domain, used as the prefix of every short link
    pub domain: String,
    /// Other hosts that serve this service (destinations on them are refused)
    pub self_host_aliases: Vec<String>,
    pub code_length: usize,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub session_ttl_secs: i64,
    /// Password an account gets after an administrative reset
    pub reset_password: String,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("reset_password", &"<redacted>")
            .field(
                "bootstrap_admin",
                &self.bootstrap_admin.as_ref().map(|a| a.username.as_str()),
            )
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            data_dir: "./data".to_string(),
            require_https: false,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            domain: "jsa.life".to_string(),
            self_host_aliases: Vec::new(),
            code_length: 5,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 3 * 60 * 60,
            reset_password: "changeme".to_string(),
            bootstrap_admin: None,
        }
    }
}

impl LinkConfig {
    /// Every host a destination must not point at
    pub fn self_hosts(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.domain.as_str()).chain(self.self_host_aliases.iter().map(String::as_str))
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let require_https = env_flag("REQUIRE_HTTPS");

        let domain = std::env::var("SHORT_DOMAIN").unwrap_or_else(|_| "jsa.life".to_string());

        let self_host_aliases: Vec<String> = std::env::var("SELF_HOST_ALIASES")
            .map(|p| {
                p.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let code_length = std::env::var("SHORT_CODE_LENGTH")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let session_ttl_secs = std::env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3 * 60 * 60); // 3 hours

        let reset_password =
            std::env::var("RESET_PASSWORD").unwrap_or_else(|_| "changeme".to_string());

        let bootstrap_admin = match (
            std::env::var("BOOTSTRAP_ADMIN_USERNAME").ok(),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
        ) {
            (Some(username), Some(password)) => Some(BootstrapAdmin { username, password }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::ValidationError(
                    "BOOTSTRAP_ADMIN_USERNAME and BOOTSTRAP_ADMIN_PASSWORD must be set together"
                        .to_string(),
                ))
            }
        };

        let test_mode = env_flag("TEST_MODE");

        let config = Config {
            server: ServerConfig {
                bind_address,
                data_dir,
                require_https,
            },
            links: LinkConfig {
                domain,
                self_host_aliases,
                code_length,
            },
            auth: AuthConfig {
                session_ttl_secs,
                reset_password,
                bootstrap_admin,
            },
            test_mode,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.links.domain.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "SHORT_DOMAIN cannot be empty".to_string(),
            ));
        }

        if !(1..=32).contains(&self.links.code_length) {
            return Err(ConfigError::ValidationError(format!(
                "SHORT_CODE_LENGTH must be between 1 and 32, got {}",
                self.links.code_length
            )));
        }

        if self.auth.session_ttl_secs <= 0 {
            return Err(ConfigError::ValidationError(
                "SESSION_TTL_SECS must be positive".to_string(),
            ));
        }

        if self.auth.reset_password.is_empty() {
            return Err(ConfigError::ValidationError(
                "RESET_PASSWORD cannot be empty".to_string(),
            ));
        }

        if let Some(admin) = &self.auth.bootstrap_admin {
            if admin.username.is_empty() || admin.password.is_empty() {
                return Err(ConfigError::ValidationError(
                    "bootstrap admin username and password cannot be empty".to_string(),
                ));
            }
        }

        if self.links.code_length < 4 {
            tracing::warn!(
                "SHORT_CODE_LENGTH {} leaves a small code space. \
                 Generation may run out of attempts as links accumulate.",
                self.links.code_length
            );
        }

        Ok(())
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}
