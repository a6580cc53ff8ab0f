use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub mail: MailConfig,
    pub location: LocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub default_page_size: i64,
    pub max_page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub enabled: bool,
    pub api_url: String,
    pub from_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub enabled: bool,
    pub api_url: String,
    pub api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SERVER_BIND_ADDRESS") {
            self.server.bind_address = v;
        }
        if let Ok(v) = env::var("SERVER_PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("SERVER_DEFAULT_PAGE_SIZE") {
            self.server.default_page_size = v.parse().unwrap_or(self.server.default_page_size);
        }
        if let Ok(v) = env::var("SERVER_MAX_PAGE_SIZE") {
            self.server.max_page_size = v.parse().unwrap_or(self.server.max_page_size);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Mail overrides
        if let Ok(v) = env::var("MAIL_ENABLED") {
            self.mail.enabled = v.parse().unwrap_or(self.mail.enabled);
        }
        if let Ok(v) = env::var("MAIL_API_URL") {
            self.mail.api_url = v;
        }
        if let Ok(v) = env::var("MAIL_FROM_ADDRESS") {
            self.mail.from_address = v;
        }

        // Location overrides
        if let Ok(v) = env::var("LOCATION_ENABLED") {
            self.location.enabled = v.parse().unwrap_or(self.location.enabled);
        }
        if let Ok(v) = env::var("LOCATION_API_URL") {
            self.location.api_url = v;
        }
        if let Ok(v) = env::var("LOCATION_API_KEY") {
            self.location.api_key = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                default_page_size: 25,
                max_page_size: 1000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/techkit_dev".to_string(),
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: "dev-secret-change-me".to_string(),
                enable_cors: true,
                cors_origins: vec![
                    "http://localhost:3000".to_string(),
                    "http://localhost:4200".to_string(),
                ],
            },
            mail: MailConfig {
                enabled: false,
                api_url: "http://localhost:8025/api/send".to_string(),
                from_address: "noreply@localhost".to_string(),
            },
            location: LocationConfig {
                enabled: false,
                api_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
                api_key: String::new(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 8080,
                default_page_size: 25,
                max_page_size: 500,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/techkit_staging".to_string(),
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                cors_origins: vec!["https://staging.techkit.example.org".to_string()],
            },
            mail: MailConfig {
                enabled: true,
                api_url: String::new(),
                from_address: "noreply@techkit.example.org".to_string(),
            },
            location: LocationConfig {
                enabled: true,
                api_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
                api_key: String::new(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 8080,
                default_page_size: 25,
                max_page_size: 100,
            },
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                enable_cors: true,
                cors_origins: vec!["https://techkit.example.org".to_string()],
            },
            mail: MailConfig {
                enabled: true,
                api_url: String::new(),
                from_address: "noreply@techkit.example.org".to_string(),
            },
            location: LocationConfig {
                enabled: true,
                api_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
                api_key: String::new(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.default_page_size, 25);
        assert!(!config.mail.enabled);
        assert!(!config.location.enabled);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.server.max_page_size, 100);
        assert!(config.mail.enabled);
        assert!(config.location.enabled);
        assert!(config.security.jwt_secret.is_empty());
    }
}
