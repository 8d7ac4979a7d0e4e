use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub storage: StorageConfig,
    pub generation: GenerationConfig,
    pub audit: AuditConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub sqlite_path: PathBuf,
    pub document_path: PathBuf,
    /// Seed demo employees into a store whose file did not exist yet
    pub seed_on_create: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of an Ollama-compatible chat API
    pub endpoint: String,
    pub model: String,
    /// Model used for result insights
    pub analyst_model: String,
    pub timeout_secs: u64,
    pub enable_insights: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// JSON-lines mirror of the audit log; `None` disables it
    pub side_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub enable_request_logging: bool,
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
        // Storage overrides
        if let Ok(v) = env::var("STORAGE_SQLITE_PATH") {
            self.storage.sqlite_path = PathBuf::from(v);
        }
        if let Ok(v) = env::var("STORAGE_DOCUMENT_PATH") {
            self.storage.document_path = PathBuf::from(v);
        }
        if let Ok(v) = env::var("STORAGE_SEED_ON_CREATE") {
            self.storage.seed_on_create = v.parse().unwrap_or(self.storage.seed_on_create);
        }

        // Generation overrides
        if let Ok(v) = env::var("GENERATION_ENDPOINT") {
            self.generation.endpoint = v;
        }
        if let Ok(v) = env::var("GENERATION_MODEL") {
            self.generation.model = v;
        }
        if let Ok(v) = env::var("GENERATION_ANALYST_MODEL") {
            self.generation.analyst_model = v;
        }
        if let Ok(v) = env::var("GENERATION_TIMEOUT_SECS") {
            self.generation.timeout_secs = v.parse().unwrap_or(self.generation.timeout_secs);
        }
        if let Ok(v) = env::var("GENERATION_ENABLE_INSIGHTS") {
            self.generation.enable_insights = v.parse().unwrap_or(self.generation.enable_insights);
        }

        // Audit overrides; an empty value turns the side file off
        if let Ok(v) = env::var("AUDIT_SIDE_FILE") {
            self.audit.side_file = if v.trim().is_empty() { None } else { Some(PathBuf::from(v)) };
        }

        // API overrides
        if let Ok(v) = env::var("PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_CORS_ORIGINS") {
            self.api.cors_origins = v.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            storage: StorageConfig {
                sqlite_path: PathBuf::from("data/employees.db"),
                document_path: PathBuf::from("data/employees.json"),
                seed_on_create: true,
            },
            generation: GenerationConfig {
                endpoint: "http://localhost:11434".to_string(),
                model: "llama3".to_string(),
                analyst_model: "llama3".to_string(),
                timeout_secs: 30,
                enable_insights: true,
            },
            audit: AuditConfig {
                side_file: Some(PathBuf::from("data/audit_log.jsonl")),
            },
            api: ApiConfig {
                port: 8000,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                enable_request_logging: true,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            storage: StorageConfig {
                sqlite_path: PathBuf::from("/var/lib/datasense/employees.db"),
                document_path: PathBuf::from("/var/lib/datasense/employees.json"),
                seed_on_create: true,
            },
            generation: GenerationConfig {
                endpoint: "http://localhost:11434".to_string(),
                model: "llama3".to_string(),
                analyst_model: "llama3".to_string(),
                timeout_secs: 30,
                enable_insights: true,
            },
            audit: AuditConfig {
                side_file: Some(PathBuf::from("/var/lib/datasense/audit_log.jsonl")),
            },
            api: ApiConfig {
                port: 8000,
                cors_origins: vec!["https://staging.example.com".to_string()],
                enable_request_logging: true,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            storage: StorageConfig {
                sqlite_path: PathBuf::from("/var/lib/datasense/employees.db"),
                document_path: PathBuf::from("/var/lib/datasense/employees.json"),
                seed_on_create: false,
            },
            generation: GenerationConfig {
                endpoint: "http://localhost:11434".to_string(),
                model: "llama3".to_string(),
                analyst_model: "llama3".to_string(),
                timeout_secs: 20,
                enable_insights: false,
            },
            audit: AuditConfig {
                side_file: Some(PathBuf::from("/var/log/datasense/audit_log.jsonl")),
            },
            api: ApiConfig {
                port: 8000,
                cors_origins: vec!["https://app.example.com".to_string()],
                enable_request_logging: false,
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
        assert!(config.storage.seed_on_create);
        assert!(config.generation.enable_insights);
        assert_eq!(config.api.port, 8000);
        assert!(config.audit.side_file.is_some());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.storage.seed_on_create);
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.environment, Environment::Production);
    }
}
