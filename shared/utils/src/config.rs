use config::{Config, ConfigError, Environment, File};
use dreamhaven_models::{DEFAULT_SHIPPING, DEFAULT_TAX_RATE};
use serde::{Deserialize, Serialize};
use std::env;

/// Delimiter the order-intake chat template puts in front of every order.
pub const DEFAULT_ORDER_DELIMITER: &str = r"✅Name\s+:";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub invoice: InvoiceConfig,
    pub company: CompanyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceConfig {
    pub output_dir: String,
    pub counter_file: String,
    pub starting_number: u32,
    pub tax_rate: f64,
    pub shipping: f64,
    pub order_delimiter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyConfig {
    pub name: String,
    pub website: String,
    pub contacts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let defaults = Config::try_from(&AppConfig::default())?;

        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // DREAMHAVEN__LLM__MODEL=gpt-4o-mini etc.
            .add_source(Environment::with_prefix("DREAMHAVEN").separator("__"));

        let mut app_config: AppConfig = config.build()?.try_deserialize()?;
        app_config.apply_openai_key_fallback(env::var("OPENAI_API_KEY").ok());
        Ok(app_config)
    }

    /// Use the conventional `OPENAI_API_KEY` when no key was configured.
    pub fn apply_openai_key_fallback(&mut self, key: Option<String>) {
        if self.llm.api_key.trim().is_empty() {
            if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
                self.llm.api_key = key;
            }
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                max_request_size: 1024 * 1024, // 1MB of pasted text is plenty
                timeout_seconds: 120,
            },
            llm: LlmConfig {
                api_url: "https://api.openai.com/v1".to_string(),
                api_key: String::new(),
                model: "gpt-3.5-turbo".to_string(),
                max_tokens: 1500,
                temperature: 0.1,
                timeout_seconds: 60,
            },
            invoice: InvoiceConfig {
                output_dir: "invoices".to_string(),
                counter_file: "invoice_number.txt".to_string(),
                starting_number: 2500,
                tax_rate: DEFAULT_TAX_RATE,
                shipping: DEFAULT_SHIPPING,
                order_delimiter: DEFAULT_ORDER_DELIMITER.to_string(),
            },
            company: CompanyConfig {
                name: "DREAMHAVEN BEDDING & FURNITURE".to_string(),
                website: "www.dreamhavenbedding.com".to_string(),
                contacts: vec![
                    "682-424-2071".to_string(),
                    "940-224-1232".to_string(),
                    "469-825-2323".to_string(),
                ],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
                file_path: None,
            },
        }
    }
}
