use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub mailer: MailerSettings,
    #[serde(default)]
    pub templates: TemplateSettings,
    #[serde(default)]
    pub otel: OtelConfig,
}

/// Message assembly defaults
#[derive(Debug, Clone, Deserialize)]
pub struct MailerSettings {
    /// Subject used when neither the message nor the template sets one
    #[serde(default = "default_fallback_subject")]
    pub fallback_subject: String,
    /// Layout used when the message does not name one
    #[serde(default = "default_layout")]
    pub default_layout: String,
    /// From address applied when the message leaves it unset
    #[serde(default)]
    pub default_from: Option<String>,
    /// Reply-to address applied when the message leaves it unset
    #[serde(default)]
    pub default_reply_to: Option<String>,
}

/// Where template and layout sources live
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSettings {
    #[serde(default = "default_template_root")]
    pub template_root: String,
    #[serde(default = "default_layout_root")]
    pub layout_root: String,
}

/// OpenTelemetry export settings
#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    /// OTLP gRPC endpoint
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Trace sampling ratio (0.0-1.0)
    #[serde(default = "default_sampling_ratio")]
    pub sampling_ratio: f64,
}

fn default_fallback_subject() -> String {
    "Notification".to_string()
}

fn default_layout() -> String {
    "base.html".to_string()
}

fn default_template_root() -> String {
    ".".to_string()
}

fn default_layout_root() -> String {
    "layouts".to_string()
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_service_name() -> String {
    "letterpress".to_string()
}

fn default_sampling_ratio() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Self::builder(&run_mode)?
            // LETTERPRESS__MAILER__FALLBACK_SUBJECT, LETTERPRESS__OTEL__ENABLED, etc.
            .add_source(
                Environment::with_prefix("LETTERPRESS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load settings from a single file on top of the defaults
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path))
            .build()?
            .try_deserialize()
    }

    fn builder(
        run_mode: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("mailer.fallback_subject", default_fallback_subject())?
            .set_default("mailer.default_layout", default_layout())?
            .set_default("templates.template_root", default_template_root())?
            .set_default("templates.layout_root", default_layout_root())?
            .set_default("otel.enabled", false)?
            .set_default("otel.endpoint", default_otel_endpoint())?
            .set_default("otel.service_name", default_service_name())?
            .set_default("otel.sampling_ratio", default_sampling_ratio())?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false)))
    }
}

impl Default for MailerSettings {
    fn default() -> Self {
        Self {
            fallback_subject: default_fallback_subject(),
            default_layout: default_layout(),
            default_from: None,
            default_reply_to: None,
        }
    }
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            template_root: default_template_root(),
            layout_root: default_layout_root(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service_name: default_service_name(),
            sampling_ratio: default_sampling_ratio(),
        }
    }
}
