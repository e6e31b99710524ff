mod settings;

pub use settings::{MailerSettings, OtelConfig, Settings, TemplateSettings};
