// Infrastructure layer (shared components)
pub mod infrastructure;

pub use infrastructure::config;
pub use infrastructure::error;
pub use infrastructure::metrics;

// Domain layer
pub mod domain;

pub use domain::email;
pub use domain::markdown;
pub use domain::template;

// Application layer
pub mod mailer;
pub mod renderer;

// Supporting modules
pub mod telemetry;

pub use domain::email::{Email, SendError, Sender};
pub use error::MailerError;
pub use mailer::{Mailer, TemplateEmail};
pub use renderer::Renderer;
