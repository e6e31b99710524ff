//! Outgoing email model and the delivery contract

mod log_sender;
mod memory_sender;
mod sender;
mod types;

pub use log_sender::LogSender;
pub use memory_sender::MemorySender;
pub use sender::{SendError, Sender};
pub use types::{Attachment, Email, Tag, TagValue};
