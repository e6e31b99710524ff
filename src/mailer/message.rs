//! Template-backed message request

use std::collections::BTreeMap;

use serde_json::Value;

use crate::domain::email::{Attachment, Tag};

/// A message to be rendered from a template and sent.
///
/// Only `to`, `template` and `data` are required. An empty `subject` or an
/// unset `layout` falls back to the template and mailer defaults.
#[derive(Debug, Clone)]
pub struct TemplateEmail {
    pub to: String,
    pub template: String,
    pub data: Value,
    pub subject: Option<String>,
    pub layout: Option<String>,
    pub from: Option<String>,
    pub reply_to: Option<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub attachments: Vec<Attachment>,
    pub headers: BTreeMap<String, String>,
    pub tags: BTreeMap<String, Tag>,
}

impl TemplateEmail {
    pub fn new(to: impl Into<String>, template: impl Into<String>, data: Value) -> Self {
        Self {
            to: to.into(),
            template: template.into(),
            data,
            subject: None,
            layout: None,
            from: None,
            reply_to: None,
            cc: Vec::new(),
            bcc: Vec::new(),
            attachments: Vec::new(),
            headers: BTreeMap::new(),
            tags: BTreeMap::new(),
        }
    }

    /// Explicit subject; takes priority over the template's `Subject`
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    pub fn cc(mut self, cc: impl Into<String>) -> Self {
        self.cc.push(cc.into());
        self
    }

    pub fn bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc.push(bcc.into());
        self
    }

    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a tag; use `Tag::Present` for a value-less tag
    pub fn tag(mut self, name: impl Into<String>, tag: impl Into<Tag>) -> Self {
        self.tags.insert(name.into(), tag.into());
        self
    }

    /// The explicit subject, if set and non-empty
    pub(crate) fn explicit_subject(&self) -> Option<&str> {
        self.subject.as_deref().filter(|subject| !subject.is_empty())
    }
}
