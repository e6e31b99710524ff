//! Outgoing message types

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Email message handed to a `Sender`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Email {
    /// To recipients
    pub to: Vec<String>,

    /// CC recipients
    #[serde(default)]
    pub cc: Vec<String>,

    /// BCC recipients
    #[serde(default)]
    pub bcc: Vec<String>,

    /// Sender address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,

    /// Reply-to address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,

    pub subject: String,

    /// HTML body
    pub html: String,

    /// Plain text body
    #[serde(default)]
    pub text: String,

    /// Custom headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Provider tags
    #[serde(default)]
    pub tags: BTreeMap<String, Tag>,

    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Email {
    /// Create an email with a single recipient
    pub fn new(to: impl Into<String>, subject: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            to: vec![to.into()],
            subject: subject.into(),
            html: html.into(),
            ..Default::default()
        }
    }

    /// Set the plain text body
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the from address
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Add a CC recipient
    pub fn cc(mut self, cc: impl Into<String>) -> Self {
        self.cc.push(cc.into());
        self
    }

    /// Add a BCC recipient
    pub fn bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc.push(bcc.into());
        self
    }

    /// Total recipient count across to, cc and bcc
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }
}

/// Email attachment
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name
    pub filename: String,

    /// MIME type
    pub content_type: String,

    /// Content ID (for inline attachments referenced as `cid:`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,

    /// Raw content
    pub data: Vec<u8>,
}

impl Attachment {
    /// Create a new attachment from bytes
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content_id: None,
            data: data.into(),
        }
    }

    /// Mark the attachment as inline with the given content ID
    pub fn inline(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("content_id", &self.content_id)
            .field("size", &self.data.len())
            .finish()
    }
}

/// A message tag: either present without a value, or carrying one scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Present,
    Value(TagValue),
}

/// Scalar tag value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Tag {
    /// The tag's value, if it carries one
    pub fn value(&self) -> Option<&TagValue> {
        match self {
            Tag::Present => None,
            Tag::Value(value) => Some(value),
        }
    }
}

impl From<&str> for Tag {
    fn from(value: &str) -> Self {
        Tag::Value(TagValue::String(value.to_string()))
    }
}

impl From<String> for Tag {
    fn from(value: String) -> Self {
        Tag::Value(TagValue::String(value))
    }
}

impl From<i64> for Tag {
    fn from(value: i64) -> Self {
        Tag::Value(TagValue::Int(value))
    }
}

impl From<f64> for Tag {
    fn from(value: f64) -> Self {
        Tag::Value(TagValue::Float(value))
    }
}

impl From<bool> for Tag {
    fn from(value: bool) -> Self {
        Tag::Value(TagValue::Bool(value))
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Bool(b) => write!(f, "{}", b),
            TagValue::Int(i) => write!(f, "{}", i),
            TagValue::Float(x) => write!(f, "{}", x),
            TagValue::String(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_builder() {
        let email = Email::new("a@example.com", "Hi", "<p>Hi</p>")
            .text("Hi")
            .from("noreply@example.com")
            .cc("b@example.com")
            .bcc("c@example.com");

        assert_eq!(email.to, vec!["a@example.com"]);
        assert_eq!(email.from.as_deref(), Some("noreply@example.com"));
        assert_eq!(email.recipient_count(), 3);
    }

    #[test]
    fn test_tag_variants() {
        assert_eq!(Tag::Present.value(), None);
        assert_eq!(Tag::from("welcome").value(), Some(&TagValue::String("welcome".into())));
        assert_eq!(Tag::from(3i64), Tag::Value(TagValue::Int(3)));
        assert_eq!(Tag::from(true).value().unwrap().to_string(), "true");
    }

    #[test]
    fn test_tag_serialization() {
        assert_eq!(serde_json::to_value(Tag::Present).unwrap(), json!("present"));
        assert_eq!(
            serde_json::to_value(Tag::from("x")).unwrap(),
            json!({"value": "x"})
        );
        let tag: Tag = serde_json::from_value(json!({"value": 7})).unwrap();
        assert_eq!(tag, Tag::Value(TagValue::Int(7)));
    }

    #[test]
    fn test_attachment_debug_hides_content() {
        let attachment = Attachment::new("logo.png", "image/png", vec![1, 2, 3]).inline("logo");
        let debug = format!("{:?}", attachment);
        assert!(debug.contains("size: 3"));
        assert!(debug.contains("logo.png"));
        assert_eq!(attachment.content_id.as_deref(), Some("logo"));
    }
}
