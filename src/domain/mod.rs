//! Domain layer modules
//!
//! This module contains the composition logic:
//! - `template`: Frontmatter, substitution, sources and the template cache
//! - `markdown`: Markdown conversion with inline rules
//! - `email`: Outgoing message model and the `Sender` contract
//! - `html`: Entity escaping

pub mod email;
pub mod html;
pub mod markdown;
pub mod template;
