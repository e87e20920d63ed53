//! Core domain types for outlines.
//!
//! The serialized shape follows the Roam JSON export: pages carry a `title`,
//! blocks carry a `string`, and both nest `children`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// One node of an outline: its uid, its text, and its nested children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Stable block identifier.
    pub uid: String,
    /// Block text.
    #[serde(rename = "string", default)]
    pub text: String,
    /// Whether the block is expanded in the outline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
    /// Ordered child blocks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

impl Block {
    /// A block with no children.
    pub fn new(uid: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            text: text.into(),
            open: None,
            children: Vec::new(),
        }
    }

    /// Builder-style helper for attaching children.
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        self.children = children;
        self
    }

    /// First direct child whose text is exactly `text`.
    pub fn child_with_text(&self, text: &str) -> Option<&Block> {
        self.children.iter().find(|child| child.text == text)
    }
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// A top-level entry of an outline export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Page title.
    pub title: String,
    /// Page uid; pages without one are reachable only through their blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Top-level blocks of the page.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}
