//! # Rendering Templates
//!
//! The blueprint a certificate is rendered from: markup with named
//! placeholders plus a structured [`StyleSheet`]. Styling is grouped into
//! named sections, each holding `{font, color, size}`, which keeps the
//! renderer's binding logic table-driven instead of field-by-field.
//!
//! Templates are immutable by id. The template source never updates a
//! stored template in place; an edit registers a new [`TemplateId`], so a
//! certificate's stored `template_id` always resolves to the exact markup
//! and styles it was issued with — historical verification stays stable.

use serde::{Deserialize, Serialize};

use certchain_core::{TemplateId, Timestamp, UserId};

/// Styling for one named document section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionStyle {
    /// Font family name.
    pub font: String,
    /// CSS color value.
    pub color: String,
    /// Font size in points.
    pub size: u32,
}

impl SectionStyle {
    fn new(font: &str, color: &str, size: u32) -> Self {
        Self {
            font: font.to_string(),
            color: color.to_string(),
            size,
        }
    }
}

/// Structured style sheet with per-section styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSheet {
    /// Page size name (e.g. `A4`, `Letter`).
    pub page_size: String,
    /// Page margin in points.
    pub margin: u32,
    /// Title section styling.
    pub title: SectionStyle,
    /// Body section styling.
    pub body: SectionStyle,
    /// Recipient name section styling.
    pub recipient: SectionStyle,
    /// Issuer name section styling.
    pub issuer: SectionStyle,
    /// Description section styling.
    pub description: SectionStyle,
    /// Issue/expiry dates section styling.
    pub dates: SectionStyle,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            page_size: "A4".to_string(),
            margin: 40,
            title: SectionStyle::new("Georgia", "#1a1a2e", 32),
            body: SectionStyle::new("Helvetica", "#333333", 14),
            recipient: SectionStyle::new("Georgia", "#0f3460", 24),
            issuer: SectionStyle::new("Helvetica", "#555555", 12),
            description: SectionStyle::new("Helvetica", "#444444", 12),
            dates: SectionStyle::new("Helvetica", "#777777", 10),
        }
    }
}

/// A rendering template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Immutable template identifier.
    pub id: TemplateId,
    /// Human-readable template name.
    pub name: String,
    /// What the template is for.
    pub description: String,
    /// Markup body with `{{name}}` placeholders.
    pub markup: String,
    /// Structured style sheet applied at render time.
    pub styles: StyleSheet,
    /// Placeholder names the markup requires. Every listed name must be
    /// resolvable from certificate data at render time or rendering fails.
    pub placeholders: Vec<String>,
    /// Whether this is the platform default template.
    pub is_default: bool,
    /// User who registered the template.
    pub created_by: UserId,
    /// Registration time.
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_style_sheet_covers_all_sections() {
        let styles = StyleSheet::default();
        assert_eq!(styles.page_size, "A4");
        assert!(styles.title.size > styles.dates.size);
    }

    #[test]
    fn style_sheet_serializes_camel_case() {
        let val = serde_json::to_value(StyleSheet::default()).unwrap();
        assert!(val.get("pageSize").is_some());
        assert!(val.get("page_size").is_none());
    }

    #[test]
    fn template_serde_roundtrip() {
        let template = Template {
            id: TemplateId::new(),
            name: "Course Completion".to_string(),
            description: "Standard completion certificate".to_string(),
            markup: "<h1>{{title}}</h1><p>{{recipientName}}</p>".to_string(),
            styles: StyleSheet::default(),
            placeholders: vec!["title".to_string(), "recipientName".to_string()],
            is_default: true,
            created_by: UserId::new(),
            created_at: Timestamp::now(),
        };
        let json = serde_json::to_string(&template).unwrap();
        let back: Template = serde_json::from_str(&json).unwrap();
        assert_eq!(template, back);
    }
}
