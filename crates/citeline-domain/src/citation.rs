//! Citations and cited fields
//!
//! A [`Citation`] points from an extracted value back to the page, box and
//! structural block of the source PDF that justifies it. A [`CitedField`]
//! pairs a string value with zero or more citations, primary source first.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder value meaning "not available"
pub const NOT_AVAILABLE: &str = "N/A";

/// Kind of layout block a citation was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BlockType {
    /// Tabular region
    Table,
    /// Running text
    #[default]
    Text,
    /// Whole list
    List,
    /// Single list entry
    #[serde(rename = "List Item")]
    ListItem,
    /// Figure or picture
    Image,
    /// Heading of a document section
    #[serde(rename = "Section Header")]
    SectionHeader,
    /// Page header
    Header,
    /// Document title
    Title,
}

impl BlockType {
    /// Label as emitted by the extraction backend
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Table => "Table",
            BlockType::Text => "Text",
            BlockType::List => "List",
            BlockType::ListItem => "List Item",
            BlockType::Image => "Image",
            BlockType::SectionHeader => "Section Header",
            BlockType::Header => "Header",
            BlockType::Title => "Title",
        }
    }

    /// Parse a backend label, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "table" => Some(BlockType::Table),
            "text" => Some(BlockType::Text),
            "list" => Some(BlockType::List),
            "list item" | "listitem" | "list_item" => Some(BlockType::ListItem),
            "image" | "figure" => Some(BlockType::Image),
            "section header" | "sectionheader" | "section_header" => Some(BlockType::SectionHeader),
            "header" => Some(BlockType::Header),
            "title" => Some(BlockType::Title),
            _ => None,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative confidence of a citation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Strong match between value and source
    High,
    /// Plausible match
    Medium,
    /// Weak match
    #[default]
    Low,
}

impl Confidence {
    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }

    /// Parse a label, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high" => Some(Confidence::High),
            "medium" => Some(Confidence::Medium),
            "low" => Some(Confidence::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page-relative rectangle plus its page
///
/// Coordinates are fractions of the page dimensions. They are not clamped
/// here; a box may legitimately run past a page edge. Display code calls
/// [`BoundingBox::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Distance from the left edge
    pub left: f64,
    /// Distance from the top edge
    pub top: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
    /// 1-based page index
    pub page: u32,
    /// Page index in the unsplit original, for multi-pass documents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_page: Option<u32>,
}

impl BoundingBox {
    /// Create a box, forcing the page to be at least 1
    pub fn new(left: f64, top: f64, width: f64, height: f64, page: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
            page: page.max(1),
            original_page: None,
        }
    }

    /// Zero-area box on page 1, substituted when a citation has no box
    pub fn degenerate() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, 1)
    }

    /// Whether this box has no area
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Copy of this box with every edge kept inside the page
    pub fn clamped(&self) -> Self {
        let clamp = |v: f64| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        let left = clamp(self.left);
        let top = clamp(self.top);
        let right = clamp(self.left + self.width).max(left);
        let bottom = clamp(self.top + self.height).max(top);
        Self {
            left,
            top,
            width: right - left,
            height: bottom - top,
            page: self.page.max(1),
            original_page: self.original_page,
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::degenerate()
    }
}

/// Numeric confidence scores, present when requested from the backend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GranularConfidence {
    /// Confidence of the field extraction, if the backend computed one
    #[serde(default)]
    pub extract_confidence: Option<f64>,
    /// Confidence of the underlying layout parse
    #[serde(default)]
    pub parse_confidence: f64,
}

/// Structural block (table, section) that contained a citation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentBlock {
    /// Kind of the enclosing block
    pub block_type: BlockType,
    /// Text of the enclosing block
    #[serde(default)]
    pub content: String,
    /// Location of the enclosing block
    pub bbox: BoundingBox,
}

/// One source location backing a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Kind of block the value was read from
    pub block_type: BlockType,
    /// Verbatim source text, possibly empty
    #[serde(default)]
    pub content: String,
    /// Where on which page
    pub bbox: BoundingBox,
    /// Qualitative confidence
    pub confidence: Confidence,
    /// Numeric confidence scores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granular_confidence: Option<GranularConfidence>,
    /// Enclosing structural block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_block: Option<ParentBlock>,
}

impl Citation {
    /// Create a citation with no granular scores or parent block
    pub fn new(
        block_type: BlockType,
        content: impl Into<String>,
        bbox: BoundingBox,
        confidence: Confidence,
    ) -> Self {
        Self {
            block_type,
            content: content.into(),
            bbox,
            confidence,
            granular_confidence: None,
            parent_block: None,
        }
    }

    /// 1-based page of this citation
    pub fn page(&self) -> u32 {
        self.bbox.page
    }
}

/// A string value together with its ordered citations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CitedField {
    /// The value as displayed and exported
    #[serde(default)]
    pub value: String,
    /// Sources, primary first; empty for generated or typed-in values
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl CitedField {
    /// Create a field with citations
    pub fn new(value: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            value: value.into(),
            citations,
        }
    }

    /// Create a field with no citations
    pub fn manual(value: impl Into<String>) -> Self {
        Self::new(value, Vec::new())
    }

    /// Citations of this field, primary first
    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// First citation, if any
    pub fn primary_citation(&self) -> Option<&Citation> {
        self.citations.first()
    }

    /// Value exists but nothing in the source backs it
    ///
    /// Exact comparison: only `""` and `"N/A"` count as having no value.
    pub fn is_generated(&self) -> bool {
        self.citations.is_empty() && !self.value.is_empty() && self.value != NOT_AVAILABLE
    }

    /// Value is blank or "N/A", ignoring whitespace and case
    pub fn is_missing(&self) -> bool {
        let trimmed = self.value.trim();
        trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NOT_AVAILABLE)
    }

    /// Same citations, new value
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            citations: self.citations.clone(),
        }
    }
}

impl From<&str> for CitedField {
    fn from(value: &str) -> Self {
        Self::manual(value)
    }
}

/// Citations of an optional field, empty when the field is absent
pub fn citations_of(field: Option<&CitedField>) -> &[Citation] {
    field.map(CitedField::citations).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cite(page: u32) -> Citation {
        Citation::new(
            BlockType::Table,
            "Armstrong ceiling tile",
            BoundingBox::new(0.1, 0.2, 0.3, 0.05, page),
            Confidence::High,
        )
    }

    #[test]
    fn test_generated_detection_table() {
        let cases = [
            ("", false, false),
            (NOT_AVAILABLE, false, false),
            ("Desk", false, true),
            ("", true, false),
            (NOT_AVAILABLE, true, false),
            ("Desk", true, false),
        ];
        for (value, cited, expected) in cases {
            let citations = if cited { vec![cite(1)] } else { vec![] };
            let field = CitedField::new(value, citations);
            assert_eq!(
                field.is_generated(),
                expected,
                "value={:?} cited={}",
                value,
                cited
            );
        }
    }

    #[test]
    fn test_generated_is_exact_not_trimmed() {
        // "n/a" in lowercase is a real value as far as provenance goes
        assert!(CitedField::manual("n/a").is_generated());
        assert!(CitedField::manual(" ").is_generated());
    }

    #[test]
    fn test_missing_is_trimmed_and_case_insensitive() {
        assert!(CitedField::manual("").is_missing());
        assert!(CitedField::manual("  ").is_missing());
        assert!(CitedField::manual(" n/a ").is_missing());
        assert!(CitedField::manual("N/A").is_missing());
        assert!(!CitedField::manual("09 51 00").is_missing());
    }

    #[test]
    fn test_citations_of_absent_field() {
        assert!(citations_of(None).is_empty());
        let field = CitedField::new("Desk", vec![cite(3), cite(5)]);
        assert_eq!(citations_of(Some(&field)).len(), 2);
        assert_eq!(field.primary_citation().map(Citation::page), Some(3));
    }

    #[test]
    fn test_with_value_keeps_citations() {
        let field = CitedField::new("Desk", vec![cite(3), cite(5)]);
        let edited = field.with_value("Standing desk");
        assert_eq!(edited.value, "Standing desk");
        assert_eq!(edited.citations, field.citations);
    }

    #[test]
    fn test_page_is_at_least_one() {
        assert_eq!(BoundingBox::new(0.0, 0.0, 0.1, 0.1, 0).page, 1);
        assert_eq!(BoundingBox::degenerate().page, 1);
        assert!(BoundingBox::degenerate().is_degenerate());
    }

    #[test]
    fn test_clamped_box() {
        let bbox = BoundingBox::new(0.8, -0.1, 0.5, 0.3, 2);
        let clamped = bbox.clamped();
        assert_eq!(clamped.left, 0.8);
        assert_eq!(clamped.top, 0.0);
        assert!((clamped.width - 0.2).abs() < 1e-9);
        assert!((clamped.height - 0.2).abs() < 1e-9);
        assert_eq!(clamped.page, 2);
        // The model itself is untouched
        assert_eq!(bbox.width, 0.5);
    }

    #[test]
    fn test_block_type_labels() {
        assert_eq!(BlockType::parse("List Item"), Some(BlockType::ListItem));
        assert_eq!(BlockType::parse("section header"), Some(BlockType::SectionHeader));
        assert_eq!(BlockType::parse("Footnote"), None);
        let json = serde_json::to_string(&BlockType::SectionHeader).unwrap();
        assert_eq!(json, "\"Section Header\"");
    }

    #[test]
    fn test_confidence_parse() {
        assert_eq!(Confidence::parse("HIGH"), Some(Confidence::High));
        assert_eq!(Confidence::parse("medium"), Some(Confidence::Medium));
        assert_eq!(Confidence::parse("certain"), None);
        assert_eq!(Confidence::Low.to_string(), "low");
    }
}
