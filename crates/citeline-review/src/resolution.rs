//! Field resolution: which page to show and what to highlight
//!
//! A field's first citation decides the page. Every citation on the
//! current page becomes a highlight region. Fields without citations
//! leave the viewer where it is.

use citeline_domain::{
    BlockType, BoundingBox, CitedField, Confidence, FieldKey, Record, RecordId,
};
use std::fmt;

/// Field shown for `key`, falling back to the item name
pub fn resolve_field(record: &Record, key: Option<FieldKey>) -> &CitedField {
    record.field(key.unwrap_or(FieldKey::ItemName))
}

/// Page of the resolved field's first citation
///
/// `None` means "stay on the current page".
pub fn target_page(record: &Record, key: Option<FieldKey>) -> Option<u32> {
    resolve_field(record, key)
        .primary_citation()
        .map(|citation| citation.page())
}

/// Highlight regions for `page`, one per citation on that page
///
/// Boxes are clamped to the page.
pub fn highlights_for_page(record: &Record, key: Option<FieldKey>, page: u32) -> Vec<BoundingBox> {
    resolve_field(record, key)
        .citations
        .iter()
        .filter(|citation| citation.page() == page)
        .map(|citation| citation.bbox.clamped())
        .collect()
}

/// Source badge shown next to a field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Provenance {
    /// Classification code filled in without a source
    AiGenerated,
    /// Backed by at least one citation; describes the first
    Cited {
        /// Block the value was read from
        block_type: BlockType,
        /// Backend confidence
        confidence: Confidence,
        /// 1-based page
        page: u32,
    },
    /// No citation at all
    NoSource,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::AiGenerated => f.write_str("AI generated"),
            Provenance::Cited {
                block_type,
                confidence,
                page,
            } => write!(f, "{} ({} confidence), page {}", block_type, confidence, page),
            Provenance::NoSource => f.write_str("no source citation"),
        }
    }
}

/// Badge for `field` displayed under `key`
///
/// Only the classification field can be "AI generated"; any other field
/// without citations has no source.
pub fn provenance(key: FieldKey, field: &CitedField) -> Provenance {
    if key == FieldKey::SpecIdNumber && field.is_generated() {
        return Provenance::AiGenerated;
    }
    match field.primary_citation() {
        Some(citation) => Provenance::Cited {
            block_type: citation.block_type,
            confidence: citation.confidence,
            page: citation.page(),
        },
        None => Provenance::NoSource,
    }
}

/// Current page of the document viewer
///
/// Tracks the selection it last reconciled so that only a change of
/// record or field moves the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageNavigator {
    current: u32,
    total: u32,
    last_selection: Option<(RecordId, FieldKey)>,
}

impl PageNavigator {
    /// Open a document of `total` pages
    ///
    /// Starts on `target` when it is a valid page, otherwise on page 1.
    pub fn open(total: u32, target: Option<u32>) -> Self {
        let mut navigator = Self {
            current: 1,
            total,
            last_selection: None,
        };
        if let Some(page) = target.filter(|p| navigator.in_range(*p)) {
            navigator.current = page;
        }
        navigator
    }

    /// Open a document positioned for `record` and `key`
    pub fn open_for(total: u32, record: &Record, key: FieldKey) -> Self {
        let mut navigator = Self::open(total, target_page(record, Some(key)));
        navigator.last_selection = Some((record.id, key));
        navigator
    }

    /// Current 1-based page
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Page count
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Whether `page` exists in this document
    pub fn in_range(&self, page: u32) -> bool {
        (1..=self.total).contains(&page)
    }

    /// Jump to `page` if it exists; returns whether the page changed
    pub fn go_to(&mut self, page: u32) -> bool {
        if !self.in_range(page) || page == self.current {
            return false;
        }
        self.current = page;
        true
    }

    /// Next page, stopping at the last
    pub fn next(&mut self) -> bool {
        self.go_to(self.current.saturating_add(1))
    }

    /// Previous page, stopping at the first
    pub fn prev(&mut self) -> bool {
        self.go_to(self.current.saturating_sub(1))
    }

    /// Follow a selection change
    ///
    /// Navigates only when the record or field differs from the last
    /// reconciled selection and the target page is in range. An absent or
    /// out-of-range target leaves the page alone. Returns whether the page
    /// changed.
    pub fn reconcile(&mut self, record: &Record, key: FieldKey) -> bool {
        let selection = (record.id, key);
        if self.last_selection == Some(selection) {
            return false;
        }
        self.last_selection = Some(selection);

        match target_page(record, Some(key)) {
            Some(page) => self.go_to(page),
            None => false,
        }
    }
}
