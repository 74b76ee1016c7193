//! Product records
//!
//! A [`Record`] is one extracted product. Its cited fields form a closed set
//! named by [`FieldKey`]; the same enumeration drives search, export columns
//! and the field navigator, so adding a field is a compile error everywhere
//! it has not been handled.

use crate::citation::CitedField;
use crate::document::DocumentType;
use crate::id::{DocumentId, RecordId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of one cited field on a record
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    /// Product name
    #[default]
    ItemName,
    /// Free-text product description
    ProductDescription,
    /// Manufacturer or supplier
    Manufacturer,
    /// Drawing or schedule tag
    Tag,
    /// Classification code, e.g. "09 51 00"
    SpecIdNumber,
    /// Project name
    Project,
    /// Finish or color
    Finish,
    /// Dimensions
    Size,
    /// Price
    Price,
    /// Anything else worth keeping
    Details,
}

impl FieldKey {
    /// Every field, in navigator order
    pub const ALL: [FieldKey; 10] = [
        FieldKey::ItemName,
        FieldKey::ProductDescription,
        FieldKey::Manufacturer,
        FieldKey::SpecIdNumber,
        FieldKey::Tag,
        FieldKey::Project,
        FieldKey::Finish,
        FieldKey::Size,
        FieldKey::Price,
        FieldKey::Details,
    ];

    /// camelCase key, as used in payloads and storage
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::ItemName => "itemName",
            FieldKey::ProductDescription => "productDescription",
            FieldKey::Manufacturer => "manufacturer",
            FieldKey::Tag => "tag",
            FieldKey::SpecIdNumber => "specIdNumber",
            FieldKey::Project => "project",
            FieldKey::Finish => "finish",
            FieldKey::Size => "size",
            FieldKey::Price => "price",
            FieldKey::Details => "details",
        }
    }

    /// Short label for the field navigator
    pub fn label(&self) -> &'static str {
        match self {
            FieldKey::ItemName => "Name",
            FieldKey::ProductDescription => "Description",
            FieldKey::Manufacturer => "Manufacturer",
            FieldKey::Tag => "Tag",
            FieldKey::SpecIdNumber => "Spec ID",
            FieldKey::Project => "Project",
            FieldKey::Finish => "Finish",
            FieldKey::Size => "Size",
            FieldKey::Price => "Price",
            FieldKey::Details => "Details",
        }
    }

    /// Parse a key, accepting camelCase, snake_case or kebab-case
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().to_lowercase() == normalized)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Unknown field '{}'", s))
    }
}

/// One extracted product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Immutable identifier
    pub id: RecordId,
    /// Owning document, immutable
    pub document_id: DocumentId,
    /// Type of the owning document at extraction time
    pub document_type: DocumentType,
    /// Creation timestamp (Unix seconds)
    pub created_at: u64,
    /// Product name
    pub item_name: CitedField,
    /// Product description
    pub product_description: CitedField,
    /// Manufacturer
    pub manufacturer: CitedField,
    /// Tag
    pub tag: CitedField,
    /// Classification code
    pub spec_id_number: CitedField,
    /// Project
    pub project: CitedField,
    /// Finish
    pub finish: CitedField,
    /// Size
    pub size: CitedField,
    /// Price
    pub price: CitedField,
    /// Details
    pub details: CitedField,
}

impl Record {
    /// Build a record from a draft, assigning a fresh id and timestamp
    pub fn from_draft(draft: RecordDraft) -> Self {
        Self::restore(RecordId::new(), crate::current_timestamp(), draft)
    }

    /// Rebuild a stored record from its identity and fields
    pub fn restore(id: RecordId, created_at: u64, draft: RecordDraft) -> Self {
        let mut record = Self {
            id,
            document_id: draft.document_id,
            document_type: draft.document_type,
            created_at,
            item_name: CitedField::default(),
            product_description: CitedField::default(),
            manufacturer: CitedField::default(),
            tag: CitedField::default(),
            spec_id_number: CitedField::default(),
            project: CitedField::default(),
            finish: CitedField::default(),
            size: CitedField::default(),
            price: CitedField::default(),
            details: CitedField::default(),
        };
        for (key, field) in draft.fields {
            record.set_field(key, field);
        }
        record
    }

    /// Borrow one field
    pub fn field(&self, key: FieldKey) -> &CitedField {
        match key {
            FieldKey::ItemName => &self.item_name,
            FieldKey::ProductDescription => &self.product_description,
            FieldKey::Manufacturer => &self.manufacturer,
            FieldKey::Tag => &self.tag,
            FieldKey::SpecIdNumber => &self.spec_id_number,
            FieldKey::Project => &self.project,
            FieldKey::Finish => &self.finish,
            FieldKey::Size => &self.size,
            FieldKey::Price => &self.price,
            FieldKey::Details => &self.details,
        }
    }

    fn field_mut(&mut self, key: FieldKey) -> &mut CitedField {
        match key {
            FieldKey::ItemName => &mut self.item_name,
            FieldKey::ProductDescription => &mut self.product_description,
            FieldKey::Manufacturer => &mut self.manufacturer,
            FieldKey::Tag => &mut self.tag,
            FieldKey::SpecIdNumber => &mut self.spec_id_number,
            FieldKey::Project => &mut self.project,
            FieldKey::Finish => &mut self.finish,
            FieldKey::Size => &mut self.size,
            FieldKey::Price => &mut self.price,
            FieldKey::Details => &mut self.details,
        }
    }

    /// Replace one field wholesale, citations included
    pub fn set_field(&mut self, key: FieldKey, field: CitedField) {
        *self.field_mut(key) = field;
    }

    /// Apply a patch: named fields are replaced, all others untouched
    pub fn apply(&mut self, patch: &RecordPatch) {
        for (key, field) in patch.iter() {
            self.set_field(*key, field.clone());
        }
    }

    /// Every field in navigator order
    pub fn fields(&self) -> impl Iterator<Item = (FieldKey, &CitedField)> + '_ {
        FieldKey::ALL.into_iter().map(move |key| (key, self.field(key)))
    }
}

/// Fields for a record that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    /// Owning document
    pub document_id: DocumentId,
    /// Document type at extraction time
    pub document_type: DocumentType,
    /// Fields present in the extraction; absent keys become empty fields
    pub fields: Vec<(FieldKey, CitedField)>,
}

impl RecordDraft {
    /// Draft with no fields
    pub fn new(document_id: DocumentId, document_type: DocumentType) -> Self {
        Self {
            document_id,
            document_type,
            fields: Vec::new(),
        }
    }

    /// Builder-style field setter
    pub fn with_field(mut self, key: FieldKey, field: CitedField) -> Self {
        self.fields.push((key, field));
        self
    }
}

/// Named fields to replace on an existing record
///
/// Each entry replaces the whole field, citations included. A caller that
/// only means to change the value must carry the existing citations over
/// (see [`CitedField::with_value`]).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordPatch {
    fields: Vec<(FieldKey, CitedField)>,
}

impl RecordPatch {
    /// Empty patch
    pub fn new() -> Self {
        Self::default()
    }

    /// Patch replacing a single field
    pub fn single(key: FieldKey, field: CitedField) -> Self {
        Self::new().set(key, field)
    }

    /// Add or overwrite one entry; a key appears at most once
    pub fn set(mut self, key: FieldKey, field: CitedField) -> Self {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = field,
            None => self.fields.push((key, field)),
        }
        self
    }

    /// Entry for one key
    pub fn get(&self, key: FieldKey) -> Option<&CitedField> {
        self.fields.iter().find(|(k, _)| *k == key).map(|(_, f)| f)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &(FieldKey, CitedField)> {
        self.fields.iter()
    }

    /// Keys named by the patch
    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.fields.iter().map(|(k, _)| *k)
    }

    /// Whether the patch names no field
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of fields named
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::citation::{BlockType, BoundingBox, Citation, Confidence};

    fn cited(value: &str, page: u32) -> CitedField {
        CitedField::new(
            value,
            vec![Citation::new(
                BlockType::Table,
                value,
                BoundingBox::new(0.1, 0.1, 0.2, 0.02, page),
                Confidence::High,
            )],
        )
    }

    fn sample() -> Record {
        Record::from_draft(
            RecordDraft::new(DocumentId::new(), DocumentType::PurchaseOrder)
                .with_field(FieldKey::ItemName, cited("Desk", 2))
                .with_field(FieldKey::Manufacturer, cited("Acme", 2)),
        )
    }

    #[test]
    fn test_from_draft_fills_absent_fields() {
        let record = sample();
        assert_eq!(record.item_name.value, "Desk");
        assert_eq!(record.manufacturer.value, "Acme");
        assert_eq!(record.finish, CitedField::default());
        assert!(record.created_at > 0);
    }

    #[test]
    fn test_field_accessor_covers_all_keys() {
        let mut record = sample();
        for (i, key) in FieldKey::ALL.into_iter().enumerate() {
            record.set_field(key, CitedField::manual(format!("v{}", i)));
        }
        for (i, (key, field)) in record.fields().enumerate() {
            assert_eq!(field.value, format!("v{}", i), "field {}", key);
        }
    }

    #[test]
    fn test_apply_patch_leaves_other_fields() {
        let mut record = sample();
        let before = record.manufacturer.clone();
        let patch = RecordPatch::single(FieldKey::ItemName, record.item_name.with_value("Table"));
        record.apply(&patch);
        assert_eq!(record.item_name.value, "Table");
        assert_eq!(record.item_name.citations.len(), 1);
        assert_eq!(record.manufacturer, before);
    }

    #[test]
    fn test_patch_key_appears_once() {
        let patch = RecordPatch::new()
            .set(FieldKey::Tag, CitedField::manual("A"))
            .set(FieldKey::Tag, CitedField::manual("B"));
        assert_eq!(patch.len(), 1);
        assert_eq!(patch.get(FieldKey::Tag).map(|f| f.value.as_str()), Some("B"));
    }

    #[test]
    fn test_field_key_parse() {
        assert_eq!(FieldKey::parse("itemName"), Some(FieldKey::ItemName));
        assert_eq!(FieldKey::parse("spec_id_number"), Some(FieldKey::SpecIdNumber));
        assert_eq!(FieldKey::parse("product-description"), Some(FieldKey::ProductDescription));
        assert_eq!(FieldKey::parse("colour"), None);
        assert!("nope".parse::<FieldKey>().is_err());
    }

    #[test]
    fn test_field_keys_unique() {
        let mut keys: Vec<_> = FieldKey::ALL.iter().map(|k| k.as_str()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), FieldKey::ALL.len());
    }

    #[test]
    fn test_record_json_uses_camel_case() {
        let record = sample();
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("itemName").is_some());
        assert!(json.get("specIdNumber").is_some());
        assert_eq!(json["documentType"], "purchase_order");
    }
}
