//! Quick search over the review table

use citeline_domain::{FieldKey, Record};

/// Fields the quick search looks at
///
/// Details, finish, size and price are not searched.
pub const SEARCHABLE_FIELDS: [FieldKey; 4] = [
    FieldKey::ItemName,
    FieldKey::Manufacturer,
    FieldKey::SpecIdNumber,
    FieldKey::Project,
];

/// Whether `record` matches `query`
///
/// An empty query matches everything. Otherwise the query must be a
/// case-insensitive substring of one of [`SEARCHABLE_FIELDS`].
pub fn matches(record: &Record, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    SEARCHABLE_FIELDS
        .iter()
        .any(|key| record.field(*key).value.to_lowercase().contains(&needle))
}

/// Records matching `query`, in input order
pub fn filter<'a>(records: &'a [Record], query: &str) -> Vec<&'a Record> {
    records.iter().filter(|r| matches(r, query)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use citeline_domain::{CitedField, DocumentId, DocumentType, RecordDraft};
    use proptest::prelude::*;

    fn record(fields: &[(FieldKey, &str)]) -> Record {
        let draft = fields.iter().fold(
            RecordDraft::new(DocumentId::new(), DocumentType::PurchaseOrder),
            |draft, (key, value)| draft.with_field(*key, CitedField::manual(*value)),
        );
        Record::from_draft(draft)
    }

    #[test]
    fn test_matches_searchable_field_only() {
        let by_manufacturer = record(&[(FieldKey::Manufacturer, "Armstrong")]);
        let by_details = record(&[(FieldKey::Details, "Armstrong-approved")]);
        assert!(matches(&by_manufacturer, "arms"));
        assert!(!matches(&by_details, "arms"));
    }

    #[test]
    fn test_every_searchable_field_is_searched() {
        for key in SEARCHABLE_FIELDS {
            assert!(matches(&record(&[(key, "Needle")]), "NEEDLE"), "{} not searched", key);
        }
    }

    #[test]
    fn test_empty_query_matches() {
        assert!(matches(&record(&[]), ""));
    }

    #[test]
    fn test_filter_keeps_order() {
        let records = vec![
            record(&[(FieldKey::ItemName, "Oak Desk")]),
            record(&[(FieldKey::ItemName, "Chair")]),
            record(&[(FieldKey::Project, "Oakland HQ")]),
        ];
        let hits = filter(&records, "oak");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, records[0].id);
        assert_eq!(hits[1].id, records[2].id);
    }

    proptest! {
        #[test]
        fn prop_any_substring_of_name_matches(name in "[A-Za-z ]{1,20}", start in 0usize..20, len in 1usize..20) {
            let start = start.min(name.len() - 1);
            let end = (start + len).min(name.len());
            let r = record(&[(FieldKey::ItemName, &name)]);
            prop_assert!(matches(&r, &name[start..end].to_uppercase()));
        }
    }
}
