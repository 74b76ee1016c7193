//! Parse extraction payloads into record drafts
//!
//! The payload is an object holding an array under a configured key; each
//! array element maps field names to `{value, citations}`. Anything
//! malformed below the top level is repaired rather than rejected: absent
//! fields become empty, missing boxes become degenerate, unknown labels
//! fall back to defaults.

use crate::error::ExtractorError;
use citeline_domain::{
    BlockType, BoundingBox, Citation, CitedField, Confidence, DocumentId, DocumentType, FieldKey,
    GranularConfidence, ParentBlock, RecordDraft,
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Parse a payload into drafts, one per array element
///
/// Invalid JSON is an error. A payload without an array under `products_key`
/// is not: it yields no drafts and a warning.
pub fn parse_products(
    body: &str,
    products_key: &str,
    document_id: DocumentId,
    document_type: DocumentType,
) -> Result<Vec<RecordDraft>, ExtractorError> {
    let json_str = extract_json(body)?;
    let json: Value = serde_json::from_str(&json_str)
        .map_err(|e| ExtractorError::InvalidFormat(format!("JSON parse error: {}", e)))?;

    let Some(items) = json.get(products_key).and_then(Value::as_array) else {
        warn!("No '{}' array found in extraction result", products_key);
        return Ok(Vec::new());
    };

    let mut drafts = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match item.as_object() {
            Some(obj) => drafts.push(parse_item(obj, document_id, document_type)),
            None => warn!("Skipping item {}: not a JSON object", idx),
        }
    }
    Ok(drafts)
}

/// Extract JSON from a payload, handling markdown code blocks
fn extract_json(body: &str) -> Result<String, ExtractorError> {
    let trimmed = body.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractorError::InvalidFormat("Empty code block".to_string()));
        }
        // Drop the opening fence and, if present, the closing one
        let end = if lines[lines.len() - 1].trim_start().starts_with("```") {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}

fn parse_item(obj: &Map<String, Value>, document_id: DocumentId, document_type: DocumentType) -> RecordDraft {
    let mut draft = RecordDraft::new(document_id, document_type);
    for key in FieldKey::ALL {
        let field = obj.get(key.as_str()).map(parse_field).unwrap_or_default();
        draft.fields.push((key, field));
    }
    draft
}

fn parse_field(json: &Value) -> CitedField {
    match json {
        Value::Object(obj) => {
            let value = obj.get("value").map(scalar_to_string).unwrap_or_default();
            let citations = obj
                .get("citations")
                .and_then(Value::as_array)
                .map(|list| list.iter().filter_map(parse_citation).collect())
                .unwrap_or_default();
            CitedField::new(value, citations)
        }
        // Bare value with no citation wrapper
        other => CitedField::manual(scalar_to_string(other)),
    }
}

fn scalar_to_string(json: &Value) -> String {
    match json {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_citation(json: &Value) -> Option<Citation> {
    let Some(obj) = json.as_object() else {
        debug!("Dropping citation that is not an object");
        return None;
    };

    let block_type = obj
        .get("type")
        .and_then(Value::as_str)
        .and_then(BlockType::parse)
        .unwrap_or_default();
    let content = obj.get("content").and_then(Value::as_str).unwrap_or_default().to_string();
    let bbox = parse_bbox(obj.get("bbox"));
    let confidence = obj
        .get("confidence")
        .and_then(Value::as_str)
        .and_then(Confidence::parse)
        .unwrap_or_default();
    let granular_confidence = obj
        .get("granular_confidence")
        .and_then(Value::as_object)
        .map(|g| GranularConfidence {
            extract_confidence: g.get("extract_confidence").and_then(Value::as_f64),
            parse_confidence: g.get("parse_confidence").and_then(Value::as_f64).unwrap_or(0.0),
        });
    let parent_block = obj
        .get("parentBlock")
        .or_else(|| obj.get("parent_block"))
        .and_then(Value::as_object)
        .map(|p| ParentBlock {
            block_type: p
                .get("type")
                .and_then(Value::as_str)
                .and_then(BlockType::parse)
                .unwrap_or_default(),
            content: p.get("content").and_then(Value::as_str).unwrap_or_default().to_string(),
            bbox: parse_bbox(p.get("bbox")),
        });

    Some(Citation {
        block_type,
        content,
        bbox,
        confidence,
        granular_confidence,
        parent_block,
    })
}

fn parse_bbox(json: Option<&Value>) -> BoundingBox {
    let Some(obj) = json.and_then(Value::as_object) else {
        debug!("Citation has no bounding box, using degenerate box");
        return BoundingBox::degenerate();
    };

    let coord = |name: &str| obj.get(name).and_then(Value::as_f64).unwrap_or(0.0);
    let page = |name: &str| {
        obj.get(name)
            .and_then(Value::as_f64)
            .filter(|p| p.is_finite() && *p >= 1.0)
            .map(|p| p.min(u32::MAX as f64) as u32)
    };

    let mut bbox = BoundingBox::new(
        coord("left"),
        coord("top"),
        coord("width"),
        coord("height"),
        page("page").unwrap_or(1),
    );
    bbox.original_page = page("original_page");
    bbox
}
