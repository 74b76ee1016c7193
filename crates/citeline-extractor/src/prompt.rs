//! Extraction profiles: the schema and system prompt sent per document type
//!
//! Only purchase orders and specifications have their own profile. Every
//! other document type is mapped to the purchase-order profile in
//! [`profile_for`], spelled out per variant.

use citeline_domain::{DocumentType, FieldKey};
use serde_json::{json, Map, Value};

/// Which profile a document was extracted with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// Line items of a furniture or fixtures purchase order
    PurchaseOrder,
    /// Primary products of a CSI three-part specification
    Specification,
}

impl ProfileKind {
    /// Lowercase label
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::PurchaseOrder => "purchase_order",
            ProfileKind::Specification => "specification",
        }
    }
}

/// Schema plus system prompt for one extraction call
#[derive(Debug, Clone)]
pub struct ExtractionProfile {
    /// Which profile this is
    pub kind: ProfileKind,
    /// JSON schema of the payload, rendered as text
    pub schema: String,
    /// System prompt
    pub prompt: &'static str,
}

/// Profile used for a document type
pub fn profile_for(document_type: DocumentType, products_key: &str) -> ExtractionProfile {
    let kind = match document_type {
        DocumentType::PurchaseOrder => ProfileKind::PurchaseOrder,
        DocumentType::Specification => ProfileKind::Specification,
        // No dedicated profile yet; these use the purchase-order one.
        DocumentType::Drawing => ProfileKind::PurchaseOrder,
        DocumentType::Rfi => ProfileKind::PurchaseOrder,
        DocumentType::Submittal => ProfileKind::PurchaseOrder,
    };

    let prompt = match kind {
        ProfileKind::PurchaseOrder => PURCHASE_ORDER_PROMPT,
        ProfileKind::Specification => SPECIFICATION_PROMPT,
    };

    ExtractionProfile {
        kind,
        schema: build_schema(kind, products_key).to_string(),
        prompt,
    }
}

fn field_description(kind: ProfileKind, key: FieldKey) -> &'static str {
    match (kind, key) {
        (_, FieldKey::ItemName) => {
            "Concise, human-recognizable product name without manufacturer, model line or features"
        }
        (_, FieldKey::ProductDescription) => {
            "Full manufacturer-specific description: product line, model, configuration"
        }
        (_, FieldKey::Manufacturer) => "Company or brand that makes the product",
        (_, FieldKey::Tag) => "Architect's project tag for the item, e.g. C-01",
        (ProfileKind::Specification, FieldKey::SpecIdNumber) => {
            "CSI MasterFormat number of the specification section, e.g. 09 64 66"
        }
        (ProfileKind::PurchaseOrder, FieldKey::SpecIdNumber) => {
            "CSI MasterFormat number if printed on the document, e.g. 09 51 00"
        }
        (_, FieldKey::Project) => "Project name or number",
        (_, FieldKey::Finish) => "Finish, color, fabric or material grade",
        (_, FieldKey::Size) => "Dimensions in any format given",
        (ProfileKind::Specification, FieldKey::Price) => "Price if stated, otherwise N/A",
        (ProfileKind::PurchaseOrder, FieldKey::Price) => "Unit price with currency symbol",
        (_, FieldKey::Details) => "Critical installation or procurement notes not covered elsewhere",
    }
}

fn build_schema(kind: ProfileKind, products_key: &str) -> Value {
    let mut properties = Map::new();
    for key in FieldKey::ALL {
        properties.insert(
            key.as_str().to_string(),
            json!({
                "type": "string",
                "description": field_description(kind, key),
            }),
        );
    }
    let required: Vec<&str> = FieldKey::ALL.iter().map(FieldKey::as_str).collect();

    json!({
        "type": "object",
        "properties": {
            products_key: {
                "type": "array",
                "description": "Every product found, in document order",
                "items": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                },
            },
        },
        "required": [products_key],
    })
}

const PURCHASE_ORDER_PROMPT: &str = "\
Extract every product line item from this furniture and fixtures purchase order.

Rules:
- One entry per line item. When a tag is present (e.g. CH-01), produce exactly one entry for that tag and merge multi-line descriptions into it.
- Skip non-product lines such as freight, tax and installation.
- itemName is a short descriptive name an architect would use (\"Mesh-Back Task Chair\", not \"Chair\" and not \"Zody II\"). Never put manufacturer, model line or feature lists in it.
- productDescription holds the full manufacturer description, without repeating tag, finish, size or price.
- price is the unit price only.
- specIdNumber is filled only when a MasterFormat number (DD DD DD) is printed on the document.
- Use \"N/A\" for anything not stated. Do not guess.
- Keep document order.";

const SPECIFICATION_PROMPT: &str = "\
Extract the primary products from this CSI three-part specification section.

Rules:
- Read Part 2 (Products) only.
- Extract a product only when Part 2 names approved manufacturers for it (a MANUFACTURERS article, a basis-of-design product, or an acceptable-manufacturers list).
- Extract only products that belong to the section's own MasterFormat number; skip supporting materials such as adhesives, fasteners or underlayment.
- itemName is the product category in plain language (\"Wood Athletic Flooring\"), never a brand or model.
- productDescription holds the basis-of-design product and its options.
- specIdNumber is the section number of this specification.
- Use \"N/A\" for anything not stated. Do not guess.
- Keep document order.";
