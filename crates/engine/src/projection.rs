//! Projection tables
//!
//! A projection table is an ordered list of `(output field, source)` pairs
//! applied to one record. Extraction is null-safe: a missing path yields
//! `null` in the projected map, never an error.
//!
//! Tables are versioned so that index documents produced by different
//! generators stay distinguishable:
//!
//! | Version | Table | Fields |
//! |---------|-------|--------|
//! | 1 | `catalog_entry_v1` | id, name, status, category, manufacturer, filename |
//! | 2 | `catalog_entry` | id, name, status, category, atc_code, registration_number, filename |
//!
//! The export and packaging tables are not stored in index documents and
//! share the current version number.

use serde_json::Value;

use medcat_core::{get_at_path, FieldMap, JsonPath, Record, SOURCE_REF_FIELD};

/// Projection table version written into new index documents
pub const CURRENT_PROJECTION_VERSION: u32 = 2;

/// Where a projected field takes its value from
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSource {
    /// Path into the whole record
    Record(JsonPath),
    /// Path into the current item of a per-item table
    Item(JsonPath),
    /// The record's source reference (its file name)
    SourceRef,
}

/// One output field of a projection table
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Output field name
    pub name: String,
    /// Value source
    pub source: FieldSource,
}

impl FieldSpec {
    fn record(name: &str, keys: &[&str]) -> Self {
        FieldSpec {
            name: name.to_string(),
            source: FieldSource::Record(path(keys)),
        }
    }

    fn item(name: &str, keys: &[&str]) -> Self {
        FieldSpec {
            name: name.to_string(),
            source: FieldSource::Item(path(keys)),
        }
    }

    fn source_ref() -> Self {
        FieldSpec {
            name: SOURCE_REF_FIELD.to_string(),
            source: FieldSource::SourceRef,
        }
    }
}

fn path(keys: &[&str]) -> JsonPath {
    keys.iter().fold(JsonPath::root(), |p, k| p.key(*k))
}

/// Declarative mapping from a record to summary entries or export rows
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionTable {
    name: &'static str,
    version: u32,
    items: Option<JsonPath>,
    fields: Vec<FieldSpec>,
}

impl ProjectionTable {
    /// Current compact index entry (version 2)
    pub fn catalog_entry() -> Self {
        ProjectionTable {
            name: "catalog_entry",
            version: 2,
            items: None,
            fields: Self::catalog_entry_fields(),
        }
    }

    fn catalog_entry_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::record("id", &["id"]),
            FieldSpec::record("name", &["name"]),
            FieldSpec::record("status", &["status"]),
            FieldSpec::record("category", &["category"]),
            FieldSpec::record("atc_code", &["codes", "atc5", "code"]),
            FieldSpec::record("registration_number", &["registration_number"]),
            FieldSpec::source_ref(),
        ]
    }

    /// First-generation index entry, carrying the manufacturer name
    pub fn catalog_entry_v1() -> Self {
        ProjectionTable {
            name: "catalog_entry_v1",
            version: 1,
            items: None,
            fields: vec![
                FieldSpec::record("id", &["id"]),
                FieldSpec::record("name", &["name"]),
                FieldSpec::record("status", &["status"]),
                FieldSpec::record("category", &["category"]),
                FieldSpec::record("manufacturer", &["manufacturer", "name"]),
                FieldSpec::source_ref(),
            ],
        }
    }

    /// Full tabular export: the compact entry plus descriptive columns
    pub fn catalog_export() -> Self {
        let mut fields = Self::catalog_entry_fields();
        // keep the source reference last
        let source_ref = fields.pop();

        let extra: [(&str, &[&str]); 29] = [
            ("generic_name", &["generic_name"]),
            ("brand_name", &["brand_name"]),
            ("dosage_form", &["dosage_form"]),
            ("route", &["route"]),
            ("active_ingredients", &["active_ingredients"]),
            ("strength", &["strength"]),
            ("manufacturer_name", &["manufacturer", "name"]),
            ("manufacturer_country", &["manufacturer", "country"]),
            ("importer_name", &["importer", "name"]),
            ("atc4_code", &["codes", "atc4", "code"]),
            ("atc4_name", &["codes", "atc4", "name"]),
            ("atc5_code", &["codes", "atc5", "code"]),
            ("atc5_name", &["codes", "atc5", "name"]),
            ("moh_code", &["codes", "moh"]),
            ("yarpa_code", &["codes", "yarpa"]),
            ("pharmasoft_code", &["codes", "pharmasoft"]),
            ("snomed_code", &["codes", "snomed", "code"]),
            ("prescription_required", &["clinical", "prescription_required"]),
            ("health_basket", &["clinical", "health_basket"]),
            ("indications", &["clinical", "indications"]),
            ("contraindications", &["clinical", "contraindications"]),
            ("side_effects", &["clinical", "side_effects"]),
            ("warnings", &["clinical", "warnings"]),
            ("pregnancy_category", &["clinical", "pregnancy_category"]),
            ("storage_conditions", &["clinical", "storage_conditions"]),
            ("max_price", &["pricing", "max_price"]),
            ("currency", &["pricing", "currency"]),
            ("registration_date", &["registration_date"]),
            ("last_updated", &["last_updated"]),
        ];
        fields.extend(extra.iter().map(|(name, keys)| FieldSpec::record(name, keys)));
        fields.extend(source_ref);

        ProjectionTable {
            name: "catalog_export",
            version: CURRENT_PROJECTION_VERSION,
            items: None,
            fields,
        }
    }

    /// One row per element of the record's `packaging` list
    pub fn packaging() -> Self {
        ProjectionTable {
            name: "packaging",
            version: CURRENT_PROJECTION_VERSION,
            items: Some(path(&["packaging"])),
            fields: vec![
                FieldSpec::record("catalog_id", &["id"]),
                FieldSpec::record("name", &["name"]),
                FieldSpec::item("package_id", &["package_id"]),
                FieldSpec::item("strength", &["strength"]),
                FieldSpec::item("form", &["form"]),
                FieldSpec::item("size", &["size"]),
                FieldSpec::item("unit", &["unit"]),
                FieldSpec::item("status", &["status"]),
                FieldSpec::item("barcode", &["barcode"]),
                FieldSpec::source_ref(),
            ],
        }
    }

    /// Index entry table for a persisted projection version
    ///
    /// Documents without a projection version were written by the first
    /// generator and map to version 1.
    pub fn for_version(version: Option<u32>) -> Option<Self> {
        match version.unwrap_or(1) {
            1 => Some(Self::catalog_entry_v1()),
            2 => Some(Self::catalog_entry()),
            _ => None,
        }
    }

    /// Table name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Table version
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Whether the table emits one row per nested item
    pub fn is_per_item(&self) -> bool {
        self.items.is_some()
    }

    /// Field specs in output order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Output column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Whether the table produces the named field
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Project a record into one field map
    ///
    /// Values keep their native JSON shape; lists are not flattened.
    /// Item-sourced fields resolve to `null` outside a per-item projection.
    pub fn project(&self, record: &Record, source_ref: &str) -> FieldMap {
        self.project_with_item(record, None, source_ref)
    }

    /// Project a record into zero or more field maps
    ///
    /// Whole-record tables always return exactly one map. Per-item tables
    /// return one map per element of the item list; a missing or non-list
    /// source yields none.
    pub fn project_items(&self, record: &Record, source_ref: &str) -> Vec<FieldMap> {
        let Some(items_path) = &self.items else {
            return vec![self.project(record, source_ref)];
        };
        match get_at_path(record.as_inner(), items_path) {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| self.project_with_item(record, Some(item), source_ref))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Project a record into a flat row of strings
    ///
    /// Same fields as [`project`](Self::project), with every value passed
    /// through [`flatten_value`].
    pub fn project_row(&self, record: &Record, source_ref: &str, delimiter: &str) -> FieldMap {
        self.project(record, source_ref)
            .into_iter()
            .map(|(k, v)| (k, Value::String(flatten_value(&v, delimiter))))
            .collect()
    }

    fn project_with_item(&self, record: &Record, item: Option<&Value>, source_ref: &str) -> FieldMap {
        let mut out = FieldMap::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = match &field.source {
                FieldSource::Record(p) => get_at_path(record.as_inner(), p).cloned(),
                FieldSource::Item(p) => item.and_then(|i| get_at_path(i, p)).cloned(),
                FieldSource::SourceRef => Some(Value::String(source_ref.to_string())),
            };
            out.insert(field.name.clone(), value.unwrap_or(Value::Null));
        }
        out
    }
}

/// Render a JSON value as a single tabular cell
///
/// `null` renders empty, strings verbatim, numbers and booleans as their
/// JSON text, objects as compact JSON. Arrays are flattened element by
/// element and joined with `delimiter`.
pub fn flatten_value(value: &Value, delimiter: &str) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|v| flatten_value(v, delimiter))
            .collect::<Vec<_>>()
            .join(delimiter),
        Value::Object(_) => value.to_string(),
    }
}
