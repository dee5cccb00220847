//! Change mirroring into the Record Store
//!
//! An external job forwards change notifications from the managed database
//! that owns the catalog. Each notification names the change kind and
//! carries the item images in the database's typed attribute encoding:
//!
//! ```json
//! { "eventName": "MODIFY",
//!   "dynamodb": { "NewImage": { "id": {"S": "MOH_1"}, "size": {"N": "20"} } } }
//! ```
//!
//! Applying an event decodes the image to plain JSON and upserts or removes
//! the record. Both operations are idempotent. The index is not rebuilt; it
//! catches up on the next build.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::{debug, info, warn};

use medcat_core::{Error, Record, RecordId, Result};
use medcat_storage::RecordStore;

/// One typed attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// String
    #[serde(rename = "S")]
    S(String),
    /// Number, as its decimal text
    #[serde(rename = "N")]
    N(String),
    /// Boolean
    #[serde(rename = "BOOL")]
    Bool(bool),
    /// Null marker
    #[serde(rename = "NULL")]
    Null(bool),
    /// List of values
    #[serde(rename = "L")]
    L(Vec<AttributeValue>),
    /// Nested map
    #[serde(rename = "M")]
    M(BTreeMap<String, AttributeValue>),
    /// String set
    #[serde(rename = "SS")]
    Ss(Vec<String>),
    /// Number set
    #[serde(rename = "NS")]
    Ns(Vec<String>),
}

/// Item image: attribute name to typed value
pub type Image = BTreeMap<String, AttributeValue>;

fn decode_number(text: &str) -> Result<Value> {
    let invalid = || Error::SerializationError(format!("invalid number attribute '{}'", text));
    if !text.contains('.') {
        if let Ok(n) = text.parse::<i64>() {
            return Ok(Value::from(n));
        }
        if let Ok(n) = text.parse::<u64>() {
            return Ok(Value::from(n));
        }
    }
    let f: f64 = text.parse().map_err(|_| invalid())?;
    Number::from_f64(f).map(Value::Number).ok_or_else(invalid)
}

impl AttributeValue {
    /// Decode into plain JSON
    ///
    /// Numbers containing `.` become floats, others integers. Sets become
    /// lists.
    pub fn into_json(self) -> Result<Value> {
        Ok(match self {
            AttributeValue::S(s) => Value::String(s),
            AttributeValue::N(n) => decode_number(&n)?,
            AttributeValue::Bool(b) => Value::Bool(b),
            AttributeValue::Null(_) => Value::Null,
            AttributeValue::L(items) => Value::Array(
                items
                    .into_iter()
                    .map(AttributeValue::into_json)
                    .collect::<Result<_>>()?,
            ),
            AttributeValue::M(map) => decode_image(map)?,
            AttributeValue::Ss(items) => Value::Array(items.into_iter().map(Value::String).collect()),
            AttributeValue::Ns(items) => Value::Array(
                items
                    .iter()
                    .map(|n| decode_number(n))
                    .collect::<Result<_>>()?,
            ),
        })
    }
}

/// Decode a whole image into a JSON object
pub fn decode_image(image: Image) -> Result<Value> {
    let mut out = Map::with_capacity(image.len());
    for (key, value) in image {
        out.insert(key, value.into_json()?);
    }
    Ok(Value::Object(out))
}

/// Kind of change carried by an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    /// Item created
    Insert,
    /// Item replaced
    Modify,
    /// Item deleted
    Remove,
}

/// Item images attached to an event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeImages {
    /// Item after the change
    #[serde(rename = "NewImage", default, skip_serializing_if = "Option::is_none")]
    pub new_image: Option<Image>,
    /// Item before the change
    #[serde(rename = "OldImage", default, skip_serializing_if = "Option::is_none")]
    pub old_image: Option<Image>,
}

/// One change notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// What happened
    #[serde(rename = "eventName")]
    pub kind: ChangeKind,
    /// Item images
    #[serde(rename = "dynamodb", default)]
    pub images: ChangeImages,
}

/// A notification carrying several events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeBatch {
    /// Events in delivery order
    #[serde(rename = "Records", default)]
    pub records: Vec<ChangeEvent>,
}

impl ChangeEvent {
    /// Insert or modify event for a new image
    pub fn upsert(kind: ChangeKind, new_image: Image) -> Self {
        ChangeEvent {
            kind,
            images: ChangeImages {
                new_image: Some(new_image),
                old_image: None,
            },
        }
    }

    /// Remove event for an old image
    pub fn remove(old_image: Image) -> Self {
        ChangeEvent {
            kind: ChangeKind::Remove,
            images: ChangeImages {
                new_image: None,
                old_image: Some(old_image),
            },
        }
    }

    /// Image the event acts on: new for inserts and modifies, old for removes
    pub fn image(&self) -> Option<&Image> {
        match self.kind {
            ChangeKind::Insert | ChangeKind::Modify => self.images.new_image.as_ref(),
            ChangeKind::Remove => self.images.old_image.as_ref(),
        }
    }

    /// String `id` attribute of the relevant image
    pub fn record_id(&self) -> Option<&str> {
        match self.image()?.get(Record::ID_FIELD)? {
            AttributeValue::S(id) if !id.is_empty() => Some(id),
            _ => None,
        }
    }
}

/// What applying an event did to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MirrorAction {
    /// Record written
    Upserted {
        /// Record identifier
        id: RecordId,
    },
    /// Record deleted
    Removed {
        /// Record identifier
        id: RecordId,
        /// Whether a record was present
        existed: bool,
    },
}

/// Create or replace the record stored under `id`
///
/// The record's own `id` field, when present, must equal `id`.
pub fn upsert(store: &dyn RecordStore, id: &RecordId, record: &Record) -> Result<()> {
    store.write(id, record)?;
    debug!(target: "medcat::mirror", id = %id, "Record upserted");
    Ok(())
}

/// Delete a record; removing an absent record is not an error
pub fn remove(store: &dyn RecordStore, id: &RecordId) -> Result<bool> {
    let existed = store.delete(id)?;
    debug!(target: "medcat::mirror", id = %id, existed, "Record removed");
    Ok(existed)
}

/// Apply one change event to the store
pub fn apply_change(store: &dyn RecordStore, event: &ChangeEvent) -> Result<MirrorAction> {
    let raw_id = event.record_id().ok_or_else(|| {
        Error::InvalidIdentifier(format!("{:?} event carries no id attribute", event.kind))
    })?;
    let id = RecordId::new(raw_id)?;

    match event.kind {
        ChangeKind::Insert | ChangeKind::Modify => {
            let image = event.images.new_image.clone().unwrap_or_default();
            let record = Record::from_value(decode_image(image)?);
            upsert(store, &id, &record)?;
            Ok(MirrorAction::Upserted { id })
        }
        ChangeKind::Remove => {
            let existed = remove(store, &id)?;
            Ok(MirrorAction::Removed { id, existed })
        }
    }
}

/// Apply events in order, returning how many succeeded
///
/// A failing event is logged and skipped; later events still apply.
pub fn apply_batch(store: &dyn RecordStore, events: &[ChangeEvent]) -> usize {
    let mut applied = 0;
    for (position, event) in events.iter().enumerate() {
        match apply_change(store, event) {
            Ok(_) => applied += 1,
            Err(e) => warn!(
                target: "medcat::mirror",
                position,
                kind = ?event.kind,
                error = %e,
                "Skipping change event"
            ),
        }
    }
    info!(
        target: "medcat::mirror",
        applied,
        total = events.len(),
        "Change batch processed"
    );
    applied
}
