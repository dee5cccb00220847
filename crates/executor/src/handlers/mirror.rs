//! Record Store write handlers.
//!
//! These change the authoritative records only. The loaded index is left as
//! it is until the next rebuild.

use serde_json::Value;

use medcat_core::{Record, RecordId};
use medcat_engine::{self as engine, ChangeEvent};
use medcat_storage::RecordStore;

use crate::convert::convert_result;
use crate::{Error, Output, Result};

fn record_id(id: &str) -> Result<RecordId> {
    convert_result(RecordId::new(id))
}

/// Handle Upsert command.
///
/// A record without an `id` field is stored under `id`; one whose `id`
/// disagrees with `id` is rejected.
pub fn upsert(store: &dyn RecordStore, id: String, record: Value) -> Result<Output> {
    let id = record_id(&id)?;
    let Value::Object(mut fields) = record else {
        return Err(Error::InvalidInput {
            reason: "record must be a JSON object".to_string(),
        });
    };
    fields
        .entry(Record::ID_FIELD)
        .or_insert_with(|| Value::String(id.to_string()));
    let record = Record::from_value(Value::Object(fields));
    convert_result(engine::upsert(store, &id, &record))?;
    Ok(Output::Written { id: id.to_string() })
}

/// Handle Remove command.
pub fn remove(store: &dyn RecordStore, id: String) -> Result<Output> {
    let id = record_id(&id)?;
    let existed = convert_result(engine::remove(store, &id))?;
    Ok(Output::Bool(existed))
}

/// Handle ApplyChange command.
pub fn apply_change(store: &dyn RecordStore, event: ChangeEvent) -> Result<Output> {
    let action = convert_result(engine::apply_change(store, &event))?;
    Ok(Output::Mirrored(action))
}

/// Handle ApplyBatch command.
pub fn apply_batch(store: &dyn RecordStore, events: Vec<ChangeEvent>) -> Result<Output> {
    let applied = engine::apply_batch(store, &events);
    Ok(Output::Applied {
        applied,
        total: events.len(),
    })
}
