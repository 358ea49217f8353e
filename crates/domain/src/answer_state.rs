use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use quillform_core::{AppError, AppResult, FieldId, ItemId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FieldDefinition, ResponseRecord};

/// Key of one tracked answer: item-level or field-level.
///
/// The wire forms are `i-<id>` and `f-<id>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnswerKey {
    /// Answer attached to the item itself.
    Item(ItemId),
    /// Answer attached to one of the item's fields.
    Field(FieldId),
}

impl Display for AnswerKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Item(item_id) => write!(formatter, "i-{item_id}"),
            Self::Field(field_id) => write!(formatter, "f-{field_id}"),
        }
    }
}

impl FromStr for AnswerKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Some(raw) = value.strip_prefix("i-") {
            return Ok(Self::Item(ItemId::from_str(raw)?));
        }

        if let Some(raw) = value.strip_prefix("f-") {
            return Ok(Self::Field(FieldId::from_str(raw)?));
        }

        Err(AppError::Validation(format!(
            "answer key '{value}' must start with 'i-' or 'f-'"
        )))
    }
}

/// Returns whether a JSON value counts as "no answer".
///
/// Null, blank strings, empty arrays, and empty objects are all treated as
/// absent; they are removed from state rather than stored.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(entries) => entries.is_empty(),
        Value::Object(members) => members.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Outgoing answer entry produced from the current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingAnswer {
    /// The answered item.
    pub item_id: ItemId,
    /// The answered field; `None` for an item-level answer.
    pub field_id: Option<FieldId>,
    /// The non-empty answer value.
    pub value: Value,
}

/// Tracks in-progress answer edits for one response.
///
/// The dirty flag is precise: re-setting a key to a structurally equal value
/// leaves it untouched, so no spurious unsaved-changes warnings or writes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerState {
    values: BTreeMap<AnswerKey, Value>,
    dirty: bool,
}

impl AnswerState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the state map from a loaded response.
    #[must_use]
    pub fn from_response(response: &ResponseRecord) -> Self {
        let mut values = BTreeMap::new();
        for answer in response.answers() {
            let key = match answer.field_id() {
                Some(field_id) => AnswerKey::Field(field_id),
                None => AnswerKey::Item(answer.item_id()),
            };
            values.insert(key, answer.effective_value());
        }

        Self {
            values,
            dirty: false,
        }
    }

    /// Returns the tracked value for a key.
    #[must_use]
    pub fn get(&self, key: AnswerKey) -> Option<&Value> {
        self.values.get(&key)
    }

    /// Returns the number of tracked answers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether no answers are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Updates the value for a key.
    ///
    /// An empty value deletes the key ("no answer"); a value structurally
    /// equal to the current one is a no-op and does not mark the state dirty.
    pub fn set(&mut self, key: AnswerKey, value: Value) {
        if is_empty_value(&value) {
            if self.values.remove(&key).is_some() {
                self.dirty = true;
            }
            return;
        }

        if self.values.get(&key) != Some(&value) {
            self.values.insert(key, value);
            self.dirty = true;
        }
    }

    /// Adds or removes one option value in a multi-choice answer.
    pub fn toggle_choice(&mut self, key: AnswerKey, option_value: &str) {
        let mut choices: Vec<Value> = match self.values.get(&key) {
            Some(Value::Array(entries)) => entries.clone(),
            _ => Vec::new(),
        };

        match choices
            .iter()
            .position(|entry| entry.as_str() == Some(option_value))
        {
            Some(position) => {
                choices.remove(position);
            }
            None => choices.push(Value::String(option_value.to_owned())),
        }

        self.set(key, Value::Array(choices));
    }

    /// Returns whether unsaved edits exist.
    #[must_use]
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag after a successful save.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Builds the outgoing answer list for a save.
    ///
    /// Item-level answers come first, then field-level answers; a field-level
    /// key maps to its owning item through the supplied field list. Only
    /// non-empty values are tracked, so every entry is persistable.
    pub fn outgoing(&self, fields: &[FieldDefinition]) -> AppResult<Vec<OutgoingAnswer>> {
        let mut answers = Vec::with_capacity(self.values.len());

        for (key, value) in &self.values {
            if let AnswerKey::Item(item_id) = key {
                answers.push(OutgoingAnswer {
                    item_id: *item_id,
                    field_id: None,
                    value: value.clone(),
                });
            }
        }

        for (key, value) in &self.values {
            if let AnswerKey::Field(field_id) = key {
                let owning_item = fields
                    .iter()
                    .find(|field| field.id() == *field_id)
                    .map(FieldDefinition::item_id)
                    .ok_or_else(|| {
                        AppError::Validation(format!(
                            "answer references unknown field '{field_id}'"
                        ))
                    })?;

                answers.push(OutgoingAnswer {
                    item_id: owning_item,
                    field_id: Some(*field_id),
                    value: value.clone(),
                });
            }
        }

        Ok(answers)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use quillform_core::{FieldId, ItemId};
    use serde_json::json;

    use crate::{FieldDefinition, UiType};

    use super::{AnswerKey, AnswerState, is_empty_value};

    fn input_field(item_id: ItemId) -> FieldDefinition {
        FieldDefinition::new(
            FieldId::new(),
            item_id,
            UiType::Input,
            None,
            None,
            None,
            None,
            None,
            None,
            Vec::new(),
            None,
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn answer_key_round_trips_wire_form() {
        let field_key = AnswerKey::Field(FieldId::new());
        let parsed = AnswerKey::from_str(field_key.to_string().as_str());
        assert!(parsed.is_ok());
        assert_eq!(parsed.unwrap_or(AnswerKey::Item(ItemId::new())), field_key);
    }

    #[test]
    fn answer_key_rejects_unknown_prefix() {
        assert!(AnswerKey::from_str("x-123").is_err());
    }

    #[test]
    fn empty_values_are_recognized() {
        for empty in [json!(null), json!(""), json!("  "), json!([]), json!({})] {
            assert!(is_empty_value(&empty));
        }
        for present in [json!(false), json!(0), json!("a"), json!([1]), json!({"a": 1})] {
            assert!(!is_empty_value(&present));
        }
    }

    #[test]
    fn setting_empty_value_removes_key() {
        let key = AnswerKey::Field(FieldId::new());
        let mut state = AnswerState::new();

        state.set(key, json!("Alice"));
        assert_eq!(state.get(key), Some(&json!("Alice")));

        state.set(key, json!(""));
        assert!(state.get(key).is_none());
        assert!(state.dirty());
    }

    #[test]
    fn dirty_flag_is_precise() {
        let key = AnswerKey::Field(FieldId::new());
        let mut state = AnswerState::new();

        state.set(key, json!(["a", "b"]));
        assert!(state.dirty());
        state.clear_dirty();

        state.set(key, json!(["a", "b"]));
        assert!(!state.dirty());

        state.set(key, json!(["a"]));
        assert!(state.dirty());
    }

    #[test]
    fn setting_absent_key_to_empty_is_not_dirty() {
        let mut state = AnswerState::new();
        state.set(AnswerKey::Item(ItemId::new()), json!(null));
        assert!(!state.dirty());
    }

    #[test]
    fn toggle_choice_adds_and_removes() {
        let key = AnswerKey::Field(FieldId::new());
        let mut state = AnswerState::new();

        state.toggle_choice(key, "r");
        state.toggle_choice(key, "b");
        state.toggle_choice(key, "r");
        assert_eq!(state.get(key), Some(&json!(["b"])));

        state.toggle_choice(key, "b");
        assert!(state.get(key).is_none());
    }

    #[test]
    fn outgoing_orders_items_before_fields_and_maps_owners() {
        let item_id = ItemId::new();
        let note_item = ItemId::new();
        let field = input_field(item_id);

        let mut state = AnswerState::new();
        state.set(AnswerKey::Field(field.id()), json!("Alice"));
        state.set(AnswerKey::Item(note_item), json!("a note"));

        let outgoing = state.outgoing(std::slice::from_ref(&field));
        assert!(outgoing.is_ok());
        let outgoing = outgoing.unwrap_or_default();

        assert_eq!(outgoing.len(), 2);
        assert_eq!(outgoing[0].item_id, note_item);
        assert_eq!(outgoing[0].field_id, None);
        assert_eq!(outgoing[1].item_id, item_id);
        assert_eq!(outgoing[1].field_id, Some(field.id()));
    }

    #[test]
    fn outgoing_rejects_unknown_field_key() {
        let mut state = AnswerState::new();
        state.set(AnswerKey::Field(FieldId::new()), json!("x"));

        assert!(state.outgoing(&[]).is_err());
    }
}
