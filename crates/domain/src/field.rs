use std::collections::BTreeMap;
use std::str::FromStr;

use quillform_core::{AppError, AppResult, FieldId, ItemId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::answer_state::is_empty_value;

/// Closed set of supported field ui types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiType {
    /// Single-line text input.
    Input,
    /// Multi-line text area.
    Textarea,
    /// Rich-text editor.
    Wysiwyg,
    /// Single-choice dropdown.
    Select,
    /// Multi-choice dropdown.
    Multiselect,
    /// Single-choice button group.
    Radio,
    /// Checkbox group (with options) or single boolean checkbox (without).
    Checkbox,
    /// Numeric slider.
    Slider,
    /// Color picker.
    Color,
    /// Date picker.
    Date,
    /// Time picker.
    Time,
    /// Date range picker.
    Daterange,
    /// Whole-number input.
    Integer,
    /// Text input with suggestions.
    Autocomplete,
    /// Dependent (chained) selects.
    Chainselect,
    /// Image upload.
    Image,
    /// Generic file upload.
    File,
    /// Audio recording upload.
    Voice,
    /// Video recording upload.
    Video,
    /// Boolean switch.
    Toggle,
}

impl UiType {
    /// Returns a stable storage value for the ui type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Textarea => "textarea",
            Self::Wysiwyg => "wysiwyg",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Slider => "slider",
            Self::Color => "color",
            Self::Date => "date",
            Self::Time => "time",
            Self::Daterange => "daterange",
            Self::Integer => "integer",
            Self::Autocomplete => "autocomplete",
            Self::Chainselect => "chainselect",
            Self::Image => "image",
            Self::File => "file",
            Self::Voice => "voice",
            Self::Video => "video",
            Self::Toggle => "toggle",
        }
    }

    /// Returns every supported ui type.
    #[must_use]
    pub fn all() -> &'static [UiType] {
        &[
            Self::Input,
            Self::Textarea,
            Self::Wysiwyg,
            Self::Select,
            Self::Multiselect,
            Self::Radio,
            Self::Checkbox,
            Self::Slider,
            Self::Color,
            Self::Date,
            Self::Time,
            Self::Daterange,
            Self::Integer,
            Self::Autocomplete,
            Self::Chainselect,
            Self::Image,
            Self::File,
            Self::Voice,
            Self::Video,
            Self::Toggle,
        ]
    }

    /// Parses a ui-type tag, returning `None` for unknown tags.
    ///
    /// Rendering uses this lenient form so an unrecognized tag degrades to the
    /// registry fallback instead of failing; authoring uses the strict
    /// [`FromStr`] impl.
    #[must_use]
    pub fn parse_lenient(tag: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|ui_type| ui_type.as_str() == tag)
    }
}

impl FromStr for UiType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(value)
            .ok_or_else(|| AppError::Validation(format!("unknown field ui type '{value}'")))
    }
}

/// Shape of the answer value a field produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    /// Plain string.
    Text,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// One option value as a string.
    SingleChoice,
    /// Array of option value strings.
    MultiChoice,
    /// Structured object with opaque substructure.
    Structured,
    /// Opaque upload handle.
    UploadRef,
}

/// Widget family a ui type renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    /// Single-line text box.
    TextInput,
    /// Multi-line text box.
    TextArea,
    /// Rich-text editor surface.
    RichText,
    /// Single-choice dropdown.
    SelectBox,
    /// Multi-choice dropdown.
    MultiSelectBox,
    /// Single-choice button group.
    RadioGroup,
    /// Checkbox per option.
    CheckboxGroup,
    /// One boolean checkbox.
    CheckboxSingle,
    /// Numeric slider with a live value readout.
    Slider,
    /// Color swatch picker.
    ColorPicker,
    /// Date picker.
    DatePicker,
    /// Time picker.
    TimePicker,
    /// Date range picker.
    DateRangePicker,
    /// Numeric input.
    NumberInput,
    /// Text input with a suggestion list.
    AutocompleteInput,
    /// Dependent select chain.
    ChainedSelect,
    /// Upload drop zone.
    UploadControl,
    /// Media recorder with upload.
    RecorderControl,
    /// Boolean switch.
    Switch,
}

/// One selectable option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    label: String,
    value: String,
}

impl FieldOption {
    /// Creates an option; a blank label falls back to the value.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "option value must not be empty".to_owned(),
            ));
        }

        let label = label.into();
        let label = if label.trim().is_empty() {
            value.clone()
        } else {
            label
        };

        Ok(Self { label, value })
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the stored option value.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

/// Normalizes a raw options payload into labeled options.
///
/// Accepts bare strings (label = value) and `{label, value}` objects; numeric
/// values are stringified. Entries whose resolved value is empty are dropped.
#[must_use]
pub fn normalize_options(raw: &Value) -> Vec<FieldOption> {
    let Some(entries) = raw.as_array() else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let (label, value) = match entry {
                Value::String(text) => (text.clone(), text.clone()),
                Value::Number(number) => (number.to_string(), number.to_string()),
                Value::Object(object) => {
                    let value = match object.get("value") {
                        Some(Value::String(text)) => text.clone(),
                        Some(Value::Number(number)) => number.to_string(),
                        _ => String::new(),
                    };
                    let label = object
                        .get("label")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_owned();
                    (label, value)
                }
                _ => return None,
            };

            FieldOption::new(label, value).ok()
        })
        .collect()
}

/// A typed input control attached to one question item.
///
/// Field display order within a question is insertion order; there is no
/// field-level sort column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    id: FieldId,
    item_id: ItemId,
    ui_type: UiType,
    label: Option<String>,
    placeholder: Option<String>,
    default_value: Option<String>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    step_value: Option<f64>,
    options: Vec<FieldOption>,
    help: Option<String>,
}

impl FieldDefinition {
    /// Creates a validated field definition.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: FieldId,
        item_id: ItemId,
        ui_type: UiType,
        label: Option<String>,
        placeholder: Option<String>,
        default_value: Option<String>,
        min_value: Option<f64>,
        max_value: Option<f64>,
        step_value: Option<f64>,
        options: Vec<FieldOption>,
        help: Option<String>,
    ) -> AppResult<Self> {
        if let (Some(min), Some(max)) = (min_value, max_value)
            && min > max
        {
            return Err(AppError::Validation(format!(
                "field min value {min} must not exceed max value {max}"
            )));
        }

        if let Some(step) = step_value
            && step <= 0.0
        {
            return Err(AppError::Validation(
                "field step value must be positive".to_owned(),
            ));
        }

        Ok(Self {
            id,
            item_id,
            ui_type,
            label: normalize_optional(label),
            placeholder: normalize_optional(placeholder),
            default_value: normalize_optional(default_value),
            min_value,
            max_value,
            step_value,
            options,
            help: normalize_optional(help),
        })
    }

    /// Returns the field identifier.
    #[must_use]
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Returns the owning question item.
    #[must_use]
    pub fn item_id(&self) -> ItemId {
        self.item_id
    }

    /// Returns the ui type.
    #[must_use]
    pub fn ui_type(&self) -> UiType {
        self.ui_type
    }

    /// Returns the display label, if set.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns the placeholder text, if set.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Returns the default value, if set.
    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Returns the minimum numeric value, if set.
    #[must_use]
    pub fn min_value(&self) -> Option<f64> {
        self.min_value
    }

    /// Returns the maximum numeric value, if set.
    #[must_use]
    pub fn max_value(&self) -> Option<f64> {
        self.max_value
    }

    /// Returns the numeric step, if set.
    #[must_use]
    pub fn step_value(&self) -> Option<f64> {
        self.step_value
    }

    /// Returns the ordered options.
    #[must_use]
    pub fn options(&self) -> &[FieldOption] {
        self.options.as_slice()
    }

    /// Returns the help text, if set.
    #[must_use]
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|text| {
        let trimmed = text.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}

/// Per-type rendering and value contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTypeSpec {
    value_shape: ValueShape,
    control: ControlKind,
    supports_options: bool,
    supports_range: bool,
}

impl FieldTypeSpec {
    const fn new(
        value_shape: ValueShape,
        control: ControlKind,
        supports_options: bool,
        supports_range: bool,
    ) -> Self {
        Self {
            value_shape,
            control,
            supports_options,
            supports_range,
        }
    }

    /// Returns the answer value shape.
    #[must_use]
    pub fn value_shape(&self) -> ValueShape {
        self.value_shape
    }

    /// Returns the widget family.
    #[must_use]
    pub fn control(&self) -> ControlKind {
        self.control
    }

    /// Returns whether the type consumes an options list.
    #[must_use]
    pub fn supports_options(&self) -> bool {
        self.supports_options
    }

    /// Returns whether min/max/step settings are meaningful.
    #[must_use]
    pub fn supports_range(&self) -> bool {
        self.supports_range
    }
}

/// Render mode of a control descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Builder preview: populated with the default value, not interactive.
    DisabledPreview,
    /// Runner: bound to the current answer, emits change events.
    Live,
}

/// Serializable control descriptor for either render mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedControl {
    /// Widget family to mount.
    pub control: ControlKind,
    /// Original ui-type tag.
    pub ui_type: String,
    /// Resolved display label.
    pub label: String,
    /// Placeholder text.
    pub placeholder: Option<String>,
    /// Help text.
    pub help: Option<String>,
    /// Effective value: the current answer, or the default in preview mode.
    pub value: Option<Value>,
    /// Normalized options for choice controls.
    pub options: Vec<FieldOption>,
    /// Lower bound for range controls.
    pub min: Option<f64>,
    /// Upper bound for range controls.
    pub max: Option<f64>,
    /// Step for range controls.
    pub step: Option<f64>,
    /// Whether the control is inert.
    pub disabled: bool,
}

/// Registry mapping ui types to their rendering and value contracts.
///
/// Dispatch never fails: lookups for tags outside the closed set fall back to
/// a plain single-line text contract in both render modes.
#[derive(Debug, Clone)]
pub struct FieldTypeRegistry {
    specs: BTreeMap<UiType, FieldTypeSpec>,
    fallback: FieldTypeSpec,
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        let mut specs = BTreeMap::new();
        for ui_type in UiType::all() {
            specs.insert(*ui_type, builtin_spec(*ui_type));
        }

        Self {
            specs,
            fallback: FieldTypeSpec::new(ValueShape::Text, ControlKind::TextInput, false, false),
        }
    }
}

impl FieldTypeRegistry {
    /// Creates the registry with every built-in ui type registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the spec for a ui type.
    #[must_use]
    pub fn spec(&self, ui_type: UiType) -> &FieldTypeSpec {
        self.specs.get(&ui_type).unwrap_or(&self.fallback)
    }

    /// Returns the spec for a raw tag, falling back for unknown tags.
    #[must_use]
    pub fn spec_for_tag(&self, tag: &str) -> &FieldTypeSpec {
        match UiType::parse_lenient(tag) {
            Some(ui_type) => self.spec(ui_type),
            None => &self.fallback,
        }
    }

    /// Returns the effective value shape for a concrete field.
    ///
    /// A checkbox without options is a single boolean toggle rather than a
    /// multi-choice group.
    #[must_use]
    pub fn value_shape_for(&self, field: &FieldDefinition) -> ValueShape {
        if field.ui_type() == UiType::Checkbox && field.options().is_empty() {
            return ValueShape::Boolean;
        }

        self.spec(field.ui_type()).value_shape()
    }

    /// Coerces a raw answer value into the field's value shape.
    ///
    /// Empty values (null, empty string/array/object) coerce to `None`,
    /// meaning "no answer".
    pub fn coerce_value(&self, field: &FieldDefinition, value: Value) -> AppResult<Option<Value>> {
        if is_empty_value(&value) {
            return Ok(None);
        }

        let coerced = match self.value_shape_for(field) {
            ValueShape::Text => match value {
                Value::String(text) => Value::String(text),
                Value::Number(number) => Value::String(number.to_string()),
                other => {
                    return Err(shape_error(field, "a string", &other));
                }
            },
            ValueShape::Number => match value {
                Value::Number(number) => Value::Number(number),
                Value::String(text) => {
                    let parsed: f64 = text.trim().parse().map_err(|_| {
                        AppError::Validation(format!(
                            "field '{}' expects a numeric value, got '{text}'",
                            field.id()
                        ))
                    })?;
                    serde_json::Number::from_f64(parsed)
                        .map(Value::Number)
                        .ok_or_else(|| {
                            AppError::Validation(format!(
                                "field '{}' received a non-finite number",
                                field.id()
                            ))
                        })?
                }
                other => {
                    return Err(shape_error(field, "a number", &other));
                }
            },
            ValueShape::Boolean => match value {
                Value::Bool(flag) => Value::Bool(flag),
                other => {
                    return Err(shape_error(field, "a boolean", &other));
                }
            },
            ValueShape::SingleChoice => match value {
                Value::String(choice) => {
                    self.require_known_option(field, choice.as_str())?;
                    Value::String(choice)
                }
                other => {
                    return Err(shape_error(field, "an option value string", &other));
                }
            },
            ValueShape::MultiChoice => match value {
                Value::Array(choices) => {
                    let mut coerced_choices = Vec::with_capacity(choices.len());
                    for choice in choices {
                        let choice = match choice {
                            Value::String(choice) => choice,
                            other => {
                                return Err(shape_error(field, "option value strings", &other));
                            }
                        };
                        self.require_known_option(field, choice.as_str())?;
                        coerced_choices.push(Value::String(choice));
                    }
                    Value::Array(coerced_choices)
                }
                other => {
                    return Err(shape_error(field, "an array of option values", &other));
                }
            },
            // Chained selects, date ranges, and upload handles carry opaque
            // substructure; pass them through untouched.
            ValueShape::Structured | ValueShape::UploadRef => value,
        };

        Ok(Some(coerced))
    }

    /// Produces the control descriptor for a field in the given mode.
    #[must_use]
    pub fn render(
        &self,
        field: &FieldDefinition,
        item_title: &str,
        mode: RenderMode,
        current: Option<&Value>,
    ) -> RenderedControl {
        let spec = self.spec(field.ui_type());
        let single_checkbox = field.ui_type() == UiType::Checkbox && field.options().is_empty();
        let control = if single_checkbox {
            ControlKind::CheckboxSingle
        } else {
            spec.control()
        };

        // Checkbox-without-options and toggle fall back to the item title.
        let label = match field.label() {
            Some(label) => label.to_owned(),
            None if single_checkbox || field.ui_type() == UiType::Toggle => item_title.to_owned(),
            None => String::new(),
        };

        let value = match mode {
            RenderMode::Live => current.cloned(),
            RenderMode::DisabledPreview => current
                .cloned()
                .or_else(|| field.default_value().map(|text| Value::String(text.to_owned()))),
        };

        let (min, max, step) = if field.ui_type() == UiType::Slider {
            (
                Some(field.min_value().unwrap_or(0.0)),
                Some(field.max_value().unwrap_or(100.0)),
                Some(field.step_value().unwrap_or(1.0)),
            )
        } else if spec.supports_range() {
            (field.min_value(), field.max_value(), field.step_value())
        } else {
            (None, None, None)
        };

        RenderedControl {
            control,
            ui_type: field.ui_type().as_str().to_owned(),
            label,
            placeholder: field.placeholder().map(str::to_owned),
            help: field.help().map(str::to_owned),
            value,
            options: field.options().to_vec(),
            min,
            max,
            step,
            disabled: mode == RenderMode::DisabledPreview,
        }
    }

    fn require_known_option(&self, field: &FieldDefinition, choice: &str) -> AppResult<()> {
        if field.options().is_empty()
            || field.options().iter().any(|option| option.value() == choice)
        {
            return Ok(());
        }

        Err(AppError::Validation(format!(
            "value '{choice}' is not an option of field '{}'",
            field.id()
        )))
    }
}

fn builtin_spec(ui_type: UiType) -> FieldTypeSpec {
    match ui_type {
        UiType::Input => FieldTypeSpec::new(ValueShape::Text, ControlKind::TextInput, false, false),
        UiType::Textarea => {
            FieldTypeSpec::new(ValueShape::Text, ControlKind::TextArea, false, false)
        }
        UiType::Wysiwyg => FieldTypeSpec::new(ValueShape::Text, ControlKind::RichText, false, false),
        UiType::Select => {
            FieldTypeSpec::new(ValueShape::SingleChoice, ControlKind::SelectBox, true, false)
        }
        UiType::Multiselect => FieldTypeSpec::new(
            ValueShape::MultiChoice,
            ControlKind::MultiSelectBox,
            true,
            false,
        ),
        UiType::Radio => {
            FieldTypeSpec::new(ValueShape::SingleChoice, ControlKind::RadioGroup, true, false)
        }
        UiType::Checkbox => FieldTypeSpec::new(
            ValueShape::MultiChoice,
            ControlKind::CheckboxGroup,
            true,
            false,
        ),
        UiType::Slider => FieldTypeSpec::new(ValueShape::Number, ControlKind::Slider, false, true),
        UiType::Color => FieldTypeSpec::new(ValueShape::Text, ControlKind::ColorPicker, false, false),
        UiType::Date => FieldTypeSpec::new(ValueShape::Text, ControlKind::DatePicker, false, false),
        UiType::Time => FieldTypeSpec::new(ValueShape::Text, ControlKind::TimePicker, false, false),
        UiType::Daterange => FieldTypeSpec::new(
            ValueShape::Structured,
            ControlKind::DateRangePicker,
            false,
            false,
        ),
        UiType::Integer => {
            FieldTypeSpec::new(ValueShape::Number, ControlKind::NumberInput, false, true)
        }
        UiType::Autocomplete => FieldTypeSpec::new(
            ValueShape::Text,
            ControlKind::AutocompleteInput,
            true,
            false,
        ),
        UiType::Chainselect => FieldTypeSpec::new(
            ValueShape::Structured,
            ControlKind::ChainedSelect,
            true,
            false,
        ),
        UiType::Image | UiType::File => {
            FieldTypeSpec::new(ValueShape::UploadRef, ControlKind::UploadControl, false, false)
        }
        UiType::Voice | UiType::Video => FieldTypeSpec::new(
            ValueShape::UploadRef,
            ControlKind::RecorderControl,
            false,
            false,
        ),
        UiType::Toggle => {
            FieldTypeSpec::new(ValueShape::Boolean, ControlKind::Switch, false, false)
        }
    }
}

fn shape_error(field: &FieldDefinition, expected: &str, got: &Value) -> AppError {
    AppError::Validation(format!(
        "field '{}' expects {expected}, got {got}",
        field.id()
    ))
}

#[cfg(test)]
mod tests {
    use quillform_core::{FieldId, ItemId};
    use serde_json::json;

    use super::{
        ControlKind, FieldDefinition, FieldTypeRegistry, RenderMode, UiType, ValueShape,
        normalize_options,
    };

    fn field(ui_type: UiType, options: &[(&str, &str)]) -> FieldDefinition {
        let options = options
            .iter()
            .map(|(label, value)| {
                super::FieldOption::new(*label, *value).unwrap_or_else(|_| unreachable!())
            })
            .collect();

        FieldDefinition::new(
            FieldId::new(),
            ItemId::new(),
            ui_type,
            None,
            None,
            None,
            None,
            None,
            None,
            options,
            None,
        )
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn normalize_options_handles_mixed_entries() {
        let normalized = normalize_options(&json!([
            "a",
            {"label": "B", "value": "b"},
            {"value": ""},
        ]));

        let pairs: Vec<(&str, &str)> = normalized
            .iter()
            .map(|option| (option.label(), option.value()))
            .collect();
        assert_eq!(pairs, vec![("a", "a"), ("B", "b")]);
    }

    #[test]
    fn normalize_options_falls_back_to_value_for_missing_label() {
        let normalized = normalize_options(&json!([{"value": "x"}]));
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].label(), "x");
    }

    #[test]
    fn unknown_tag_falls_back_to_plain_text_control() {
        let registry = FieldTypeRegistry::new();
        let spec = registry.spec_for_tag("holograph");
        assert_eq!(spec.control(), ControlKind::TextInput);
        assert_eq!(spec.value_shape(), ValueShape::Text);
    }

    #[test]
    fn checkbox_without_options_is_boolean() {
        let registry = FieldTypeRegistry::new();
        assert_eq!(
            registry.value_shape_for(&field(UiType::Checkbox, &[])),
            ValueShape::Boolean
        );
        assert_eq!(
            registry.value_shape_for(&field(UiType::Checkbox, &[("Red", "r")])),
            ValueShape::MultiChoice
        );
    }

    #[test]
    fn coerce_empty_value_means_no_answer() {
        let registry = FieldTypeRegistry::new();
        let input = field(UiType::Input, &[]);

        for empty in [json!(null), json!(""), json!([]), json!({})] {
            let coerced = registry.coerce_value(&input, empty);
            assert!(coerced.is_ok());
            assert!(coerced.unwrap_or(Some(json!("x"))).is_none());
        }
    }

    #[test]
    fn coerce_integer_parses_numeric_strings() {
        let registry = FieldTypeRegistry::new();
        let integer = field(UiType::Integer, &[]);

        let coerced = registry.coerce_value(&integer, json!("42"));
        assert!(coerced.is_ok());
        assert_eq!(coerced.unwrap_or(None), Some(json!(42.0)));

        assert!(registry.coerce_value(&integer, json!("nope")).is_err());
    }

    #[test]
    fn coerce_rejects_unknown_choice() {
        let registry = FieldTypeRegistry::new();
        let select = field(UiType::Select, &[("Red", "r"), ("Blue", "b")]);

        assert!(registry.coerce_value(&select, json!("r")).is_ok());
        assert!(registry.coerce_value(&select, json!("green")).is_err());
    }

    #[test]
    fn coerce_multiselect_requires_string_array() {
        let registry = FieldTypeRegistry::new();
        let multi = field(UiType::Multiselect, &[("Red", "r"), ("Blue", "b")]);

        let coerced = registry.coerce_value(&multi, json!(["b"]));
        assert!(coerced.is_ok());
        assert_eq!(coerced.unwrap_or(None), Some(json!(["b"])));

        assert!(registry.coerce_value(&multi, json!([1])).is_err());
        assert!(registry.coerce_value(&multi, json!("b")).is_err());
    }

    #[test]
    fn render_preview_uses_default_value_and_disables() {
        let registry = FieldTypeRegistry::new();
        let with_default = FieldDefinition::new(
            FieldId::new(),
            ItemId::new(),
            UiType::Input,
            Some("Name".to_owned()),
            None,
            Some("Alice".to_owned()),
            None,
            None,
            None,
            Vec::new(),
            None,
        );
        assert!(with_default.is_ok());
        let with_default = with_default.unwrap_or_else(|_| unreachable!());

        let control = registry.render(&with_default, "Who?", RenderMode::DisabledPreview, None);
        assert!(control.disabled);
        assert_eq!(control.value, Some(serde_json::json!("Alice")));
        assert_eq!(control.label, "Name");
    }

    #[test]
    fn render_toggle_label_falls_back_to_item_title() {
        let registry = FieldTypeRegistry::new();
        let toggle = field(UiType::Toggle, &[]);

        let control = registry.render(&toggle, "Still in use?", RenderMode::Live, None);
        assert_eq!(control.control, ControlKind::Switch);
        assert_eq!(control.label, "Still in use?");
        assert!(!control.disabled);
    }

    #[test]
    fn render_slider_defaults_domain() {
        let registry = FieldTypeRegistry::new();
        let slider = field(UiType::Slider, &[]);

        let control = registry.render(&slider, "Weight", RenderMode::Live, None);
        assert_eq!(control.min, Some(0.0));
        assert_eq!(control.max, Some(100.0));
        assert_eq!(control.step, Some(1.0));
    }

    #[test]
    fn field_rejects_inverted_range() {
        let result = FieldDefinition::new(
            FieldId::new(),
            ItemId::new(),
            UiType::Slider,
            None,
            None,
            None,
            Some(10.0),
            Some(1.0),
            None,
            Vec::new(),
            None,
        );
        assert!(result.is_err());
    }
}
