//! Display and editing metadata for members

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::resource::{Culture, LocalizableString, ResourceType};
use crate::value::Value;

// ============================================================================
// DISPLAY
// ============================================================================

/// Localizable display strings for a member.
///
/// All strings share one optional resource type. When it is set, every
/// non-null value is a resource key.
#[derive(Debug, Clone)]
pub struct DisplayAttribute {
    name: LocalizableString,
    short_name: LocalizableString,
    description: LocalizableString,
    prompt: LocalizableString,
    group_name: LocalizableString,
    resource_type: Option<Arc<ResourceType>>,
    order: Option<i32>,
    auto_generate_field: Option<bool>,
}

impl Default for DisplayAttribute {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayAttribute {
    pub fn new() -> Self {
        Self {
            name: LocalizableString::new("Name"),
            short_name: LocalizableString::new("ShortName"),
            description: LocalizableString::new("Description"),
            prompt: LocalizableString::new("Prompt"),
            group_name: LocalizableString::new("GroupName"),
            resource_type: None,
            order: None,
            auto_generate_field: None,
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name.set_value(Some(name));
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name.set_value(Some(short_name));
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description.set_value(Some(description));
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt.set_value(Some(prompt));
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_group_name(mut self, group_name: impl Into<String>) -> Self {
        self.group_name.set_value(Some(group_name));
        self
    }

    /// Treats every string as a key into `resource_type`.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_resource_type(mut self, resource_type: Arc<ResourceType>) -> Self {
        for s in [
            &mut self.name,
            &mut self.short_name,
            &mut self.description,
            &mut self.prompt,
            &mut self.group_name,
        ] {
            s.set_resource_type(Some(Arc::clone(&resource_type)));
        }
        self.resource_type = Some(resource_type);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_auto_generate_field(mut self, auto_generate: bool) -> Self {
        self.auto_generate_field = Some(auto_generate);
        self
    }

    /// Raw name value: a literal or a resource key.
    pub fn name(&self) -> Option<&str> {
        self.name.value()
    }

    pub fn short_name(&self) -> Option<&str> {
        self.short_name.value()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.value()
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.value()
    }

    pub fn group_name(&self) -> Option<&str> {
        self.group_name.value()
    }

    pub fn resource_type(&self) -> Option<&Arc<ResourceType>> {
        self.resource_type.as_ref()
    }

    pub fn order(&self) -> Option<i32> {
        self.order
    }

    pub fn auto_generate_field(&self) -> Option<bool> {
        self.auto_generate_field
    }

    pub fn get_name(&self, culture: &Culture) -> Result<Option<String>> {
        self.name.localizable_value(culture)
    }

    /// Localized short name, falling back to the name when unset.
    pub fn get_short_name(&self, culture: &Culture) -> Result<Option<String>> {
        match self.short_name.localizable_value(culture)? {
            Some(short) => Ok(Some(short)),
            None => self.get_name(culture),
        }
    }

    pub fn get_description(&self, culture: &Culture) -> Result<Option<String>> {
        self.description.localizable_value(culture)
    }

    pub fn get_prompt(&self, culture: &Culture) -> Result<Option<String>> {
        self.prompt.localizable_value(culture)
    }

    pub fn get_group_name(&self, culture: &Culture) -> Result<Option<String>> {
        self.group_name.localizable_value(culture)
    }
}

// ============================================================================
// EDITABLE
// ============================================================================

/// Whether a member may be edited, and whether it accepts an initial value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditableAttribute {
    allow_edit: bool,
    allow_initial_value: Option<bool>,
}

impl EditableAttribute {
    pub fn new(allow_edit: bool) -> Self {
        Self {
            allow_edit,
            allow_initial_value: None,
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_allow_initial_value(mut self, allow: bool) -> Self {
        self.allow_initial_value = Some(allow);
        self
    }

    pub fn allow_edit(&self) -> bool {
        self.allow_edit
    }

    /// Defaults to [`allow_edit`](Self::allow_edit) unless set explicitly.
    pub fn allow_initial_value(&self) -> bool {
        self.allow_initial_value.unwrap_or(self.allow_edit)
    }
}

// ============================================================================
// UI HINT
// ============================================================================

/// Control parameters keyed by name, in declaration order.
pub type ControlParameters = IndexMap<String, Value>;

/// Names the control a presentation layer should use for a member.
///
/// Control parameters are given as a flat `key, value, key, value, ...` list
/// and checked on first access. A malformed list is a configuration error,
/// reported on every access.
#[derive(Debug, Clone)]
pub struct UiHintAttribute {
    ui_hint: String,
    presentation_layer: Option<String>,
    raw_parameters: Vec<Value>,
    control_parameters: OnceLock<std::result::Result<ControlParameters, String>>,
}

impl UiHintAttribute {
    pub fn new(ui_hint: impl Into<String>) -> Self {
        Self {
            ui_hint: ui_hint.into(),
            presentation_layer: None,
            raw_parameters: Vec::new(),
            control_parameters: OnceLock::new(),
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_presentation_layer(mut self, presentation_layer: impl Into<String>) -> Self {
        self.presentation_layer = Some(presentation_layer.into());
        self
    }

    /// Sets the flat `key, value, ...` parameter list.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_control_parameters<I, V>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.raw_parameters = parameters.into_iter().map(Into::into).collect();
        self.control_parameters = OnceLock::new();
        self
    }

    pub fn ui_hint(&self) -> &str {
        &self.ui_hint
    }

    pub fn presentation_layer(&self) -> Option<&str> {
        self.presentation_layer.as_deref()
    }

    /// The parameters as a map.
    ///
    /// Fails when the list has an odd length, or a key is null, not a
    /// string, or repeated.
    pub fn control_parameters(&self) -> Result<&ControlParameters> {
        self.control_parameters
            .get_or_init(|| pair_parameters(&self.raw_parameters))
            .as_ref()
            .map_err(|message| Error::configuration(message.clone()))
    }
}

fn pair_parameters(raw: &[Value]) -> std::result::Result<ControlParameters, String> {
    if raw.len() % 2 != 0 {
        return Err("The number of control parameters must be even.".to_owned());
    }
    let mut parameters = ControlParameters::with_capacity(raw.len() / 2);
    let pairs = raw.iter().step_by(2).zip(raw.iter().skip(1).step_by(2));
    for (index, (key, value)) in pairs.enumerate() {
        let position = index * 2;
        let key = match key {
            Value::Null => return Err(format!("The key parameter at position {position} is null.")),
            Value::String(key) => key,
            other => {
                return Err(format!(
                    "The key parameter at position {position} with value '{other}' is not a string. Every key control parameter must be a string."
                ));
            }
        };
        if parameters.contains_key(key) {
            return Err(format!(
                "The key parameter at position {position} with value '{key}' occurs more than once."
            ));
        }
        parameters.insert(key.clone(), value.clone());
    }
    Ok(parameters)
}
