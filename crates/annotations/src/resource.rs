//! Localized resources
//!
//! A [`ResourceType`] stands in for a class whose public static string
//! properties return localized text for a [`Culture`]. [`LocalizableString`]
//! resolves a literal-or-key value against an optional resource type.
//!
//! Resolution is repeated on every call so a different culture yields a
//! different string without rebuilding anything.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::short_name;
use crate::error::{Error, Result};
use crate::value::{Value, ValueType};

// ============================================================================
// CULTURE
// ============================================================================

/// A culture tag such as `"en-US"`. The empty tag is the invariant culture.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Culture(Cow<'static, str>);

impl Culture {
    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub const fn invariant() -> Self {
        Self(Cow::Borrowed(""))
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_invariant(&self) -> bool {
        self.0.is_empty()
    }

    /// The neutral parent, e.g. `"fr"` for `"fr-CA"`. Invariant has none.
    pub fn parent(&self) -> Option<Self> {
        if self.is_invariant() {
            return None;
        }
        Some(match self.0.rsplit_once('-') {
            Some((parent, _)) => Self(Cow::Owned(parent.to_owned())),
            None => Self::invariant(),
        })
    }
}

impl fmt::Display for Culture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// RESOURCE PROPERTY
// ============================================================================

/// Reads a resource member for a culture.
pub type ResourceGetter = Arc<dyn Fn(&Culture) -> Value + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Field,
    Const,
}

/// A member of a resource type.
///
/// Only public, static, string-typed, readable properties are resources;
/// the remaining knobs describe members that lookups must reject.
#[derive(Clone)]
pub struct ResourceProperty {
    name: String,
    is_public: bool,
    is_static: bool,
    kind: MemberKind,
    property_type: ValueType,
    getter: Option<ResourceGetter>,
}

impl ResourceProperty {
    /// A public static string property.
    pub fn string<F>(name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&Culture) -> String + Send + Sync + 'static,
    {
        Self::typed(name, ValueType::String, move |c| Value::String(getter(c)))
    }

    /// A public static property of an arbitrary type.
    pub fn typed<F>(name: impl Into<String>, property_type: ValueType, getter: F) -> Self
    where
        F: Fn(&Culture) -> Value + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            is_public: true,
            is_static: true,
            kind: MemberKind::Property,
            property_type,
            getter: Some(Arc::new(getter)),
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn instance(mut self) -> Self {
        self.is_static = false;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn kind(mut self, kind: MemberKind) -> Self {
        self.kind = kind;
        self
    }

    /// Drops the getter, leaving a write-only property.
    #[must_use = "builder methods must be chained or built"]
    pub fn write_only(mut self) -> Self {
        self.getter = None;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property_type(&self) -> &ValueType {
        &self.property_type
    }

    /// Public, static, readable property of any type.
    pub fn is_public_static_property(&self) -> bool {
        self.is_public && self.is_static && self.kind == MemberKind::Property && self.getter.is_some()
    }

    /// Reads the member for `culture`. `None` when write-only.
    pub fn read(&self, culture: &Culture) -> Option<Value> {
        self.getter.as_ref().map(|get| get(culture))
    }
}

impl fmt::Debug for ResourceProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceProperty")
            .field("name", &self.name)
            .field("is_public", &self.is_public)
            .field("is_static", &self.is_static)
            .field("kind", &self.kind)
            .field("property_type", &self.property_type)
            .field("readable", &self.getter.is_some())
            .finish()
    }
}

// ============================================================================
// RESOURCE TYPE
// ============================================================================

/// A container of localized resources.
#[derive(Debug, Clone)]
pub struct ResourceType {
    full_name: String,
    is_public: bool,
    properties: Vec<ResourceProperty>,
}

impl ResourceType {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            is_public: true,
            properties: Vec::new(),
        }
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_property(mut self, property: ResourceProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Adds a public static string property.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_string<F>(self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&Culture) -> String + Send + Sync + 'static,
    {
        self.with_property(ResourceProperty::string(name, getter))
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn name(&self) -> &str {
        short_name(&self.full_name)
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    /// Finds a public static readable property by exact name.
    pub fn public_static_property(&self, name: &str) -> Option<&ResourceProperty> {
        self.properties
            .iter()
            .find(|p| p.name == name && p.is_public_static_property())
    }

    /// Reads a localized string, provided this type is public and `name` is a
    /// public static string property.
    pub fn localized_string(&self, name: &str, culture: &Culture) -> Option<String> {
        if !self.is_public {
            return None;
        }
        let property = self
            .public_static_property(name)
            .filter(|p| p.property_type == ValueType::String)?;
        match property.read(culture)? {
            Value::String(s) => Some(s),
            Value::Null => Some(String::new()),
            other => Some(other.to_string()),
        }
    }
}

// ============================================================================
// LOCALIZABLE STRING
// ============================================================================

/// A string that is either a literal or a key into a [`ResourceType`].
///
/// `property_name` names the owning property (for example `"Name"` on a
/// display attribute) and appears in error messages.
#[derive(Debug, Clone)]
pub struct LocalizableString {
    property_name: Cow<'static, str>,
    value: Option<String>,
    resource_type: Option<Arc<ResourceType>>,
}

impl LocalizableString {
    pub fn new(property_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            property_name: property_name.into(),
            value: None,
            resource_type: None,
        }
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// The raw value: a literal or a resource key.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: Option<impl Into<String>>) {
        self.value = value.map(Into::into);
    }

    pub fn resource_type(&self) -> Option<&Arc<ResourceType>> {
        self.resource_type.as_ref()
    }

    pub fn set_resource_type(&mut self, resource_type: Option<Arc<ResourceType>>) {
        self.resource_type = resource_type;
    }

    /// Resolves the final text for `culture`.
    ///
    /// Without a resource type the value is returned as is. With one, a null
    /// value stays null and any other value (including `""`) must name a
    /// public static string property of a public resource type.
    pub fn localizable_value(&self, culture: &Culture) -> Result<Option<String>> {
        let Some(resource_type) = &self.resource_type else {
            return Ok(self.value.clone());
        };
        let Some(key) = &self.value else {
            return Ok(None);
        };
        resource_type
            .localized_string(key, culture)
            .map(Some)
            .ok_or_else(|| {
                Error::configuration(format!(
                    "Cannot retrieve property '{}' because localization failed. Type '{}' is not public or does not contain a public static string property with the name '{}'.",
                    self.property_name,
                    resource_type.full_name(),
                    key
                ))
            })
    }
}
