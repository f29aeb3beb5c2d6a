//! Type descriptors: the metadata the engine reads attributes from
//!
//! A [`TypeDescriptor`] lists the type-level attributes and the properties of
//! a type, each property with its own ordered attribute list. Descriptors are
//! assembled once with [`TypeDescriptorBuilder`] and shared behind an `Arc`.
//!
//! Members inherited from a base type are merged in first. Attributes
//! declared on an associated metadata type (a "buddy" type added with
//! [`TypeDescriptorBuilder::metadata_type`]) are appended after them, and may
//! target inherited properties. Identical declarations are all kept.

use std::fmt;
use std::sync::Arc;

use crate::attribute::ValidationAttribute;
use crate::context::ValidationContext;
use crate::error::{Error, Result};
use crate::metadata::{DisplayAttribute, EditableAttribute, UiHintAttribute};
use crate::result::ValidationOutcome;
use crate::value::{Value, ValueType};

/// Shared attribute handle as stored on descriptors.
pub type AttributeRef = Arc<dyn ValidationAttribute>;

// ============================================================================
// OBJECT CAPABILITIES
// ============================================================================

/// An object the engine can validate.
///
/// Implementors expose their descriptor and read property values by name.
pub trait Validatable: Send + Sync + 'static {
    /// Descriptor of the runtime type of this object.
    fn type_descriptor(&self) -> Arc<TypeDescriptor>;

    /// Reads a property value. `None` is treated as null.
    fn property_value(&self, name: &str) -> Option<Value>;

    /// Returns the self-validation hook when the object implements one.
    fn as_validatable_object(&self) -> Option<&dyn ValidatableObject> {
        None
    }
}

/// Self-validation performed after all attribute checks pass.
pub trait ValidatableObject {
    /// Returns the outcomes of self-validation. `None` entries are successes
    /// and are ignored by the engine.
    fn validate(&self, context: &ValidationContext) -> Vec<ValidationOutcome>;
}

// ============================================================================
// PROPERTY DESCRIPTOR
// ============================================================================

/// A property and the metadata attached to it.
#[derive(Clone)]
pub struct PropertyDescriptor {
    name: String,
    property_type: ValueType,
    is_public: bool,
    readable: bool,
    indexer: bool,
    attributes: Vec<AttributeRef>,
    display: Option<DisplayAttribute>,
    editable: Option<EditableAttribute>,
    ui_hints: Vec<UiHintAttribute>,
}

impl PropertyDescriptor {
    /// Creates a public, readable property with no attributes.
    pub fn new(name: impl Into<String>, property_type: ValueType) -> Self {
        Self {
            name: name.into(),
            property_type,
            is_public: true,
            readable: true,
            indexer: false,
            attributes: Vec::new(),
            display: None,
            editable: None,
            ui_hints: Vec::new(),
        }
    }

    /// Appends a validation attribute.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_attribute(self, attribute: impl ValidationAttribute) -> Self {
        self.with_shared_attribute(Arc::new(attribute))
    }

    /// Appends an already shared validation attribute.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_shared_attribute(mut self, attribute: AttributeRef) -> Self {
        self.attributes.push(attribute);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_display(mut self, display: DisplayAttribute) -> Self {
        self.display = Some(display);
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn with_editable(mut self, editable: EditableAttribute) -> Self {
        self.editable = Some(editable);
        self
    }

    /// Adds a presentation hint. A property may carry several.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_ui_hint(mut self, hint: UiHintAttribute) -> Self {
        self.ui_hints.push(hint);
        self
    }

    /// Marks the property as an indexer. Indexers are never validated.
    #[must_use = "builder methods must be chained or built"]
    pub fn indexer(mut self) -> Self {
        self.indexer = true;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    #[must_use = "builder methods must be chained or built"]
    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property_type(&self) -> &ValueType {
        &self.property_type
    }

    /// Validation attributes in declaration order.
    pub fn attributes(&self) -> &[AttributeRef] {
        &self.attributes
    }

    pub fn display(&self) -> Option<&DisplayAttribute> {
        self.display.as_ref()
    }

    pub fn editable(&self) -> Option<&EditableAttribute> {
        self.editable.as_ref()
    }

    pub fn ui_hints(&self) -> &[UiHintAttribute] {
        &self.ui_hints
    }

    pub fn is_indexer(&self) -> bool {
        self.indexer
    }

    /// Public, readable and not an indexer.
    pub fn is_validatable(&self) -> bool {
        self.is_public && self.readable && !self.indexer
    }

    /// Appends `other`'s attributes and fills display metadata left unset.
    fn merge_from(&mut self, other: &Self) {
        self.attributes.extend(other.attributes.iter().cloned());
        self.ui_hints.extend(other.ui_hints.iter().cloned());
        if self.display.is_none() {
            self.display.clone_from(&other.display);
        }
        if self.editable.is_none() {
            self.editable.clone_from(&other.editable);
        }
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("property_type", &self.property_type)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TYPE DESCRIPTOR
// ============================================================================

/// Metadata for a validatable type.
pub struct TypeDescriptor {
    full_name: String,
    is_public: bool,
    base: Option<Arc<TypeDescriptor>>,
    attributes: Vec<AttributeRef>,
    properties: Vec<PropertyDescriptor>,
}

impl TypeDescriptor {
    /// Starts a builder for a type with the given namespace-qualified name.
    pub fn builder(full_name: impl Into<String>) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            full_name: full_name.into(),
            is_public: true,
            base: None,
            attributes: Vec::new(),
            properties: Vec::new(),
            metadata_type: None,
        }
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The last segment of the full name.
    pub fn name(&self) -> &str {
        short_name(&self.full_name)
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    pub fn base(&self) -> Option<&Arc<TypeDescriptor>> {
        self.base.as_ref()
    }

    /// Type-level attributes: own, then inherited, then metadata-type.
    pub fn attributes(&self) -> &[AttributeRef] {
        &self.attributes
    }

    /// Properties in discovery order, inherited ones after declared ones.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// True when `other` is this type or derives from it.
    pub fn is_assignable_from(&self, other: &TypeDescriptor) -> bool {
        let mut current = Some(other);
        while let Some(t) = current {
            if std::ptr::eq(t, self) || t.full_name == self.full_name {
                return true;
            }
            current = t.base.as_deref();
        }
        false
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("full_name", &self.full_name)
            .field("attributes", &self.attributes.len())
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

/// Returns the segment after the last `.` of a qualified type name.
pub(crate) fn short_name(full_name: &str) -> &str {
    full_name.rsplit('.').next().unwrap_or(full_name)
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`TypeDescriptor`].
#[must_use = "builder does nothing until .build() is called"]
pub struct TypeDescriptorBuilder {
    full_name: String,
    is_public: bool,
    base: Option<Arc<TypeDescriptor>>,
    attributes: Vec<AttributeRef>,
    properties: Vec<PropertyDescriptor>,
    metadata_type: Option<Arc<TypeDescriptor>>,
}

impl TypeDescriptorBuilder {
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// Derives from `base`, inheriting its attributes and properties.
    pub fn extends(mut self, base: Arc<TypeDescriptor>) -> Self {
        self.base = Some(base);
        self
    }

    /// Appends a type-level validation attribute.
    pub fn attribute(self, attribute: impl ValidationAttribute) -> Self {
        self.shared_attribute(Arc::new(attribute))
    }

    pub fn shared_attribute(mut self, attribute: AttributeRef) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Associates a metadata type whose attributes are merged into this one.
    pub fn metadata_type(mut self, buddy: Arc<TypeDescriptor>) -> Self {
        self.metadata_type = Some(buddy);
        self
    }

    /// Merges inherited and metadata-type members and produces the descriptor.
    ///
    /// Inherited members come first, so a metadata type may annotate
    /// properties declared on a base type. A property redeclared here keeps
    /// its own attributes followed by the base property's.
    ///
    /// Fails when the metadata type declares properties this type lacks.
    pub fn build(self) -> Result<Arc<TypeDescriptor>> {
        let Self {
            full_name,
            is_public,
            base,
            mut attributes,
            mut properties,
            metadata_type,
        } = self;

        if let Some(base) = &base {
            attributes.extend(base.attributes.iter().cloned());
            for inherited in &base.properties {
                match properties.iter_mut().find(|p| p.name == inherited.name) {
                    Some(own) => own.merge_from(inherited),
                    None => properties.push(inherited.clone()),
                }
            }
        }

        if let Some(buddy) = metadata_type {
            let unknown: Vec<&str> = buddy
                .properties
                .iter()
                .filter(|bp| !properties.iter().any(|p| p.name == bp.name))
                .map(|bp| bp.name.as_str())
                .collect();
            if !unknown.is_empty() {
                return Err(Error::configuration(format!(
                    "The associated metadata type for type '{full_name}' contains the following unknown properties or fields: {}. Please make sure that the names of these members match the names of the properties on the main type.",
                    unknown.join(", ")
                )));
            }

            attributes.extend(buddy.attributes.iter().cloned());
            for property in &mut properties {
                if let Some(bp) = buddy.property(&property.name) {
                    property.merge_from(bp);
                }
            }
        }

        Ok(Arc::new(TypeDescriptor {
            full_name,
            is_public,
            base,
            attributes,
            properties,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Range, Required, StringLength};

    fn names(attributes: &[AttributeRef]) -> Vec<&str> {
        attributes.iter().map(|a| a.name()).collect()
    }

    #[test]
    fn metadata_type_attributes_are_appended_without_dedup() {
        let buddy = TypeDescriptor::builder("Shop.OrderMetadata")
            .attribute(Required::new())
            .property(PropertyDescriptor::new("Total", ValueType::I32).with_attribute(Required::new()))
            .build()
            .unwrap();

        let order = TypeDescriptor::builder("Shop.Order")
            .attribute(Required::new())
            .property(
                PropertyDescriptor::new("Total", ValueType::I32).with_attribute(Range::int(0, 10)),
            )
            .metadata_type(buddy)
            .build()
            .unwrap();

        assert_eq!(names(order.attributes()), ["Required", "Required"]);
        assert_eq!(
            names(order.property("Total").unwrap().attributes()),
            ["Range", "Required"]
        );
    }

    #[test]
    fn unknown_metadata_property_is_rejected() {
        let buddy = TypeDescriptor::builder("Shop.OrderMetadata")
            .property(PropertyDescriptor::new("Missing", ValueType::I32))
            .build()
            .unwrap();

        let err = TypeDescriptor::builder("Shop.Order")
            .metadata_type(buddy)
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("unknown properties or fields: Missing."));
    }

    #[test]
    fn inheritance_chain_and_properties() {
        let base = TypeDescriptor::builder("Zoo.Animal")
            .property(PropertyDescriptor::new("Name", ValueType::String).with_attribute(StringLength::new(5)))
            .build()
            .unwrap();
        let dog = TypeDescriptor::builder("Zoo.Dog")
            .extends(Arc::clone(&base))
            .property(PropertyDescriptor::new("Breed", ValueType::String))
            .build()
            .unwrap();

        assert!(base.is_assignable_from(&dog));
        assert!(!dog.is_assignable_from(&base));
        assert_eq!(dog.name(), "Dog");
        let props: Vec<&str> = dog.properties().iter().map(PropertyDescriptor::name).collect();
        assert_eq!(props, ["Breed", "Name"]);
    }

    #[test]
    fn redeclared_property_keeps_base_rules() {
        let base = TypeDescriptor::builder("Zoo.Animal")
            .attribute(Required::new())
            .property(
                PropertyDescriptor::new("Name", ValueType::String)
                    .with_attribute(Required::new())
                    .with_ui_hint(UiHintAttribute::new("TextBox")),
            )
            .build()
            .unwrap();
        let dog = TypeDescriptor::builder("Zoo.Dog")
            .extends(base)
            .attribute(Range::int(0, 1))
            .property(PropertyDescriptor::new("Name", ValueType::String).with_attribute(StringLength::new(5)))
            .build()
            .unwrap();

        assert_eq!(dog.properties().len(), 1);
        assert_eq!(
            names(dog.property("Name").unwrap().attributes()),
            ["StringLength", "Required"]
        );
        assert_eq!(names(dog.attributes()), ["Range", "Required"]);
        let hints: Vec<&str> = dog
            .property("Name")
            .unwrap()
            .ui_hints()
            .iter()
            .map(UiHintAttribute::ui_hint)
            .collect();
        assert_eq!(hints, ["TextBox"]);
    }

    #[test]
    fn metadata_type_annotates_inherited_property() {
        let base = TypeDescriptor::builder("Zoo.Animal")
            .property(PropertyDescriptor::new("Name", ValueType::String))
            .build()
            .unwrap();
        let buddy = TypeDescriptor::builder("Zoo.DogMetadata")
            .attribute(StringLength::new(1))
            .property(PropertyDescriptor::new("Name", ValueType::String).with_attribute(Required::new()))
            .build()
            .unwrap();
        let dog = TypeDescriptor::builder("Zoo.Dog")
            .extends(Arc::clone(&base))
            .attribute(Range::int(0, 1))
            .metadata_type(buddy)
            .build()
            .unwrap();

        assert_eq!(names(dog.property("Name").unwrap().attributes()), ["Required"]);
        // own, then inherited, then metadata type
        assert_eq!(names(dog.attributes()), ["Range", "StringLength"]);
        // the base descriptor is untouched
        assert!(base.property("Name").unwrap().attributes().is_empty());
    }
}
