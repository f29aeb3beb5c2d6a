//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use nebula_annotations::prelude::*;
//! ```

// ============================================================================
// CONTRACT: attribute traits, results, errors
// ============================================================================

pub use crate::attribute::{ValidationAttribute, ValidationAttributeExt};
pub use crate::error::{Error, Result, ValidationException};
pub use crate::result::{ValidationOutcome, ValidationResult};

// ============================================================================
// ATTRIBUTES
// ============================================================================

pub use crate::attributes::{Range, RegularExpression, Required, StringLength};
pub use crate::custom::{CustomValidation, MethodInfo, MethodResult, ValidatorType};
pub use crate::metadata::{DisplayAttribute, EditableAttribute, UiHintAttribute};

// ============================================================================
// DESCRIPTORS AND CONTEXT
// ============================================================================

pub use crate::context::{Items, ServiceContainer, ServiceProvider, ValidationContext};
pub use crate::descriptor::{
    AttributeRef, PropertyDescriptor, TypeDescriptor, Validatable, ValidatableObject,
};
pub use crate::resource::{Culture, LocalizableString, ResourceType};
pub use crate::value::{ObjectRef, Value, ValueType};

// ============================================================================
// ENGINE
// ============================================================================

pub use crate::validator;
