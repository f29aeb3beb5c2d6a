//! # nebula-annotations
//!
//! Declarative validation attributes and the engine that runs them.
//!
//! Types describe their properties and attach validation attributes through
//! a [`TypeDescriptor`](descriptor::TypeDescriptor). The engine in
//! [`validator`] reads those descriptors, runs the attributes in declaration
//! order and either collects [`ValidationResult`](result::ValidationResult)s
//! or raises the first failure.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nebula_annotations::prelude::*;
//!
//! let mut results = Vec::new();
//! let context = ValidationContext::new(Arc::clone(&customer));
//! let valid = validator::try_validate_object(&customer, &context, Some(&mut results), true)?;
//! ```
//!
//! ## Built-in Attributes
//!
//! - [`Required`](attributes::Required)
//! - [`StringLength`](attributes::StringLength)
//! - [`Range`](attributes::Range)
//! - [`RegularExpression`](attributes::RegularExpression)
//! - [`CustomValidation`](custom::CustomValidation), bound to an external method
//!
//! ## Messages
//!
//! Every attribute formats its message from a default template, a literal
//! override or a localized resource, see [`message`]. Localized text is
//! resolved for the [`Culture`](resource::Culture) carried by the context.

pub mod attribute;
pub mod attributes;
pub mod context;
pub mod custom;
pub mod descriptor;
pub mod error;
pub mod message;
pub mod metadata;
pub mod prelude;
pub mod resource;
pub mod result;
pub mod validator;
pub mod value;

pub use error::{Error, Result};
