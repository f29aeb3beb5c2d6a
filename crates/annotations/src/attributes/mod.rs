//! Built-in validation attributes
//!
//! - [`Required`]: rejects null and blank strings
//! - [`StringLength`]: bounds the length of a string
//! - [`Range`]: bounds a comparable value
//! - [`RegularExpression`]: requires a whole-string pattern match
//!
//! Custom logic bound to an external function lives in
//! [`custom`](crate::custom).

mod range;
mod regular_expression;
mod required;
mod string_length;

pub use range::Range;
pub use regular_expression::RegularExpression;
pub use required::Required;
pub use string_length::StringLength;
