//! # Aurora Development Tools
//!
//! Command-line tools for content authors:
//! - Content table validation
//! - Export of the built-in tables as an editable RON template

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod validate;
