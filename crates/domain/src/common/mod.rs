//! Common utility functions.
//!
//! Pure helpers with no side effects and no dependencies beyond `std`.

pub mod string;

pub use string::{contains_phrase, normalize_phrase, strip_html};
