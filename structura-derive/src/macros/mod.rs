//! Macro implementations

pub mod structure;

pub use structure::derive_structure;
