//! Custom request extractors.

pub mod body;

pub use body::FormOrJson;
