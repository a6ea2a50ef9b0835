//! Data Transfer Objects for the Aurax API
//!
//! Request bodies serialize in camelCase and omit optional fields that were
//! not supplied, rather than sending them as `null`.

pub mod image_generation;
pub mod product_description;
pub mod task;
pub mod vto;
