//! Open Packaging Conventions (OPC) vocabulary.
//!
//! Content types, namespaces and relationship types used when assembling
//! an Office Open XML package.

pub mod constants;
