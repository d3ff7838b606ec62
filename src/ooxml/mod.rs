//! Office Open XML (OOXML) format implementation.
//!
//! 1. **OPC Layer** (`opc`): package-level constants
//! 2. **Format-Specific Modules**: `xlsx` for Excel workbooks
pub mod opc;
pub mod xlsx;
