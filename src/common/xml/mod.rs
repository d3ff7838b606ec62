//! XML text helpers shared by every part writer.

pub mod escape;

pub use escape::{Escaper, escape_xml, unescape_xml};
