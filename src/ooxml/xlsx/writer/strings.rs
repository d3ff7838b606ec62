//! Shared strings table for XLSX workbooks, written as rows stream in.
use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::path::{Path, PathBuf};

use super::stream::PartWriter;
use crate::common::xml::Escaper;
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::namespace;

/// Room reserved in the `<sst>` start tag for the count attributes.
const COUNTS_PLACEHOLDER_LEN: usize = 64;

/// Streaming shared strings table.
///
/// Excel stores frequently used strings in a shared table to reduce file size.
/// Each distinct string is appended to the staging file the first time it is
/// seen; the `count`/`uniqueCount` attributes are filled into a reserved
/// whitespace gap in the start tag when the table is closed.
#[derive(Debug)]
pub struct SharedStringsWriter {
    writer: Option<PartWriter<File>>,
    path: PathBuf,
    escaper: Escaper,
    /// Map from string to index for fast lookup
    string_to_index: HashMap<String, u32>,
    /// Number of references, duplicates included
    reference_count: u64,
    counts_offset: u64,
}

impl SharedStringsWriter {
    /// Create the staging file and write the table's start tag.
    pub fn create(path: &Path) -> Result<Self> {
        let mut writer = PartWriter::create(path)?;
        writer.write_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#)?;
        writer.write_str(&format!(r#"<sst xmlns="{}""#, namespace::SML_MAIN))?;
        let counts_offset = writer.position();
        writer.write_str(&" ".repeat(COUNTS_PLACEHOLDER_LEN))?;
        writer.write_str(">")?;

        Ok(Self {
            writer: Some(writer),
            path: path.to_path_buf(),
            escaper: Escaper::new(),
            string_to_index: HashMap::new(),
            reference_count: 0,
            counts_offset,
        })
    }

    /// Return the index of `text`, appending it to the table on first use.
    pub fn write_string(&mut self, text: &str) -> Result<u32> {
        let writer = self.writer.as_mut().ok_or(Error::WriterClosed)?;
        self.reference_count += 1;
        if let Some(&index) = self.string_to_index.get(text) {
            return Ok(index);
        }

        let index = u32::try_from(self.string_to_index.len()).map_err(|_| {
            Error::InvalidArgument("shared string table is full".to_string())
        })?;
        let mut entry = String::with_capacity(text.len() + 40);
        write!(
            entry,
            r#"<si><t xml:space="preserve">{}</t></si>"#,
            self.escaper.escape(text)
        )?;
        writer.write_str(&entry)?;
        self.string_to_index.insert(text.to_string(), index);
        Ok(index)
    }

    /// Number of distinct strings.
    pub fn unique_count(&self) -> usize {
        self.string_to_index.len()
    }

    /// Number of cells that referenced the table.
    pub fn reference_count(&self) -> u64 {
        self.reference_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close the table and patch its counts. Does nothing once closed.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        writer.write_str("</sst>")?;
        let counts = format!(
            r#" count="{}" uniqueCount="{}""#,
            self.reference_count,
            self.string_to_index.len()
        );
        writer.patch_at(self.counts_offset, counts.as_bytes())?;
        writer.finish()?;
        Ok(())
    }

    /// Drop the open handle without finishing the part.
    pub(crate) fn abandon(&mut self) {
        self.writer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sharedStrings.xml");
        let mut ss = SharedStringsWriter::create(&path).unwrap();
        let idx1 = ss.write_string("Hello").unwrap();
        let idx2 = ss.write_string("World").unwrap();
        let idx3 = ss.write_string("Hello").unwrap(); // Duplicate

        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert_eq!(idx3, 0); // Same as first "Hello"
        assert_eq!(ss.unique_count(), 2);
        assert_eq!(ss.reference_count(), 3);

        ss.close().unwrap();
        ss.close().unwrap();
        let xml = std::fs::read_to_string(&path).unwrap();
        assert!(xml.contains(r#" count="3" uniqueCount="2""#));
        assert!(xml.contains(r#"<si><t xml:space="preserve">Hello</t></si><si><t xml:space="preserve">World</t></si></sst>"#));
        assert!(matches!(ss.write_string("late"), Err(Error::WriterClosed)));
    }

    #[test]
    fn test_entries_are_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sharedStrings.xml");
        let mut ss = SharedStringsWriter::create(&path).unwrap();
        ss.write_string("a < b\u{1}").unwrap();
        ss.close().unwrap();
        let xml = std::fs::read_to_string(&path).unwrap();
        assert!(xml.contains("a &lt; b_x0001_"));
    }
}
