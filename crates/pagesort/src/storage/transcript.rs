//! Combining and normalizing page transcripts.

use std::io::Cursor;

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use crate::error::StorageError;

/// Joins page fragments into a single `<document>` root.
pub fn combine_pages<S: AsRef<str>>(pages: &[S]) -> String {
    let mut xml = String::from("<document>");
    for page in pages {
        xml.push_str(page.as_ref().trim());
    }
    xml.push_str("</document>");
    xml
}

/// Re-serializes a transcript with consistent indentation.
///
/// Whitespace around text is trimmed and self-closing tags are expanded.
/// Mismatched tags are reported as [`StorageError::InvalidXml`].
pub fn format_xml(xml: &str) -> Result<String, StorageError> {
    let mut reader = Reader::from_str(xml);
    let config = reader.config_mut();
    config.trim_text(true);
    config.expand_empty_elements = true;

    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => writer
                .write_event(event)
                .map_err(|e| StorageError::InvalidXml(e.to_string()))?,
            Err(e) => {
                return Err(StorageError::InvalidXml(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| StorageError::InvalidXml(e.to_string()))
}
