use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// Text of every page of a PDF, in page order.
pub fn pdf_text(path: &Path) -> Result<String> {
    let doc = lopdf::Document::load(path).map_err(Error::extraction)?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    if pages.is_empty() {
        return Ok(String::new());
    }
    doc.extract_text(&pages).map_err(Error::extraction)
}

/// Raw text of an OOXML word-processing document (`.docx`).
///
/// Paragraphs are separated by a blank line; tabs and explicit breaks are
/// kept. Formatting, tables and embedded objects are not interpreted.
pub fn docx_text(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(Error::extraction)?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(Error::extraction)?
        .read_to_string(&mut xml)
        .map_err(Error::extraction)?;
    document_xml_text(&xml)
}

/// Walk `word/document.xml` collecting `w:t` runs.
pub fn document_xml_text(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(Error::extraction)? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => out.push_str("\n\n"),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                b"w:p" => out.push_str("\n\n"),
                _ => {}
            },
            Event::Text(t) if in_text => {
                out.push_str(&t.unescape().map_err(Error::extraction)?);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}
