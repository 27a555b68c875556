//! Loading page input produced by the page-access collaborator.
//!
//! The input format is the JSON form of `Vec<Page>`:
//!
//! ```json
//! [
//!   {
//!     "number": 0, "width": 612.0, "height": 792.0,
//!     "blocks": [{ "kind": "body", "lines": [
//!       { "text": "Figure 1: Results.", "font_size": 9.0,
//!         "bbox": { "x1": 50.0, "y1": 400.0, "x2": 300.0, "y2": 410.0 } }
//!     ]}],
//!     "primitives": [{ "kind": "stroke",
//!       "bbox": { "x1": 100.0, "y1": 100.0, "x2": 400.0, "y2": 380.0 } }]
//!   }
//! ]
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::Result;
use crate::model::Page;

/// Read pages from any reader.
pub fn load_pages<R: Read>(reader: R) -> Result<Vec<Page>> {
    let pages: Vec<Page> = serde_json::from_reader(reader)?;
    log::debug!("Loaded {} page(s)", pages.len());
    Ok(pages)
}

/// Read pages from a JSON file.
pub fn load_pages_file<P: AsRef<Path>>(path: P) -> Result<Vec<Page>> {
    let file = File::open(path)?;
    load_pages(BufReader::new(file))
}

/// Read pages from an in-memory JSON document.
pub fn load_pages_bytes(data: &[u8]) -> Result<Vec<Page>> {
    let pages: Vec<Page> = serde_json::from_slice(data)?;
    Ok(pages)
}
