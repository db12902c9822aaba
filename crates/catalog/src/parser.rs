//! Parser for catalog data files.
//!
//! - attributes.dat: one attribute name per line, in vector order
//! - items.dat: itemId::title::year::tags::attributes::factors[::synopsis]
//!
//! Tags are pipe-separated ("space|rescue"), vectors are comma-separated
//! ("0.8,0.2,0.1,0.9"), the year may be left empty. Blank lines and lines
//! starting with `#` are skipped in both files.

use crate::error::{CatalogError, Result};
use crate::types::*;
use std::fs;
use std::path::Path;

/// Read a file into (line number, trimmed line) pairs, skipping blanks and comments
fn read_data_lines(path: &Path) -> Result<Vec<(usize, String)>> {
    if !path.exists() {
        return Err(CatalogError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path)?;

    Ok(content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim().to_string()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .collect())
}

fn parse_error(file: &str, line: usize, reason: impl Into<String>) -> CatalogError {
    CatalogError::ParseError {
        file: file.to_string(),
        line,
        reason: reason.into(),
    }
}

/// Parse the attributes.dat file into a schema
pub fn parse_schema(path: &Path) -> Result<AttributeSchema> {
    let lines = read_data_lines(path)?;
    let mut names: Vec<String> = Vec::with_capacity(lines.len());

    for (line_no, name) in lines {
        if names.contains(&name) {
            return Err(parse_error(
                "attributes.dat",
                line_no,
                format!("Duplicate attribute: {}", name),
            ));
        }
        names.push(name);
    }

    Ok(AttributeSchema::new(names))
}

/// Parse the items.dat file
///
/// Dimensions are not checked here; [`Catalog::from_items`] validates them
/// against the schema.
pub fn parse_items(path: &Path) -> Result<Vec<Item>> {
    const FILE: &str = "items.dat";
    let lines = read_data_lines(path)?;
    let mut items = Vec::with_capacity(lines.len());

    for (line_no, line) in lines {
        let mut parts = line.split("::");
        let mut next_field = |name: &str| {
            parts
                .next()
                .ok_or_else(|| parse_error(FILE, line_no, format!("Missing {}", name)))
        };

        let id = next_field("itemId")?.trim();
        let title = next_field("title")?.trim();
        let year = next_field("year")?.trim();
        let tags = next_field("tags")?;
        let attributes = next_field("attributes")?;
        let factors = next_field("factors")?;
        let synopsis = parts.next().unwrap_or("").trim();

        if id.is_empty() {
            return Err(parse_error(FILE, line_no, "Empty itemId"));
        }

        let item = Item {
            id: id.to_string(),
            title: title.to_string(),
            synopsis: synopsis.to_string(),
            year: parse_year(year)
                .map_err(|reason| parse_error(FILE, line_no, reason))?,
            tags: parse_tags(tags),
            attributes: parse_vector(attributes)
                .map_err(|reason| parse_error(FILE, line_no, format!("attributes: {}", reason)))?,
            factors: parse_vector(factors)
                .map_err(|reason| parse_error(FILE, line_no, format!("factors: {}", reason)))?,
        };

        items.push(item);
    }

    Ok(items)
}

/// Empty string -> None, otherwise a valid year
fn parse_year(s: &str) -> std::result::Result<Option<u16>, String> {
    if s.is_empty() {
        return Ok(None);
    }
    s.parse::<u16>()
        .map(Some)
        .map_err(|e| format!("Invalid year '{}': {}", s, e))
}

/// Pipe-separated tags, empty segments dropped
fn parse_tags(s: &str) -> Vec<String> {
    s.split('|')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Comma-separated finite floats
fn parse_vector(s: &str) -> std::result::Result<Vec<f32>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(',')
        .map(|value| {
            let value = value.trim();
            match value.parse::<f32>() {
                Ok(v) if v.is_finite() => Ok(v),
                Ok(_) => Err(format!("non-finite value '{}'", value)),
                Err(e) => Err(format!("invalid number '{}': {}", value, e)),
            }
        })
        .collect()
}
