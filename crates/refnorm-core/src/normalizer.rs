//! Reference normalizer: deduplicates and numerically sorts color references
//!
//! For every color record carrying a `references` list:
//!
//! 1. Drop exact-string duplicates
//! 2. Parse each survivor as an integer
//! 3. Sort ascending by integer value
//! 4. Write back the canonical decimal form of each integer
//!
//! # Guarantees
//!
//! - **Idempotent**: `normalize(normalize(x)) == normalize(x)`
//! - **All-or-nothing**: on error no record is modified
//! - **Local**: records without `references` are never touched

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::document::{validate_references, Document};
use crate::{Error, Result, COLORS_KEY, REFERENCES_KEY};

/// Counters and findings from one normalization pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    /// Color records seen
    pub records: usize,
    pub records_with_references: usize,
    /// Records whose `references` value differs after normalization
    pub records_changed: usize,
    /// Entries removed across all records (input length minus output length)
    pub duplicates_removed: usize,
    /// References naming no entry in `palettes`
    pub dangling: Vec<DanglingReference>,
}

/// A reference with no matching palette
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DanglingReference {
    pub color: String,
    pub reference: String,
}

// ── Public API ─────────────────────────────────────────────

/// Normalize JSON text and return the pretty-printed result
///
/// Pipeline: parse → validate shape → normalize → serialize
///
/// # Errors
/// Returns `Json`/`InvalidShape`/`MissingColors` for bad input and
/// `InvalidReference` for a reference that is not an integer.
pub fn normalize_str(text: &str) -> Result<String> {
    let mut doc = Document::parse(text)?;
    normalize_document(&mut doc)?;
    doc.to_pretty_string()
}

/// Normalize every color in a document and look for dangling references
pub fn normalize_document(doc: &mut Document) -> Result<NormalizeReport> {
    let mut report = normalize_colors(doc.colors_mut()?)?;
    report.dangling = find_dangling(doc)?;
    for d in &report.dangling {
        warn!(color = %d.color, reference = %d.reference, "reference names no palette");
    }
    Ok(report)
}

/// Normalize the `references` of every record in a `colors` mapping
///
/// Every new list is computed before any record is written, so an
/// `InvalidReference` leaves `colors` exactly as it was.
pub fn normalize_colors(colors: &mut Map<String, Value>) -> Result<NormalizeReport> {
    let mut report = NormalizeReport {
        records: colors.len(),
        ..NormalizeReport::default()
    };
    let mut updates: Vec<(String, Vec<String>)> = Vec::new();

    for (id, record) in colors.iter() {
        let Some(references) = record.get(REFERENCES_KEY) else {
            continue;
        };
        validate_references(
            references,
            &format!("{}.{}.{}", COLORS_KEY, id, REFERENCES_KEY),
        )?;
        report.records_with_references += 1;

        let current: Vec<&str> = references
            .as_array()
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let normalized = normalize_references(id, &current)?;

        if normalized.iter().map(String::as_str).ne(current.iter().copied()) {
            report.records_changed += 1;
            report.duplicates_removed += current.len() - normalized.len();
            debug!(
                color = %id,
                before = current.len(),
                after = normalized.len(),
                "normalized references"
            );
            updates.push((id.clone(), normalized));
        }
    }

    for (id, normalized) in updates {
        if let Some(record) = colors.get_mut(&id).and_then(Value::as_object_mut) {
            let list = normalized.into_iter().map(Value::String).collect();
            record.insert(REFERENCES_KEY.to_string(), Value::Array(list));
        }
    }

    Ok(report)
}

/// Deduplicate, sort numerically, and canonicalize one reference list
///
/// Duplicates are exact string matches. Distinct strings with the same
/// integer value (`"01"`, `"1"`) collapse once rendered canonically.
///
/// # Errors
/// `InvalidReference` naming `color` and the index of the first bad entry.
pub fn normalize_references(color: &str, references: &[&str]) -> Result<Vec<String>> {
    let mut seen = HashSet::with_capacity(references.len());
    let mut values = Vec::with_capacity(references.len());

    for (index, raw) in references.iter().enumerate() {
        if !seen.insert(*raw) {
            continue;
        }
        let value = parse_reference(raw).ok_or_else(|| Error::InvalidReference {
            color: color.to_string(),
            index,
            value: raw.to_string(),
        })?;
        values.push(value);
    }

    values.sort_unstable();
    values.dedup();
    Ok(values.into_iter().map(|v| v.to_string()).collect())
}

/// An integer reference of any width, held in canonical form
///
/// `digits` has no leading zeros and zero is never negative, so equal
/// integers compare and print equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    negative: bool,
    digits: String,
}

impl Ord for Reference {
    fn cmp(&self, other: &Self) -> Ordering {
        let magnitude = self
            .digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(&other.digits));
        match (self.negative, other.negative) {
            (false, false) => magnitude,
            (true, true) => magnitude.reverse(),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Reference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        f.write_str(&self.digits)
    }
}

/// Parse a reference string as an integer
///
/// Accepts surrounding ASCII whitespace and one leading `+` or `-`.
/// There is no width limit. Returns `None` for anything else.
pub fn parse_reference(raw: &str) -> Option<Reference> {
    let trimmed = raw.trim_matches(|c: char| c.is_ascii_whitespace());
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(Reference {
            negative: false,
            digits: "0".to_string(),
        });
    }
    Some(Reference {
        negative,
        digits: digits.to_string(),
    })
}

/// Canonical form of a key or reference, or the string itself if it is
/// not an integer
fn canonical_key(raw: &str) -> String {
    parse_reference(raw).map_or_else(|| raw.to_string(), |r| r.to_string())
}

/// References that name no key of `palettes`
///
/// Keys and references are compared by integer value, so a palette stored
/// under `"007"` matches the reference `"7"`. Empty when the document has no
/// `palettes` mapping.
pub fn find_dangling(doc: &Document) -> Result<Vec<DanglingReference>> {
    let Some(palettes) = doc.palettes() else {
        return Ok(Vec::new());
    };
    let keys: HashSet<String> = palettes.keys().map(|k| canonical_key(k)).collect();
    let mut dangling = Vec::new();
    for (id, record) in doc.colors()? {
        let Some(references) = record.get(REFERENCES_KEY).and_then(Value::as_array) else {
            continue;
        };
        for reference in references.iter().filter_map(Value::as_str) {
            if !keys.contains(&canonical_key(reference)) {
                dangling.push(DanglingReference {
                    color: id.clone(),
                    reference: reference.to_string(),
                });
            }
        }
    }
    Ok(dangling)
}
