//! # Example lines
//!
//! ```text
//! #date: 2023-04-05
//! database_id  disease_name  qualifier  hpo_id  reference  evidence  onset  frequency  sex  modifier  aspect  biocuration
//! OMIM:619340  Developmental and epileptic encephalopathy 96      HP:0011097  PMID:31675180  PCS  1/2  P  HPO:probinson[2021-06-21]
//! OMIM:609153  Pseudohyperkalemia                             NOT HP:0001878  PMID:2766660   PCS       P  HPO:lccarmody[2018-10-03]
//! ```
use std::io::BufRead;
use std::path::Path;

use crate::annotations::DiseaseId;
use crate::parser::open;
use crate::{PhenopacketError, PhenopacketResult};

/// The minimum number of columns, `biocuration` may be missing
const MIN_COLUMNS: usize = 11;

/// A single annotation row
///
/// Term IDs and the frequency are kept as text, because invalid values
/// only invalidate the row and are handled by the
/// [`AnnotationIndex`](crate::AnnotationIndex).
#[derive(Debug, PartialEq, Eq)]
pub struct HpoaRow<'a> {
    /// The disease the row belongs to
    pub disease: DiseaseId,
    /// The disease name
    pub disease_name: &'a str,
    /// `true` for the `NOT` qualifier
    pub excluded: bool,
    /// The annotated term
    pub hpo_id: &'a str,
    /// The onset term, if present
    pub onset: Option<&'a str>,
    /// The frequency as written in the file
    pub frequency: &'a str,
    /// Clinical modifier terms
    pub modifiers: Vec<&'a str>,
    /// `P`henotype, `I`nheritance, `C`linical course or `M`odifier
    pub aspect: &'a str,
}

fn optional(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Parses a single data line
///
/// Returns `None` for comment and header lines
fn parse_line(line: &str) -> PhenopacketResult<Option<HpoaRow<'_>>> {
    if line.starts_with('#') || line.starts_with("database_id") || line.trim().is_empty() {
        return Ok(None);
    }

    let cols: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    if cols.len() < MIN_COLUMNS {
        return Err(PhenopacketError::InvalidInput(line.to_string()));
    }

    let disease = DiseaseId::try_from(cols[0])
        .map_err(|_| PhenopacketError::InvalidInput(line.to_string()))?;

    let modifiers = cols[9]
        .split(';')
        .filter_map(optional)
        .collect();

    Ok(Some(HpoaRow {
        disease,
        disease_name: cols[1].trim(),
        excluded: cols[2].trim() == "NOT",
        hpo_id: cols[3].trim(),
        onset: optional(cols[6]),
        frequency: cols[7].trim(),
        modifiers,
        aspect: cols[10].trim(),
    }))
}

/// Extracts the release date from header lines like `#date: 2023-04-05`
fn parse_version(line: &str) -> Option<&str> {
    let header = line.strip_prefix('#')?;
    let (key, value) = header.split_once(':')?;
    match key.trim() {
        "date" | "version" => Some(value.trim()),
        _ => None,
    }
}

/// Reads `phenotype.hpoa` and calls `row_handler` for every data row
///
/// Returns the release version from the file header, if present
///
/// # Errors
///
/// - [`PhenopacketError::CannotOpenFile`]: Source file not present or can't be opened
/// - [`PhenopacketError::InvalidInput`]: A line has too few columns or an invalid disease ID
/// - Any error returned by `row_handler`
pub fn parse<P, F>(file: P, mut row_handler: F) -> PhenopacketResult<Option<String>>
where
    P: AsRef<Path>,
    F: FnMut(HpoaRow<'_>) -> PhenopacketResult<()>,
{
    let reader = open(file)?;
    let mut version = None;
    for line in reader.lines() {
        let line = line?;
        if version.is_none() {
            if let Some(v) = parse_version(&line) {
                version = Some(v.to_string());
                continue;
            }
        }
        if let Some(row) = parse_line(&line)? {
            row_handler(row)?;
        }
    }
    Ok(version)
}
