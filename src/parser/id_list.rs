use std::io::BufRead;
use std::path::Path;

use crate::annotations::DiseaseId;
use crate::parser::open;
use crate::PhenopacketResult;

/// Reads a newline separated list of disease IDs
///
/// Empty lines and lines starting with `#` are skipped. The order of the
/// file is kept, duplicates are not removed.
///
/// # Errors
///
/// - [`PhenopacketError::CannotOpenFile`](crate::PhenopacketError::CannotOpenFile): file can't be opened
/// - [`PhenopacketError::InvalidInput`](crate::PhenopacketError::InvalidInput): a line is not a disease ID
pub fn parse<P: AsRef<Path>>(file: P) -> PhenopacketResult<Vec<DiseaseId>> {
    let reader = open(file)?;
    let mut ids = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        ids.push(DiseaseId::try_from(line)?);
    }
    Ok(ids)
}
