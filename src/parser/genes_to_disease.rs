//! ```text
//! ncbi_gene_id    gene_symbol association_type    disease_id  source
//! NCBIGene:10     NAT2        MENDELIAN           OMIM:243400 ftp://ftp.omim.org/mim2gene_medgen
//! NCBIGene:100    ADA         MENDELIAN           OMIM:102700 ftp://ftp.omim.org/mim2gene_medgen
//! ```
use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::annotations::{AssociationType, DiseaseId, GeneMapping, GeneToDisease};
use crate::parser::open;
use crate::{PhenopacketError, PhenopacketResult};

/// Checks that the first line is the expected header
fn check_header(line: &str) -> PhenopacketResult<()> {
    if line.starts_with('#') || line.starts_with("ncbi_gene_id") {
        Ok(())
    } else {
        Err(PhenopacketError::InvalidInput(
            "genes_to_disease.txt file must contain a header".to_string(),
        ))
    }
}

/// Parses a single line of `genes_to_disease.txt`
fn parse_line(line: &str) -> PhenopacketResult<GeneToDisease> {
    let mut cols = line.trim_end_matches(['\r', '\n']).split('\t');

    let (Some(ncbi_id), Some(symbol), Some(association), Some(disease)) =
        (cols.next(), cols.next(), cols.next(), cols.next())
    else {
        return Err(PhenopacketError::InvalidInput(line.to_string()));
    };
    let source = cols.next().unwrap_or_default();

    if symbol.trim().is_empty() {
        return Err(PhenopacketError::InvalidInput(line.to_string()));
    }
    let disease = DiseaseId::try_from(disease)
        .map_err(|_| PhenopacketError::InvalidInput(line.to_string()))?;

    Ok(GeneToDisease::new(
        ncbi_id.trim(),
        symbol.trim(),
        AssociationType::from(association),
        disease,
        source.trim(),
    ))
}

/// Parse `genes_to_disease.txt` file
///
/// # Errors
///
/// - [`PhenopacketError::CannotOpenFile`]: Source file not present or can't be opened
/// - [`PhenopacketError::InvalidInput`]: Header is missing or a line is malformed
pub fn parse<P: AsRef<Path>>(file: P) -> PhenopacketResult<GeneMapping> {
    let reader = open(file)?;
    let mut mapping = GeneMapping::new();
    let mut lines = reader.lines();

    match lines.next() {
        Some(header) => check_header(&header?)?,
        None => {
            return Err(PhenopacketError::InvalidInput(
                "genes_to_disease.txt is empty".to_string(),
            ))
        }
    }

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        mapping.insert(parse_line(&line)?);
    }
    debug!("Parsed gene associations of {} diseases", mapping.len());
    Ok(mapping)
}
