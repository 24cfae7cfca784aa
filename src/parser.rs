//! Parsing the HPO master data provided by Jax, the HGNC gene data and
//! the ClinVar variant summary
//!
//! Each submodule handles one file format. Rows that are malformed
//! abort parsing with [`PhenopacketError::InvalidInput`], because a
//! broken input file should be detected before any phenopacket is built.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::{PhenopacketError, PhenopacketResult};

/// Module to parse `genes_to_disease.txt`
pub mod genes_to_disease;
/// Module to parse `hgnc_complete_set.txt`
pub mod hgnc;
/// Module to parse `hp.obo` file
pub mod hp_obo;
/// Module to parse a list of disease IDs
pub mod id_list;
/// Module to parse HPO - disease associations from `phenotype.hpoa` file
pub mod phenotype_hpoa;
/// Module to parse ClinVar's `variant_summary.txt`
pub mod variant_summary;

/// Opens a file for buffered reading
fn open<P: AsRef<Path>>(file: P) -> PhenopacketResult<BufReader<File>> {
    let filename = file.as_ref().display().to_string();
    let file = File::open(file).map_err(|_| PhenopacketError::CannotOpenFile(filename))?;
    Ok(BufReader::new(file))
}
