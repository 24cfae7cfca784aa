//! Attaches validated gene associations to phenopackets
use std::path::Path;

use tracing::{debug, info};

use crate::annotations::{DiseaseId, GeneAssociation, GeneMapping, HgncData};
use crate::parser;
use crate::phenopacket::PhenopacketRecord;
use crate::pipeline::Diagnostics;
use crate::{PhenopacketError, PhenopacketResult};

/// Adds the known disease genes to phenopackets
///
/// Gene symbols of `genes_to_disease.txt` are validated against HGNC,
/// both approved and previous symbols are accepted. Symbols that are
/// unknown to HGNC are skipped with a warning.
///
/// # Examples
///
/// ```
/// use phenotype2phenopacket::genes::GeneAnnotator;
/// use phenotype2phenopacket::{Diagnostics, DiseaseId};
///
/// let annotator = GeneAnnotator::from_files(
///     "tests/genes_to_disease.txt",
///     "tests/hgnc_complete_set.txt",
/// ).unwrap();
///
/// let mut diagnostics = Diagnostics::default();
/// let genes = annotator.genes(&DiseaseId::omim(100100), &mut diagnostics);
/// let symbols: Vec<&str> = genes.iter().map(|gene| gene.symbol.as_str()).collect();
/// assert_eq!(symbols, vec!["ABC1", "DEF2"]);
/// assert_eq!(diagnostics.len(), 1);
/// ```
#[derive(Debug, Default, Clone)]
pub struct GeneAnnotator {
    mapping: GeneMapping,
    hgnc: HgncData,
}

impl GeneAnnotator {
    /// Constructs a new `GeneAnnotator`
    pub fn new(mapping: GeneMapping, hgnc: HgncData) -> Self {
        Self { mapping, hgnc }
    }

    /// Loads `genes_to_disease.txt` and `hgnc_complete_set.txt`
    ///
    /// # Errors
    ///
    /// - [`PhenopacketError::CannotOpenFile`]: a file cannot be read
    /// - [`PhenopacketError::InvalidInput`]: a file is malformed
    pub fn from_files<P: AsRef<Path>, Q: AsRef<Path>>(
        genes_to_disease: P,
        hgnc: Q,
    ) -> PhenopacketResult<Self> {
        let mapping = parser::genes_to_disease::parse(genes_to_disease)?;
        let hgnc = parser::hgnc::parse(hgnc)?;
        info!(
            "Loaded genes of {} diseases and {} HGNC genes",
            mapping.len(),
            hgnc.len()
        );
        Ok(Self::new(mapping, hgnc))
    }

    /// Returns the validated genes of a disease
    ///
    /// Every approved symbol is present at most once, in the order
    /// of the gene-to-disease mapping
    pub fn genes(&self, disease: &DiseaseId, diagnostics: &mut Diagnostics) -> Vec<GeneAssociation> {
        let mut genes: Vec<GeneAssociation> = Vec::new();
        for row in self.mapping.genes(disease) {
            let Some(hgnc) = self.hgnc.record(row.symbol()) else {
                diagnostics.record(PhenopacketError::UnresolvedGeneSymbol {
                    disease: disease.to_string(),
                    symbol: row.symbol().to_string(),
                });
                continue;
            };
            if genes.iter().any(|gene| gene.symbol == hgnc.symbol) {
                continue;
            }
            genes.push(GeneAssociation::new(row, hgnc));
        }
        genes
    }

    /// Attaches the genes of the disease to the phenopacket
    ///
    /// Existing gene associations are replaced, so annotating a record
    /// twice gives the same result. Records of diseases without genes are
    /// returned unchanged.
    pub fn annotate(
        &self,
        mut record: PhenopacketRecord,
        diagnostics: &mut Diagnostics,
    ) -> PhenopacketRecord {
        if self.mapping.genes(record.disease()).is_empty() {
            debug!("No genes known for {}", record.disease());
            return record;
        }
        let genes = self.genes(record.disease(), diagnostics);
        record.replace_genes(genes);
        record
    }
}
