//! Attaches ClinVar variants to phenopackets
use std::path::Path;

use tracing::{debug, info};

use crate::annotations::{DiseaseId, HgncData, VariantAssociation, VariantFilter, VariantSummary};
use crate::parser;
use crate::phenopacket::{PhenopacketRecord, Resource};
use crate::pipeline::Diagnostics;
use crate::{PhenopacketError, PhenopacketResult};

/// Version of the `clinvar` resource if none is provided
pub const UNKNOWN_CLINVAR_VERSION: &str = "unknown";

/// Adds the ClinVar variants of the disease to phenopackets
///
/// Only variants that pass the [`VariantFilter`] are loaded. If HGNC data
/// is available, the gene of every variant is resolved to its approved
/// symbol and HGNC ID.
///
/// # Examples
///
/// ```
/// use phenotype2phenopacket::annotations::{ClinicalSignificance, GenomeAssembly, VariantFilter};
/// use phenotype2phenopacket::variants::VariantAnnotator;
/// use phenotype2phenopacket::{Diagnostics, DiseaseId};
///
/// let filter = VariantFilter::new(ClinicalSignificance::LikelyPathogenic, GenomeAssembly::GRCh38);
/// let annotator = VariantAnnotator::from_file("tests/variant_summary.txt", &filter).unwrap();
///
/// let mut diagnostics = Diagnostics::default();
/// let variants = annotator.variants(&DiseaseId::omim(100100), &mut diagnostics);
/// let ids: Vec<&str> = variants.iter().map(|variant| variant.id.as_str()).collect();
/// assert_eq!(ids, vec!["clinvar:101", "clinvar:102"]);
/// ```
#[derive(Debug, Clone)]
pub struct VariantAnnotator {
    summary: VariantSummary,
    hgnc: Option<HgncData>,
    clinvar_version: String,
}

impl Default for VariantAnnotator {
    fn default() -> Self {
        Self::new(VariantSummary::default())
    }
}

impl VariantAnnotator {
    /// Constructs a new `VariantAnnotator`
    pub fn new(summary: VariantSummary) -> Self {
        Self {
            summary,
            hgnc: None,
            clinvar_version: UNKNOWN_CLINVAR_VERSION.to_string(),
        }
    }

    /// Loads the variants of ClinVar's `variant_summary.txt`
    ///
    /// # Errors
    ///
    /// - [`PhenopacketError::CannotOpenFile`]: the file cannot be read
    /// - [`PhenopacketError::InvalidInput`]: the file is malformed
    pub fn from_file<P: AsRef<Path>>(
        variant_summary: P,
        filter: &VariantFilter,
    ) -> PhenopacketResult<Self> {
        let summary = parser::variant_summary::parse(variant_summary, filter)?;
        info!(
            "Loaded {} {} variants of {} diseases",
            summary.len(),
            filter.assembly,
            summary.diseases()
        );
        Ok(Self::new(summary))
    }

    /// Resolves gene symbols and IDs with the HGNC data
    #[must_use]
    pub fn with_hgnc(mut self, hgnc: HgncData) -> Self {
        self.hgnc = Some(hgnc);
        self
    }

    /// Sets the release of ClinVar, used in the `clinvar` resource
    #[must_use]
    pub fn with_version(mut self, version: &str) -> Self {
        self.clinvar_version = version.to_string();
        self
    }

    /// The `clinvar` resource of the phenopacket metadata
    pub fn resource(&self) -> Resource {
        clinvar_resource(&self.clinvar_version)
    }

    /// Returns the variants of a disease
    ///
    /// Every ClinVar variation is present at most once, in file order
    pub fn variants(
        &self,
        disease: &DiseaseId,
        diagnostics: &mut Diagnostics,
    ) -> Vec<VariantAssociation> {
        let mut variants: Vec<VariantAssociation> = Vec::new();
        for variant in self.summary.variants(disease) {
            let mut association = VariantAssociation::from(variant);
            if variants.iter().any(|known| known.id == association.id) {
                continue;
            }
            if let Some(hgnc) = &self.hgnc {
                resolve_gene(&mut association, hgnc, disease, diagnostics);
            }
            variants.push(association);
        }
        variants
    }

    /// Attaches the variants of the disease to the phenopacket
    ///
    /// Existing variants are replaced and the `clinvar` resource is added
    /// once, so annotating a record twice gives the same result. Records
    /// of diseases without variants are returned unchanged.
    pub fn annotate(
        &self,
        mut record: PhenopacketRecord,
        diagnostics: &mut Diagnostics,
    ) -> PhenopacketRecord {
        let variants = self.variants(record.disease(), diagnostics);
        if variants.is_empty() {
            debug!("No variants known for {}", record.disease());
            return record;
        }
        record.replace_variants(variants);

        let resource = self.resource();
        let resources = &mut record.meta_data_mut().resources;
        match resources.iter_mut().find(|known| known.id == resource.id) {
            Some(known) => *known = resource,
            None => resources.push(resource),
        }
        record
    }
}

/// Sets the approved symbol and the HGNC ID of the variant's gene
fn resolve_gene(
    variant: &mut VariantAssociation,
    hgnc: &HgncData,
    disease: &DiseaseId,
    diagnostics: &mut Diagnostics,
) {
    let by_id = variant
        .hgnc_id
        .as_deref()
        .and_then(|id| hgnc.symbol_for_identifier(id))
        .and_then(|symbol| hgnc.record(symbol));
    let record = by_id.or_else(|| {
        variant
            .gene_symbol
            .as_deref()
            .and_then(|symbol| hgnc.record(symbol))
    });
    match record {
        Some(record) => {
            variant.gene_symbol = Some(record.symbol.clone());
            variant.hgnc_id = Some(record.hgnc_id.clone());
        }
        None => {
            if let Some(symbol) = &variant.gene_symbol {
                diagnostics.record(PhenopacketError::UnresolvedGeneSymbol {
                    disease: disease.to_string(),
                    symbol: symbol.clone(),
                });
            }
        }
    }
}

fn clinvar_resource(version: &str) -> Resource {
    Resource {
        id: "clinvar".to_string(),
        name: "Clinical Variation".to_string(),
        url: "https://www.ncbi.nlm.nih.gov/clinvar/".to_string(),
        version: version.to_string(),
        namespace_prefix: "clinvar".to_string(),
        iri_prefix: "https://www.ncbi.nlm.nih.gov/clinvar/variation/".to_string(),
    }
}
