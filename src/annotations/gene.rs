use std::collections::HashMap;
use std::fmt::Display;

use crate::annotations::DiseaseId;

/// How a gene is associated with a disease in `genes_to_disease.txt`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AssociationType {
    /// The gene is causative for the disease
    Mendelian,
    /// The gene contributes to the disease
    Polygenic,
    /// Unknown or unspecified association
    #[default]
    Unknown,
}

impl From<&str> for AssociationType {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "MENDELIAN" => AssociationType::Mendelian,
            "POLYGENIC" => AssociationType::Polygenic,
            _ => AssociationType::Unknown,
        }
    }
}

impl Display for AssociationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssociationType::Mendelian => write!(f, "MENDELIAN"),
            AssociationType::Polygenic => write!(f, "POLYGENIC"),
            AssociationType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// A single row of `genes_to_disease.txt`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneToDisease {
    ncbi_gene_id: String,
    symbol: String,
    association_type: AssociationType,
    disease: DiseaseId,
    source: String,
}

impl GeneToDisease {
    /// Creates a new gene-to-disease association
    pub fn new(
        ncbi_gene_id: &str,
        symbol: &str,
        association_type: AssociationType,
        disease: DiseaseId,
        source: &str,
    ) -> Self {
        Self {
            ncbi_gene_id: ncbi_gene_id.to_string(),
            symbol: symbol.to_string(),
            association_type,
            disease,
            source: source.to_string(),
        }
    }

    /// The NCBI gene ID, e.g. `NCBIGene:10`
    pub fn ncbi_gene_id(&self) -> &str {
        &self.ncbi_gene_id
    }

    /// The gene symbol as written in the mapping file
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The type of association
    pub fn association_type(&self) -> AssociationType {
        self.association_type
    }

    /// The associated disease
    pub fn disease(&self) -> &DiseaseId {
        &self.disease
    }

    /// The source of the association, e.g. a `mim2gene` URL
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// All gene-to-disease associations, grouped by disease
#[derive(Debug, Default, Clone)]
pub struct GeneMapping {
    by_disease: HashMap<DiseaseId, Vec<GeneToDisease>>,
}

impl GeneMapping {
    /// Constructs a new, empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an association, keeping the order of insertion per disease
    pub fn insert(&mut self, association: GeneToDisease) {
        self.by_disease
            .entry(association.disease)
            .or_default()
            .push(association);
    }

    /// All associations of the disease, empty if there are none
    pub fn genes(&self, disease: &DiseaseId) -> &[GeneToDisease] {
        self.by_disease
            .get(disease)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The number of diseases with at least one associated gene
    pub fn len(&self) -> usize {
        self.by_disease.len()
    }

    /// Returns `true` if the mapping contains no associations
    pub fn is_empty(&self) -> bool {
        self.by_disease.is_empty()
    }
}

/// A single gene of the HGNC complete set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HgncRecord {
    /// The HGNC ID, e.g. `HGNC:5`
    pub hgnc_id: String,
    /// The approved gene symbol
    pub symbol: String,
    /// Ensembl gene ID
    pub ensembl_gene_id: Option<String>,
    /// NCBI (Entrez) gene ID
    pub entrez_id: Option<String>,
    /// RefSeq accession
    pub refseq_accession: Option<String>,
    /// Symbols that were used for this gene before
    pub previous_symbols: Vec<String>,
}

/// Reference data of the HGNC complete set
///
/// Genes can be looked up by their approved symbol, by a previous symbol,
/// or by any of their identifiers.
#[derive(Debug, Default, Clone)]
pub struct HgncData {
    records: HashMap<String, HgncRecord>,
    previous: HashMap<String, String>,
    identifiers: HashMap<String, String>,
}

impl HgncData {
    /// Constructs new, empty HGNC data
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record
    ///
    /// If a previous symbol is claimed by several genes, the first
    /// one wins.
    pub fn insert(&mut self, record: HgncRecord) {
        for prev in &record.previous_symbols {
            self.previous
                .entry(prev.clone())
                .or_insert_with(|| record.symbol.clone());
        }
        let identifiers = [
            Some(&record.hgnc_id),
            record.ensembl_gene_id.as_ref(),
            record.entrez_id.as_ref(),
            record.refseq_accession.as_ref(),
        ];
        for id in identifiers.into_iter().flatten() {
            self.identifiers.insert(id.clone(), record.symbol.clone());
        }
        self.records.insert(record.symbol.clone(), record);
    }

    /// Finds the gene of the symbol
    ///
    /// Approved symbols take precedence over previous symbols
    pub fn record(&self, symbol: &str) -> Option<&HgncRecord> {
        self.records.get(symbol).or_else(|| {
            self.previous
                .get(symbol)
                .and_then(|approved| self.records.get(approved))
        })
    }

    /// Returns the approved symbol of a gene identifier, e.g. `HGNC:5`
    pub fn symbol_for_identifier(&self, identifier: &str) -> Option<&str> {
        self.identifiers.get(identifier).map(String::as_str)
    }

    /// The number of genes
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if there are no genes
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Where a [`GeneAssociation`] comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssociationProvenance {
    /// The type of association
    pub association_type: AssociationType,
    /// The source of the association
    pub source: String,
}

/// A validated gene that is attached to a phenopacket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneAssociation {
    /// The approved HGNC symbol
    pub symbol: String,
    /// The HGNC ID
    pub hgnc_id: String,
    /// Ensembl gene ID
    pub ensembl_gene_id: Option<String>,
    /// NCBI gene ID
    pub ncbi_gene_id: Option<String>,
    /// Where the association comes from
    pub provenance: AssociationProvenance,
}

impl GeneAssociation {
    /// Combines a gene-to-disease row with its HGNC record
    pub fn new(row: &GeneToDisease, hgnc: &HgncRecord) -> Self {
        Self {
            symbol: hgnc.symbol.clone(),
            hgnc_id: hgnc.hgnc_id.clone(),
            ensembl_gene_id: hgnc.ensembl_gene_id.clone(),
            ncbi_gene_id: Some(row.ncbi_gene_id().to_string()).filter(|id| !id.is_empty()),
            provenance: AssociationProvenance {
                association_type: row.association_type(),
                source: row.source().to_string(),
            },
        }
    }
}
