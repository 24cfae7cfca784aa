use std::fmt::Display;

use crate::annotations::PhenotypeAnnotation;
use crate::term::TermGroup;
use crate::{PhenopacketError, PhenopacketResult};

/// The source database of a [`DiseaseId`]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiseaseNamespace {
    /// Online Mendelian Inheritance in Man
    Omim,
    /// Orphanet
    Orpha,
    /// DECIPHER
    Decipher,
}

impl DiseaseNamespace {
    /// The prefix used in CURIEs, e.g. `OMIM`
    pub fn prefix(&self) -> &'static str {
        match self {
            DiseaseNamespace::Omim => "OMIM",
            DiseaseNamespace::Orpha => "ORPHA",
            DiseaseNamespace::Decipher => "DECIPHER",
        }
    }
}

/// A unique, namespaced identifier of a disease, e.g. `OMIM:612567`
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct DiseaseId {
    namespace: DiseaseNamespace,
    inner: u32,
}

impl DiseaseId {
    /// Constructs a new `DiseaseId`
    pub fn new(namespace: DiseaseNamespace, inner: u32) -> Self {
        Self { namespace, inner }
    }

    /// Constructs a new OMIM `DiseaseId`
    pub fn omim(inner: u32) -> Self {
        Self::new(DiseaseNamespace::Omim, inner)
    }

    /// The namespace of the disease
    pub fn namespace(&self) -> DiseaseNamespace {
        self.namespace
    }

    /// The numerical accession within the namespace
    pub fn as_u32(&self) -> u32 {
        self.inner
    }

    /// Returns a string that is safe to use in file names, e.g. `OMIM_612567`
    pub fn file_stem(&self) -> String {
        format!("{}_{}", self.namespace.prefix(), self.inner)
    }
}

impl TryFrom<&str> for DiseaseId {
    type Error = PhenopacketError;
    /// Parses `OMIM:612567` into a [`DiseaseId`]
    ///
    /// # Errors
    ///
    /// - [`PhenopacketError::InvalidInput`]: unknown or missing namespace
    /// - [`PhenopacketError::ParseIntError`]: invalid accession number
    ///
    /// # Examples
    ///
    /// ```
    /// use phenotype2phenopacket::DiseaseId;
    ///
    /// let id = DiseaseId::try_from("OMIM:612567").unwrap();
    /// assert_eq!(id.to_string(), "OMIM:612567");
    /// assert_eq!(id.file_stem(), "OMIM_612567");
    /// ```
    fn try_from(value: &str) -> PhenopacketResult<Self> {
        let Some((prefix, accession)) = value.trim().split_once(':') else {
            return Err(PhenopacketError::InvalidInput(format!(
                "{value} is not a disease ID"
            )));
        };
        let namespace = match prefix {
            "OMIM" => DiseaseNamespace::Omim,
            "ORPHA" => DiseaseNamespace::Orpha,
            "DECIPHER" => DiseaseNamespace::Decipher,
            _ => {
                return Err(PhenopacketError::InvalidInput(format!(
                    "unknown disease namespace {prefix}"
                )))
            }
        };
        Ok(DiseaseId {
            namespace,
            inner: accession.parse::<u32>()?,
        })
    }
}

impl Display for DiseaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace.prefix(), self.inner)
    }
}

/// A single disease and its phenotype annotations
///
/// The annotations keep the order of the source file. A record can
/// end up without annotations if all of them were dropped while loading,
/// such diseases are skipped when phenopackets are built.
#[derive(Debug, Clone)]
pub struct DiseaseRecord {
    id: DiseaseId,
    name: String,
    annotations: Vec<PhenotypeAnnotation>,
}

impl DiseaseRecord {
    /// Initializes a new disease without annotations
    pub fn new(id: DiseaseId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            annotations: Vec::new(),
        }
    }

    /// The unique [`DiseaseId`]
    pub fn id(&self) -> &DiseaseId {
        &self.id
    }

    /// The disease name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All phenotype annotations, in source order
    pub fn annotations(&self) -> &[PhenotypeAnnotation] {
        &self.annotations
    }

    /// Returns `true` if the disease has no annotations
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Adds another annotation to the end of the list
    ///
    /// # Note
    ///
    /// No validation happens here. Use the
    /// [`AnnotationIndex`](crate::AnnotationIndex) to load diseases with
    /// resolved terms and frequencies.
    pub fn add_annotation(&mut self, annotation: PhenotypeAnnotation) {
        self.annotations.push(annotation);
    }

    /// The terms that are present in every patient with the disease
    pub fn obligate_terms(&self) -> TermGroup {
        self.annotations
            .iter()
            .filter(|anno| anno.is_obligate())
            .map(PhenotypeAnnotation::term)
            .collect()
    }

    /// All annotated terms, including excluded ones
    pub fn annotated_terms(&self) -> TermGroup {
        self.annotations
            .iter()
            .map(PhenotypeAnnotation::term)
            .collect()
    }
}

impl PartialEq for DiseaseRecord {
    fn eq(&self, other: &DiseaseRecord) -> bool {
        self.id == other.id
    }
}

impl Eq for DiseaseRecord {}
