//! ClinVar's `variant_summary.txt` is a wide, tab separated table with
//! one row per variant and genome assembly. The columns are located
//! through the header row.
//!
//! ```text
//! #AlleleID  Type  ...  GeneSymbol  HGNC_ID     ClinicalSignificance  ...  PhenotypeIDS                     ...  Assembly  ...  Chromosome  Start     ...  ReferenceAllele  AlternateAllele  ...  VariationID  PositionVCF  ReferenceAlleleVCF  AlternateAlleleVCF
//! 15041      Indel ...  AP5Z1       HGNC:22197  Pathogenic            ...  MONDO:MONDO:0013342,OMIM:613647  ...  GRCh37    ...  7           4820844   ...  na               na               ...  2            4820844      GGAT                TGCTGTAAACTGTAACTGTAAA
//! ```
//!
//! Rows are filtered while parsing, only variants that pass the
//! [`VariantFilter`] and are reported for at least one disease are kept.
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, trace};

use crate::annotations::{
    ClinicalSignificance, ClinvarVariant, DiseaseId, VariantFilter, VariantSummary,
};
use crate::parser::open;
use crate::{PhenopacketError, PhenopacketResult};

/// Column positions of the fields that are used
#[derive(Debug, PartialEq, Eq)]
struct Columns {
    variation_id: usize,
    gene_symbol: usize,
    hgnc_id: usize,
    significance: usize,
    phenotype_ids: usize,
    assembly: usize,
    chromosome: usize,
    start: usize,
    reference: usize,
    alternate: usize,
    position_vcf: Option<usize>,
    reference_vcf: Option<usize>,
    alternate_vcf: Option<usize>,
}

/// Returns `None` for ClinVar's placeholders of missing values
fn present(value: &str) -> Option<&str> {
    match value.trim() {
        "" | "-" | "na" => None,
        value => Some(value),
    }
}

/// Extracts the disease IDs of the `PhenotypeIDS` column
///
/// Entries of different phenotypes are separated by `|`, the IDs of
/// one phenotype by `,`. IDs of other namespaces (MedGen, MONDO...)
/// are ignored.
fn disease_ids(value: &str) -> Vec<DiseaseId> {
    let mut ids: Vec<DiseaseId> = Vec::new();
    for token in value.split(['|', ',', ';']) {
        if let Ok(id) = DiseaseId::try_from(token) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

impl Columns {
    fn from_header(header: &str) -> PhenopacketResult<Self> {
        let names: Vec<&str> = header
            .trim_end_matches(['\r', '\n'])
            .split('\t')
            .map(|col| col.trim().trim_start_matches('#'))
            .collect();
        let position = |name: &str| names.iter().position(|col| *col == name);
        let required = |name: &str| {
            position(name).ok_or_else(|| {
                PhenopacketError::InvalidInput(format!(
                    "variant summary must contain a `{name}` column"
                ))
            })
        };

        Ok(Self {
            variation_id: required("VariationID")?,
            gene_symbol: required("GeneSymbol")?,
            hgnc_id: required("HGNC_ID")?,
            significance: required("ClinicalSignificance")?,
            phenotype_ids: required("PhenotypeIDS")?,
            assembly: required("Assembly")?,
            chromosome: required("Chromosome")?,
            start: required("Start")?,
            reference: required("ReferenceAllele")?,
            alternate: required("AlternateAllele")?,
            position_vcf: position("PositionVCF"),
            reference_vcf: position("ReferenceAlleleVCF"),
            alternate_vcf: position("AlternateAlleleVCF"),
        })
    }

    /// Parses a row, returns `None` if the variant is not used
    fn variant(
        &self,
        line: &str,
        filter: &VariantFilter,
    ) -> PhenopacketResult<Option<ClinvarVariant>> {
        let cols: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        let value = |idx: usize| cols.get(idx).copied().and_then(present);
        let optional = |idx: Option<usize>| idx.and_then(value);

        let Some(significance) = value(self.significance)
            .and_then(|text| ClinicalSignificance::try_from(text).ok())
        else {
            trace!("Ignoring variant without supported significance: {line}");
            return Ok(None);
        };
        let assembly = value(self.assembly).unwrap_or_default();
        if !filter.accepts(significance, assembly) {
            return Ok(None);
        }

        let diseases = value(self.phenotype_ids)
            .map(disease_ids)
            .unwrap_or_default();
        if diseases.is_empty() {
            return Ok(None);
        }

        let variation_id = value(self.variation_id)
            .and_then(|id| id.parse::<u64>().ok())
            .ok_or_else(|| PhenopacketError::InvalidInput(line.to_string()))?;

        // VCF alleles come with their own position
        let (position, reference, alternate) =
            match (value(self.reference), value(self.alternate)) {
                (Some(reference), Some(alternate)) => (value(self.start), reference, alternate),
                _ => match (optional(self.reference_vcf), optional(self.alternate_vcf)) {
                    (Some(reference), Some(alternate)) => (
                        optional(self.position_vcf).or_else(|| value(self.start)),
                        reference,
                        alternate,
                    ),
                    _ => {
                        trace!("Ignoring variant {variation_id} without alleles");
                        return Ok(None);
                    }
                },
            };
        let (Some(chromosome), Some(position)) = (
            value(self.chromosome),
            position.and_then(|pos| pos.parse::<u64>().ok()),
        ) else {
            trace!("Ignoring variant {variation_id} without position");
            return Ok(None);
        };

        let gene_symbol = value(self.gene_symbol)
            .and_then(|symbols| symbols.split(';').next())
            .and_then(present)
            .map(str::to_string);

        Ok(Some(ClinvarVariant {
            variation_id,
            gene_symbol,
            hgnc_id: value(self.hgnc_id).map(str::to_string),
            significance,
            assembly: filter.assembly,
            chromosome: chromosome.to_string(),
            position,
            reference: reference.to_string(),
            alternate: alternate.to_string(),
            diseases,
        }))
    }
}

/// Parse `variant_summary.txt`
///
/// # Errors
///
/// - [`PhenopacketError::CannotOpenFile`]: Source file not present or can't be opened
/// - [`PhenopacketError::InvalidInput`]: Required columns are missing or a
///   used row has no numeric `VariationID`
pub fn parse<P: AsRef<Path>>(
    file: P,
    filter: &VariantFilter,
) -> PhenopacketResult<VariantSummary> {
    let reader = open(file)?;
    let mut lines = reader.lines();

    let columns = match lines.next() {
        Some(header) => Columns::from_header(&header?)?,
        None => {
            return Err(PhenopacketError::InvalidInput(
                "variant summary file is empty".to_string(),
            ))
        }
    };

    let mut summary = VariantSummary::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Some(variant) = columns.variant(&line, filter)? {
            summary.insert(variant);
        }
    }
    debug!(
        "Parsed {} variants of {} diseases",
        summary.len(),
        summary.diseases()
    );
    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::annotations::GenomeAssembly;

    const HEADER: &str = "#AlleleID\tGeneSymbol\tHGNC_ID\tClinicalSignificance\tPhenotypeIDS\tAssembly\tChromosome\tStart\tReferenceAllele\tAlternateAllele\tVariationID\tPositionVCF\tReferenceAlleleVCF\tAlternateAlleleVCF";

    fn filter(min: ClinicalSignificance) -> VariantFilter {
        VariantFilter::new(min, GenomeAssembly::GRCh38)
    }

    #[test]
    fn header_columns() {
        let columns = Columns::from_header(HEADER).unwrap();
        assert_eq!(columns.gene_symbol, 1);
        assert_eq!(columns.variation_id, 10);
        assert_eq!(columns.alternate_vcf, Some(13));

        assert!(matches!(
            Columns::from_header("#AlleleID\tGeneSymbol"),
            Err(PhenopacketError::InvalidInput(_))
        ));
    }

    #[test]
    fn phenotype_ids() {
        assert_eq!(
            disease_ids("MONDO:MONDO:0013342,MedGen:C3150901,OMIM:613647|OMIM:100100,OMIM:613647"),
            vec![DiseaseId::omim(613647), DiseaseId::omim(100100)]
        );
        assert!(disease_ids("MedGen:CN517202").is_empty());
    }

    #[test]
    fn variant_with_vcf_alleles() {
        let columns = Columns::from_header(HEADER).unwrap();
        let line = "15041\tAP5Z1\tHGNC:22197\tPathogenic\tMONDO:MONDO:0013342,OMIM:613647\tGRCh38\t7\t4781213\tna\tna\t2\t4781212\tGGAT\tTG";
        let variant = columns
            .variant(line, &filter(ClinicalSignificance::LikelyPathogenic))
            .unwrap()
            .expect("variant passes the filter");
        assert_eq!(variant.variation_id, 2);
        assert_eq!(variant.gene_symbol.as_deref(), Some("AP5Z1"));
        assert_eq!(variant.position, 4781212);
        assert_eq!(variant.reference, "GGAT");
        assert_eq!(variant.alternate, "TG");
        assert_eq!(variant.diseases, vec![DiseaseId::omim(613647)]);
    }

    #[test]
    fn variant_with_plain_alleles() {
        let columns = Columns::from_header(HEADER).unwrap();
        let line = "1\tABC1;LOC1\t-\tLikely pathogenic\tOMIM:100100\tGRCh38\t1\t1000\tA\tG\t10\t1000\tA\tG";
        let variant = columns
            .variant(line, &filter(ClinicalSignificance::LikelyPathogenic))
            .unwrap()
            .unwrap();
        assert_eq!(variant.gene_symbol.as_deref(), Some("ABC1"));
        assert_eq!(variant.hgnc_id, None);
        assert_eq!(variant.position, 1000);
    }

    #[test]
    fn filtered_rows() {
        let columns = Columns::from_header(HEADER).unwrap();
        let filter = filter(ClinicalSignificance::LikelyPathogenic);
        for line in [
            // wrong assembly
            "1\tABC1\tHGNC:1\tPathogenic\tOMIM:100100\tGRCh37\t1\t1000\tA\tG\t10\t1000\tA\tG",
            // not pathogenic enough
            "1\tABC1\tHGNC:1\tUncertain significance\tOMIM:100100\tGRCh38\t1\t1000\tA\tG\t10\t1000\tA\tG",
            // combined significance
            "1\tABC1\tHGNC:1\tPathogenic/Likely pathogenic\tOMIM:100100\tGRCh38\t1\t1000\tA\tG\t10\t1000\tA\tG",
            // no OMIM disease
            "1\tABC1\tHGNC:1\tPathogenic\tMedGen:CN517202\tGRCh38\t1\t1000\tA\tG\t10\t1000\tA\tG",
            // no alleles
            "1\tABC1\tHGNC:1\tPathogenic\tOMIM:100100\tGRCh38\t1\t1000\tna\tna\t10\t1000\tna\tna",
        ] {
            assert_eq!(columns.variant(line, &filter), Ok(None), "{line}");
        }
    }

    #[test]
    fn invalid_variation_id() {
        let columns = Columns::from_header(HEADER).unwrap();
        let line = "1\tABC1\tHGNC:1\tPathogenic\tOMIM:100100\tGRCh38\t1\t1000\tA\tG\tfoo\t1000\tA\tG";
        assert!(matches!(
            columns.variant(line, &filter(ClinicalSignificance::Pathogenic)),
            Err(PhenopacketError::InvalidInput(_))
        ));
    }

    #[test]
    fn parse_fixture() {
        let summary = parse(
            "tests/variant_summary.txt",
            &filter(ClinicalSignificance::LikelyPathogenic),
        )
        .expect("fixture is valid");
        assert_eq!(summary.len(), 3);
        let ids: Vec<u64> = summary
            .variants(&DiseaseId::omim(100100))
            .map(|variant| variant.variation_id)
            .collect();
        assert_eq!(ids, vec![101, 102]);
        assert_eq!(summary.variants(&DiseaseId::omim(200200)).count(), 1);
        assert_eq!(summary.variants(&DiseaseId::omim(300300)).count(), 0);
    }
}
