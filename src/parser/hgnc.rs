//! The HGNC complete set is a wide, tab separated table. Only a few
//! columns are needed and they are located through the header row.
//!
//! ```text
//! hgnc_id   symbol  name                         ...  prev_symbol  ...  entrez_id  ensembl_gene_id  ...  refseq_accession
//! HGNC:5    A1BG    alpha-1-B glycoprotein       ...               ...  1          ENSG00000121410  ...  NM_130786
//! ```
use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::annotations::{HgncData, HgncRecord};
use crate::parser::open;
use crate::{PhenopacketError, PhenopacketResult};

/// Column positions of the fields that are used
#[derive(Debug, PartialEq, Eq)]
struct Columns {
    hgnc_id: usize,
    symbol: usize,
    prev_symbol: Option<usize>,
    entrez_id: Option<usize>,
    ensembl_gene_id: Option<usize>,
    refseq_accession: Option<usize>,
}

impl Columns {
    fn from_header(header: &str) -> PhenopacketResult<Self> {
        let names: Vec<&str> = header
            .trim_end_matches(['\r', '\n'])
            .split('\t')
            .map(str::trim)
            .collect();
        let position = |name: &str| names.iter().position(|col| *col == name);

        let (Some(hgnc_id), Some(symbol)) = (position("hgnc_id"), position("symbol")) else {
            return Err(PhenopacketError::InvalidInput(
                "HGNC data must contain `hgnc_id` and `symbol` columns".to_string(),
            ));
        };
        Ok(Self {
            hgnc_id,
            symbol,
            prev_symbol: position("prev_symbol"),
            entrez_id: position("entrez_id"),
            ensembl_gene_id: position("ensembl_gene_id"),
            refseq_accession: position("refseq_accession"),
        })
    }

    fn record(&self, line: &str) -> PhenopacketResult<HgncRecord> {
        let cols: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        let value = |idx: Option<usize>| {
            idx.and_then(|i| cols.get(i))
                .map(|v| v.trim().trim_matches('"'))
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let (Some(hgnc_id), Some(symbol)) = (value(Some(self.hgnc_id)), value(Some(self.symbol)))
        else {
            return Err(PhenopacketError::InvalidInput(line.to_string()));
        };

        let previous_symbols = value(self.prev_symbol)
            .map(|prev| {
                prev.split('|')
                    .map(|s| s.trim().trim_matches('"'))
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(HgncRecord {
            hgnc_id,
            symbol,
            ensembl_gene_id: value(self.ensembl_gene_id),
            entrez_id: value(self.entrez_id),
            refseq_accession: value(self.refseq_accession),
            previous_symbols,
        })
    }
}

/// Parse `hgnc_complete_set.txt`
///
/// # Errors
///
/// - [`PhenopacketError::CannotOpenFile`]: Source file not present or can't be opened
/// - [`PhenopacketError::InvalidInput`]: Required columns are missing
pub fn parse<P: AsRef<Path>>(file: P) -> PhenopacketResult<HgncData> {
    let reader = open(file)?;
    let mut lines = reader.lines();

    let columns = match lines.next() {
        Some(header) => Columns::from_header(&header?)?,
        None => {
            return Err(PhenopacketError::InvalidInput(
                "HGNC data file is empty".to_string(),
            ))
        }
    };

    let mut hgnc = HgncData::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        hgnc.insert(columns.record(&line)?);
    }
    debug!("Parsed {} HGNC genes", hgnc.len());
    Ok(hgnc)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn header_columns() {
        let columns = Columns::from_header("symbol\tname\thgnc_id\tprev_symbol").unwrap();
        assert_eq!(columns.hgnc_id, 2);
        assert_eq!(columns.symbol, 0);
        assert_eq!(columns.prev_symbol, Some(3));
        assert_eq!(columns.entrez_id, None);

        assert!(Columns::from_header("symbol\tname").is_err());
    }

    #[test]
    fn record_with_previous_symbols() {
        let columns =
            Columns::from_header("hgnc_id\tsymbol\tprev_symbol\tentrez_id\tensembl_gene_id")
                .unwrap();
        let record = columns
            .record("HGNC:2\tDEF2\t\"OLDSYM|OLDER\"\t2000\tENSG00000000002")
            .unwrap();
        assert_eq!(record.hgnc_id, "HGNC:2");
        assert_eq!(record.previous_symbols, vec!["OLDSYM", "OLDER"]);
        assert_eq!(record.entrez_id.as_deref(), Some("2000"));
        assert_eq!(record.refseq_accession, None);
    }

    #[test]
    fn record_with_missing_values() {
        let columns = Columns::from_header("hgnc_id\tsymbol\tprev_symbol").unwrap();
        let record = columns.record("HGNC:1\tABC1").unwrap();
        assert!(record.previous_symbols.is_empty());
        assert!(columns.record("HGNC:1\t").is_err());
    }

    #[test]
    fn parse_fixture() {
        let hgnc = parse("tests/hgnc_complete_set.txt").expect("fixture is valid");
        assert_eq!(hgnc.len(), 4);
        assert_eq!(
            hgnc.record("OLDSYM").map(|r| r.symbol.as_str()),
            Some("DEF2")
        );
    }
}
