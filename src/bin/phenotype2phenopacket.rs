//! Command line interface to convert HPO disease annotations into phenopackets
//!
//! Usage:
//!   phenotype2phenopacket convert -p phenotype.hpoa -O hp.obo -o out/ [-n 10] [-i OMIM:612567]
//!   phenotype2phenopacket create -p phenotype.hpoa -O hp.obo -o out/ [--patients 5] [--seed 42]
//!   phenotype2phenopacket add-genes -p out/ --genes-to-disease genes_to_disease.txt --hgnc-data hgnc_complete_set.txt -o with_genes/
//!   phenotype2phenopacket add-variants -p out/ -s variant_summary.txt --hgnc-data hgnc_complete_set.txt -c 4 -g GRCh38 -o with_variants/
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use phenotype2phenopacket::annotations::{ClinicalSignificance, GenomeAssembly, VariantFilter};
use phenotype2phenopacket::genes::GeneAnnotator;
use phenotype2phenopacket::parser::{hgnc, id_list};
use phenotype2phenopacket::phenopacket::write_phenopacket;
use phenotype2phenopacket::pipeline::{add_genes_to_directory, add_variants_to_directory};
use phenotype2phenopacket::variants::{VariantAnnotator, UNKNOWN_CLINVAR_VERSION};
use phenotype2phenopacket::{
    AnnotationIndex, Diagnostics, DiseaseId, DiseaseSelection, NoiseConfig, Ontology,
    PhenopacketRecord, PhenopacketResult, Pipeline, RunSummary, SynthesisConfig,
    DEFAULT_PATIENTS_PER_DISEASE, DEFAULT_SEED,
};

#[derive(Parser)]
#[command(name = "phenotype2phenopacket")]
#[command(version)]
#[command(about = "Convert HPO disease annotations into phenopackets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug output, `RUST_LOG` takes precedence
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create one phenopacket per disease with all annotated phenotypes
    Convert(InputArgs),

    /// Create synthetic patients with sampled phenotypes
    Create {
        #[command(flatten)]
        input: InputArgs,

        /// Number of synthetic patients per disease
        #[arg(long, default_value_t = DEFAULT_PATIENTS_PER_DISEASE)]
        patients: usize,

        /// Seed for reproducible patients
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Probability that a phenotype is missed
        #[arg(long, default_value_t = NoiseConfig::default().deletion())]
        deletion: f64,

        /// Probability that a phenotype is replaced by a more general term
        #[arg(long, default_value_t = NoiseConfig::default().imprecision())]
        imprecision: f64,

        /// Probability that an unrelated phenotype is added
        #[arg(long, default_value_t = NoiseConfig::default().addition())]
        addition: f64,

        /// Maximum number of levels for imprecise terms
        #[arg(long, default_value_t = NoiseConfig::default().max_imprecision_levels())]
        max_imprecision_levels: usize,
    },

    /// Add known disease genes to existing phenopackets
    AddGenes {
        /// Directory with phenopacket JSON files
        #[arg(short = 'p', long)]
        phenopacket_dir: PathBuf,

        #[command(flatten)]
        genes: GeneArgs,

        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,
    },

    /// Add ClinVar variants to existing phenopackets
    AddVariants {
        /// Directory with phenopacket JSON files
        #[arg(short = 'p', long)]
        phenopacket_dir: PathBuf,

        /// Path to ClinVar's `variant_summary.txt`
        #[arg(short = 's', long)]
        variant_summary: PathBuf,

        /// Path to `hgnc_complete_set.txt`
        #[arg(long)]
        hgnc_data: PathBuf,

        /// Minimum clinical significance: 0 not provided, 1 benign, 2 likely benign,
        /// 3 uncertain significance, 4 likely pathogenic, 5 pathogenic
        #[arg(short = 'c', long)]
        clinical_significance_filter: ClinicalSignificance,

        /// Genome assembly of the variant positions, `GRCh37` or `GRCh38`
        #[arg(short = 'g', long)]
        genome_assembly_filter: GenomeAssembly,

        /// Release of the ClinVar data
        #[arg(long, default_value = UNKNOWN_CLINVAR_VERSION)]
        clinvar_version: String,

        /// Output directory
        #[arg(short, long)]
        output_dir: PathBuf,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Path to `phenotype.hpoa`
    #[arg(short = 'p', long)]
    phenotype_annotation: PathBuf,

    /// Path to `hp.obo`
    #[arg(short = 'O', long)]
    hpo: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Only process the first N diseases
    #[arg(short, long, conflicts_with_all = ["omim_id", "omim_id_list"])]
    num_diseases: Option<usize>,

    /// Only process a single disease, e.g. `OMIM:612567`
    #[arg(short = 'i', long, conflicts_with = "omim_id_list")]
    omim_id: Option<String>,

    /// File with one disease ID per line
    #[arg(short = 'l', long)]
    omim_id_list: Option<PathBuf>,

    #[command(flatten)]
    genes: OptionalGeneArgs,
}

#[derive(Args)]
struct GeneArgs {
    /// Path to `genes_to_disease.txt`
    #[arg(long)]
    genes_to_disease: PathBuf,

    /// Path to `hgnc_complete_set.txt`
    #[arg(long)]
    hgnc_data: PathBuf,
}

#[derive(Args)]
struct OptionalGeneArgs {
    /// Path to `genes_to_disease.txt`, adds genes to the phenopackets
    #[arg(long, requires = "hgnc_data")]
    genes_to_disease: Option<PathBuf>,

    /// Path to `hgnc_complete_set.txt`
    #[arg(long, requires = "genes_to_disease")]
    hgnc_data: Option<PathBuf>,
}

impl InputArgs {
    fn selection(&self) -> PhenopacketResult<DiseaseSelection> {
        if let Some(id) = &self.omim_id {
            return Ok(DiseaseSelection::Ids(vec![DiseaseId::try_from(id.as_str())?]));
        }
        if let Some(file) = &self.omim_id_list {
            return Ok(DiseaseSelection::Ids(id_list::parse(file)?));
        }
        Ok(match self.num_diseases {
            Some(k) => DiseaseSelection::First(k),
            None => DiseaseSelection::All,
        })
    }

    fn gene_annotator(&self) -> PhenopacketResult<Option<GeneAnnotator>> {
        match (&self.genes.genes_to_disease, &self.genes.hgnc_data) {
            (Some(genes_to_disease), Some(hgnc)) => {
                GeneAnnotator::from_files(genes_to_disease, hgnc).map(Some)
            }
            _ => Ok(None),
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn prepare_output(dir: &Path) -> PhenopacketResult<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Runs `convert` or `create`
fn run_pipeline(
    input: &InputArgs,
    synthesis: Option<SynthesisConfig>,
) -> PhenopacketResult<RunSummary> {
    let selection = input.selection()?;
    let ontology = Ontology::from_obo(&input.hpo)?;
    let mut diagnostics = Diagnostics::new();
    let index =
        AnnotationIndex::from_hpoa(&input.phenotype_annotation, &ontology, &mut diagnostics)?;
    let genes = input.gene_annotator()?;
    prepare_output(&input.output_dir)?;

    let created = chrono::Utc::now().to_rfc3339();
    let mut pipeline = Pipeline::new(&index, &ontology, &created);
    if let Some(genes) = &genes {
        pipeline = pipeline.with_genes(genes);
    }

    let sink = |record: PhenopacketRecord| write_phenopacket(&record, &input.output_dir).map(|_| ());
    let mut summary = match synthesis {
        Some(config) => pipeline.create(&selection, &config, sink)?,
        None => pipeline.convert(&selection, sink)?,
    };
    diagnostics.extend(summary.diagnostics);
    summary.diagnostics = diagnostics;
    Ok(summary)
}

fn run(cli: Cli) -> PhenopacketResult<RunSummary> {
    match cli.command {
        Commands::Convert(input) => run_pipeline(&input, None),
        Commands::Create {
            input,
            patients,
            seed,
            deletion,
            imprecision,
            addition,
            max_imprecision_levels,
        } => {
            let config = SynthesisConfig {
                seed,
                patients_per_disease: patients,
                noise: NoiseConfig::new(deletion, imprecision, addition, max_imprecision_levels)?,
            };
            run_pipeline(&input, Some(config))
        }
        Commands::AddGenes {
            phenopacket_dir,
            genes,
            output_dir,
        } => {
            let annotator = GeneAnnotator::from_files(&genes.genes_to_disease, &genes.hgnc_data)?;
            prepare_output(&output_dir)?;
            add_genes_to_directory(&phenopacket_dir, &output_dir, &annotator)
        }
        Commands::AddVariants {
            phenopacket_dir,
            variant_summary,
            hgnc_data,
            clinical_significance_filter,
            genome_assembly_filter,
            clinvar_version,
            output_dir,
        } => {
            let filter = VariantFilter::new(clinical_significance_filter, genome_assembly_filter);
            let annotator = VariantAnnotator::from_file(&variant_summary, &filter)?
                .with_hgnc(hgnc::parse(&hgnc_data)?)
                .with_version(&clinvar_version);
            prepare_output(&output_dir)?;
            add_variants_to_directory(&phenopacket_dir, &output_dir, &annotator)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(summary) => {
            info!(
                "Wrote {} phenopackets with {} warnings",
                summary.records,
                summary.diagnostics.len()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
