use std::fs;

use phenotype2phenopacket::annotations::{ClinicalSignificance, GenomeAssembly, VariantFilter};
use phenotype2phenopacket::genes::GeneAnnotator;
use phenotype2phenopacket::parser::{hgnc, id_list};
use phenotype2phenopacket::phenopacket::{read_phenopacket, write_phenopacket};
use phenotype2phenopacket::pipeline::{add_genes_to_directory, add_variants_to_directory};
use phenotype2phenopacket::variants::VariantAnnotator;
use phenotype2phenopacket::{
    AnnotationIndex, Diagnostics, DiseaseSelection, NoiseConfig, Ontology, PhenopacketError,
    Pipeline, SynthesisConfig,
};

const CREATED: &str = "2023-04-05T12:00:00Z";

fn load() -> (Ontology, AnnotationIndex, Diagnostics) {
    let ontology = Ontology::from_obo("tests/small.obo").expect("small.obo is valid");
    let mut diagnostics = Diagnostics::new();
    let index = AnnotationIndex::from_hpoa("tests/phenotype.hpoa", &ontology, &mut diagnostics)
        .expect("phenotype.hpoa is valid");
    (ontology, index, diagnostics)
}

fn json_file_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("directory exists")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn loading_reports_data_issues() {
    let (_, index, diagnostics) = load();
    assert_eq!(index.len(), 4);
    // HP:9999999, HP:8888888 (onset), `foo`, HP:9999998
    assert_eq!(diagnostics.len(), 4);
    assert!(diagnostics.warnings().iter().all(|w| w.is_recoverable()));
}

#[test]
fn convert_writes_one_file_per_disease() {
    let (ontology, index, _) = load();
    let output = tempfile::tempdir().unwrap();

    let pipeline = Pipeline::new(&index, &ontology, CREATED);
    let summary = pipeline
        .convert(&DiseaseSelection::All, |record| {
            write_phenopacket(&record, output.path()).map(|_| ())
        })
        .unwrap();
    assert_eq!(summary.records, 3);

    assert_eq!(
        json_file_names(output.path()),
        vec!["OMIM_100100.json", "OMIM_200200.json", "OMIM_300300.json"]
    );

    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(output.path().join("OMIM_100100.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["id"], "OMIM_100100");
    assert_eq!(json["subject"]["id"], "OMIM_100100_patient1");
    assert_eq!(json["diseases"][0]["term"]["label"], "Alpha syndrome");
    assert_eq!(json["metaData"]["createdBy"], "phenotype2phenopacket");
    assert_eq!(json["metaData"]["created"], CREATED);

    let features = json["phenotypicFeatures"].as_array().unwrap();
    assert_eq!(features.len(), 4);
    assert_eq!(features[0]["type"]["id"], "HP:0001250");
    assert_eq!(features[0]["description"], "HP:0040282");
    assert_eq!(features[0]["onset"]["ontologyClass"]["id"], "HP:0003593");
    assert_eq!(features[0]["modifiers"][0]["label"], "Severe");
    assert_eq!(features[3]["excluded"], true);
}

#[test]
fn create_with_id_list() {
    let (ontology, index, _) = load();
    let output = tempfile::tempdir().unwrap();
    let ids = id_list::parse("tests/omim_ids.txt").unwrap();

    let config = SynthesisConfig {
        seed: 3,
        patients_per_disease: 2,
        noise: NoiseConfig::new(0.5, 0.5, 0.5, 2).unwrap(),
    };
    let pipeline = Pipeline::new(&index, &ontology, CREATED);
    let summary = pipeline
        .create(&DiseaseSelection::Ids(ids), &config, |record| {
            write_phenopacket(&record, output.path()).map(|_| ())
        })
        .unwrap();

    assert_eq!(summary.records, 4);
    assert_eq!(
        summary.diagnostics.warnings(),
        &[PhenopacketError::DiseaseNotFound("OMIM:999999".to_string())]
    );
    assert_eq!(
        json_file_names(output.path()),
        vec![
            "OMIM_100100_patient1.json",
            "OMIM_100100_patient2.json",
            "OMIM_200200_patient1.json",
            "OMIM_200200_patient2.json"
        ]
    );

    for name in json_file_names(output.path()) {
        let record = read_phenopacket(output.path().join(&name)).unwrap();
        assert!(!record.features().is_empty());
        assert_eq!(format!("{}.json", record.subject_id()), name);
    }

    // OMIM:100100 has the obligate phenotype Microcephaly
    for patient in ["OMIM_100100_patient1.json", "OMIM_100100_patient2.json"] {
        let record = read_phenopacket(output.path().join(patient)).unwrap();
        assert!(record
            .features()
            .iter()
            .any(|feature| feature.term.label == "Microcephaly"));
    }
}

#[test]
fn add_genes_afterwards() {
    let (ontology, index, _) = load();
    let converted = tempfile::tempdir().unwrap();
    let with_genes = tempfile::tempdir().unwrap();

    Pipeline::new(&index, &ontology, CREATED)
        .convert(&DiseaseSelection::First(2), |record| {
            write_phenopacket(&record, converted.path()).map(|_| ())
        })
        .unwrap();

    let genes =
        GeneAnnotator::from_files("tests/genes_to_disease.txt", "tests/hgnc_complete_set.txt")
            .unwrap();
    let summary = add_genes_to_directory(converted.path(), with_genes.path(), &genes).unwrap();
    assert_eq!(summary.records, 2);
    assert_eq!(summary.diagnostics.len(), 1);

    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(with_genes.path().join("OMIM_100100.json")).unwrap(),
    )
    .unwrap();
    let interpretation = &json["interpretations"][0];
    assert_eq!(interpretation["id"], "Alpha syndrome-interpretation");
    assert_eq!(interpretation["progressStatus"], "UNKNOWN_PROGRESS");
    let genomic = &interpretation["diagnosis"]["genomicInterpretations"];
    assert_eq!(genomic[0]["interpretationStatus"], "CAUSATIVE");
    assert_eq!(genomic[0]["gene"]["valueId"], "HGNC:1");
    assert_eq!(genomic[1]["gene"]["symbol"], "DEF2");

    // running it again does not duplicate genes
    let again = tempfile::tempdir().unwrap();
    add_genes_to_directory(with_genes.path(), again.path(), &genes).unwrap();
    let record = read_phenopacket(again.path().join("OMIM_100100.json")).unwrap();
    assert_eq!(record.genes().len(), 2);
}

#[test]
fn add_variants_afterwards() {
    let (ontology, index, _) = load();
    let converted = tempfile::tempdir().unwrap();
    let with_variants = tempfile::tempdir().unwrap();

    Pipeline::new(&index, &ontology, CREATED)
        .convert(&DiseaseSelection::All, |record| {
            write_phenopacket(&record, converted.path()).map(|_| ())
        })
        .unwrap();

    let filter = VariantFilter::new(ClinicalSignificance::LikelyPathogenic, GenomeAssembly::GRCh38);
    let variants = VariantAnnotator::from_file("tests/variant_summary.txt", &filter)
        .unwrap()
        .with_hgnc(hgnc::parse("tests/hgnc_complete_set.txt").unwrap())
        .with_version("2023-04-06");
    let summary =
        add_variants_to_directory(converted.path(), with_variants.path(), &variants).unwrap();
    assert_eq!(summary.records, 2);
    assert!(summary.diagnostics.is_empty());
    assert_eq!(
        json_file_names(with_variants.path()),
        vec!["OMIM_100100.json", "OMIM_200200.json"]
    );

    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(with_variants.path().join("OMIM_100100.json")).unwrap(),
    )
    .unwrap();
    let interpretation = &json["interpretations"][0];
    assert_eq!(interpretation["id"], "Alpha syndrome-interpretation");
    let genomic = &interpretation["diagnosis"]["genomicInterpretations"];
    assert_eq!(genomic.as_array().map(Vec::len), Some(2));
    assert_eq!(genomic[0]["interpretationStatus"], "UNKNOWN_STATUS");
    assert_eq!(genomic[0]["subjectOrBiosampleId"], "OMIM_100100_patient1");

    let variant = &genomic[1]["variantInterpretation"];
    assert_eq!(variant["acmgPathogenicityClassification"], "LIKELY_PATHOGENIC");
    let descriptor = &variant["variationDescriptor"];
    assert_eq!(descriptor["id"], "clinvar:102");
    assert_eq!(descriptor["geneContext"]["valueId"], "HGNC:2");
    assert_eq!(descriptor["geneContext"]["symbol"], "DEF2");
    assert_eq!(descriptor["vcfRecord"]["genomeAssembly"], "GRCh38");
    assert_eq!(descriptor["vcfRecord"]["chrom"], "2");
    assert_eq!(descriptor["vcfRecord"]["pos"], "22000");
    assert_eq!(descriptor["vcfRecord"]["ref"], "CT");
    assert_eq!(descriptor["vcfRecord"]["alt"], "C");

    let resources = json["metaData"]["resources"].as_array().unwrap();
    let clinvar = resources.iter().find(|r| r["id"] == "clinvar").unwrap();
    assert_eq!(clinvar["version"], "2023-04-06");
    assert_eq!(clinvar["iriPrefix"], "https://www.ncbi.nlm.nih.gov/clinvar/variation/");

    // running it again neither duplicates variants nor resources
    let again = tempfile::tempdir().unwrap();
    add_variants_to_directory(with_variants.path(), again.path(), &variants).unwrap();
    let first = read_phenopacket(with_variants.path().join("OMIM_100100.json")).unwrap();
    let second = read_phenopacket(again.path().join("OMIM_100100.json")).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.variants().len(), 2);
}
