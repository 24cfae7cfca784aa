use std::time::Duration;

use phenotype2phenopacket::index::work_items_for;
use phenotype2phenopacket::sampling::{NoiseInjector, PatientSampler};
use phenotype2phenopacket::{
    AnnotationIndex, Diagnostics, DiseaseId, NoiseConfig, Ontology, SynthesisConfig,
};

use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sample_patients_benchmark(c: &mut Criterion) {
    let ontology = Ontology::from_obo("tests/small.obo").expect("small.obo cannot be opened");
    let mut diagnostics = Diagnostics::default();
    let index = AnnotationIndex::from_hpoa("tests/phenotype.hpoa", &ontology, &mut diagnostics)
        .expect("phenotype.hpoa cannot be opened");
    let disease = index
        .get(&DiseaseId::omim(200200))
        .expect("OMIM:200200 is part of phenotype.hpoa");

    let config = SynthesisConfig {
        seed: 42,
        patients_per_disease: 100,
        noise: NoiseConfig::new(0.2, 0.5, 0.5, 2).expect("valid noise config"),
    };
    let sampler = PatientSampler::new(&ontology, &config);

    c.bench_function("sample 100 patients", |b| {
        b.iter(|| {
            work_items_for(black_box(disease), config.patients_per_disease)
                .map(|(disease, patient)| {
                    sampler
                        .sample(disease, patient)
                        .expect("valid annotations")
                        .len()
                })
                .sum::<usize>()
        })
    });

    let injector = NoiseInjector::new(&ontology, &config.noise);
    let selection = sampler.sample(disease, 0).expect("valid annotations");
    c.bench_function("apply noise", |b| {
        b.iter(|| {
            let mut rng = sampler.rng(disease.id(), 1);
            injector
                .apply(black_box(selection.clone()), disease, &mut rng)
                .len()
        })
    });
}

criterion_group! {
    name = sampling;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(5));
    targets = sample_patients_benchmark
}
criterion_main!(sampling);
