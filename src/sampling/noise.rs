use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use tracing::trace;

use crate::annotations::DiseaseRecord;
use crate::ontology::OntologyResolver;
use crate::sampling::{
    FrequencySampler, NoiseConfig, PhenotypeOrigin, PhenotypeSelection, SelectedPhenotype,
};
use crate::HpoTermId;

/// Perturbs the phenotypes of a synthetic patient
///
/// Every non-obligate phenotype is, in order:
///
/// 1. removed with the `deletion` probability, or otherwise
/// 2. replaced with the `imprecision` probability by a random ancestor
///    that is at most `max_imprecision_levels` levels above it
///
/// Afterwards, with the `addition` probability, one random phenotype
/// that is not annotated to the disease is added.
///
/// If no phenotype is left at the end, the obligate phenotypes of the
/// disease are added back. Diseases without obligate phenotypes get
/// their most frequent phenotype instead.
pub struct NoiseInjector<'a, O: OntologyResolver> {
    resolver: &'a O,
    config: &'a NoiseConfig,
}

impl<'a, O: OntologyResolver> NoiseInjector<'a, O> {
    /// Constructs a new `NoiseInjector`
    pub fn new(resolver: &'a O, config: &'a NoiseConfig) -> Self {
        Self { resolver, config }
    }

    /// Applies noise to the selected phenotypes of a patient
    pub fn apply<R: Rng + ?Sized>(
        &self,
        selection: PhenotypeSelection,
        disease: &DiseaseRecord,
        rng: &mut R,
    ) -> PhenotypeSelection {
        let mut result = PhenotypeSelection::with_capacity(selection.len() + 1);

        for phenotype in &selection {
            let is_obligate = phenotype
                .annotation(disease)
                .map_or(false, |annotation| annotation.is_obligate());
            if is_obligate {
                result.push(*phenotype);
                continue;
            }

            if FrequencySampler::draw(self.config.deletion(), rng) {
                trace!("Removing {} from {}", phenotype.term(), disease.id());
                continue;
            }

            if FrequencySampler::draw(self.config.imprecision(), rng) {
                if let Some(imprecise) = self.imprecise(phenotype, &selection, &result, rng) {
                    trace!(
                        "Replacing {} by {} in {}",
                        phenotype.term(),
                        imprecise.term(),
                        disease.id()
                    );
                    result.push(imprecise);
                    continue;
                }
            }
            result.push(*phenotype);
        }

        if FrequencySampler::draw(self.config.addition(), rng) {
            if let Some(term) = self.false_positive(disease, &result, rng) {
                trace!("Adding {} to {}", term, disease.id());
                result.push(SelectedPhenotype::false_positive(term));
            }
        }

        if result.is_empty() {
            fallback(disease, &mut result);
        }
        result
    }

    /// Returns a random ancestor of the phenotype
    ///
    /// Returns `None` if the term has no suitable ancestor or if the chosen
    /// ancestor is already part of the patient.
    fn imprecise<R: Rng + ?Sized>(
        &self,
        phenotype: &SelectedPhenotype,
        selection: &PhenotypeSelection,
        result: &PhenotypeSelection,
        rng: &mut R,
    ) -> Option<SelectedPhenotype> {
        let annotation = phenotype.annotation_index()?;
        let original = match phenotype.origin() {
            PhenotypeOrigin::Imprecise { original, .. } => original,
            _ => phenotype.term(),
        };
        let ancestors = self
            .resolver
            .ancestors(phenotype.term(), self.config.max_imprecision_levels());
        let ancestor = *ancestors.as_slice().choose(rng)?;
        if selection.contains(ancestor) || result.contains(ancestor) {
            return None;
        }
        Some(SelectedPhenotype::imprecise(ancestor, annotation, original))
    }

    /// Picks a random phenotype that is unrelated to the disease
    fn false_positive<R: Rng + ?Sized>(
        &self,
        disease: &DiseaseRecord,
        result: &PhenotypeSelection,
        rng: &mut R,
    ) -> Option<HpoTermId> {
        let annotated = disease.annotated_terms();
        self.resolver
            .phenotype_pool()
            .iter()
            .filter(|term| !annotated.contains(term) && !result.contains(**term))
            .choose(rng)
            .copied()
    }
}

/// Ensures that every patient has at least one phenotype
fn fallback(disease: &DiseaseRecord, result: &mut PhenotypeSelection) {
    for (idx, annotation) in disease.annotations().iter().enumerate() {
        if annotation.is_obligate() {
            result.push(SelectedPhenotype::annotated(annotation.term(), idx));
        }
    }
    if !result.is_empty() {
        return;
    }

    let mut best: Option<(usize, f64)> = None;
    for (idx, annotation) in disease.annotations().iter().enumerate() {
        if annotation.is_excluded() {
            continue;
        }
        let Ok(probability) = FrequencySampler::resolve_probability(annotation.frequency()) else {
            continue;
        };
        // phenotypes that never occur are not a valid fallback
        if probability <= 0.0 {
            continue;
        }
        if best.map_or(true, |(_, max)| probability > max) {
            best = Some((idx, probability));
        }
    }
    if let Some((idx, _)) = best {
        trace!("Adding most frequent phenotype to {}", disease.id());
        result.push(SelectedPhenotype::annotated(
            disease.annotations()[idx].term(),
            idx,
        ));
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::annotations::{DiseaseId, FrequencyDescriptor, PhenotypeAnnotation};
    use crate::term::TermGroup;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// A flat hierarchy: 118 -> 234 -> {252, 256, 1250}, 118 -> 707
    struct Resolver {
        pool: Vec<HpoTermId>,
    }

    impl Resolver {
        fn new() -> Self {
            Self {
                pool: [234u32, 252, 256, 707, 1250]
                    .into_iter()
                    .map(HpoTermId::from)
                    .collect(),
            }
        }
    }

    impl OntologyResolver for Resolver {
        fn resolve(&self, id: HpoTermId) -> Option<HpoTermId> {
            Some(id)
        }

        fn label(&self, _: HpoTermId) -> Option<&str> {
            Some("term")
        }

        fn ancestors(&self, id: HpoTermId, _: usize) -> TermGroup {
            let mut group = TermGroup::new();
            if [252u32, 256, 1250].contains(&id.as_u32()) {
                group.insert(234u32);
            }
            group
        }

        fn phenotype_pool(&self) -> &[HpoTermId] {
            &self.pool
        }
    }

    fn disease(frequencies: &[(u32, &str)]) -> DiseaseRecord {
        let mut disease = DiseaseRecord::new(DiseaseId::omim(1), "Foo");
        for (term, freq) in frequencies {
            disease.add_annotation(PhenotypeAnnotation::new(
                HpoTermId::from(*term),
                FrequencyDescriptor::try_from(*freq).unwrap(),
            ));
        }
        disease
    }

    fn select_all(disease: &DiseaseRecord) -> PhenotypeSelection {
        let mut selection = PhenotypeSelection::new();
        for (idx, anno) in disease.annotations().iter().enumerate() {
            selection.push(SelectedPhenotype::annotated(anno.term(), idx));
        }
        selection
    }

    #[test]
    fn no_noise() {
        let resolver = Resolver::new();
        let config = NoiseConfig::none();
        let injector = NoiseInjector::new(&resolver, &config);
        let disease = disease(&[(252, "1/2"), (1250, "")]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = injector.apply(select_all(&disease), &disease, &mut rng);
        assert_eq!(result, select_all(&disease));
    }

    #[test]
    fn deletion_spares_obligate() {
        let resolver = Resolver::new();
        let config = NoiseConfig::new(1.0, 0.0, 0.0, 1).unwrap();
        let injector = NoiseInjector::new(&resolver, &config);
        let disease = disease(&[(252, "1/2"), (1250, "")]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = injector.apply(select_all(&disease), &disease, &mut rng);
        assert_eq!(result.len(), 1);
        assert!(result.contains(1250u32.into()));
    }

    #[test]
    fn imprecision_uses_ancestor() {
        let resolver = Resolver::new();
        let config = NoiseConfig::new(0.0, 1.0, 0.0, 1).unwrap();
        let injector = NoiseInjector::new(&resolver, &config);
        let disease = disease(&[(252, "1/2"), (707, "1/2")]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = injector.apply(select_all(&disease), &disease, &mut rng);
        let phenotypes: Vec<SelectedPhenotype> = result.iter().copied().collect();
        assert_eq!(
            phenotypes,
            vec![
                SelectedPhenotype::imprecise(234u32.into(), 0, 252u32.into()),
                // 707 has no ancestors and stays
                SelectedPhenotype::annotated(707u32.into(), 1),
            ]
        );
    }

    #[test]
    fn imprecision_keeps_term_if_ancestor_selected() {
        let resolver = Resolver::new();
        let config = NoiseConfig::new(0.0, 1.0, 0.0, 1).unwrap();
        let injector = NoiseInjector::new(&resolver, &config);
        let disease = disease(&[(252, "1/2"), (256, "1/2")]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = injector.apply(select_all(&disease), &disease, &mut rng);
        let terms: Vec<HpoTermId> = result.iter().map(SelectedPhenotype::term).collect();
        assert_eq!(terms, vec![HpoTermId::from(234u32), HpoTermId::from(256u32)]);
    }

    #[test]
    fn addition_picks_unannotated_term() {
        let resolver = Resolver::new();
        let config = NoiseConfig::new(0.0, 0.0, 1.0, 1).unwrap();
        let injector = NoiseInjector::new(&resolver, &config);
        let disease = disease(&[(234, ""), (252, ""), (256, ""), (1250, "")]);

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let result = injector.apply(select_all(&disease), &disease, &mut rng);
            assert_eq!(result.len(), 5);
            let added = result.iter().last().copied().unwrap();
            assert_eq!(added, SelectedPhenotype::false_positive(707u32.into()));
        }
    }

    #[test]
    fn addition_without_candidates() {
        let resolver = Resolver::new();
        let config = NoiseConfig::new(0.0, 0.0, 1.0, 1).unwrap();
        let injector = NoiseInjector::new(&resolver, &config);
        let disease = disease(&[(234, ""), (252, ""), (256, ""), (707, ""), (1250, "")]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = injector.apply(select_all(&disease), &disease, &mut rng);
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn fallback_to_obligate() {
        let resolver = Resolver::new();
        let config = NoiseConfig::none();
        let injector = NoiseInjector::new(&resolver, &config);
        let disease = disease(&[(252, "1/2"), (1250, "")]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = injector.apply(PhenotypeSelection::new(), &disease, &mut rng);
        let terms: Vec<HpoTermId> = result.iter().map(SelectedPhenotype::term).collect();
        assert_eq!(terms, vec![HpoTermId::from(1250u32)]);
    }

    #[test]
    fn fallback_to_most_frequent() {
        let resolver = Resolver::new();
        let config = NoiseConfig::new(1.0, 0.0, 0.0, 1).unwrap();
        let injector = NoiseInjector::new(&resolver, &config);
        let disease = disease(&[(252, "1/4"), (256, "HP:0040281"), (1250, "HP:0040281")]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = injector.apply(select_all(&disease), &disease, &mut rng);
        let phenotypes: Vec<SelectedPhenotype> = result.iter().copied().collect();
        assert_eq!(
            phenotypes,
            vec![SelectedPhenotype::annotated(256u32.into(), 1)]
        );
    }

    #[test]
    fn fallback_skips_zero_probability() {
        let resolver = Resolver::new();
        let config = NoiseConfig::new(1.0, 0.0, 0.0, 1).unwrap();
        let injector = NoiseInjector::new(&resolver, &config);
        let disease = disease(&[(252, "HP:0040285"), (256, "0/3"), (1250, "1/5")]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = injector.apply(select_all(&disease), &disease, &mut rng);
        let phenotypes: Vec<SelectedPhenotype> = result.iter().copied().collect();
        assert_eq!(
            phenotypes,
            vec![SelectedPhenotype::annotated(1250u32.into(), 2)]
        );
    }

    #[test]
    fn fallback_without_possible_phenotype() {
        let disease = disease(&[(252, "HP:0040285"), (256, "0/3")]);
        let mut result = PhenotypeSelection::new();
        fallback(&disease, &mut result);
        assert!(result.is_empty());
    }

    #[test]
    fn fallback_ignores_excluded() {
        let mut disease = DiseaseRecord::new(DiseaseId::omim(1), "Foo");
        disease.add_annotation(
            PhenotypeAnnotation::new(252u32.into(), FrequencyDescriptor::Obligate).excluded(),
        );
        let mut result = PhenotypeSelection::new();
        fallback(&disease, &mut result);
        assert!(result.is_empty());
    }
}
