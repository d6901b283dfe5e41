//! Annotation and weight preprocessing across module boundaries.

use codaln::genome::{CdsFeature, Genome};
use codaln::seq::seq_from_bytes;

use crate::helpers::annotated_genome;

#[test]
fn weight_balance_with_overlapping_strands() {
    // forward ORF over the whole sequence, reverse ORF over a slice:
    // covered positions carry one or two contexts but stay on one scale
    let genome = annotated_genome(
        b"ATGGCAAAACCCGGGTTTCATCAGGAACTT",
        &[("fwd", "1..30"), ("rev", "complement(7..18)")],
    );

    let mut constant = None;
    for p in 0..genome.len() {
        let k = genome.cds_aa(p).len() as i32;
        if k == 0 {
            continue;
        }
        let total = genome.nt_weight(p) + k * genome.aa_weight(p);
        match constant {
            None => constant = Some(total),
            Some(expected) => assert_eq!(total, expected, "position {}", p),
        }
    }
    assert!(constant.is_some());

    let k_max = (0..genome.len())
        .map(|p| genome.cds_aa(p).len())
        .max()
        .unwrap();
    assert_eq!(k_max, 2);
}

#[test]
fn rejected_features_do_not_poison_the_genome() {
    let mut genome = Genome::new("ref".into(), seq_from_bytes(b"ATGAAACCCGGG"));
    assert!(!genome.add_cds_feature(CdsFeature::new("bad-length", "1..5")));
    assert!(!genome.add_cds_feature(CdsFeature::new("bad-range", "1..24")));
    assert!(genome.add_cds_feature(CdsFeature::new("orf", "1..12")));
    genome.preprocess(1, 2);
    assert_eq!(genome.cds_features().len(), 1);
    assert_eq!(genome.cds_aa(0).len(), 1);
}

#[test]
fn multi_region_feature_positions() {
    let genome = annotated_genome(b"ATGAAACCCGGGTTT", &[("join", "1..6,10..15")]);
    let feature = &genome.cds_features()[0];
    assert_eq!(feature.aa_seq.len(), 4);
    // genome position 9 starts the second region, continuing the frame
    assert_eq!(feature.cds_nucleotide_pos(9), Some(6));
    let p = feature.amino_acid(6, 0);
    assert_eq!(p.phase, 0);
    assert_eq!(p.cds_region_i, 0);
}
