//! Statistics records over full query alignments.

use codaln::aligner::DEFAULT_STRIPE_CELLS;
use codaln::pipeline::align_query;
use codaln::seq::seq_from_bytes;

use crate::helpers::{annotated_genome, default_genome_scorer};

#[test]
fn identical_query_reports_full_coverage() {
    let genome = annotated_genome(b"ATGAAACCCGGGTTTTAA", &[("orf", "1..18")]);
    let scorer = default_genome_scorer();
    let result = align_query(
        &genome,
        &scorer,
        "q1",
        seq_from_bytes(b"ATGAAACCCGGGTTTTAA"),
        false,
        DEFAULT_STRIPE_CELLS,
    );

    let genome_record = &result.records[0];
    assert_eq!(genome_record.id, "q1");
    assert_eq!(genome_record.cds, None);
    assert_eq!(genome_record.matches, Some(18));
    assert_eq!(genome_record.identities, Some(18));
    assert_eq!(genome_record.begin, Some(1));
    assert_eq!(genome_record.end, Some(18));
    assert_eq!(genome_record.coverage, Some(100.0));

    let cds_record = &result.records[1];
    assert_eq!(cds_record.cds.as_deref(), Some("orf"));
    assert_eq!(cds_record.cds_begin, Some(1));
    assert_eq!(cds_record.cds_end, Some(18));
    assert_eq!(cds_record.frameshifts, Some(0));
    assert_eq!(cds_record.stop_codons, Some(0));
    assert_eq!(cds_record.mutations.as_deref(), Some(""));
}

#[test]
fn frameshifted_query_is_flagged_in_the_cds_record() {
    let orf: Vec<u8> = [
        "ATGGCAAAACCCGGGTTTCATCAGGAACTT",
        "GCTGACGAAGGCCACATTCTGAAGATGTTC",
        "CCTAGTACCTGGTATGTGGCTGATGAAGGT",
        "CACATTCTGAAGATGTTCCCTAGTACCTAA",
    ]
    .concat()
    .into_bytes();
    let genome = annotated_genome(&orf, &[("orf", "1..120")]);
    let scorer = default_genome_scorer();
    let mut query = orf.clone();
    query.remove(58);

    let result = align_query(
        &genome,
        &scorer,
        "q2",
        seq_from_bytes(&query),
        false,
        DEFAULT_STRIPE_CELLS,
    );

    let cds_record = &result.records[1];
    assert!(cds_record.frameshifts.unwrap_or(0) >= 1);
    let json = serde_json::to_value(cds_record).unwrap();
    let object = json.as_object().unwrap();
    for key in [
        "id",
        "alignLength",
        "cds",
        "cdsBegin",
        "cdsEnd",
        "begin",
        "end",
        "coverage",
        "score",
        "quality",
        "matches",
        "identities",
        "inserts",
        "deletes",
        "misaligned",
        "frameshifts",
        "ambiguities",
        "stopCodons",
        "mutations",
    ] {
        assert!(object.contains_key(key), "missing key {}", key);
    }
}

#[test]
fn unalignable_query_reports_only_headline_keys() {
    // a query of pure ambiguity still aligns as columns but the CDS
    // record collapses when nothing scores; exercise the empty shape
    // through a genome with no annotations instead
    let genome = annotated_genome(b"ACGTACGTACGT", &[]);
    let scorer = default_genome_scorer();
    let result = align_query(
        &genome,
        &scorer,
        "q3",
        seq_from_bytes(b"ACGTACGTACGT"),
        false,
        DEFAULT_STRIPE_CELLS,
    );
    assert_eq!(result.records.len(), 1);
    let json = serde_json::to_value(&result.records[0]).unwrap();
    assert!(json.as_object().unwrap().contains_key("cds"));
}
