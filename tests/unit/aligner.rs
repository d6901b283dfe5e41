//! End-to-end alignment scenarios and optimality against the reference
//! solver.

use codaln::aligner::GlobalAligner;
use codaln::cigar::CigarOp;
use codaln::genome::projection::cds_alignments_unaligned;
use codaln::scoring::SubstitutionScorer;
use codaln::seq::codon::CodonView;
use codaln::seq::{seq_from_bytes, Nucleotide};

use crate::helpers::{annotated_genome, default_genome_scorer, nt_scorer, reference_score};

fn align_nt(
    scorer: SubstitutionScorer<Nucleotide>,
    r: &[u8],
    q: &[u8],
) -> codaln::aligner::Solution {
    let r: Vec<Nucleotide> = seq_from_bytes(r);
    let q: Vec<Nucleotide> = seq_from_bytes(q);
    let aligner: GlobalAligner<SubstitutionScorer<Nucleotide>, 1> = GlobalAligner::new(scorer);
    aligner.align(&r, &q)
}

#[test]
fn identity_alignment() {
    let solution = align_nt(nt_scorer(1, -1), b"ACGTACGT", b"ACGTACGT");
    assert_eq!(solution.cigar.to_string(), "8M");
    assert_eq!(solution.score, 8);
}

#[test]
fn single_substitution_stats() {
    let scorer = nt_scorer(1, -1);
    let solution = align_nt(scorer.clone(), b"ACGTACGT", b"ACGAACGT");
    assert_eq!(solution.cigar.to_string(), "8M");

    let mut r: Vec<Nucleotide> = seq_from_bytes(b"ACGTACGT");
    let mut q: Vec<Nucleotide> = seq_from_bytes(b"ACGAACGT");
    solution.cigar.to_aligned_pair(&mut r, &mut q);
    let stats = scorer.calc_stats(&r, &q, 0);
    assert_eq!(stats.match_count, 8);
    assert_eq!(stats.identity_count, 7);
}

#[test]
fn single_base_deletion() {
    let scorer = nt_scorer(1, -1);
    let solution = align_nt(scorer.clone(), b"ACGTACGT", b"ACGACGT");
    assert_eq!(solution.cigar.to_string(), "3M1D4M");

    let mut r: Vec<Nucleotide> = seq_from_bytes(b"ACGTACGT");
    let mut q: Vec<Nucleotide> = seq_from_bytes(b"ACGACGT");
    solution.cigar.to_aligned_pair(&mut r, &mut q);
    let stats = scorer.calc_stats(&r, &q, 0);
    assert_eq!(stats.insert_count, 0);
    assert_eq!(stats.delete_count, 1);
    assert_eq!(stats.delete_events, 1);
}

#[test]
fn single_base_insertion() {
    let solution = align_nt(nt_scorer(1, -1), b"ACGACGT", b"ACGTACGT");
    assert_eq!(solution.cigar.to_string(), "3M1I4M");
}

#[test]
fn leading_overhang() {
    let solution = align_nt(nt_scorer(1, -1), b"ACGTACGT", b"GTACGT");
    let first = solution.cigar.items()[0];
    assert_eq!(first.op, CigarOp::RefSkipped);
    assert_eq!(first.len, 2);
    assert_eq!(solution.cigar.to_string(), "2X6M");
}

#[test]
fn flat_scores_match_reference_solver() {
    let scorer = nt_scorer(1, -1);
    let cases: [(&[u8], &[u8]); 6] = [
        (b"ACGTACGT", b"ACGTACGT"),
        (b"ACGTACGT", b"ACGACGT"),
        (b"ACGACGT", b"ACGTACGT"),
        (b"AAACCCGGGTTT", b"AAACGGGTTT"),
        (b"ACGT", b"TGCA"),
        (b"AAAACCCCGGGG", b"AAAAGGGG"),
    ];
    for (r, q) in cases {
        let rv: Vec<Nucleotide> = seq_from_bytes(r);
        let qv: Vec<Nucleotide> = seq_from_bytes(q);
        let aligner: GlobalAligner<SubstitutionScorer<Nucleotide>, 1> =
            GlobalAligner::new(scorer.clone());
        let produced = aligner.align(&rv, &qv).score;
        let expected = reference_score(&scorer, rv.as_slice(), qv.as_slice(), 1);
        assert_eq!(produced, expected, "score mismatch for {:?}", (r, q));
    }
}

#[test]
fn codon_aware_scores_match_reference_solver() {
    let genome = annotated_genome(b"ATGAAACCCGGGTTTTAA", &[("orf", "1..18")]);
    let scorer = default_genome_scorer();
    let queries: [&[u8]; 4] = [
        b"ATGAAACCCGGGTTTTAA",
        b"ATGAACCCGGGTTTTAA",
        b"ATGAAACCCGGGTAA",
        b"ATGAAAGCCCGGGTTTTAA",
    ];
    for q in queries {
        let view = CodonView::new(seq_from_bytes(q));
        let aligner: GlobalAligner<_, 3> = GlobalAligner::new(scorer.clone());
        let produced = aligner.align(&genome, &view).score;
        let expected = reference_score(&scorer, &genome, &view, 3);
        assert_eq!(produced, expected, "score mismatch for {:?}", q);
    }
}

#[test]
fn frameshift_inside_cds() {
    // a 40-codon ORF with one base deleted mid-sequence: keeping the
    // codon starts on both sides aligned outweighs the frameshift
    // charge, so the aligner spends a single-base query gap
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
    let mut query_bytes = orf.clone();
    query_bytes.remove(58);
    let query: Vec<Nucleotide> = seq_from_bytes(&query_bytes);

    let aligner: GlobalAligner<_, 3> = GlobalAligner::new(scorer.clone());
    let solution = aligner.align(&genome, &CodonView::new(query.clone()));

    let query_gaps: Vec<_> = solution
        .cigar
        .items()
        .iter()
        .filter(|i| i.op == CigarOp::QueryGap)
        .collect();
    assert_eq!(query_gaps.len(), 1);
    assert_eq!(query_gaps[0].len, 1);

    let projections =
        cds_alignments_unaligned(&genome.seq, &query, &solution.cigar, genome.cds_features(), true);
    assert_eq!(projections.len(), 1);
    let cds = &projections[0];
    assert_eq!(cds.ref_seq.nt.len() % 3, 0);
    assert!(cds.frameshift_count() >= 1);
}

#[test]
fn codon_aware_striping_is_score_stable() {
    let genome = annotated_genome(b"ATGAAACCCGGGTTTTGGCATTAA", &[("orf", "1..24")]);
    let scorer = default_genome_scorer();
    let query = CodonView::new(seq_from_bytes(b"ATGAAACCCGGGTGGCATTAA"));

    let full: GlobalAligner<_, 3> = GlobalAligner::new(scorer.clone());
    let expected = full.align(&genome, &query).score;
    for cells in [query.len(), 4 * query.len()] {
        let narrow: GlobalAligner<_, 3> = GlobalAligner::with_stripe_cells(scorer.clone(), cells);
        assert_eq!(narrow.align(&genome, &query).score, expected);
    }
}
