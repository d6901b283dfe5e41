//! Shared test helpers: an independent reference solver and small
//! fixture builders.

use codaln::aligner::{AlignScorer, SeqLen};
use codaln::genome::{CdsFeature, Genome};
use codaln::scoring::genome_scorer::GenomeScorer;
use codaln::scoring::matrices::{blosum62, nucleotide_matrix};
use codaln::scoring::SubstitutionScorer;
use codaln::seq::{seq_from_bytes, Nucleotide};

const NEG: i32 = -10_000;

/// Quadratic-space affine-gap solver over the same delta scorer and gap
/// residue classes, written as a plain full-matrix recurrence with no
/// striping and no traceback. Returns the optimal global score.
pub fn reference_score<S: AlignScorer>(
    scorer: &S,
    r: &S::RefSeq,
    q: &S::QuerySeq,
    side_n: usize,
) -> i32 {
    let n = r.seq_len();
    let m = q.seq_len();

    let mut d = vec![vec![0i32; m + 1]; n + 1];
    let mut best_match = vec![vec![0i32; m + 1]; n + 1];
    let mut ref_gap = vec![vec![vec![NEG; m + 1]; n + 1]; side_n];
    let mut query_gap = vec![vec![vec![NEG; m + 1]; n + 1]; side_n];

    for i in 1..=n {
        for j in 1..=m {
            let sextend = d[i - 1][j - 1] + scorer.score_extend(r, q, i - 1, j - 1);
            best_match[i][j] = sextend;

            let shopen =
                best_match[i - 1][j] + scorer.score_open_query_gap(r, q, i - 1, j - 1);
            let mut shbest = shopen;
            for k in 0..side_n {
                let kn = (k + 1) % side_n;
                let sk = query_gap[k][i - 1][j]
                    + scorer.score_extend_query_gap(r, q, i - 1, j - 1, kn);
                if k == side_n - 1 && shopen > sk {
                    query_gap[0][i][j] = shopen;
                } else {
                    query_gap[kn][i][j] = sk;
                    shbest = shbest.max(sk);
                }
            }

            let svopen = best_match[i][j - 1] + scorer.score_open_ref_gap(r, q, i - 1, j - 1);
            let mut svbest = svopen;
            for k in 0..side_n {
                let kn = (k + 1) % side_n;
                let sk =
                    ref_gap[k][i][j - 1] + scorer.score_extend_ref_gap(r, q, i - 1, j - 1, kn);
                if k == side_n - 1 && svopen > sk {
                    ref_gap[0][i][j] = svopen;
                } else {
                    ref_gap[kn][i][j] = sk;
                    svbest = svbest.max(sk);
                }
            }

            d[i][j] = sextend.max(shbest).max(svbest);
        }
    }

    d[n][m]
}

pub fn nt_scorer(matched: i32, mismatch: i32) -> SubstitutionScorer<Nucleotide> {
    SubstitutionScorer::new(nucleotide_matrix(matched, mismatch), -2, -1, -100, -20)
}

pub fn default_genome_scorer() -> GenomeScorer {
    GenomeScorer::new(
        SubstitutionScorer::new(nucleotide_matrix(2, -2), -10, -2, -100, -20),
        SubstitutionScorer::new(blosum62(), -6, -2, -100, -20),
    )
}

pub fn annotated_genome(seq: &[u8], features: &[(&str, &str)]) -> Genome {
    let mut genome = Genome::new("ref".to_string(), seq_from_bytes(seq));
    for (name, location) in features {
        assert!(
            genome.add_cds_feature(CdsFeature::new(name, location)),
            "fixture feature {} must process",
            name
        );
    }
    genome.preprocess(1, 2);
    genome
}
