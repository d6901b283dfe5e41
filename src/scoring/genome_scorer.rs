//! Codon-aware scoring: nucleotide substitution combined with the
//! amino-acid consequences for every CDS covering a reference position.
//!
//! Each delta returns `nt * nt_weight[refI] + aa * aa_weight[refI]`, with
//! the amino-acid part summed over the CDS codon contexts at `refI`. Gap
//! deltas charge frameshift and misalignment penalties when a gap opens or
//! extends off a codon boundary, and cancel a charged frameshift once the
//! running gap length becomes a multiple of three.

use crate::aligner::{AlignScorer, SeqLen};
use crate::genome::Genome;
use crate::seq::codon::CodonView;
use crate::seq::{AminoAcid, Nucleotide};

use super::SubstitutionScorer;

#[derive(Debug, Clone)]
pub struct GenomeScorer {
    nt_scorer: SubstitutionScorer<Nucleotide>,
    aa_scorer: SubstitutionScorer<AminoAcid>,
}

impl GenomeScorer {
    pub fn new(
        nt_scorer: SubstitutionScorer<Nucleotide>,
        aa_scorer: SubstitutionScorer<AminoAcid>,
    ) -> Self {
        GenomeScorer {
            nt_scorer,
            aa_scorer,
        }
    }

    pub fn nt_scorer(&self) -> &SubstitutionScorer<Nucleotide> {
        &self.nt_scorer
    }

    pub fn aa_scorer(&self) -> &SubstitutionScorer<AminoAcid> {
        &self.aa_scorer
    }
}

impl SeqLen for CodonView {
    fn seq_len(&self) -> usize {
        self.len()
    }
}

impl AlignScorer for GenomeScorer {
    type RefSeq = Genome;
    type QuerySeq = CodonView;

    fn score_extend(&self, genome: &Genome, query: &CodonView, i: usize, j: usize) -> i32 {
        let nt = self.nt_scorer.weight(genome.seq[i], query.nt(j));

        let mut aa = 0;
        for p in genome.cds_aa(i) {
            if p.phase == 0 {
                let aa_query = query.translate(j, p.reverse_complement);
                aa += self.aa_scorer.weight(p.aa, aa_query);
            }
        }

        nt * genome.nt_weight(i) + aa * genome.aa_weight(i)
    }

    fn score_open_ref_gap(&self, genome: &Genome, query: &CodonView, i: usize, j: usize) -> i32 {
        if i == genome.len() - 1 {
            return 0;
        }

        let nt = self.nt_scorer.gap_open_cost();

        let mut aa = 0;
        for p in genome.cds_aa(i) {
            // Opening at a non-codon boundary leaves the codon the gap
            // interrupts partial: its previously credited extension score
            // is taken back and a misalignment is charged instead. The
            // gap sits after refI, hence the phase-2 exemption.
            if p.phase != 2 {
                let prev = j as i64 - p.phase as i64 - 1;
                if prev >= 0 {
                    aa += self.aa_scorer.misalignment_cost();
                    let aa_query = query.translate(prev as usize, p.reverse_complement);
                    aa -= self.aa_scorer.weight(p.aa, aa_query);
                }
            }

            aa += self.aa_scorer.frame_shift_cost();
            aa += self.aa_scorer.gap_open_cost();
        }

        nt * genome.nt_weight(i) + aa * genome.aa_weight(i)
    }

    /// `k` is the running gap length modulo 3 before this column.
    fn score_extend_ref_gap(
        &self,
        genome: &Genome,
        _query: &CodonView,
        i: usize,
        _j: usize,
        k: usize,
    ) -> i32 {
        if i == genome.len() - 1 {
            return 0;
        }

        let nt = self.nt_scorer.gap_extend_cost();

        let mut aa = 0;
        for p in genome.cds_aa(i) {
            if k % 3 == 2 {
                // the gap just became a multiple of three: the charged
                // frameshift no longer applies at CDS-interior codons
                if p.cds_region_i != 0 {
                    aa -= self.aa_scorer.frame_shift_cost();
                }
            } else if k % 3 == 0 {
                aa += self.aa_scorer.frame_shift_cost();
                aa += self.aa_scorer.gap_extend_cost();
            }
        }

        nt * genome.nt_weight(i) + aa * genome.aa_weight(i)
    }

    fn score_open_query_gap(&self, genome: &Genome, query: &CodonView, i: usize, j: usize) -> i32 {
        if j == query.len() - 1 {
            return 0;
        }

        let nt = self.nt_scorer.gap_open_cost();

        let mut aa = 0;
        if i > 0 {
            for p in genome.cds_aa(i) {
                // the gap sits at refI itself, hence the phase-0 exemption
                if p.phase != 0 {
                    let prev = j as i64 - p.phase as i64 + 1;
                    if prev >= 0 {
                        aa += self.aa_scorer.misalignment_cost();
                        let aa_query = query.translate(prev as usize, p.reverse_complement);
                        aa -= self.aa_scorer.weight(p.aa, aa_query);
                    }
                }

                // Charged even at the exact start of a CDS region: skipping
                // the charge there would leave the cancellation in the
                // extend delta over-crediting. Scoring-model behaviour,
                // not a bug fix candidate.
                aa += self.aa_scorer.frame_shift_cost();
                aa += self.aa_scorer.gap_open_cost();
            }
        }

        nt * genome.nt_weight(i) + aa * genome.aa_weight(i)
    }

    /// `k` is the running gap length modulo 3 before this column.
    fn score_extend_query_gap(
        &self,
        genome: &Genome,
        query: &CodonView,
        i: usize,
        j: usize,
        k: usize,
    ) -> i32 {
        if j == query.len() - 1 {
            return 0;
        }

        let nt = self.nt_scorer.gap_extend_cost();

        let mut aa = 0;
        if i > 0 {
            for p in genome.cds_aa(i) {
                if p.cds_region_i == 0 && p.phase == 0 && k % 3 != 0 {
                    // an out-of-frame gap runs into the start of a CDS
                    // region
                    aa += self.aa_scorer.frame_shift_cost();
                    aa += self.aa_scorer.misalignment_cost();
                }

                if k % 3 == 2 {
                    aa -= self.aa_scorer.frame_shift_cost();
                } else if k % 3 == 0 {
                    aa += self.aa_scorer.frame_shift_cost();
                    aa += self.aa_scorer.gap_extend_cost();
                }
            }
        }

        nt * genome.nt_weight(i) + aa * genome.aa_weight(i)
    }
}
