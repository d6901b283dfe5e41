//! Per-CDS sub-alignments cut from a global alignment.
//!
//! Each CDS feature's aligned slice is concatenated across its regions,
//! reverse-complemented for complement features, and frameshift-repaired:
//! reference gaps are padded to a multiple of three with paired gap
//! columns so the reference coding sequence translates codon by codon,
//! while the repair positions are recorded as the mutation signal.

use std::collections::BTreeSet;

use crate::cigar::Cigar;
use crate::genome::{overlaps, CdsFeature, Region};
use crate::seq::codon::CodingSequence;
use crate::seq::{reverse_complement, AminoAcid, Nucleotide};

/// One projected CDS alignment.
#[derive(Debug, Clone)]
pub struct CdsAlignment {
    pub name: String,
    pub ref_seq: CodingSequence,
    pub query_seq: CodingSequence,
    /// Alignment columns inserted to repair out-of-frame reference gaps.
    pub ref_frameshifts: BTreeSet<usize>,
    /// Codons whose reference gap disagrees with the codon phase.
    pub ref_misaligned_gaps: BTreeSet<usize>,
    /// Query gaps of non-multiple-of-three length inside the CDS.
    pub query_frameshifts: i32,
}

impl CdsAlignment {
    pub fn frameshift_count(&self) -> i32 {
        self.ref_frameshifts.len() as i32 + self.query_frameshifts
    }

    /// Amino-acid differences as `<ref><1-based-codon><query>` tokens,
    /// comma-separated. Ambiguous and absent residues are not mutations.
    pub fn mutations(&self) -> String {
        let mut tokens: Vec<String> = Vec::new();
        for (i, (&r, &q)) in self
            .ref_seq
            .aa
            .iter()
            .zip(self.query_seq.aa.iter())
            .enumerate()
        {
            if r == q {
                continue;
            }
            if is_residue(r) && is_residue(q) {
                tokens.push(format!("{}{}{}", r, i + 1, q));
            }
        }
        tokens.join(",")
    }

    /// Internal stop codons in the query translation (the final codon is
    /// not counted).
    pub fn stop_codons(&self) -> i32 {
        let aa = &self.query_seq.aa;
        if aa.is_empty() {
            return 0;
        }
        aa[..aa.len() - 1]
            .iter()
            .filter(|&&a| a == AminoAcid::Stop)
            .count() as i32
    }

    /// Ambiguous residues in the query translation.
    pub fn ambiguities(&self) -> i32 {
        self.query_seq
            .aa
            .iter()
            .filter(|&&a| a == AminoAcid::X)
            .count() as i32
    }
}

fn is_residue(aa: AminoAcid) -> bool {
    !matches!(
        aa,
        AminoAcid::X | AminoAcid::Gap | AminoAcid::Missing
    )
}

/// Project a materialised global alignment onto every CDS feature.
///
/// With `overlapping_only`, features whose regions lie entirely outside
/// the aligned query range are skipped.
pub fn cds_alignments(
    cigar: &Cigar,
    aligned_ref: &[Nucleotide],
    aligned_query: &[Nucleotide],
    features: &[CdsFeature],
    overlapping_only: bool,
) -> Vec<CdsAlignment> {
    let mut result = Vec::new();

    let query_range = Region::new(cigar.query_start(), cigar.query_end());

    for f in features {
        if overlapping_only && !f.location.iter().any(|r| overlaps(r, &query_range)) {
            continue;
        }

        let mut cds_ref: Vec<Nucleotide> = Vec::new();
        let mut cds_query: Vec<Nucleotide> = Vec::new();
        for r in &f.location {
            let aligned_start = cigar.find_aligned_pos(r.start);
            let aligned_end = cigar.find_aligned_pos(r.end - 1) + 1;
            cds_ref.extend_from_slice(&aligned_ref[aligned_start..aligned_end]);
            cds_query.extend_from_slice(&aligned_query[aligned_start..aligned_end]);
        }

        if f.complement {
            cds_ref = reverse_complement(&cds_ref);
            cds_query = reverse_complement(&cds_query);
        }

        // There can be frameshifts, but we know where they are; correct
        // them so the amino-acid alignment stays meaningful.
        let mut ref_frameshifts = BTreeSet::new();
        let mut ref_misaligned_gaps = BTreeSet::new();
        let mut query_frameshifts = 0;
        let mut current_ref_gap = 0usize;
        let mut current_query_gap = 0usize;

        let mut i = 0usize;
        while i < cds_ref.len() {
            if cds_ref[i] == Nucleotide::Gap {
                current_ref_gap += 1;
            } else {
                if cds_query[i] == Nucleotide::Gap {
                    current_query_gap += 1;
                } else if current_query_gap % 3 != 0 {
                    // gaps reaching back to the CDS start are overhang,
                    // not a frameshift
                    if current_query_gap != i {
                        query_frameshifts += 1;
                    }
                    current_query_gap = 0;
                } else if current_ref_gap > 0 && current_ref_gap % 3 == 0 && i % 3 != 0 {
                    ref_misaligned_gaps.insert(i / 3);
                }

                if current_ref_gap % 3 != 0 && i % 3 != current_ref_gap % 3 {
                    ref_misaligned_gaps.insert(i / 3);
                }

                while current_ref_gap % 3 != 0 {
                    cds_ref.insert(i, Nucleotide::Gap);
                    cds_query.insert(i, Nucleotide::Gap);
                    current_ref_gap += 1;
                    ref_frameshifts.insert(i);
                    i += 1;
                }

                current_ref_gap = 0;
            }
            i += 1;
        }

        while cds_ref.len() % 3 != 0 {
            cds_ref.pop();
            cds_query.pop();
        }

        result.push(CdsAlignment {
            name: f.name.clone(),
            ref_seq: CodingSequence::new(cds_ref),
            query_seq: CodingSequence::new(cds_query),
            ref_frameshifts,
            ref_misaligned_gaps,
            query_frameshifts,
        });
    }

    result
}

/// Materialise the alignment, then project.
pub fn cds_alignments_unaligned(
    genome_seq: &[Nucleotide],
    query_seq: &[Nucleotide],
    cigar: &Cigar,
    features: &[CdsFeature],
    overlapping_only: bool,
) -> Vec<CdsAlignment> {
    let mut aligned_ref = genome_seq.to_vec();
    let mut aligned_query = query_seq.to_vec();
    cigar.to_aligned_pair(&mut aligned_ref, &mut aligned_query);
    cds_alignments(cigar, &aligned_ref, &aligned_query, features, overlapping_only)
}

/// Difference an already-aligned pair, then project.
pub fn cds_alignments_from_pair(
    aligned_ref: &[Nucleotide],
    aligned_query: &[Nucleotide],
    features: &[CdsFeature],
    overlapping_only: bool,
) -> Vec<CdsAlignment> {
    let cigar = Cigar::from_aligned_pair(aligned_ref, aligned_query);
    cds_alignments(&cigar, aligned_ref, aligned_query, features, overlapping_only)
}
