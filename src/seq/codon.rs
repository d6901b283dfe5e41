//! Codon translation and pre-translated query views.

use super::{reverse_complement, AminoAcid, Nucleotide};

/// Standard genetic code, indexed by `a * 16 + b * 4 + c` with
/// A = 0, C = 1, G = 2, T = 3.
const STANDARD_CODE: [AminoAcid; 64] = {
    use AminoAcid::*;
    [
        // AAA..ATT
        K, N, K, N, T, T, T, T, R, S, R, S, I, I, M, I,
        // CAA..CTT
        Q, H, Q, H, P, P, P, P, R, R, R, R, L, L, L, L,
        // GAA..GTT
        E, D, E, D, A, A, A, A, G, G, G, G, V, V, V, V,
        // TAA..TTT
        Stop, Y, Stop, Y, S, S, S, S, Stop, C, W, C, L, F, L, F,
    ]
};

/// Translate one codon. Any gap, missing or ambiguous nucleotide yields `X`.
pub fn translate(codon: [Nucleotide; 3]) -> AminoAcid {
    let mut index = 0usize;
    for n in codon {
        let digit = match n {
            Nucleotide::A => 0,
            Nucleotide::C => 1,
            Nucleotide::G => 2,
            Nucleotide::T => 3,
            _ => return AminoAcid::X,
        };
        index = index * 4 + digit;
    }
    STANDARD_CODE[index]
}

/// Translate a nucleotide sequence codon by codon; a trailing partial codon
/// is ignored.
pub fn translate_seq(nt: &[Nucleotide]) -> Vec<AminoAcid> {
    nt.chunks_exact(3)
        .map(|c| translate([c[0], c[1], c[2]]))
        .collect()
}

/// A nucleotide sequence paired with its translation.
#[derive(Debug, Clone, Default)]
pub struct CodingSequence {
    pub nt: Vec<Nucleotide>,
    pub aa: Vec<AminoAcid>,
}

impl CodingSequence {
    pub fn new(nt: Vec<Nucleotide>) -> Self {
        let aa = translate_seq(&nt);
        CodingSequence { nt, aa }
    }
}

/// A query sequence with all six reading frames pre-translated, so the
/// codon-aware scorer can ask for the amino acid induced at any query
/// position on either strand in constant time.
///
/// `translate(i, false)` reads the codon starting at `i` on the forward
/// strand; `translate(i, true)` reads the codon whose reverse-strand read
/// ends at `i`, i.e. the forward window `[i, i + 2]` reverse-complemented.
/// Windows that leave the sequence yield `X`.
#[derive(Debug, Clone)]
pub struct CodonView {
    nt: Vec<Nucleotide>,
    forward: Vec<AminoAcid>,
    reverse: Vec<AminoAcid>,
}

impl CodonView {
    pub fn new(nt: Vec<Nucleotide>) -> Self {
        let len = nt.len();
        let mut forward = vec![AminoAcid::X; len];
        let mut reverse = vec![AminoAcid::X; len];
        for i in 0..len {
            if i + 3 <= len {
                forward[i] = translate([nt[i], nt[i + 1], nt[i + 2]]);
                let window = reverse_complement(&nt[i..i + 3]);
                reverse[i] = translate([window[0], window[1], window[2]]);
            }
        }
        CodonView {
            nt,
            forward,
            reverse,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nt.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nt.is_empty()
    }

    #[inline]
    pub fn nt(&self, i: usize) -> Nucleotide {
        self.nt[i]
    }

    #[inline]
    pub fn translate(&self, i: usize, reverse_complement: bool) -> AminoAcid {
        if i >= self.nt.len() {
            return AminoAcid::X;
        }
        if reverse_complement {
            self.reverse[i]
        } else {
            self.forward[i]
        }
    }
}
