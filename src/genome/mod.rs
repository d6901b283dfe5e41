//! Annotated reference model: the reference sequence, its protein-coding
//! features, and the per-position codon context and scoring weights the
//! codon-aware scorer reads.

pub mod projection;

use regex::Regex;
use rustc_hash::FxHashSet;

use crate::aligner::SeqLen;
use crate::seq::codon::translate_seq;
use crate::seq::{reverse_complement, AminoAcid, Nucleotide};

/// Half-open interval `[start, end)` over reference coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: usize,
    pub end: usize,
}

impl Region {
    pub fn new(start: usize, end: usize) -> Self {
        Region { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

pub fn overlaps(r1: &Region, r2: &Region) -> bool {
    r2.start < r1.end && r2.end > r1.start
}

/// Codon context of one reference nucleotide inside a CDS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdsPosition {
    /// Amino acid this codon encodes.
    pub aa: AminoAcid,
    /// Position of the nucleotide within its codon, in reading direction.
    pub phase: u8,
    pub reverse_complement: bool,
    /// Codon index within the containing reference region.
    pub cds_region_i: usize,
}

/// A named protein-coding feature: an ordered list of reference regions
/// whose concatenation (reverse-complemented for `complement` features)
/// translates to `aa_seq`.
#[derive(Debug, Clone)]
pub struct CdsFeature {
    pub name: String,
    pub complement: bool,
    pub location_str: String,
    pub location: Vec<Region>,
    pub aa_seq: Vec<AminoAcid>,
}

impl CdsFeature {
    /// Parse a Genbank-style location: optional `complement(...)` wrapper
    /// around comma-separated `start..end` or `start..>end` tokens with
    /// 1-based inclusive coordinates.
    pub fn new(name: &str, location: &str) -> Self {
        let complement = location.starts_with("complement");
        let pattern = Regex::new(r"([0-9]+)\.\.>?([0-9]+)").expect("location pattern");
        let regions = pattern
            .captures_iter(location)
            .map(|c| {
                let start: usize = c[1].parse().expect("digits");
                let end: usize = c[2].parse().expect("digits");
                Region::new(start.saturating_sub(1), end)
            })
            .collect();
        CdsFeature {
            name: name.to_string(),
            complement,
            location_str: location.to_string(),
            location: regions,
            aa_seq: Vec::new(),
        }
    }

    /// Build from explicit regions with 1-based inclusive coordinates.
    pub fn from_regions(name: &str, complement: bool, regions: &[Region]) -> Self {
        CdsFeature {
            name: name.to_string(),
            complement,
            location_str: String::new(),
            location: regions
                .iter()
                .map(|r| Region::new(r.start - 1, r.end))
                .collect(),
            aa_seq: Vec::new(),
        }
    }

    /// Offset of `genome_pos` within the concatenation of this feature's
    /// regions, or `None` when outside every region.
    pub fn cds_nucleotide_pos(&self, genome_pos: usize) -> Option<usize> {
        let mut offset = 0;
        for r in &self.location {
            if genome_pos >= r.start && genome_pos < r.end {
                return Some(offset + genome_pos - r.start);
            }
            offset += r.len();
        }
        None
    }

    /// Offset of `genome_pos` within the region that contains it.
    pub fn region_nucleotide_pos(&self, genome_pos: usize) -> Option<usize> {
        self.location
            .iter()
            .find(|r| genome_pos >= r.start && genome_pos < r.end)
            .map(|r| genome_pos - r.start)
    }

    /// Codon context for a nucleotide at CDS offset `aa_nt` / region
    /// offset `region_nt`. Coordinates stay on the forward strand; for
    /// complement features the codon order is inverted.
    pub fn amino_acid(&self, aa_nt: usize, region_nt: usize) -> CdsPosition {
        let phase = (aa_nt % 3) as u8;
        let aa_i = if self.complement {
            let flipped = self.aa_seq.len() * 3 - aa_nt - 1;
            flipped / 3
        } else {
            aa_nt / 3
        };
        assert!(aa_i < self.aa_seq.len(), "codon index out of range");
        CdsPosition {
            aa: self.aa_seq[aa_i],
            phase,
            reverse_complement: self.complement,
            cds_region_i: region_nt / 3,
        }
    }

    /// True when every codon-start position of `other` is also a
    /// codon-start position of this feature, on the same strand.
    pub fn contains(&self, other: &CdsFeature) -> bool {
        if self.complement != other.complement {
            return false;
        }
        if self.name == other.name {
            return true;
        }

        let mut starts = FxHashSet::default();
        let mut spillover = 0usize;
        for r in &self.location {
            let mut g = r.start + spillover;
            while g < r.end {
                starts.insert(g);
                g += 3;
            }
            spillover = g - r.end;
        }

        let mut spillover = 0usize;
        for r in &other.location {
            let mut g = r.start + spillover;
            while g < r.end {
                if !starts.contains(&g) {
                    return false;
                }
                g += 3;
            }
            spillover = g - r.end;
        }

        true
    }
}

fn gcd(mut a: i32, mut b: i32) -> i32 {
    loop {
        if a == 0 {
            return b;
        }
        b %= a;
        if b == 0 {
            return a;
        }
        a %= b;
    }
}

fn lcm2(a: i32, b: i32) -> i32 {
    let g = gcd(a, b);
    if g != 0 {
        a / g * b
    } else {
        0
    }
}

fn lcm(numbers: &[i32]) -> i32 {
    numbers.iter().fold(1, |acc, &n| lcm2(acc, n))
}

/// The annotated reference: sequence, CDS features, and after
/// [`preprocess`](Genome::preprocess) the per-position codon contexts and
/// mixing weights. Immutable afterwards and safe to share across
/// alignment workers.
#[derive(Debug, Clone, Default)]
pub struct Genome {
    pub name: String,
    pub seq: Vec<Nucleotide>,
    cds_features: Vec<CdsFeature>,
    cds_aa: Vec<Vec<CdsPosition>>,
    nt_weight: Vec<i32>,
    aa_weight: Vec<i32>,
    score_factor: i32,
}

impl Genome {
    pub fn new(name: String, seq: Vec<Nucleotide>) -> Self {
        Genome {
            name,
            seq,
            cds_features: Vec::new(),
            cds_aa: Vec::new(),
            nt_weight: Vec::new(),
            aa_weight: Vec::new(),
            score_factor: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn cds_features(&self) -> &[CdsFeature] {
        &self.cds_features
    }

    /// Translate the feature against this reference. Rejects features
    /// whose concatenated span is not a multiple of 3 or runs outside the
    /// sequence, with a diagnostic on stderr.
    pub fn process_cds_feature(&self, cds: &mut CdsFeature) -> bool {
        let mut concat: Vec<Nucleotide> = Vec::new();
        for r in &cds.location {
            if r.end > self.seq.len() || r.is_empty() {
                eprintln!(
                    "Error: {} region {}..{} outside reference, ignoring",
                    cds.name,
                    r.start + 1,
                    r.end
                );
                return false;
            }
            concat.extend_from_slice(&self.seq[r.start..r.end]);
        }

        if concat.len() % 3 != 0 {
            eprintln!(
                "Error: {} length is not a multiple of 3, ignoring",
                cds.name
            );
            return false;
        }

        if cds.complement {
            concat = reverse_complement(&concat);
        }
        cds.aa_seq = translate_seq(&concat);

        true
    }

    /// Add a feature, keeping it only when it processes cleanly.
    pub fn add_cds_feature(&mut self, mut cds: CdsFeature) -> bool {
        if !self.process_cds_feature(&mut cds) {
            return false;
        }
        self.cds_features.push(cds);
        true
    }

    /// Build the per-position codon-context table and the nucleotide /
    /// amino-acid mixing weights.
    ///
    /// With `K(p)` CDS contexts at position `p` and `K_max` their maximum,
    /// weights are scaled by `lcm(k * aa_weight, k = 1..K_max)` so that
    /// `nt_weight[p] + K(p) * aa_weight[p]` is the same at every position
    /// covered by at least one CDS, independent of multiplicity.
    pub fn preprocess(&mut self, nt_weight: i32, aa_weight: i32) {
        let len = self.seq.len();
        let mut cds_aa: Vec<Vec<CdsPosition>> = vec![Vec::new(); len];
        let mut max_aa_per_nt = 0usize;

        for (i, contexts) in cds_aa.iter_mut().enumerate() {
            for f in &self.cds_features {
                let Some(t) = f.cds_nucleotide_pos(i) else {
                    continue;
                };
                let r = f
                    .region_nucleotide_pos(i)
                    .expect("position inside a located region");
                let p = f.amino_acid(t, r);

                let duplicate = contexts
                    .iter()
                    .any(|p2| p2.phase == p.phase && p2.reverse_complement == p.reverse_complement);
                if !duplicate {
                    contexts.push(p);
                }
            }
            max_aa_per_nt = max_aa_per_nt.max(contexts.len());
        }

        let totals: Vec<i32> = (1..=max_aa_per_nt)
            .map(|k| k as i32 * aa_weight)
            .collect();
        let l = lcm(&totals);
        let factors: Vec<i32> = totals.iter().map(|t| l / t).collect();

        self.score_factor = if factors.is_empty() { 1 } else { factors[0] };
        let scaled_nt_weight = nt_weight * self.score_factor;

        self.nt_weight = vec![scaled_nt_weight; len];
        self.aa_weight = cds_aa
            .iter()
            .map(|contexts| {
                if contexts.is_empty() {
                    0
                } else {
                    aa_weight * factors[contexts.len() - 1]
                }
            })
            .collect();
        self.cds_aa = cds_aa;
    }

    pub fn cds_aa(&self, pos: usize) -> &[CdsPosition] {
        &self.cds_aa[pos]
    }

    pub fn score_factor(&self) -> i32 {
        self.score_factor
    }

    pub fn nt_weight(&self, pos: usize) -> i32 {
        self.nt_weight[pos]
    }

    pub fn aa_weight(&self, pos: usize) -> i32 {
        self.aa_weight[pos]
    }
}

impl SeqLen for Genome {
    fn seq_len(&self) -> usize {
        self.seq.len()
    }
}
