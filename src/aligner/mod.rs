//! Banded affine-gap global alignment with gap-phase tracking.
//!
//! The aligner maximises an integer score over a dynamic-programming table
//! whose per-cell state carries, besides the usual best score `D` and the
//! match-ending score `M`, one slot per gap-length residue class for gaps
//! in the reference (`P`) and in the query (`Q`). `SIDE_N` is the number of
//! residue classes: 3 for codon-aware scoring, 1 for flat affine scoring.
//!
//! Memory is bounded by processing the table in horizontal stripes of at
//! most `stripe_cells / query_len` rows; the last row of a stripe seeds
//! row 0 of the next, and per-column edit scripts are reconstructed at the
//! end of every stripe.

pub mod search_range;

use crate::cigar::{extend_item, Cigar, CigarItem, CigarOp};
use crate::seq::Symbol;

use self::search_range::get_search_range;

/// Working-set bound: number of retained DP cells (not bytes).
pub const DEFAULT_STRIPE_CELLS: usize = 10_000_000;

const INVALID_SCORE: i32 = -10_000;

/// Length of a sequence as seen by the alignment table.
pub trait SeqLen {
    fn seq_len(&self) -> usize;
}

impl<C: Symbol> SeqLen for [C] {
    fn seq_len(&self) -> usize {
        self.len()
    }
}

/// Score deltas consumed by the DP recurrences.
///
/// `k` in the gap-extension deltas is the running gap length modulo
/// `SIDE_N` *before* the current column. Implementations return 0 for gaps
/// opened or extended at the final reference/query position (edge gaps are
/// free; boundary overhangs become skips, not gaps).
pub trait AlignScorer {
    type RefSeq: SeqLen + ?Sized;
    type QuerySeq: SeqLen + ?Sized;

    fn score_extend(&self, r: &Self::RefSeq, q: &Self::QuerySeq, i: usize, j: usize) -> i32;
    fn score_open_ref_gap(&self, r: &Self::RefSeq, q: &Self::QuerySeq, i: usize, j: usize)
        -> i32;
    fn score_extend_ref_gap(
        &self,
        r: &Self::RefSeq,
        q: &Self::QuerySeq,
        i: usize,
        j: usize,
        k: usize,
    ) -> i32;
    fn score_open_query_gap(
        &self,
        r: &Self::RefSeq,
        q: &Self::QuerySeq,
        i: usize,
        j: usize,
    ) -> i32;
    fn score_extend_query_gap(
        &self,
        r: &Self::RefSeq,
        q: &Self::QuerySeq,
        i: usize,
        j: usize,
        k: usize,
    ) -> i32;
}

/// A finished alignment: its score and edit script.
#[derive(Debug, Clone, Default)]
pub struct Solution {
    pub score: i32,
    pub cigar: Cigar,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    op: CigarItem,
    score: i32,
}

#[derive(Debug, Clone, Copy)]
struct Cell<const SIDE_N: usize> {
    d: Slot,
    m: Slot,
    p: [Slot; SIDE_N],
    q: [Slot; SIDE_N],
}

impl<const SIDE_N: usize> Cell<SIDE_N> {
    fn invalid() -> Self {
        Cell {
            d: Slot {
                op: CigarItem::new(CigarOp::Match, 1),
                score: 0,
            },
            m: Slot {
                op: CigarItem::new(CigarOp::Match, 1),
                score: 0,
            },
            p: [Slot {
                op: CigarItem::new(CigarOp::RefGap, 0),
                score: INVALID_SCORE,
            }; SIDE_N],
            q: [Slot {
                op: CigarItem::new(CigarOp::QueryGap, 0),
                score: INVALID_SCORE,
            }; SIDE_N],
        }
    }
}

pub struct GlobalAligner<S, const SIDE_N: usize> {
    scorer: S,
    stripe_cells: usize,
}

impl<S: AlignScorer, const SIDE_N: usize> GlobalAligner<S, SIDE_N> {
    pub fn new(scorer: S) -> Self {
        Self::with_stripe_cells(scorer, DEFAULT_STRIPE_CELLS)
    }

    pub fn with_stripe_cells(scorer: S, stripe_cells: usize) -> Self {
        assert!(SIDE_N >= 1, "SIDE_N must be at least 1");
        GlobalAligner {
            scorer,
            stripe_cells,
        }
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Align with an optional seed script. Only the empty seed (full
    /// search rectangle) is supported; a non-empty seed is a documented
    /// extension point and reports an error rather than guessing.
    pub fn align_seeded(
        &self,
        ref_seq: &S::RefSeq,
        query_seq: &S::QuerySeq,
        seed: &Cigar,
    ) -> anyhow::Result<Solution> {
        let _range = get_search_range(seed, ref_seq.seq_len(), query_seq.seq_len())?;
        Ok(self.align(ref_seq, query_seq))
    }

    /// Global alignment of `query_seq` against `ref_seq`.
    pub fn align(&self, ref_seq: &S::RefSeq, query_seq: &S::QuerySeq) -> Solution {
        let ref_len = ref_seq.seq_len();
        let query_len = query_seq.seq_len();
        assert!(ref_len > 0 && query_len > 0, "cannot align empty sequences");

        // stripe height: how many rows fit in the retained working set
        let n_cap = ref_len.min((self.stripe_cells / query_len).max(1));

        // per-column solutions; result[hj] holds the best prefix script
        // ending at column hj on the last completed stripe row
        let mut result: Vec<Solution> = Vec::with_capacity(query_len + 1);
        result.push(Solution::default());
        for j in 0..query_len {
            let mut next = result[j].clone();
            next.cigar.push_ref_gap();
            result.push(next);
        }
        result[0].cigar.push(CigarItem::new(CigarOp::QueryGap, 0));

        let mut work: Vec<Vec<Cell<SIDE_N>>> =
            vec![vec![Cell::invalid(); query_len + 1]; n_cap + 1];

        let mut stripe_start = 0usize;
        while stripe_start < ref_len {
            let n = (ref_len - stripe_start).min(n_cap);

            if stripe_start == 0 {
                for hj in 0..=query_len {
                    let boundary =
                        *result[hj].cigar.last().expect("prefix script is never empty");
                    let mut cell = Cell::invalid();
                    cell.d = Slot {
                        op: boundary,
                        score: 0,
                    };
                    cell.m = cell.d;
                    work[0][hj] = cell;
                }
                let origin = Slot {
                    op: CigarItem::new(CigarOp::QueryGap, 0),
                    score: 0,
                };
                work[0][0].d = origin;
                work[0][0].m = origin;
            } else {
                // the previous stripe's last row becomes this stripe's row 0
                work.swap(0, n_cap);
            }

            for i in stripe_start..stripe_start + n {
                let hi = i - stripe_start + 1;

                let mut boundary = work[hi - 1][0];
                boundary.d.op.len += 1;
                boundary.m = boundary.d;
                for k in 0..SIDE_N {
                    boundary.p[k].op.len += 1;
                    boundary.q[k].op.len += 1;
                }
                work[hi][0] = boundary;

                for j in 0..query_len {
                    let hj = j + 1;
                    let diag = work[hi - 1][hj - 1];
                    let up = work[hi - 1][hj];
                    let left = work[hi][hj - 1];
                    let mut cur = Cell::invalid();

                    let sextend =
                        diag.d.score + self.scorer.score_extend(ref_seq, query_seq, i, j);
                    cur.m = Slot {
                        op: extend_item(diag.d.op, CigarOp::Match),
                        score: sextend,
                    };

                    // gaps in the query: moving down along the reference
                    let shopen = up.m.score
                        + self.scorer.score_open_query_gap(ref_seq, query_seq, i, j);
                    let mut shgap = shopen;
                    let mut hgap_last = up.m.op;
                    for k in 0..SIDE_N {
                        let kn = (k + 1) % SIDE_N;
                        let sk = up.q[k].score
                            + self
                                .scorer
                                .score_extend_query_gap(ref_seq, query_seq, i, j, kn);
                        if k == SIDE_N - 1 && shopen > sk {
                            cur.q[0] = Slot {
                                op: extend_item(up.m.op, CigarOp::QueryGap),
                                score: shopen,
                            };
                        } else {
                            cur.q[kn] = Slot {
                                op: extend_item(up.q[k].op, CigarOp::QueryGap),
                                score: sk,
                            };
                            if sk > shgap {
                                shgap = sk;
                                hgap_last = up.q[k].op;
                            }
                        }
                    }

                    // gaps in the reference: moving right along the query
                    let svopen = left.m.score
                        + self.scorer.score_open_ref_gap(ref_seq, query_seq, i, j);
                    let mut svgap = svopen;
                    let mut vgap_last = left.m.op;
                    for k in 0..SIDE_N {
                        let kn = (k + 1) % SIDE_N;
                        let sk = left.p[k].score
                            + self
                                .scorer
                                .score_extend_ref_gap(ref_seq, query_seq, i, j, kn);
                        if k == SIDE_N - 1 && svopen > sk {
                            cur.p[0] = Slot {
                                op: extend_item(left.m.op, CigarOp::RefGap),
                                score: svopen,
                            };
                        } else {
                            cur.p[kn] = Slot {
                                op: extend_item(left.p[k].op, CigarOp::RefGap),
                                score: sk,
                            };
                            if sk > svgap {
                                svgap = sk;
                                vgap_last = left.p[k].op;
                            }
                        }
                    }

                    cur.d = if sextend > shgap && sextend > svgap {
                        Slot {
                            op: extend_item(diag.d.op, CigarOp::Match),
                            score: sextend,
                        }
                    } else if shgap > svgap {
                        Slot {
                            op: extend_item(hgap_last, CigarOp::QueryGap),
                            score: shgap,
                        }
                    } else {
                        Slot {
                            op: extend_item(vgap_last, CigarOp::RefGap),
                            score: svgap,
                        }
                    };

                    work[hi][hj] = cur;
                }
            }

            // reconstruct per-column scripts for this stripe, right to left
            for j in (0..query_len).rev() {
                let mut r_items: Vec<CigarItem> = Vec::new();
                let mut hi = n as i64;
                let mut hj = (j + 1) as i64;

                let mut slot = work[hi as usize][hj as usize].d;
                let score = slot.score;

                loop {
                    r_items.push(slot.op);
                    match slot.op.op {
                        CigarOp::Match => {
                            hi -= slot.op.len as i64;
                            hj -= slot.op.len as i64;
                        }
                        CigarOp::QueryGap => hi -= slot.op.len as i64,
                        CigarOp::RefGap => hj -= slot.op.len as i64,
                        _ => unreachable!("skip operation inside the DP table"),
                    }

                    if hi <= 0 {
                        // row 0 belongs to the previous stripe; truncate
                        // the last run to stay inside this one
                        let too_far = (-hi) as u32;
                        let last = r_items.last_mut().expect("traceback pushed a run");
                        last.len -= too_far;
                        if last.op == CigarOp::Match {
                            hj += too_far as i64;
                        }
                        break;
                    }

                    // entering a gap run resumes from the match-bounded
                    // state, which carries the open-vs-extend provenance
                    slot = match slot.op.op {
                        CigarOp::Match => work[hi as usize][hj as usize].d,
                        _ => work[hi as usize][hj as usize].m,
                    };
                }

                let hj = hj as usize;
                let mut solution = result[hj].clone();
                solution.score = score;
                let mut runs = r_items.iter().rev();
                if let (Some(first), Some(tail)) = (r_items.last(), solution.cigar.last_mut()) {
                    if first.op == tail.op {
                        tail.len += first.len;
                        runs.next();
                    }
                }
                for run in runs {
                    solution.cigar.push(*run);
                }
                result[j + 1] = solution;

                if n == ref_len {
                    break;
                }
            }

            result[0]
                .cigar
                .last_mut()
                .expect("column-0 prefix script")
                .len += n as u32;
            stripe_start += n;
        }

        let mut fin = result.swap_remove(query_len);
        if let Some(first) = fin.cigar.first_mut() {
            if first.op == CigarOp::RefGap {
                first.op = CigarOp::QuerySkipped;
            } else if first.op == CigarOp::QueryGap {
                first.op = CigarOp::RefSkipped;
            }
        }
        if let Some(last) = fin.cigar.last_mut() {
            if last.op == CigarOp::RefGap {
                last.op = CigarOp::QuerySkipped;
            } else if last.op == CigarOp::QueryGap {
                last.op = CigarOp::RefSkipped;
            }
        }
        fin.cigar.normalize();
        fin
    }
}
