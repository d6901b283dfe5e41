//! Run-length edit scripts ("CIGAR") describing a pairwise alignment.
//!
//! An edit script is an ordered list of operation runs along the alignment
//! columns. Besides the usual match/insert/delete operations there are two
//! skip operations for sequence that lies outside the aligned region:
//! `RefSkipped` for reference not covered by the query and `QuerySkipped`
//! for query not covered by the reference. Boundary overhangs are always
//! represented as skips, never as gaps.
//!
//! Text form: `<len><op>` runs with op letters `M, I, D, X, O` for
//! `Match, RefGap, QueryGap, RefSkipped, QuerySkipped`.

use std::fmt;
use std::str::FromStr;

use crate::seq::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    /// Both sequences advance (aligned column, matching or not).
    Match,
    /// Insertion into the reference side (gap in the reference).
    RefGap,
    /// Deletion from the query side (gap in the query).
    QueryGap,
    /// Reference region outside the aligned query.
    RefSkipped,
    /// Query characters outside the aligned reference.
    QuerySkipped,
}

impl CigarOp {
    pub fn code(self) -> char {
        match self {
            CigarOp::Match => 'M',
            CigarOp::RefGap => 'I',
            CigarOp::QueryGap => 'D',
            CigarOp::RefSkipped => 'X',
            CigarOp::QuerySkipped => 'O',
        }
    }
}

/// One maximal run of an edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CigarItem {
    pub op: CigarOp,
    pub len: u32,
}

impl CigarItem {
    pub fn new(op: CigarOp, len: u32) -> Self {
        CigarItem { op, len }
    }
}

/// Extend `item` with one more column of `op`: same op grows the run,
/// a different op starts a fresh run of length 1.
pub fn extend_item(item: CigarItem, op: CigarOp) -> CigarItem {
    if item.op == op {
        CigarItem::new(op, item.len + 1)
    } else {
        CigarItem::new(op, 1)
    }
}

impl fmt::Display for CigarItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len, self.op.code())
    }
}

/// An edit script: a sequence of operation runs.
///
/// Canonical scripts have maximal runs (no two adjacent items share an
/// operation) and positive lengths. Intermediate states produced by the
/// aligner may temporarily hold zero-length boundary runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cigar {
    items: Vec<CigarItem>,
}

impl Cigar {
    pub fn new() -> Self {
        Cigar { items: Vec::new() }
    }

    pub fn items(&self) -> &[CigarItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last(&self) -> Option<&CigarItem> {
        self.items.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut CigarItem> {
        self.items.last_mut()
    }

    pub fn first_mut(&mut self) -> Option<&mut CigarItem> {
        self.items.first_mut()
    }

    /// Push a run without merging. The aligner uses this for its boundary
    /// bookkeeping; most callers want the `push_*` operations instead.
    pub fn push(&mut self, item: CigarItem) {
        self.items.push(item);
    }

    fn append(&mut self, op: CigarOp) {
        if let Some(last) = self.items.last_mut() {
            if last.op == op {
                last.len += 1;
                return;
            }
        }
        self.items.push(CigarItem::new(op, 1));
    }

    pub fn push_match(&mut self) {
        self.append(CigarOp::Match);
    }

    pub fn push_ref_gap(&mut self) {
        self.append(CigarOp::RefGap);
    }

    pub fn push_query_gap(&mut self) {
        self.append(CigarOp::QueryGap);
    }

    /// Merge adjacent same-op runs and drop zero-length runs.
    pub fn normalize(&mut self) {
        let mut merged: Vec<CigarItem> = Vec::with_capacity(self.items.len());
        for item in self.items.drain(..) {
            if item.len == 0 {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.op == item.op => last.len += item.len,
                _ => merged.push(item),
            }
        }
        self.items = merged;
    }

    /// Number of reference positions the script consumes.
    pub fn ref_consumed(&self) -> usize {
        self.items
            .iter()
            .filter(|i| {
                matches!(
                    i.op,
                    CigarOp::Match | CigarOp::QueryGap | CigarOp::RefSkipped
                )
            })
            .map(|i| i.len as usize)
            .sum()
    }

    /// Number of query positions the script consumes.
    pub fn query_consumed(&self) -> usize {
        self.items
            .iter()
            .filter(|i| {
                matches!(
                    i.op,
                    CigarOp::Match | CigarOp::RefGap | CigarOp::QuerySkipped
                )
            })
            .map(|i| i.len as usize)
            .sum()
    }

    /// Build an edit script by scanning two aligned (equal-length)
    /// sequences. A column is `RefGap` iff the reference holds a gap, else
    /// `QuerySkipped` iff the reference is missing, else `QueryGap` iff the
    /// query holds a gap, else `RefSkipped` iff the query is missing, else
    /// `Match`. Leading and trailing `QueryGap` runs are rewritten to
    /// `RefSkipped` so boundary query absence never looks like a deletion.
    pub fn from_aligned_pair<C: Symbol>(aligned_ref: &[C], aligned_query: &[C]) -> Cigar {
        assert_eq!(aligned_ref.len(), aligned_query.len());

        let mut result = Cigar::new();
        for (&r, &q) in aligned_ref.iter().zip(aligned_query.iter()) {
            let op = if r == C::GAP {
                CigarOp::RefGap
            } else if r == C::MISSING {
                CigarOp::QuerySkipped
            } else if q == C::GAP {
                CigarOp::QueryGap
            } else if q == C::MISSING {
                CigarOp::RefSkipped
            } else {
                CigarOp::Match
            };
            result.append(op);
        }

        if let Some(first) = result.items.first_mut() {
            if first.op == CigarOp::QueryGap {
                first.op = CigarOp::RefSkipped;
            }
        }
        if let Some(last) = result.items.last_mut() {
            if last.op == CigarOp::QueryGap {
                last.op = CigarOp::RefSkipped;
            }
        }
        result.normalize();

        result
    }

    /// Materialise the gapped alignment into `ref_seq` and `query_seq`
    /// (both supplied ungapped): `RefGap` inserts a gap into the reference,
    /// `QueryGap` into the query, `RefSkipped` inserts missing into the
    /// query, and `QuerySkipped` inserts missing into the reference.
    pub fn to_aligned_pair<C: Symbol>(&self, ref_seq: &mut Vec<C>, query_seq: &mut Vec<C>) {
        let mut pos = 0usize;
        for item in &self.items {
            let len = item.len as usize;
            match item.op {
                CigarOp::Match => {}
                CigarOp::RefGap => {
                    ref_seq.splice(pos..pos, std::iter::repeat(C::GAP).take(len));
                }
                CigarOp::QueryGap => {
                    query_seq.splice(pos..pos, std::iter::repeat(C::GAP).take(len));
                }
                CigarOp::RefSkipped => {
                    query_seq.splice(pos..pos, std::iter::repeat(C::MISSING).take(len));
                }
                CigarOp::QuerySkipped => {
                    ref_seq.splice(pos..pos, std::iter::repeat(C::MISSING).take(len));
                }
            }
            pos += len;
        }
    }

    /// Alignment column index corresponding to reference position
    /// `ref_pos`.
    ///
    /// Panics when `ref_pos` lies beyond the reference span of the script;
    /// that is a caller bug, not a data condition.
    pub fn find_aligned_pos(&self, ref_pos: usize) -> usize {
        let mut a_pos = 0usize;
        let mut ref_i = 0usize;

        for item in &self.items {
            let len = item.len as usize;
            match item.op {
                CigarOp::Match | CigarOp::QueryGap | CigarOp::RefSkipped => {
                    if ref_pos < ref_i + len {
                        return a_pos + (ref_pos - ref_i);
                    }
                    ref_i += len;
                    a_pos += len;
                }
                CigarOp::RefGap => {
                    a_pos += len;
                }
                CigarOp::QuerySkipped => {}
            }
        }

        assert!(
            ref_pos == ref_i,
            "reference position {} beyond edit script (reference span {})",
            ref_pos,
            ref_i
        );
        a_pos
    }

    /// Reference position where the aligned query region begins: the
    /// length of a leading `RefSkipped` run preceded only by
    /// `QuerySkipped`, else 0.
    pub fn query_start(&self) -> usize {
        for item in &self.items {
            match item.op {
                CigarOp::QuerySkipped => continue,
                CigarOp::RefSkipped => return item.len as usize,
                _ => return 0,
            }
        }
        0
    }

    /// Reference position where the aligned query region ends, as the
    /// source sums it: `Match` advances the counter and records its end,
    /// `RefGap` and `QuerySkipped` subtract, the remaining operations
    /// advance without recording.
    pub fn query_end(&self) -> usize {
        let mut pos: i64 = 0;
        let mut result: i64 = 0;
        for item in &self.items {
            let len = item.len as i64;
            match item.op {
                CigarOp::Match => {
                    pos += len;
                    result = pos;
                }
                CigarOp::RefGap | CigarOp::QuerySkipped => pos -= len,
                CigarOp::QueryGap | CigarOp::RefSkipped => pos += len,
            }
        }
        result.max(0) as usize
    }

    /// Remove leading and trailing `QuerySkipped` runs from the script and
    /// the corresponding characters from `query_seq`.
    pub fn trim_query<C: Symbol>(&mut self, query_seq: &mut Vec<C>) {
        while let Some(first) = self.items.first() {
            if first.op != CigarOp::QuerySkipped {
                break;
            }
            let len = first.len as usize;
            query_seq.drain(0..len.min(query_seq.len()));
            self.items.remove(0);
        }
        while let Some(last) = self.items.last() {
            if last.op != CigarOp::QuerySkipped {
                break;
            }
            let len = last.len as usize;
            query_seq.truncate(query_seq.len().saturating_sub(len));
            self.items.pop();
        }
    }

    /// Remove `n` alignment columns from the start, folding the removed
    /// reference and query characters into boundary `RefSkipped` /
    /// `QuerySkipped` runs. Pre-existing boundary skips are absorbed and
    /// re-emitted extended.
    pub fn trim_query_start(&mut self, n: usize) {
        let (mut ref_skipped, mut query_skipped) = (0u32, 0u32);

        while let Some(first) = self.items.first() {
            match first.op {
                CigarOp::RefSkipped => ref_skipped += first.len,
                CigarOp::QuerySkipped => query_skipped += first.len,
                _ => break,
            }
            self.items.remove(0);
        }

        let mut remaining = n as u32;
        while remaining > 0 {
            let Some(first) = self.items.first_mut() else {
                break;
            };
            let take = first.len.min(remaining);
            match first.op {
                CigarOp::Match => {
                    ref_skipped += take;
                    query_skipped += take;
                }
                CigarOp::RefGap | CigarOp::QuerySkipped => query_skipped += take,
                CigarOp::QueryGap | CigarOp::RefSkipped => ref_skipped += take,
            }
            first.len -= take;
            remaining -= take;
            if first.len == 0 {
                self.items.remove(0);
            }
        }

        if ref_skipped > 0 {
            self.items
                .insert(0, CigarItem::new(CigarOp::RefSkipped, ref_skipped));
        }
        if query_skipped > 0 {
            self.items
                .insert(0, CigarItem::new(CigarOp::QuerySkipped, query_skipped));
        }
    }

    /// Mirror of [`trim_query_start`](Cigar::trim_query_start) operating on
    /// the end of the alignment.
    pub fn trim_query_end(&mut self, n: usize) {
        let (mut ref_skipped, mut query_skipped) = (0u32, 0u32);

        while let Some(last) = self.items.last() {
            match last.op {
                CigarOp::RefSkipped => ref_skipped += last.len,
                CigarOp::QuerySkipped => query_skipped += last.len,
                _ => break,
            }
            self.items.pop();
        }

        let mut remaining = n as u32;
        while remaining > 0 {
            let Some(last) = self.items.last_mut() else {
                break;
            };
            let take = last.len.min(remaining);
            match last.op {
                CigarOp::Match => {
                    ref_skipped += take;
                    query_skipped += take;
                }
                CigarOp::RefGap | CigarOp::QuerySkipped => query_skipped += take,
                CigarOp::QueryGap | CigarOp::RefSkipped => ref_skipped += take,
            }
            last.len -= take;
            remaining -= take;
            if last.len == 0 {
                self.items.pop();
            }
        }

        if ref_skipped > 0 {
            self.items
                .push(CigarItem::new(CigarOp::RefSkipped, ref_skipped));
        }
        if query_skipped > 0 {
            self.items
                .push(CigarItem::new(CigarOp::QuerySkipped, query_skipped));
        }
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}

impl FromStr for Cigar {
    type Err = anyhow::Error;

    /// Parse the `<len><op>` text form. Whitespace is tolerated anywhere.
    /// An unknown op letter is diagnosed on stderr and coerced to `Match`
    /// so downstream processing can proceed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut result = Cigar::new();
        let mut count: Option<u32> = None;

        for c in s.chars() {
            if c.is_whitespace() {
                continue;
            }
            if let Some(d) = c.to_digit(10) {
                count = Some(count.unwrap_or(0) * 10 + d);
                continue;
            }
            let len = count
                .take()
                .ok_or_else(|| anyhow::anyhow!("edit-script op '{}' has no length", c))?;
            let op = match c {
                'M' => CigarOp::Match,
                'I' => CigarOp::RefGap,
                'D' => CigarOp::QueryGap,
                'X' => CigarOp::RefSkipped,
                'O' => CigarOp::QuerySkipped,
                other => {
                    eprintln!(
                        "Warning: unknown edit-script op '{}', treating as M",
                        other
                    );
                    CigarOp::Match
                }
            };
            result.push(CigarItem::new(op, len));
        }

        if count.is_some() {
            anyhow::bail!("edit script ends with a length and no op");
        }
        result.normalize();
        Ok(result)
    }
}
