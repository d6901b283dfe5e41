//! Edit-script invariants: canonicality, round trips, projection
//! consistency and trim behaviour.

use codaln::cigar::{Cigar, CigarOp};
use codaln::seq::{seq_from_bytes, Nucleotide, Symbol};

fn nt(s: &[u8]) -> Vec<Nucleotide> {
    seq_from_bytes(s)
}

fn assert_canonical(c: &Cigar) {
    let items = c.items();
    for item in items {
        assert!(item.len > 0, "zero-length run in {}", c);
    }
    for pair in items.windows(2) {
        assert_ne!(pair[0].op, pair[1].op, "adjacent runs share an op in {}", c);
    }
}

#[test]
fn canonicality_after_mutations() {
    let mut c: Cigar = "3M2I4M1D2M".parse().unwrap();
    assert_canonical(&c);
    c.trim_query_start(4);
    assert_canonical(&c);
    c.trim_query_end(2);
    assert_canonical(&c);
}

#[test]
fn materialised_lengths_match_consumption() {
    let c: Cigar = "2O3M2I4M1D2M3X".parse().unwrap();
    let mut r = nt(b"ACGTACGTACGTA"); // 3+4+1+2+3 = 13 reference chars
    let mut q = nt(b"GGACGTACGTACG"); // 2+3+2+4+2 = 13 query chars
    c.to_aligned_pair(&mut r, &mut q);
    assert_eq!(r.len(), q.len());
    assert_eq!(r.len(), 17);
    assert_eq!(c.ref_consumed(), 13);
    assert_eq!(c.query_consumed(), 13);
}

#[test]
fn from_to_aligned_pair_round_trip() {
    for text in ["8M", "2X6M", "3M1I4M", "3M1D4M", "2O3M2I1M1D2M3X"] {
        let c: Cigar = text.parse().unwrap();
        let mut r = nt(b"ACGTACGTACGTACGT")[..c.ref_consumed()].to_vec();
        let mut q = nt(b"TGCATGCATGCATGCA")[..c.query_consumed()].to_vec();
        c.to_aligned_pair(&mut r, &mut q);
        let back = Cigar::from_aligned_pair(&r, &q);
        assert_eq!(back, c, "round trip failed for {}", text);
    }
}

#[test]
fn projection_consistency() {
    let c: Cigar = "3M2I3M1D2M".parse().unwrap();
    let ref_plain = nt(b"ACGTACGTA");
    let mut r = ref_plain.clone();
    let mut q = nt(b"ACGGGTACTA");
    c.to_aligned_pair(&mut r, &mut q);
    for p in 0..ref_plain.len() {
        let col = c.find_aligned_pos(p);
        assert_ne!(r[col], Nucleotide::GAP);
        assert_eq!(r[col], ref_plain[p]);
    }
}

#[test]
fn edit_script_text_round_trip() {
    let c: Cigar = "5M2I3M1X".parse().unwrap();
    assert_eq!(c.to_string(), "5M2I3M1X");
}

#[test]
fn unknown_letters_coerce_and_merge() {
    let c: Cigar = "2M1W3M".parse().unwrap();
    assert_eq!(c.to_string(), "6M");
    assert_canonical(&c);
}

#[test]
fn trims_compose() {
    let base: Cigar = "1X6M2I5M1D4M".parse().unwrap();
    for (a, b) in [(1, 4), (3, 2), (0, 5)] {
        let mut split = base.clone();
        split.trim_query_start(a);
        split.trim_query_start(b);
        let mut joined = base.clone();
        joined.trim_query_start(a + b);
        assert_eq!(split, joined);
    }
}

#[test]
fn full_trim_is_all_skips() {
    let base: Cigar = "6M2I5M".parse().unwrap();
    let mut c = base.clone();
    c.trim_query_start(13);
    assert!(c
        .items()
        .iter()
        .all(|i| matches!(i.op, CigarOp::RefSkipped | CigarOp::QuerySkipped)));
    assert_eq!(c.ref_consumed(), base.ref_consumed());
    assert_eq!(c.query_consumed(), base.query_consumed());
}
