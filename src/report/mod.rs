//! Statistics records: the JSON shape emitted per alignment and a compact
//! text rendering for verbose output.

use serde::Serialize;

use crate::genome::projection::CdsAlignment;
use crate::scoring::AlignmentStats;

/// One statistics record, either genome-level (`cds` is null) or for a
/// projected CDS alignment. `id`, `alignLength` and `cds` are always
/// present; the remaining keys only when there is any alignment.
#[derive(Debug, Clone, Serialize)]
pub struct StatsRecord {
    pub id: String,
    #[serde(rename = "alignLength")]
    pub align_length: i64,
    pub cds: Option<String>,
    #[serde(rename = "cdsBegin", skip_serializing_if = "Option::is_none")]
    pub cds_begin: Option<i64>,
    #[serde(rename = "cdsEnd", skip_serializing_if = "Option::is_none")]
    pub cds_end: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identities: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inserts: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub misaligned: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frameshifts: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ambiguities: Option<i64>,
    #[serde(rename = "stopCodons", skip_serializing_if = "Option::is_none")]
    pub stop_codons: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mutations: Option<String>,
}

impl StatsRecord {
    fn empty(id: &str, cds: Option<String>) -> Self {
        StatsRecord {
            id: id.to_string(),
            align_length: 0,
            cds,
            cds_begin: None,
            cds_end: None,
            begin: None,
            end: None,
            coverage: None,
            score: None,
            quality: None,
            matches: None,
            identities: None,
            inserts: None,
            deletes: None,
            misaligned: None,
            frameshifts: None,
            ambiguities: None,
            stop_codons: None,
            mutations: None,
        }
    }

    fn fill(&mut self, stats: &AlignmentStats, ambiguities: i32) {
        self.align_length = stats.align_length() as i64;
        self.begin = Some(stats.begin as i64 + 1);
        self.end = Some(stats.end as i64);
        self.coverage = Some(if stats.ref_length != 0 {
            100.0 * stats.coverage as f64 / stats.ref_length as f64
        } else {
            0.0
        });
        self.score = Some(stats.score as i64);
        self.quality = Some(if stats.coverage != 0 {
            stats.score as f64 / stats.coverage as f64
        } else {
            0.0
        });
        self.matches = Some(stats.match_count as i64);
        self.identities = Some(stats.identity_count as i64);
        self.inserts = Some(stats.insert_count as i64);
        self.deletes = Some(stats.delete_count as i64);
        self.misaligned = Some(stats.misaligned as i64);
        self.frameshifts = Some(stats.frame_shifts as i64);
        self.ambiguities = Some(ambiguities as i64);
    }

    /// Genome-level nucleotide record.
    pub fn genome(id: &str, stats: &AlignmentStats, ambiguities: i32) -> Self {
        let mut record = StatsRecord::empty(id, None);
        if stats.align_length() != 0 {
            record.fill(stats, ambiguities);
        }
        record
    }

    /// Per-CDS amino-acid record.
    pub fn cds(
        id: &str,
        alignment: &CdsAlignment,
        cds_begin: i64,
        cds_end: i64,
        stats: &AlignmentStats,
    ) -> Self {
        let mut record = StatsRecord::empty(id, Some(alignment.name.clone()));
        if stats.align_length() != 0 {
            record.fill(stats, alignment.ambiguities());
            record.cds_begin = Some(cds_begin);
            record.cds_end = Some(cds_end);
            record.stop_codons = Some(alignment.stop_codons() as i64);
            record.mutations = Some(alignment.mutations());
        }
        record
    }
}

/// One-line text form, for verbose output.
pub fn render_text(record: &StatsRecord) -> String {
    if record.align_length == 0 {
        return "N/A".to_string();
    }
    let pct = |n: Option<i64>| 100.0 * n.unwrap_or(0) as f64 / record.align_length as f64;
    format!(
        "begin: {} end: {} coverage: {:.1}% score: {} quality: {:.2} \
         matches: {} ({:.1}%) identities: {} ({:.1}%) inserts: {} deletes: {} \
         misaligned: {} frameshifts: {}",
        record.begin.unwrap_or(0),
        record.end.unwrap_or(0),
        record.coverage.unwrap_or(0.0),
        record.score.unwrap_or(0),
        record.quality.unwrap_or(0.0),
        record.matches.unwrap_or(0),
        pct(record.matches),
        record.identities.unwrap_or(0),
        pct(record.identities),
        record.inserts.unwrap_or(0),
        record.deletes.unwrap_or(0),
        record.misaligned.unwrap_or(0),
        record.frameshifts.unwrap_or(0),
    )
}
