use clap::Args;
use std::path::PathBuf;

use crate::aligner::DEFAULT_STRIPE_CELLS;

#[derive(Args, Debug)]
pub struct AlignArgs {
    /// Reference genome FASTA (single record)
    #[arg(short, long)]
    pub reference: PathBuf,
    /// CDS annotation table: ref_name <TAB> gene_name <TAB> location
    #[arg(long)]
    pub cds: Option<PathBuf>,
    /// Query FASTA; every record is aligned against the reference
    #[arg(short, long)]
    pub query: PathBuf,
    /// Write the materialised aligned pairs to this FASTA
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Write statistics JSON records here instead of stdout
    #[arg(long)]
    pub stats: Option<PathBuf>,
    // Scoring scalars; costs are negative
    #[arg(long, default_value_t = 2)]
    pub nt_match: i32,
    #[arg(long, default_value_t = -2)]
    pub nt_mismatch: i32,
    #[arg(long, default_value_t = -10)]
    pub nt_gap_open: i32,
    #[arg(long, default_value_t = -2)]
    pub nt_gap_extend: i32,
    #[arg(long, default_value_t = -6)]
    pub aa_gap_open: i32,
    #[arg(long, default_value_t = -2)]
    pub aa_gap_extend: i32,
    #[arg(long, default_value_t = -100)]
    pub frameshift: i32,
    #[arg(long, default_value_t = -20)]
    pub misalignment: i32,
    /// Relative weight of the nucleotide score layer
    #[arg(long, default_value_t = 1)]
    pub nt_weight: i32,
    /// Relative weight of each amino-acid score layer
    #[arg(long, default_value_t = 2)]
    pub aa_weight: i32,
    /// Plain nucleotide alignment even when CDS annotations are present
    #[arg(long, default_value_t = false)]
    pub nt_only: bool,
    #[arg(short = 'n', long, default_value_t = 0)]
    pub num_threads: usize,
    /// DP working-set bound, in retained cells
    #[arg(long, default_value_t = DEFAULT_STRIPE_CELLS)]
    pub stripe_cells: usize,
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}
