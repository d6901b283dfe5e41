//! End-to-end pipeline: read the annotated reference and the queries,
//! align every query (in parallel), write aligned FASTA and statistics.

pub mod args;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use bio::io::fasta;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::aligner::{GlobalAligner, Solution};
use crate::genome::projection::cds_alignments;
use crate::genome::{CdsFeature, Genome};
use crate::report::{render_text, StatsRecord};
use crate::scoring::genome_scorer::GenomeScorer;
use crate::scoring::matrices::{blosum62, nucleotide_matrix};
use crate::scoring::SubstitutionScorer;
use crate::seq::codon::CodonView;
use crate::seq::{seq_from_bytes, seq_to_string, Nucleotide};

use self::args::AlignArgs;

/// Everything produced for one query.
pub struct QueryResult {
    pub id: String,
    pub solution: Solution,
    pub aligned_ref: Vec<Nucleotide>,
    pub aligned_query: Vec<Nucleotide>,
    pub records: Vec<StatsRecord>,
}

/// Parse one annotation line: `ref_name <TAB> gene_name <TAB> location`.
/// An empty gene name becomes `G<n>` with `n` counting up.
pub fn parse_cds_line(line: &str, unnamed: &mut usize) -> Option<CdsFeature> {
    let mut fields = line.splitn(3, '\t');
    let _ref_name = fields.next()?;
    let gene = fields.next()?;
    let location = fields.next()?;
    let name = if gene.is_empty() {
        let generated = format!("G{}", unnamed);
        *unnamed += 1;
        generated
    } else {
        gene.to_string()
    };
    Some(CdsFeature::new(&name, location))
}

/// Read the single-record reference FASTA and its CDS annotation table.
/// Malformed features are diagnosed and skipped.
pub fn read_genome(fasta_path: &Path, cds_path: Option<&Path>, verbose: bool) -> Result<Genome> {
    let reader = fasta::Reader::from_file(fasta_path)
        .with_context(|| format!("cannot read reference {}", fasta_path.display()))?;
    let record = reader
        .records()
        .next()
        .context("reference FASTA holds no record")?
        .context("malformed reference FASTA")?;
    let mut genome = Genome::new(record.id().to_string(), seq_from_bytes(record.seq()));

    if let Some(cds_path) = cds_path {
        let file = File::open(cds_path)
            .with_context(|| format!("cannot read annotations {}", cds_path.display()))?;
        let mut unnamed = 0usize;
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match parse_cds_line(&line, &mut unnamed) {
                Some(feature) => {
                    genome.add_cds_feature(feature);
                }
                None => eprintln!("Warning: skipping malformed annotation line: {}", line),
            }
        }
    }

    if verbose {
        let features = genome.cds_features();
        for (i, a) in features.iter().enumerate() {
            for b in features.iter().skip(i + 1) {
                if a.contains(b) {
                    eprintln!("[INFO] CDS {} covers the codon grid of {}", a.name, b.name);
                }
            }
        }
    }

    Ok(genome)
}

/// Align one query and derive its statistics records.
pub fn align_query(
    genome: &Genome,
    scorer: &GenomeScorer,
    id: &str,
    query: Vec<Nucleotide>,
    nt_only: bool,
    stripe_cells: usize,
) -> QueryResult {
    let solution = if nt_only || genome.cds_features().is_empty() {
        let aligner: GlobalAligner<SubstitutionScorer<Nucleotide>, 1> =
            GlobalAligner::with_stripe_cells(scorer.nt_scorer().clone(), stripe_cells);
        aligner.align(&genome.seq, &query)
    } else {
        let aligner: GlobalAligner<GenomeScorer, 3> =
            GlobalAligner::with_stripe_cells(scorer.clone(), stripe_cells);
        aligner.align(genome, &CodonView::new(query.clone()))
    };

    let mut aligned_ref = genome.seq.clone();
    let mut aligned_query = query;
    solution
        .cigar
        .to_aligned_pair(&mut aligned_ref, &mut aligned_query);

    let nt_stats = scorer.nt_scorer().calc_stats(&aligned_ref, &aligned_query, 0);
    let nt_ambiguities = aligned_query
        .iter()
        .filter(|&&n| n == Nucleotide::N)
        .count() as i32;
    let mut records = vec![StatsRecord::genome(id, &nt_stats, nt_ambiguities)];

    let projections = cds_alignments(
        &solution.cigar,
        &aligned_ref,
        &aligned_query,
        genome.cds_features(),
        true,
    );
    for cds in &projections {
        let feature = genome
            .cds_features()
            .iter()
            .find(|f| f.name == cds.name)
            .expect("projection came from a known feature");
        let aa_stats = scorer.aa_scorer().calc_stats(
            &cds.ref_seq.aa,
            &cds.query_seq.aa,
            cds.frameshift_count(),
        );
        let cds_begin = feature.location.first().map(|r| r.start + 1).unwrap_or(0) as i64;
        let cds_end = feature.location.last().map(|r| r.end).unwrap_or(0) as i64;
        records.push(StatsRecord::cds(id, cds, cds_begin, cds_end, &aa_stats));
    }

    QueryResult {
        id: id.to_string(),
        solution,
        aligned_ref,
        aligned_query,
        records,
    }
}

pub fn run(args: AlignArgs) -> Result<()> {
    if args.num_threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.num_threads)
            .build_global()
            .context("cannot size the thread pool")?;
    }

    let mut genome = read_genome(&args.reference, args.cds.as_deref(), args.verbose)?;
    genome.preprocess(args.nt_weight, args.aa_weight);
    if args.verbose {
        eprintln!(
            "[INFO] reference {} ({} nt, {} CDS features)",
            genome.name,
            genome.len(),
            genome.cds_features().len()
        );
    }

    let scorer = GenomeScorer::new(
        SubstitutionScorer::new(
            nucleotide_matrix(args.nt_match, args.nt_mismatch),
            args.nt_gap_open,
            args.nt_gap_extend,
            args.frameshift,
            args.misalignment,
        ),
        SubstitutionScorer::new(
            blosum62(),
            args.aa_gap_open,
            args.aa_gap_extend,
            args.frameshift,
            args.misalignment,
        ),
    );

    let query_reader = fasta::Reader::from_file(&args.query)
        .with_context(|| format!("cannot read queries {}", args.query.display()))?;
    let queries: Vec<(String, Vec<Nucleotide>)> = query_reader
        .records()
        .map(|record| {
            let record = record.context("malformed query FASTA")?;
            Ok((record.id().to_string(), seq_from_bytes(record.seq())))
        })
        .collect::<Result<_>>()?;

    let bar = ProgressBar::new(queries.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("static template"),
    );

    let results: Vec<QueryResult> = queries
        .into_par_iter()
        .map(|(id, seq)| {
            let result = align_query(
                &genome,
                &scorer,
                &id,
                seq,
                args.nt_only,
                args.stripe_cells,
            );
            bar.inc(1);
            result
        })
        .collect();
    bar.finish_and_clear();

    if let Some(out) = &args.out {
        let mut writer = fasta::Writer::to_file(out)
            .with_context(|| format!("cannot write alignment {}", out.display()))?;
        for r in &results {
            writer.write(&genome.name, None, seq_to_string(&r.aligned_ref).as_bytes())?;
            writer.write(&r.id, None, seq_to_string(&r.aligned_query).as_bytes())?;
        }
    }

    let mut stats_out: Box<dyn Write> = match &args.stats {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("cannot write {}", path.display()))?,
        )),
        None => Box::new(io::stdout()),
    };
    for r in &results {
        for record in &r.records {
            serde_json::to_writer(&mut stats_out, record)?;
            stats_out.write_all(b"\n")?;
        }
        if args.verbose {
            eprintln!("{}: {}", r.id, render_text(&r.records[0]));
        }
    }
    stats_out.flush()?;

    Ok(())
}
