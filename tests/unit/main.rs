//! Integration tests, organised by area:
//! - `cigar` - edit-script invariants and round trips
//! - `genome` - annotation parsing and weight preprocessing
//! - `aligner` - end-to-end alignment scenarios and optimality checks
//! - `pipeline` - statistics records over full query alignments

mod aligner;
mod cigar;
mod genome;
mod helpers;
mod pipeline;
