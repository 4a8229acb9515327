//! Per-parameter annotation tables and the batch operations over them.
//!
//! Tables are keyed module -> class (or [`GLOBAL`]) -> function -> parameter
//! (or [`RETURN`]). Upstream collectors fill a [`RawResults`] table with
//! annotation strings; this crate parses it into canonical [`Results`],
//! reprints it, deduplicates it and counts the classes it references.

pub mod batch;
pub mod census;
pub mod error;
pub mod io;
pub mod table;

pub use batch::{
    dedup_results, parse_results, print_results, BatchOptions, ParsedResults, SkippedAnnotation,
};
pub use census::ClassCensus;
pub use error::{Result, ResultsError};
pub use io::{read_raw_results, write_json, write_raw_results};
pub use table::{
    build_query, collect_raw, count_values, ModuleSignatures, QueryTable, RawResults, ResultTable, Results,
    Site, GLOBAL, RETURN,
};
