//! Batch operations over whole result tables.

use std::collections::HashSet;

use annotype_common::manifest::{BatchSection, OnError};
use annotype_common::printer::print;
use annotype_common::TypeResult;
use annotype_parser::{parse_with_origin, ParseError};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{Result, ResultsError};
use crate::table::{ModuleLevel, RawResults, ResultTable, Results, Site};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    pub on_error: OnError,
    /// Worker threads; 0 runs on rayon's global pool.
    pub jobs: usize,
}

impl From<&BatchSection> for BatchOptions {
    fn from(section: &BatchSection) -> Self {
        Self {
            on_error: section.on_error,
            jobs: section.jobs,
        }
    }
}

/// An annotation string dropped under [`OnError::Skip`].
#[derive(Debug, Clone)]
pub struct SkippedAnnotation {
    /// `module.class.function.parameter`
    pub site: String,
    pub input: String,
    pub error: ParseError,
}

#[derive(Debug, Clone, Default)]
pub struct ParsedResults {
    pub results: Results,
    /// In table order.
    pub skipped: Vec<SkippedAnnotation>,
}

/// Parse every annotation string in `raw`.
///
/// Modules are parsed in parallel. Each string is parsed with its site as
/// the span origin, so errors point at `module.class.function.parameter`.
/// Under [`OnError::Abort`] the first failure in table order is returned.
pub fn parse_results(raw: &RawResults, options: &BatchOptions) -> Result<ParsedResults> {
    if options.jobs == 0 {
        return parse_all(raw, options.on_error);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs)
        .build()
        .map_err(|source| ResultsError::ThreadPool {
            jobs: options.jobs,
            source,
        })?;
    pool.install(|| parse_all(raw, options.on_error))
}

fn parse_all(raw: &RawResults, on_error: OnError) -> Result<ParsedResults> {
    let modules: Vec<(&String, Result<(ModuleLevel<TypeResult>, Vec<SkippedAnnotation>)>)> = raw
        .par_iter()
        .map(|(name, module)| (name, parse_module(name, module, on_error)))
        .collect();

    let mut parsed = ParsedResults::default();
    let mut total = 0;
    for (name, outcome) in modules {
        let (module, skipped) = outcome?;
        total += module
            .values()
            .flat_map(|c| c.values())
            .flat_map(|f| f.values())
            .map(Vec::len)
            .sum::<usize>();
        parsed.results.insert(name.clone(), module);
        parsed.skipped.extend(skipped);
    }

    info!(
        modules = parsed.results.len(),
        parsed = total,
        skipped = parsed.skipped.len(),
        "parsed result table"
    );
    Ok(parsed)
}

fn parse_module(
    module_name: &str,
    module: &ModuleLevel<String>,
    on_error: OnError,
) -> Result<(ModuleLevel<TypeResult>, Vec<SkippedAnnotation>)> {
    let mut parsed = ModuleLevel::new();
    let mut skipped = Vec::new();

    for (class_name, functions) in module {
        let class_entry = parsed.entry(class_name.clone()).or_default();
        for (function_name, parameters) in functions {
            let function_entry = class_entry.entry(function_name.clone()).or_default();
            for (parameter, inputs) in parameters {
                let site = Site {
                    module: module_name,
                    class: class_name,
                    function: function_name,
                    parameter,
                }
                .to_string();

                let mut values = Vec::with_capacity(inputs.len());
                for input in inputs {
                    match parse_with_origin(input, site.as_str()) {
                        Ok(result) => {
                            debug!(%site, input = %input, canonical = %result, "parsed type annotation");
                            values.push(result);
                        }
                        Err(error) => match on_error {
                            OnError::Abort => {
                                return Err(ResultsError::Parse {
                                    site,
                                    input: input.clone(),
                                    source: error,
                                })
                            }
                            OnError::Skip => {
                                warn!(%site, input = %input, %error, "skipping malformed type annotation");
                                skipped.push(SkippedAnnotation {
                                    site: site.clone(),
                                    input: input.clone(),
                                    error,
                                });
                            }
                        },
                    }
                }
                function_entry.insert(parameter.clone(), values);
            }
        }
    }

    Ok((parsed, skipped))
}

/// Reprint every result in canonical form.
pub fn print_results(results: &Results) -> RawResults {
    map_values(results, |values| values.iter().map(print).collect())
}

/// Keep the first of each structurally equal result per parameter.
pub fn dedup_results(results: &Results) -> Results {
    map_values(results, |values| {
        let mut seen = HashSet::with_capacity(values.len());
        values
            .iter()
            .filter(|value| seen.insert(*value))
            .cloned()
            .collect()
    })
}

fn map_values<T, U>(table: &ResultTable<T>, f: impl Fn(&[T]) -> Vec<U>) -> ResultTable<U> {
    table
        .iter()
        .map(|(module_name, classes)| {
            let classes = classes
                .iter()
                .map(|(class_name, functions)| {
                    let functions = functions
                        .iter()
                        .map(|(function_name, parameters)| {
                            let parameters = parameters
                                .iter()
                                .map(|(parameter, values)| (parameter.clone(), f(values)))
                                .collect();
                            (function_name.clone(), parameters)
                        })
                        .collect();
                    (class_name.clone(), functions)
                })
                .collect();
            (module_name.clone(), classes)
        })
        .collect()
}
