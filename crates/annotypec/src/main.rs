use std::fmt::Display;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use annotype_common::manifest::{self, AnnotypeManifest, OnError};
use annotype_common::Diagnostic;
use annotype_parser::lexer::Lexer;
use annotype_parser::{parse_tree, transform, DEFAULT_ORIGIN};
use annotype_results::{
    dedup_results, parse_results, print_results, read_raw_results, write_json, write_raw_results,
    BatchOptions, ClassCensus, ParsedResults, ResultsError,
};

/// Type annotation parser and canonicalizer.
#[derive(Parser)]
#[command(
    name = "annotypec",
    version,
    about,
    long_about = "Type annotation parser and canonicalizer.\n\nParses annotation strings such as `dict[str, list[int]]` into a canonical\ntree and prints them back in canonical form.\n\nExamples:\n  annotypec parse 'Callable[ [int], str ]'     Print the canonical form\n  annotypec parse 'dict[str, int]' --json      Print the tree as JSON\n  annotypec canonicalize raw.json -o out.json  Canonicalize a result table\n  annotypec census raw.json --top 20           Count class references"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (overridden by RUST_LOG).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

#[derive(Subcommand)]
enum Command {
    /// Parse one annotation and print its canonical form.
    Parse(ParseArgs),
    /// Parse and reprint every entry of a raw result table.
    Canonicalize(CanonicalizeArgs),
    /// Count how often each class is referenced in a raw result table.
    Census(CensusArgs),
}

#[derive(Args)]
struct ParseArgs {
    /// The annotation string.
    annotation: String,

    /// Emit token stream to stdout (debug).
    #[arg(long = "emit-tokens")]
    emit_tokens: bool,

    /// Emit parse tree to stdout (debug).
    #[arg(long = "emit-tree")]
    emit_tree: bool,

    /// Print the canonical tree as JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CanonicalizeArgs {
    /// Raw result table (JSON).
    input: PathBuf,

    /// Output file path (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to do with a malformed annotation (default: from Annotype.toml, else skip).
    #[arg(long = "on-error", value_enum)]
    on_error: Option<OnErrorArg>,

    /// Worker threads (default: from Annotype.toml, else rayon's choice).
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Drop repeated annotations per parameter.
    #[arg(long)]
    dedup: bool,

    /// Write compact JSON.
    #[arg(long)]
    compact: bool,
}

#[derive(Args)]
struct CensusArgs {
    /// Raw result table (JSON).
    input: PathBuf,

    /// Only print the N most referenced classes.
    #[arg(long)]
    top: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OnErrorArg {
    Skip,
    Abort,
}

impl From<OnErrorArg> for OnError {
    fn from(arg: OnErrorArg) -> Self {
        match arg {
            OnErrorArg::Skip => OnError::Skip,
            OnErrorArg::Abort => OnError::Abort,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match cli.command {
        Command::Parse(args) => run_parse(&args),
        Command::Canonicalize(args) => run_canonicalize(&args),
        Command::Census(args) => run_census(&args),
    }
}

fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run_parse(args: &ParseArgs) -> ExitCode {
    let source = args.annotation.as_str();

    if args.emit_tokens {
        let (tokens, lex_diags) = Lexer::new(source, DEFAULT_ORIGIN).tokenize();
        for token in &tokens {
            println!(
                "{:>4}:{:<3} {:?} {:?}",
                token.span.start.line, token.span.start.column, token.kind, token.lexeme,
            );
        }
        if lex_diags.has_errors() {
            for diag in lex_diags.diagnostics() {
                print_diagnostic(diag, source, DEFAULT_ORIGIN);
            }
            return ExitCode::FAILURE;
        }
    }

    let tree = match parse_tree(source, DEFAULT_ORIGIN) {
        Ok(tree) => tree,
        Err(e) => {
            print_diagnostic(&e.to_diagnostic(), source, DEFAULT_ORIGIN);
            return ExitCode::FAILURE;
        }
    };

    if args.emit_tree {
        println!("{:#?}", tree);
    }

    let result = transform::to_type_result(&tree);
    if args.json {
        if let Err(e) = write_json(&mut io::stdout().lock(), &result, true) {
            return fail(e);
        }
    } else {
        println!("{}", result);
    }
    ExitCode::SUCCESS
}

/// Effective `canonicalize` settings: flags given on the command line win
/// over Annotype.toml, which wins over the built-in defaults.
#[derive(Debug, PartialEq, Eq)]
struct CanonicalizeSettings {
    options: BatchOptions,
    dedup: bool,
    pretty: bool,
}

impl CanonicalizeSettings {
    fn resolve(args: &CanonicalizeArgs, manifest: &AnnotypeManifest) -> Self {
        Self {
            options: BatchOptions {
                on_error: args.on_error.map_or(manifest.batch.on_error, OnError::from),
                jobs: args.jobs.unwrap_or(manifest.batch.jobs),
            },
            dedup: args.dedup || manifest.output.dedup,
            pretty: manifest.output.pretty && !args.compact,
        }
    }
}

fn run_canonicalize(args: &CanonicalizeArgs) -> ExitCode {
    let manifest = match load_manifest(&args.input) {
        Ok(m) => m,
        Err(code) => return code,
    };

    let CanonicalizeSettings {
        options,
        dedup,
        pretty,
    } = CanonicalizeSettings::resolve(args, &manifest);

    let parsed = match read_and_parse(&args.input, &options) {
        Ok(parsed) => parsed,
        Err(code) => return code,
    };

    let results = if dedup {
        dedup_results(&parsed.results)
    } else {
        parsed.results
    };
    let canonical = print_results(&results);

    let written = match args.output {
        Some(ref path) => write_raw_results(path, &canonical, pretty).map(|()| {
            info!(output = %path.display(), "wrote canonical table");
        }),
        None => write_json(&mut io::stdout().lock(), &canonical, pretty),
    };
    if let Err(e) = written {
        return fail(e);
    }

    if !parsed.skipped.is_empty() {
        eprintln!(
            "warning: skipped {} malformed annotation(s)",
            parsed.skipped.len()
        );
    }
    ExitCode::SUCCESS
}

fn run_census(args: &CensusArgs) -> ExitCode {
    let manifest = match load_manifest(&args.input) {
        Ok(m) => m,
        Err(code) => return code,
    };
    let parsed = match read_and_parse(&args.input, &BatchOptions::from(&manifest.batch)) {
        Ok(parsed) => parsed,
        Err(code) => return code,
    };

    let census = ClassCensus::from_results(&parsed.results);
    let entries = census.entries();
    let shown = args.top.unwrap_or(entries.len());
    for (class, count) in entries.iter().take(shown) {
        println!("{:>8}  {}", count, class);
    }
    println!(
        "{} annotation(s), {} distinct class(es)",
        census.annotations(),
        census.distinct()
    );
    ExitCode::SUCCESS
}

/// Find Annotype.toml from the input file's directory (walks up).
fn load_manifest(input: &Path) -> Result<AnnotypeManifest, ExitCode> {
    let abs_input = fs::canonicalize(input).unwrap_or_else(|_| input.to_path_buf());
    let loaded = manifest::load_or_default(&abs_input).map_err(fail)?;
    match loaded.root_dir {
        Some(ref root) => info!(root = %root.display(), "loaded {}", manifest::MANIFEST_FILE),
        None => info!("no {} found, using defaults", manifest::MANIFEST_FILE),
    }
    Ok(loaded)
}

fn read_and_parse(input: &Path, options: &BatchOptions) -> Result<ParsedResults, ExitCode> {
    let raw = read_raw_results(input)
        .map_err(|e| fail(format!("could not read '{}': {}", input.display(), e)))?;

    parse_results(&raw, options).map_err(|e| match e {
        ResultsError::Parse {
            ref site,
            ref input,
            ref source,
        } => {
            print_diagnostic(&source.to_diagnostic(), input, site);
            ExitCode::FAILURE
        }
        other => fail(other),
    })
}

fn fail(message: impl Display) -> ExitCode {
    eprintln!("error: {}", message);
    ExitCode::FAILURE
}

/// Spans count bytes; ariadne counts chars.
fn char_offset(source: &str, byte_offset: u32) -> usize {
    let byte_offset = byte_offset as usize;
    source
        .get(..byte_offset)
        .map_or(byte_offset, |prefix| prefix.chars().count())
}

fn print_diagnostic(diag: &Diagnostic, source: &str, origin: &str) {
    if let Some(ref span) = diag.span {
        let start = char_offset(source, span.start.offset);
        let end = char_offset(source, span.end.offset).max(start + 1);

        let mut report = Report::build(ReportKind::Error, origin, start)
            .with_message(&diag.message)
            .with_label(
                Label::new((origin, start..end))
                    .with_message(&diag.message)
                    .with_color(Color::Red),
            );

        for related in &diag.related {
            let rs = char_offset(source, related.span.start.offset);
            let re = char_offset(source, related.span.end.offset).max(rs + 1);
            report = report.with_label(
                Label::new((origin, rs..re))
                    .with_message(&related.message)
                    .with_color(Color::Blue),
            );
        }

        if let Some(ref suggestion) = diag.suggestion {
            report = report.with_help(suggestion);
        }

        if report
            .finish()
            .eprint((origin, Source::from(source)))
            .is_err()
        {
            eprintln!("{}", diag);
        }
    } else {
        eprintln!("error: {}", diag.message);
        if let Some(ref suggestion) = diag.suggestion {
            eprintln!("   = help: {}", suggestion);
        }
        eprintln!();
    }
}
