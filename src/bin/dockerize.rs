use bpaf::Bpaf;
use camino::Utf8PathBuf;
use dockerize::{Bundler, Error};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options)]
struct Options {
    #[bpaf(short, long)]
    /// Verbose output
    verbose: bool,

    #[bpaf(short('N'), long)]
    /// Dry run - print the archive entries without writing anything
    dry_run: bool,

    #[bpaf(short, long, argument("OUT"))]
    /// Output tarfile
    out: Utf8PathBuf,

    #[bpaf(long, argument("DIR"))]
    /// Directory libraries are placed in (default: /usr/lib)
    library_dir: Option<Utf8PathBuf>,

    #[bpaf(long, argument("CMD"))]
    /// Dependency lister for binaries without an interpreter (default: ldd)
    ldd: Option<String>,

    #[bpaf(positional("BINARY"), many)]
    /// Binaries to bundle
    binaries: Vec<Utf8PathBuf>,
}

/// Initialize the tracing subscriber with appropriate configuration
///
/// # Arguments
///
/// * `verbose` - If true, sets log level to DEBUG, otherwise INFO
pub fn init_logging(verbose: bool) {
    let filter_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Set up environment filter - allow overriding via RUST_LOG env var
    let env_filter = EnvFilter::builder()
        .with_default_directive(filter_level.into())
        .from_env_lossy();

    // Diagnostics go to stderr, stdout is reserved for --dry-run listings
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_level(verbose)
        .with_target(verbose)
        .with_line_number(verbose)
        .without_time()
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    debug!("Logging initialized with level: {}", filter_level);
}

fn main() -> ExitCode {
    let options = options().run();

    init_logging(options.verbose);

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Bypasses the log filter, fatal errors are always reported
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(options: Options) -> Result<(), Error> {
    let bundler = Bundler::builder()
        .maybe_library_dir(options.library_dir)
        .maybe_lister(options.ldd)
        .build();

    debug!("Library directory: {}", bundler.library_dir());

    let manifest = bundler.collect(&options.binaries)?;

    if manifest.is_empty() {
        return Err(Error::NoBinaries);
    }

    if options.dry_run {
        for entry in bundler.plan(&manifest) {
            println!("{}", entry);
        }
        return Ok(());
    }

    bundler.write_to_file(&manifest, &options.out)
}
