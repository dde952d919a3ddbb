use clap::Parser;
use miette::Result;
use srp::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE so piping to `head` or `grep -q` terminates quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => srp::cli::commands::init::run(args, &global),
        Commands::Supplier(cmd) => srp::cli::commands::supplier::run(cmd, &global),
        Commands::Asset(cmd) => srp::cli::commands::asset::run(cmd, &global),
        Commands::Task(cmd) => srp::cli::commands::task::run(cmd, &global),
        Commands::Audit(cmd) => srp::cli::commands::audit::run(cmd, &global),
        Commands::File(cmd) => srp::cli::commands::file::run(cmd, &global),
        Commands::Mail(cmd) => srp::cli::commands::mail::run(cmd, &global),
        Commands::Calendar(cmd) => srp::cli::commands::calendar::run(cmd, &global),
        Commands::Dashboard(args) => srp::cli::commands::dashboard::run(args, &global),
        Commands::Completions(args) => srp::cli::commands::completions::run(args),
    }
}

/// Log to stderr; `RUST_LOG` wins, otherwise warnings only unless `-v`
fn init_tracing(verbose: bool) {
    let default = if verbose { "srp=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
