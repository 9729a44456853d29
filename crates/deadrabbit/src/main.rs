#![forbid(unsafe_code)]

//! deadrabbit binary entry point.

use anyhow::Context;
use deadrabbit::app::{Dashboard, Services};
use deadrabbit::cli::{self, Command};
use deadrabbit::{State, broker, config, database, logging};
use rtui_runtime::{EventPump, LoopExit, TerminalBackend, run_event_loop};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let opts = match cli::Opts::parse()? {
        Command::Run(opts) => opts,
        Command::Help => {
            println!("{}", cli::HELP_TEXT);
            return Ok(());
        }
        Command::Version => {
            println!("deadrabbit {}", cli::VERSION);
            return Ok(());
        }
    };

    let configuration = config::load(&opts.config)
        .with_context(|| format!("can't load configuration from {}", opts.config.display()))?;
    let debug = opts.debug || configuration.debug;
    let _log_guard = logging::init(&opts.log_file, debug).context("can't set up logging")?;
    // `tracing`'s macros import a `debug` helper that shadows the local.
    let debug_enabled = debug;
    tracing::info!(version = cli::VERSION, config = %opts.config.display(), debug = debug_enabled, "starting");

    let repositories =
        database::connect_all(&configuration.databases).context("can't connect to the databases")?;
    let services = Services {
        broker: broker::from_config(&configuration.rabbitmq),
        repositories,
    };
    let initial = State::new(debug, configuration.query_options());

    let backend = TerminalBackend::new().context("can't initialize the terminal")?;
    let mut dashboard =
        Dashboard::new(initial, services, backend).context("can't read the terminal size")?;
    let updates = dashboard.updates().clone();
    let pump = EventPump::spawn();

    let exit = run_event_loop(&mut dashboard, pump.events(), &updates);
    if exit == LoopExit::Disconnected {
        tracing::warn!("event sources disconnected before exit");
    }
    tracing::info!("stopped");
    Ok(())
}
