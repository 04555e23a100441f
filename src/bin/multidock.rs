use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use multidock::actor::broadcast::BroadcastReceiver;
use multidock::actor::config_watcher::ConfigWatcher;
use multidock::actor::reactor::{self, Event, Reactor, Record, replay};
use multidock::actor::timer::Timer;
use multidock::common::config::{Config, config_file};
use multidock::common::log;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Keeps a dock placed sensibly across monitors.
///
/// Events from the display, input and settings services arrive on stdin as
/// JSON lines; the signals for the dock frontend, window manager and input
/// region monitor leave on stdout the same way.
#[derive(Parser)]
struct Cli {
    /// Config file to load and watch. Defaults to the per-user config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable animations.
    #[arg(long)]
    no_animate: bool,

    /// Check the config file for problems and exit.
    #[arg(long)]
    validate: bool,

    /// Record reactor events to the given file. Overwrites the file if
    /// it exists.
    #[arg(long)]
    record: Option<PathBuf>,

    /// Replay a recording and print the signals it produces instead of
    /// reading events from stdin.
    #[arg(long, conflicts_with = "record")]
    replay: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    sigpipe::reset();
    let opt: Cli = Parser::parse();

    log::init_logging();
    install_panic_hook();

    let config_path = opt.config.clone().unwrap_or_else(config_file);
    let mut config = Config::read_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    if opt.validate {
        return validate(&config, &config_path);
    }

    let fixes = config.auto_fix_values();
    if fixes > 0 {
        warn!(fixes, "config had out-of-range values, corrected");
    }
    config.settings.animation.animate &= !opt.no_animate;

    if let Some(path) = &opt.replay {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        return replay(path, |signal| match serde_json::to_string(&signal) {
            Ok(line) => {
                let _ = writeln!(out, "{line}");
            }
            Err(e) => warn!("unserializable signal: {e}"),
        });
    }

    let record = Record::new(opt.record.as_deref())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building the runtime")?;
    runtime.block_on(run(config, config_path, record));
    Ok(())
}

fn validate(config: &Config, path: &Path) -> anyhow::Result<()> {
    let issues = config.validate();
    if issues.is_empty() {
        println!("{}: ok", path.display());
        return Ok(());
    }
    for issue in &issues {
        eprintln!("{}: {issue}", path.display());
    }
    anyhow::bail!("{} problem(s) in {}", issues.len(), path.display())
}

async fn run(config: Config, config_path: PathBuf, record: Record) {
    let (events_tx, events_rx) = multidock::actor::channel();
    let (signal_tx, signal_rx) = multidock::actor::channel();
    let (timer_tx, timer_rx) = multidock::actor::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let reactor = Reactor::new(config, record, signal_tx, timer_tx);
    let timer = Timer::new(timer_rx, events_tx.clone());
    let watcher = ConfigWatcher::new(config_path, events_tx.clone());

    let background = async move {
        let watch = async move {
            if let Err(e) = watcher.run().await {
                warn!("config watcher stopped: {e}");
            }
        };
        tokio::join!(timer.run(), watch);
        std::future::pending::<()>().await
    };
    let foreground = async move {
        tokio::join!(
            reactor.run(events_rx, shutdown_rx),
            read_events(events_tx, shutdown_tx),
            write_signals(signal_rx),
        );
    };

    info!("multidock running");
    tokio::select! {
        _ = foreground => {}
        _ = background => {}
    }
    debug!("multidock exiting");
}

async fn read_events(events_tx: reactor::Sender, shutdown: oneshot::Sender<()>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => {}
            Ok(Some(line)) => match serde_json::from_str::<Event>(&line) {
                Ok(event) => events_tx.send(event),
                Err(e) => warn!("ignoring malformed event line: {e}"),
            },
            Ok(None) => break,
            Err(e) => {
                error!("reading events failed: {e}");
                break;
            }
        }
    }
    debug!("event input closed");
    _ = shutdown.send(());
}

async fn write_signals(mut signals: BroadcastReceiver) {
    let mut stdout = tokio::io::stdout();
    while let Some((_span, signal)) = signals.recv().await {
        let line = match serde_json::to_string(&signal) {
            Ok(line) => line,
            Err(e) => {
                warn!("unserializable signal: {e}");
                continue;
            }
        };
        let written = async {
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await
        };
        if let Err(e) = written.await {
            debug!("signal output closed: {e}");
            break;
        }
    }
}

#[cfg(panic = "unwind")]
fn install_panic_hook() {
    // Abort on panic instead of propagating panics to the main thread.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        original_hook(info);
        std::process::abort();
    }));
}

#[cfg(not(panic = "unwind"))]
fn install_panic_hook() {}
