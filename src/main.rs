use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use jjdag::backend::{JjBackend, Worker};
use jjdag::model::ViewerConfig;
use jjdag::session::{Session, SessionConfig, StatusKind};
use jjdag::tui::TuiRunOptions;

#[derive(Parser)]
#[command(name = "jjdag")]
#[command(about = "Interactive commit graph for Jujutsu repositories", long_about = None)]
struct Cli {
    /// Repository to open
    #[arg(short = 'R', long, default_value = ".")]
    repository: PathBuf,

    /// Revset selecting the changesets to show (defaults to config)
    #[arg(short = 'r', long)]
    revisions: Option<String>,

    /// Config file (defaults to <repo>/.jj/jjdag.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append tracing output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Idle auto-refresh period in milliseconds; 0 disables it
    #[arg(long)]
    refresh_ms: Option<u64>,

    /// Allow rewriting immutable changesets
    #[arg(long)]
    ignore_immutable: bool,

    /// Print one snapshot and its layout as JSON, then exit
    #[arg(long)]
    dump: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(p) => p.clone(),
        None => ViewerConfig::discover(&cli.repository),
    };
    let mut cfg = ViewerConfig::load(&config_path)?;
    if let Some(revset) = cli.revisions {
        cfg.revset = revset;
    }
    if let Some(ms) = cli.refresh_ms {
        cfg.refresh_interval_ms = ms;
    }
    if cli.log_file.is_some() {
        cfg.log_file = cli.log_file;
    }
    cfg.ignore_immutable |= cli.ignore_immutable;

    jjdag::logging::init(cfg.log_file.as_deref())?;

    let backend = JjBackend::new(cfg.jj_binary.clone(), &cli.repository);
    let root = backend
        .workspace_root()
        .with_context(|| format!("open repository {}", cli.repository.display()))?;
    tracing::info!(root = %root.display(), revset = %cfg.revset, "starting");

    let session = Session::new(session_config(&cfg));
    let worker = Worker::new(Arc::new(backend))?;

    if cli.dump {
        return dump(session, worker);
    }

    jjdag::tui::run_with_options(TuiRunOptions {
        session,
        worker,
        repository: root,
    })
}

fn session_config(cfg: &ViewerConfig) -> SessionConfig {
    SessionConfig {
        revset: cfg.revset.clone(),
        refresh_interval: (cfg.refresh_interval_ms > 0)
            .then(|| Duration::from_millis(cfg.refresh_interval_ms)),
        ignore_immutable: cfg.ignore_immutable,
    }
}

#[derive(serde::Serialize)]
struct Dump<'a> {
    snapshot: &'a jjdag::model::Snapshot,
    layout: &'a jjdag::layout::Layout,
    cursor: Option<&'a jjdag::model::ChangeId>,
}

fn dump(mut session: Session, mut worker: Worker) -> Result<()> {
    let mut pending: Vec<_> = session.request_fetch().into_iter().collect();
    while !pending.is_empty() {
        worker.send_all(pending.drain(..));
        let event = worker
            .recv_blocking()
            .context("backend worker stopped")?;
        pending = session.handle(event);
    }
    if let Some(status) = session.status()
        && status.kind == StatusKind::Error
    {
        anyhow::bail!("{}", status.message);
    }

    let out = Dump {
        snapshot: session.model().snapshot().as_ref(),
        layout: session.layout(),
        cursor: session.selection().cursor(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&out).context("serialize dump json")?
    );
    Ok(())
}
