mod action;
mod view;

use std::sync::Arc;

use action::{Action, HELP};
use remote_proto::config::Config;
use remote_proto::settings::{FileSettings, SettingsStore};
use remote_sync::{ActivityFlag, RemoteState, Session};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let data_dir = remote_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("remote.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // RUST_LOG overrides; HTTP client internals stay at warn.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    eprintln!("mpv-remote log: {}", log_path.display());
    tracing::info!("mpv-remote starting");

    // ── Settings + session ───────────────────────────────────────────────────
    let settings = Arc::new(FileSettings::open(Config::config_path())?);
    let polling = settings.config().polling;
    let session = Session::new(settings.clone(), polling)?;

    let focus = ActivityFlag::new(true);
    session.start(focus.predicate());

    // ── State printer ────────────────────────────────────────────────────────
    let printer = tokio::spawn(print_changes(session.subscribe()));

    println!("{}", HELP);

    // ── Input loop ───────────────────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let action = match Action::parse(&line) {
            Ok(action) => action,
            Err(msg) => {
                println!("{}", msg);
                continue;
            }
        };

        match action {
            Action::SendCommand(command) => {
                tracing::debug!("input: {}", command.name());
                session.send(command).await;
            }
            Action::Refresh => session.refresh(),
            Action::Set { key, value } => {
                if let Err(e) = settings.set(&key, &value) {
                    println!("could not save {}: {}", key, e);
                }
            }
            Action::Focus => {
                focus.set(true);
                if !session.is_running() {
                    session.start(focus.predicate());
                }
            }
            Action::Blur => {
                focus.set(false);
                session.stop();
            }
            Action::Help => println!("{}", HELP),
            Action::Quit => break,
            Action::Noop => {}
        }
    }

    session.stop();
    printer.abort();
    tracing::info!("mpv-remote exiting");
    Ok(())
}

/// Print a line whenever the rendered view changes.
async fn print_changes(mut rx: watch::Receiver<RemoteState>) {
    let mut last = String::new();
    loop {
        let line = view::render(&rx.borrow_and_update());
        if line != last {
            println!("{}", line);
            last = line;
        }
        if rx.changed().await.is_err() {
            break;
        }
    }
}
