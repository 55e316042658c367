use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use pico_assist::channels::CliInput;
use pico_assist::config::AssistantConfig;
use pico_assist::intent::{AssistantDeps, IntentRouter};
use pico_assist::notify::ConsoleNotifier;
use pico_assist::scheduler::{Scheduler, SystemClock};
use pico_assist::store::{JsonFileStore, PersistentStore};
use pico_assist::system::{ProcessLauncher, SysinfoTelemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AssistantConfig::load().context("loading configuration")?;

    // Initialize tracing; the guard flushes the file writer on exit.
    let (file_layer, _log_guard) = if config.log_to_file {
        let appender = tracing_appender::rolling::daily(config.data_dir.join("logs"), "pico-assist.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    eprintln!("🤖 {} v{}", config.name, env!("CARGO_PKG_VERSION"));
    eprintln!("   Data: {}", config.data_dir.display());
    eprintln!("   Alarm poll: {}s", config.alarm_poll_interval.as_secs());
    match config.speech_command {
        Some(ref cmd) => eprintln!("   Speech: {cmd}"),
        None => eprintln!("   Speech: off"),
    }
    eprintln!("   Say 'help' to learn what I can do, 'exit' to quit.\n");

    // ── Store ────────────────────────────────────────────────────────────
    let docs = Arc::new(JsonFileStore::new(config.data_dir.clone()));
    let store = Arc::new(PersistentStore::load(docs).await);

    // ── Scheduler ────────────────────────────────────────────────────────
    let notifier = Arc::new(ConsoleNotifier::new(
        config.name.clone(),
        config.speech_command.clone(),
    ));
    let clock = Arc::new(SystemClock);
    let scheduler = Arc::new(Scheduler::new(
        Arc::clone(&store),
        notifier.clone(),
        clock.clone(),
        config.alarm_poll_interval,
    ));
    let restored = scheduler.restore_alarms().await;
    if restored > 0 {
        eprintln!("   Restored {restored} active alarm(s)\n");
    }

    // ── Router ───────────────────────────────────────────────────────────
    let deps = AssistantDeps {
        store,
        scheduler,
        notifier,
        input: Box::new(CliInput::new()),
        launcher: Arc::new(ProcessLauncher::new()),
        telemetry: Arc::new(SysinfoTelemetry),
        clock,
    };
    let mut router = IntentRouter::new(&config, deps);
    router.run().await;

    tracing::info!("Assistant stopped");
    Ok(())
}
