//! onmain runtime
//!
//! Demo host: the main thread owns a frame loop that pumps the main queue,
//! while worker threads report progress through `set_on_main()`.
//!
//! Usage: `onmain [settings.json]`

use anyhow::{Context, Result};
use onmain_core::{
    field, install_main_queue, shared, DeferExt, DeferrableOwner, DispatchSettings, MainLoopQueue,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WORKERS: usize = 3;
const STEPS: u32 = 5;

/// State the "UI" renders each frame.
#[derive(Debug, Default)]
struct Status {
    message: String,
    completed: u32,
    last_error: Option<String>,
}

impl DeferrableOwner for Status {}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    tracing::info!("onmain v{}", onmain_core::VERSION);

    let settings = match std::env::args().nth(1) {
        Some(path) => DispatchSettings::load(&path)
            .with_context(|| format!("loading settings from {path}"))?,
        None => DispatchSettings::default(),
    };
    tracing::info!(?settings, "settings loaded");

    let main_loop = MainLoopQueue::from_settings(&settings);
    install_main_queue(Arc::new(main_loop.clone()));

    let status = shared(Status {
        message: "starting".to_string(),
        ..Status::default()
    });

    let workers: Vec<_> = (0..WORKERS)
        .map(|id| {
            let status = status.clone();
            thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || run_worker(id, &status))
                .context("spawning worker")
        })
        .collect::<Result<_>>()?;

    let frame = Duration::from_millis(settings.frame_interval_ms);
    let mut frames = 0u64;
    loop {
        let ran = main_loop.wait_and_pump(frame);
        frames += 1;

        let current = status
            .read()
            .map_err(|_| anyhow::anyhow!("status lock poisoned"))?;
        if ran > 0 {
            tracing::info!(frame = frames, ran, message = %current.message, completed = current.completed, "frame");
        }
        // Workers dispatch before they finish, so an empty queue after that
        // means every report has been applied.
        if workers.iter().all(|w| w.is_finished()) && main_loop.pending() == 0 {
            break;
        }
    }

    for worker in workers {
        worker
            .join()
            .map_err(|_| anyhow::anyhow!("worker thread panicked"))?;
    }
    main_loop.run_until_idle();
    main_loop.close();

    let status = status
        .read()
        .map_err(|_| anyhow::anyhow!("status lock poisoned"))?;
    tracing::info!(frames, completed = status.completed, last_error = ?status.last_error, "done");

    Ok(())
}

fn run_worker(id: usize, status: &onmain_core::Shared<Status>) {
    for step in 1..=STEPS {
        thread::sleep(Duration::from_millis(5 * (id as u64 + 1)));

        let on_main = status.set_on_main();
        on_main.set(field!(Status, message), format!("worker {id} finished step {step}"));
        on_main.update(field!(Status, completed), |n| *n += 1);
        // Only report errors that actually happened.
        on_main.set_if_some(field!(Status, last_error), flaky_step(id, step).map(Some));
    }
    tracing::debug!(worker = id, "worker done");
}

fn flaky_step(id: usize, step: u32) -> Option<String> {
    (id == 1 && step == 3).then(|| format!("worker {id} retried step {step}"))
}
