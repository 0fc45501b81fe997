use std::{
    collections::HashMap,
    path::Path,
    sync::{mpsc::Receiver, Arc, LazyLock},
    thread::JoinHandle,
    time::Duration,
};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use nu_ansi_term::Color::{Cyan, Green, Red};
use pkgidx_events::{IndexEvent, OperationId};

use crate::utils::Colored;

/// Shared MultiProgress instance for suspend/stop from other modules.
static MULTI: LazyLock<Arc<MultiProgress>> = LazyLock::new(|| Arc::new(MultiProgress::new()));

/// Pause progress display, run the closure, then resume.
pub fn suspend<F: FnOnce()>(f: F) {
    MULTI.suspend(f);
}

/// Stop and clear all progress bars.
pub fn stop() {
    MULTI.clear().ok();
}

/// Owns the background progress thread.
///
/// The [`IndexContext`](pkgidx_operations::IndexContext) holding the channel
/// sender must be dropped before [`finish`](ProgressGuard::finish), otherwise
/// the thread keeps waiting for events.
pub struct ProgressGuard {
    handle: Option<JoinHandle<()>>,
}

impl ProgressGuard {
    pub fn finish(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

fn download_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.cyan} {prefix}  {wide_bar:.cyan/dim}  {bytes}/{total_bytes}  {bytes_per_sec}  {eta}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━━─")
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// Last three path components, e.g. `main/binary-amd64/Packages`.
fn short_path(path: &Path) -> String {
    let parts: Vec<_> = path
        .components()
        .rev()
        .take(3)
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.into_iter().rev().collect::<Vec<_>>().join("/")
}

/// Spawns a thread that turns [`IndexEvent`]s into progress bars: one
/// download bar per fetch and a single spinner for batch progress.
pub fn spawn_event_handler(receiver: Receiver<IndexEvent>) -> ProgressGuard {
    let handle = std::thread::spawn(move || {
        let mut fetches: HashMap<OperationId, ProgressBar> = HashMap::new();
        let mut batch_job: Option<ProgressBar> = None;

        while let Ok(event) = receiver.recv() {
            match event {
                IndexEvent::FetchStarting {
                    op_id,
                    target,
                    ..
                } => {
                    let pb = MULTI.add(ProgressBar::new(0));
                    pb.set_style(download_style());
                    pb.set_prefix(Colored(Cyan, short_path(&target)).to_string());
                    pb.enable_steady_tick(Duration::from_millis(100));
                    fetches.insert(op_id, pb);
                }
                IndexEvent::FetchProgress {
                    op_id,
                    current,
                    total,
                } => {
                    if let Some(pb) = fetches.get(&op_id) {
                        if total > 0 {
                            pb.set_length(total);
                        }
                        pb.set_position(current);
                    }
                }
                IndexEvent::FetchComplete {
                    op_id,
                    target,
                    ..
                } => {
                    if let Some(pb) = fetches.remove(&op_id) {
                        pb.finish_and_clear();
                    }
                    MULTI.suspend(|| {
                        eprintln!(" {} {}", Colored(Green, "✓"), short_path(&target));
                    });
                }
                IndexEvent::FetchFailed {
                    op_id,
                    url,
                    error,
                } => {
                    if let Some(pb) = fetches.remove(&op_id) {
                        pb.finish_and_clear();
                    }
                    MULTI.suspend(|| {
                        eprintln!(" {} {}: {}", Colored(Red, "✗"), url, Colored(Red, &error));
                    });
                }

                IndexEvent::BatchProgress {
                    completed,
                    total,
                    failed,
                } => {
                    let fail_msg = if failed > 0 {
                        format!(" ({failed} failed)")
                    } else {
                        String::new()
                    };
                    let pb = batch_job.get_or_insert_with(|| {
                        let pb = MULTI.add(ProgressBar::new_spinner());
                        pb.set_style(spinner_style());
                        pb.enable_steady_tick(Duration::from_millis(100));
                        pb
                    });
                    pb.set_message(format!("Progress: {completed}/{total}{fail_msg}"));
                }

                _ => {}
            }
        }

        if let Some(pb) = batch_job.take() {
            pb.finish_and_clear();
        }
        for (_, pb) in fetches {
            pb.finish_and_clear();
        }
    });

    ProgressGuard {
        handle: Some(handle),
    }
}
