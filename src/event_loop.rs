//! Async front ends driving a [`Studio`]: the interactive terminal loop and
//! the one-shot snapshot.

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::camera::MediaDevices;
use crate::exporter::ExportError;
use crate::input::{apply_control, control_for_key, Control};
use crate::preview::{render_line, render_preview};
use crate::studio::Studio;
use crate::sync::lock;
use crate::terminal::TerminalGuard;

/// Preview refresh interval (~15 FPS is plenty for a terminal)
const PREVIEW_INTERVAL: Duration = Duration::from_millis(67);

/// Global flag for handling Ctrl+C across the application
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Check if Ctrl+C has been received.
pub fn ctrlc_received() -> bool {
    CTRLC_RECEIVED.load(Ordering::SeqCst)
}

/// Set up the Ctrl+C handler.
///
/// This should be called once at program startup.
pub fn setup_ctrlc_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        CTRLC_RECEIVED.store(true, Ordering::SeqCst);
    })
}

/// One-line summary of the studio state for the status bar.
pub fn status_line<D: MediaDevices>(studio: &Studio<D>) -> String {
    if !studio.is_streaming() {
        return "○ idle | space: start stream | q: quit".to_string();
    }

    let device = studio
        .active_device()
        .or(studio.selected_device())
        .unwrap_or("default");
    let source = if studio.has_stream() {
        format!("device {}", device)
    } else {
        match studio.last_error() {
            Some(e) => format!("no stream ({})", e),
            None => "no stream".to_string(),
        }
    };

    let view = studio.view();
    format!(
        "● {} | filter: {} | zoom: {:.2}x | frames: {}",
        source,
        view.filter,
        view.zoom_in_scale,
        studio.frames_drawn()
    )
}

const KEY_HELP: &str = "space: release | +/-: zoom | 1/2/3: original/grayscale/blur | d: camera | s: save | q: quit";

/// Run the interactive studio until the user quits.
pub async fn run<D: MediaDevices>(
    studio: &mut Studio<D>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut guard = TerminalGuard::enter()?;
    let mut stdout = std::io::stdout();
    let mut event_stream = EventStream::new();

    let mut preview_interval = tokio::time::interval(PREVIEW_INTERVAL);
    preview_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let (mut term_cols, mut term_rows) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut message = String::new();

    loop {
        if ctrlc_received() {
            break;
        }

        tokio::select! {
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        let Some(control) = control_for_key(key_event) else {
                            continue;
                        };
                        match control {
                            Control::Quit => break,
                            Control::Save if studio.is_streaming() => {
                                message = match studio.export().await {
                                    Ok(path) => format!("saved {}", path.display()),
                                    Err(e) => format!("save failed: {}", e),
                                };
                            }
                            other => {
                                if apply_control(studio, other) {
                                    message.clear();
                                }
                            }
                        }
                    }
                    Some(Ok(Event::Resize(cols, rows))) => {
                        term_cols = cols;
                        term_rows = rows;
                        crossterm::execute!(
                            stdout,
                            crossterm::terminal::Clear(crossterm::terminal::ClearType::All)
                        )?;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        return Err(e.into());
                    }
                    None => break,
                }
            }

            _ = preview_interval.tick() => {
                // Two rows are reserved for status and key help
                let preview_rows = term_rows.saturating_sub(2);
                let snapshot = lock(&studio.canvas()).image().clone();
                render_preview(&mut stdout, &snapshot, term_cols, preview_rows)?;

                let mut status = status_line(studio);
                if !message.is_empty() {
                    status.push_str(" | ");
                    status.push_str(&message);
                }
                render_line(&mut stdout, preview_rows, &status)?;
                let help = if studio.is_streaming() { KEY_HELP } else { "" };
                render_line(&mut stdout, preview_rows + 1, help)?;
                stdout.flush()?;
            }
        }
    }

    studio.shutdown();
    guard.exit();
    Ok(())
}

/// Errors from a one-shot snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Camera unavailable: {0}")]
    Camera(String),

    #[error("Interrupted")]
    Interrupted,

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Start streaming, let the render loop settle for `warmup`, export one frame.
pub async fn snapshot<D: MediaDevices>(
    studio: &mut Studio<D>,
    warmup: Duration,
) -> Result<PathBuf, SnapshotError> {
    studio.refresh_devices();
    studio.set_streaming(true);

    if !studio.has_stream() {
        let reason = studio
            .last_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no stream".to_string());
        studio.shutdown();
        return Err(SnapshotError::Camera(reason));
    }

    let deadline = tokio::time::Instant::now() + warmup;
    while tokio::time::Instant::now() < deadline {
        if ctrlc_received() {
            studio.shutdown();
            return Err(SnapshotError::Interrupted);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    let result = studio.export().await;
    studio.shutdown();
    Ok(result?)
}
