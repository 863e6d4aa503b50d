//! Terminal feedback while the catalog loads.
//!
//! `--log-only` hides the spinner so output stays readable when piped.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

static SPINNER_HIDDEN: AtomicBool = AtomicBool::new(false);

pub fn hide_spinners(hidden: bool) {
    SPINNER_HIDDEN.store(hidden, Ordering::Relaxed);
}

pub fn spinners_hidden() -> bool {
    SPINNER_HIDDEN.load(Ordering::Relaxed)
}

/// "250ms" below a second, "2.5s" above.
pub fn format_elapsed(d: Duration) -> String {
    if d < Duration::from_secs(1) {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

/// Spinner shown while a catalog file is parsed and scaled.
pub struct CatalogSpinner {
    bar: ProgressBar,
    started: Instant,
}

impl CatalogSpinner {
    pub fn start(path: &Path) -> Self {
        let bar = ProgressBar::new_spinner();
        if spinners_hidden() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else {
            let style = ProgressStyle::with_template("{spinner} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            bar.set_style(style);
            bar.enable_steady_tick(Duration::from_millis(80));
        }
        bar.set_message(format!("Reading {}", path.display()));
        Self {
            bar,
            started: Instant::now(),
        }
    }

    pub fn loaded(self, tracks: usize) {
        let msg = format!(
            "{} tracks ready in {}",
            tracks,
            format_elapsed(self.started.elapsed())
        );
        self.bar.finish_with_message(msg);
    }

    /// Clear the line so the error report starts clean.
    pub fn failed(self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(250)), "250ms");
        assert_eq!(format_elapsed(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_elapsed(Duration::from_secs(1)), "1.0s");
    }

    #[test]
    fn test_hidden_spinner_finishes() {
        hide_spinners(true);
        assert!(spinners_hidden());
        let spinner = CatalogSpinner::start(Path::new("tracks.csv"));
        assert!(spinner.bar.is_hidden());
        spinner.loaded(3);
        CatalogSpinner::start(Path::new("tracks.csv")).failed();
    }
}
