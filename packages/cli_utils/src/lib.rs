#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the extracto toolchain.
//!
//! Provides an `indicatif`-backed progress bar behind the
//! [`ProgressCallback`] trait, plus [`init_logger`] which sets up
//! `indicatif-log-bridge` so that `log::info!` and friends are suspended
//! while progress bars redraw.

use std::sync::Arc;
use std::time::Duration;

use extracto_convert::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Page progress rendered as an `indicatif` [`ProgressBar`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Bar style used once the page count is known.
    page_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Creates a page progress bar. It starts as a spinner while the PDF
    /// is opened and becomes a bar with percentage/ETA once
    /// [`ProgressCallback::set_total()`] reports the page count.
    #[must_use]
    pub fn pages_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        let spinner = ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let page_style =
            ProgressStyle::with_template("  {msg} {bar:40.green/dim} page {pos}/{len} [{eta}]")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-");

        let bar = multi.add(ProgressBar::new_spinner().with_style(spinner));
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_message(message.to_owned());

        Arc::new(Self { bar, page_style })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_style(self.page_style.clone());
        self.bar.set_length(total);
        self.bar.reset_eta();
    }

    fn set_position(&self, pos: u64) {
        self.bar.set_position(pos);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }
}

/// Installs `pretty_env_logger` behind `indicatif-log-bridge`, so log
/// lines are printed above the progress bars instead of through them.
///
/// The level is `info` unless `RUST_LOG` overrides it. Progress bars must
/// be added to the returned [`MultiProgress`].
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Already set in tests

    log::set_max_level(level);

    multi
}
