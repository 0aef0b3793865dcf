//! Spinner shown while waiting on the remote model

use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

pub async fn with_spinner<F: Future>(message: &str, future: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));

    let output = future.await;
    spinner.finish_and_clear();
    output
}
