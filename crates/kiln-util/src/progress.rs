use std::io::Write;
use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

/// Colour of the label in a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// An action that changed something (bold green).
    Action,
    /// Informational, nothing changed (bold cyan).
    Info,
}

/// Print a Cargo-style status line to stderr: `  Downloading jetty-io-11.0.14.jar`
///
/// The label is right-padded to 12 characters.
pub fn status(tone: Tone, label: &str, message: &str) {
    let style = match tone {
        Tone::Action => Style::new().green().bold(),
        Tone::Info => Style::new().cyan().bold(),
    };
    let _ = writeln!(std::io::stderr(), "{:>12} {message}", style.apply_to(label));
}

/// Animated spinner for resolution steps of unknown length.
///
/// Finish it with [`ProgressBar::finish_and_clear`].
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
