// Mon Oct 19 2026 - Alex

use indicatif::{ProgressBar as IndicatifBar, ProgressDrawTarget, ProgressStyle};

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Signature-run progress. Hidden bars still count, they just never draw.
#[derive(Clone)]
pub struct ProgressBar {
    bar: IndicatifBar,
}

impl ProgressBar {
    pub fn new(total: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ ");

        let bar = IndicatifBar::new(total);
        bar.set_style(style);
        Self { bar }
    }

    pub fn hidden(total: u64) -> Self {
        let progress = Self::new(total);
        progress.bar.set_draw_target(ProgressDrawTarget::hidden());
        progress
    }

    pub fn with_message(self, message: &str) -> Self {
        self.bar.set_message(message.to_string());
        self
    }

    pub fn increment(&self, delta: u64) {
        self.bar.inc(delta);
    }

    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish_with_message(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_bar_counts() {
        let bar = ProgressBar::hidden(3).with_message("scanning");
        bar.increment(1);
        bar.increment(2);
        assert_eq!(bar.position(), 3);
        bar.finish_with_message("done");
    }
}
