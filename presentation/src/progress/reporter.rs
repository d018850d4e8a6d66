//! Progress reporting for expired-voting sweeps

use colored::Colorize;
use consensus_application::SweepProgress;
use consensus_domain::{ConfigurationId, FinalResult, RuleId};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Reports sweep progress with a spinner
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock()
            && let Some(bar) = guard.as_ref()
        {
            f(bar);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepProgress for ProgressReporter {
    fn on_sweep_start(&self, expired_configurations: usize) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(Self::spinner_style());
        bar.set_prefix("Sweep");
        bar.set_message(format!(
            "{} expired voting round(s)",
            expired_configurations
        ));
        bar.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut guard) = self.bar.lock() {
            *guard = Some(bar);
        }
    }

    fn on_configuration_closed(&self, id: ConfigurationId) {
        self.with_bar(|bar| {
            bar.println(format!("  {} closed voting {}", "v".green(), id));
            bar.set_message(format!("closed voting {}", id));
        });
    }

    fn on_rule_finalized(&self, id: RuleId, result: Option<FinalResult>) {
        self.with_bar(|bar| {
            let line = match result {
                Some(FinalResult::Approved) => format!("  {} rule {} approved", "v".green(), id),
                Some(FinalResult::Rejected) => format!("  {} rule {} rejected", "v".green(), id),
                None => format!("  {} rule {} failed", "x".red(), id),
            };
            bar.println(line);
            bar.set_message(format!("finalized rule {}", id));
        });
    }

    fn on_sweep_complete(&self) {
        if let Ok(mut guard) = self.bar.lock()
            && let Some(bar) = guard.take()
        {
            bar.finish_and_clear();
        }
    }
}

/// Line-per-event progress on stderr, for logs and pipes where a spinner
/// would only produce control characters
pub struct SimpleProgress;

impl SimpleProgress {
    fn start_line(expired_configurations: usize) -> String {
        format!(
            "{} {} ({} expired)",
            "->".cyan(),
            "Sweeping voting rounds".bold(),
            expired_configurations
        )
    }

    fn closed_line(id: ConfigurationId) -> String {
        format!("  {} closed voting {}", "v".green(), id)
    }

    fn rule_line(id: RuleId, result: Option<FinalResult>) -> String {
        match result {
            Some(result) => format!("  {} rule {} {}", "v".green(), id, result),
            None => format!("  {} rule {} (failed)", "x".red(), id),
        }
    }
}

impl SweepProgress for SimpleProgress {
    fn on_sweep_start(&self, expired_configurations: usize) {
        eprintln!("{}", Self::start_line(expired_configurations));
    }

    fn on_configuration_closed(&self, id: ConfigurationId) {
        eprintln!("{}", Self::closed_line(id));
    }

    fn on_rule_finalized(&self, id: RuleId, result: Option<FinalResult>) {
        eprintln!("{}", Self::rule_line(id, result));
    }
}
