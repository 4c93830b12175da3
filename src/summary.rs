//! End-of-run summary.
use std::path::Path;

use crate::logging::{Log, TaskEntry, TaskStatus};
use crate::registry::Outcome;

/// Everything a run wants to tell the operator at the end.
///
/// Built incrementally by tasks and printed once by the install command,
/// whether the run completed or stopped at the first failure.
#[derive(Debug, Default)]
pub struct RunSummary {
    tasks: Vec<TaskEntry>,
    tools: Vec<(String, Outcome)>,
    not_applicable: Vec<String>,
    warnings: Vec<String>,
    notes: Vec<String>,
}

impl RunSummary {
    /// Record the final status of a task.
    pub fn record_task(&mut self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.tasks.push(TaskEntry {
            name: name.to_string(),
            status,
            message: message.map(String::from),
        });
    }

    /// Record the outcome of ensuring a tool.
    pub fn record_tool(&mut self, name: &str, outcome: Outcome) {
        self.tools.push((name.to_string(), outcome));
    }

    /// Record a tool that does not apply to the current platform.
    pub fn record_not_applicable(&mut self, name: &str) {
        self.not_applicable.push(name.to_string());
    }

    /// Record a recoverable problem.
    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Record a manual follow-up action for the operator.
    pub fn note(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        if !self.notes.contains(&msg) {
            self.notes.push(msg);
        }
    }

    /// Recorded task statuses, in execution order.
    #[must_use]
    pub fn tasks(&self) -> &[TaskEntry] {
        &self.tasks
    }

    /// Recorded tool outcomes, in execution order.
    #[must_use]
    pub fn tools(&self) -> &[(String, Outcome)] {
        &self.tools
    }

    /// Outcome recorded for `name`, if it was ensured.
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<Outcome> {
        self.tools
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, o)| *o)
    }

    /// Tools skipped as not applicable to the platform.
    #[must_use]
    pub fn not_applicable(&self) -> &[String] {
        &self.not_applicable
    }

    /// Recorded warnings.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Recorded manual follow-up notes.
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Number of tasks that failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .count()
    }

    fn tools_with(&self, outcome: Outcome) -> Vec<&str> {
        self.tools
            .iter()
            .filter(|(_, o)| *o == outcome)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Print the summary through `log`.
    pub fn print(&self, log: &dyn Log, log_path: Option<&Path>) {
        log.stage("Summary");

        for task in &self.tasks {
            let (icon, color) = match task.status {
                TaskStatus::Ok => ("✓", "\x1b[32m"),
                TaskStatus::NotApplicable => ("·", "\x1b[2m"),
                TaskStatus::Skipped => ("○", "\x1b[33m"),
                TaskStatus::DryRun => ("~", "\x1b[37m"),
                TaskStatus::Failed => ("✗", "\x1b[31m"),
            };
            let suffix = task
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            log.info(&format!("{color}{icon} {}{suffix}\x1b[0m", task.name));
        }

        for (label, outcome) in [
            ("installed", Outcome::Installed),
            ("already present", Outcome::AlreadyPresent),
            ("would install", Outcome::DryRun),
            ("unsupported", Outcome::Unsupported),
        ] {
            let names = self.tools_with(outcome);
            if !names.is_empty() {
                log.info(&format!("{label}: {}", names.join(", ")));
            }
        }
        if !self.not_applicable.is_empty() {
            log.info(&format!(
                "\x1b[2mnot applicable: {}\x1b[0m",
                self.not_applicable.join(", ")
            ));
        }

        for warning in &self.warnings {
            log.warn(warning);
        }

        if !self.notes.is_empty() {
            log.stage("Manual follow-up");
            for note in &self.notes {
                log.info(&format!("- {note}"));
            }
        }

        if let Some(path) = log_path {
            log.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}
