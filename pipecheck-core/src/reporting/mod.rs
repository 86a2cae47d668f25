use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

use crate::runner::InvocationResult;
use crate::suite::{CaseOutcome, CaseStatus, SuiteSummary, TestCase};

/// Suite start metadata.
#[derive(Clone, Debug)]
pub struct SuiteStartInfo {
    pub total_cases: usize,
    pub interpreter: Option<String>,
    pub timeout: Option<Duration>,
}

/// High-level warning/error message.
#[derive(Clone, Debug)]
pub struct ReporterError {
    pub title: String,
    pub message: String,
    pub context: Option<String>,
    pub suggestion: Option<String>,
}

/// Reporter interface implemented by both human-readable and JSON reporters.
pub trait Reporter: Send + Sync {
    fn suite_started(&self, _info: &SuiteStartInfo) {}
    fn case_started(&self, _case: &TestCase, _index: usize, _total: usize) {}
    fn case_finished(&self, _outcome: &CaseOutcome) {}
    fn suite_complete(&self, _summary: &SuiteSummary) {}
    fn invocation_complete(&self, _command: &str, _result: &InvocationResult) {}
    fn warning(&self, _message: &str) {}
    fn error(&self, _error: &ReporterError) {}
}

/// No-op reporter that discards all updates.
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Human-friendly reporter that prints concise text output.
pub struct TerminalReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn finish_spinner(&self) {
        if let Ok(mut guard) = self.spinner.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl Reporter for TerminalReporter {
    fn suite_started(&self, info: &SuiteStartInfo) {
        println!("\n{}", style("PIPELINE EDGE CASES").bold().cyan());
        println!("  {:<12} {}", style("Cases:").bold(), info.total_cases);
        println!(
            "  {:<12} {}",
            style("Interpreter:").bold(),
            info.interpreter.as_deref().unwrap_or("none (direct exec)")
        );
        println!(
            "  {:<12} {}",
            style("Timeout:").bold(),
            info.timeout
                .map(|t| format!("{}s", t.as_secs()))
                .unwrap_or_else(|| "none".to_string())
        );
        println!();
    }

    fn case_started(&self, case: &TestCase, index: usize, total: usize) {
        self.finish_spinner();
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(format!("[{}/{}] {}", index, total, case.name));
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut guard) = self.spinner.lock() {
            *guard = Some(pb);
        }
    }

    fn case_finished(&self, outcome: &CaseOutcome) {
        self.finish_spinner();
        let styled_status = match &outcome.status {
            CaseStatus::Passed => style("ok").green(),
            CaseStatus::Failed { .. } => style("FAILED").red().bold(),
            CaseStatus::LaunchFailed { .. } => style("LAUNCH FAILED").red().bold(),
            CaseStatus::TimedOut { .. } => style("TIMED OUT").yellow().bold(),
        };
        let elapsed = outcome
            .result
            .as_ref()
            .map(|r| format!(" ({:.2}s)", r.duration.as_secs_f64()))
            .unwrap_or_default();
        println!("  {} ... {}{}", outcome.name, styled_status, elapsed);
        if let Some(reason) = outcome.status.reason() {
            println!("      {}", style(reason).dim());
        }
    }

    fn suite_complete(&self, summary: &SuiteSummary) {
        self.finish_spinner();
        println!("\n{}", style("SUMMARY").bold().cyan());
        let headline = format!("{} of {} passed", summary.passed, summary.total);
        if summary.is_success() {
            println!("  {}", style(headline).green().bold());
        } else {
            println!("  {}", style(headline).red().bold());
        }
        println!(
            "  Failed: {}, launch failures: {}, timeouts: {}",
            summary.failed, summary.launch_failures, summary.timeouts
        );
        println!("  Time: {:.2}s", summary.duration.as_secs_f64());
    }

    fn invocation_complete(&self, command: &str, result: &InvocationResult) {
        println!("\n{}", style("INVOCATION").bold().cyan());
        println!("  {:<9} {}", style("Command:").bold(), command);
        println!("  {:<9} {}", style("Status:").bold(), result.describe_exit());
        println!(
            "  {:<9} {:.2}s",
            style("Time:").bold(),
            result.duration.as_secs_f64()
        );
        println!("\n{}", style("STDOUT").bold());
        print!("{}", result.stdout);
        println!("\n{}", style("STDERR").bold());
        print!("{}", result.stderr);
        let _ = io::stdout().flush();
    }

    fn warning(&self, message: &str) {
        self.finish_spinner();
        println!("\n{}", style(format!("WARN: {}", message)).yellow().bold());
    }

    fn error(&self, error: &ReporterError) {
        self.finish_spinner();
        eprintln!(
            "\n{} {}",
            style("ERROR").red().bold(),
            style(&error.title).red().bold()
        );
        eprintln!("  {}", error.message);
        if let Some(ctx) = &error.context {
            eprintln!("  Context: {}", ctx);
        }
        if let Some(suggestion) = &error.suggestion {
            eprintln!("  Suggestion: {}", suggestion);
        }
    }
}

/// Line-delimited JSON reporter for scripted consumers.
pub struct JsonReporter {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    fn timestamp() -> String {
        chrono::Utc::now().to_rfc3339()
    }

    fn write_value(&self, value: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", value);
            let _ = writer.flush();
        }
    }
}

impl Reporter for JsonReporter {
    fn suite_started(&self, info: &SuiteStartInfo) {
        let value = json!({
            "type": "suite_started",
            "total_cases": info.total_cases,
            "interpreter": info.interpreter,
            "timeout_seconds": info.timeout.map(|t| t.as_secs()),
            "timestamp": Self::timestamp(),
        });
        self.write_value(value);
    }

    fn case_started(&self, case: &TestCase, index: usize, total: usize) {
        let value = json!({
            "type": "case_started",
            "name": case.name,
            "pipeline": case.pipeline,
            "script": case.script.to_string_lossy(),
            "args": case.args,
            "index": index,
            "total": total,
            "timestamp": Self::timestamp(),
        });
        self.write_value(value);
    }

    fn case_finished(&self, outcome: &CaseOutcome) {
        let mut value = json!({
            "type": "case_finished",
            "timestamp": Self::timestamp(),
        });
        if let (Some(map), Ok(serde_json::Value::Object(fields))) =
            (value.as_object_mut(), serde_json::to_value(outcome))
        {
            map.extend(fields);
        }
        self.write_value(value);
    }

    fn suite_complete(&self, summary: &SuiteSummary) {
        let value = json!({
            "type": "suite_complete",
            "total": summary.total,
            "passed": summary.passed,
            "failed": summary.failed,
            "launch_failures": summary.launch_failures,
            "timeouts": summary.timeouts,
            "success": summary.is_success(),
            "duration_seconds": summary.duration.as_secs_f64(),
            "timestamp": Self::timestamp(),
        });
        self.write_value(value);
    }

    fn invocation_complete(&self, command: &str, result: &InvocationResult) {
        let value = json!({
            "type": "invocation",
            "command": command,
            "exit_code": result.exit_code,
            "stdout": result.stdout,
            "stderr": result.stderr,
            "duration_seconds": result.duration.as_secs_f64(),
            "timestamp": Self::timestamp(),
        });
        self.write_value(value);
    }

    fn warning(&self, message: &str) {
        let value = json!({
            "type": "warning",
            "message": message,
            "timestamp": Self::timestamp(),
        });
        self.write_value(value);
    }

    fn error(&self, error: &ReporterError) {
        let value = json!({
            "type": "error",
            "title": error.title,
            "message": error.message,
            "context": error.context,
            "suggestion": error.suggestion,
            "timestamp": Self::timestamp(),
        });
        self.write_value(value);
    }
}
