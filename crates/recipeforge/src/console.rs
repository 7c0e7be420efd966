//! Colorful console output for matching runs.
//!
//! Provides a custom `tracing` layer that formats engine events with colors.
//! Initialized by the entry points when the `console` feature is enabled.

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();

/// Initializes the console output.
///
/// Safe to call multiple times - only the first call has effect. Does
/// nothing else if another global subscriber is already installed.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let mut filter = EnvFilter::from_default_env();
        if let Ok(directive) = "recipeforge_solver=info".parse() {
            filter = filter.add_directive(directive);
        }

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(MatchConsoleLayer)
            .try_init();
    });
}

fn print_banner() {
    let version_line = format!(
        "RecipeForge v{} - recipe-to-resource matching\n",
        env!("CARGO_PKG_VERSION")
    );

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats engine events with colors.
pub struct MatchConsoleLayer;

impl<S: Subscriber> Layer<S> for MatchConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let target = event.metadata().target();

        // Only handle engine events
        if !target.starts_with("recipeforge_solver") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_match_event(&visitor);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    mode: Option<String>,
    status: Option<String>,
    reason: Option<String>,
    error: Option<String>,
    steps: Option<u64>,
    resources: Option<u64>,
    solutions: Option<u64>,
    solution_id: Option<u64>,
    variables: Option<u64>,
    clauses: Option<u64>,
    decisions: Option<u64>,
    elapsed_ms: Option<u64>,
    truncated: Option<bool>,
}

impl EventVisitor {
    fn set_text(&mut self, name: &str, value: String) {
        match name {
            "event" => self.event = Some(value),
            "mode" => self.mode = Some(value),
            "status" => self.status = Some(value),
            "reason" => self.reason = Some(value),
            "error" => self.error = Some(value),
            _ => {}
        }
    }
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        self.set_text(field.name(), s.trim_matches('"').to_string());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set_text(field.name(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "steps" => self.steps = Some(value),
            "resources" => self.resources = Some(value),
            "solutions" => self.solutions = Some(value),
            "solution_id" => self.solution_id = Some(value),
            "variables" => self.variables = Some(value),
            "clauses" => self.clauses = Some(value),
            "decisions" => self.decisions = Some(value),
            "elapsed_ms" => self.elapsed_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "truncated" {
            self.truncated = Some(value);
        }
    }
}

fn format_match_event(v: &EventVisitor) -> String {
    match v.event.as_deref().unwrap_or("") {
        "match_start" => format_match_start(v),
        "solution_found" => format_solution_found(v),
        "infeasible" => format_infeasible(v),
        "attempt_limit_reached" => format_limit(v),
        "solver_fault" => format_fault(v),
        "match_end" => format_match_end(v),
        _ => String::new(),
    }
}

fn format_match_start(v: &EventVisitor) -> String {
    let steps = v.steps.unwrap_or(0);
    let resources = v.resources.unwrap_or(0);

    format!(
        "{} {} {} {} mode, step count ({}), resource count ({}), problem scale ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Matcher]".bright_cyan(),
        v.mode.as_deref().unwrap_or("?").white().bold(),
        steps.to_formatted_string(&Locale::en).bright_yellow(),
        resources.to_formatted_string(&Locale::en).bright_yellow(),
        problem_scale(steps as usize, resources as usize).bright_magenta()
    )
}

fn format_solution_found(v: &EventVisitor) -> String {
    format!(
        "    {} Solution {:>7}",
        "->".bright_blue(),
        v.solution_id
            .unwrap_or(0)
            .to_formatted_string(&Locale::en)
            .white()
    )
}

fn format_infeasible(v: &EventVisitor) -> String {
    format!(
        "{} {} {} Infeasible: {}",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Matcher]".bright_cyan(),
        v.reason.as_deref().unwrap_or("unknown").bright_red()
    )
}

fn format_limit(v: &EventVisitor) -> String {
    format!(
        "{} {} {} Attempt limit reached after {} solutions",
        timestamp().bright_black(),
        "WARN".yellow(),
        "[Matcher]".bright_cyan(),
        v.solutions
            .unwrap_or(0)
            .to_formatted_string(&Locale::en)
            .bright_yellow()
    )
}

fn format_fault(v: &EventVisitor) -> String {
    format!(
        "{} {} {} Solver fault: {} ({} variables, {} clauses)",
        timestamp().bright_black(),
        "ERROR".bright_red(),
        "[Matcher]".bright_cyan(),
        v.reason.as_deref().unwrap_or("unknown"),
        v.variables.unwrap_or(0).to_formatted_string(&Locale::en),
        v.clauses.unwrap_or(0).to_formatted_string(&Locale::en)
    )
}

fn format_match_end(v: &EventVisitor) -> String {
    let status = v.status.as_deref().unwrap_or("UNKNOWN");
    let solutions = v.solutions.unwrap_or(0);

    let mut output = format!(
        "{} {} {} Matching ended: time spent ({}), decisions ({})",
        timestamp().bright_black(),
        "INFO".bright_green(),
        "[Matcher]".bright_cyan(),
        format_duration_ms(v.elapsed_ms.unwrap_or(0)).yellow(),
        v.decisions
            .unwrap_or(0)
            .to_formatted_string(&Locale::en)
            .white()
    );
    if let Some(error) = &v.error {
        output.push_str(&format!(" {}", error.bright_red()));
    }

    output.push_str("\n\n");
    output.push_str(
        &"╔══════════════════════════════════════════════════════════╗"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    let status_text = match status {
        "SOLVED" if v.truncated == Some(true) => "SOLVED (attempt limit reached)",
        "SOLVED" => "SOLVED",
        "INFEASIBLE" => "INFEASIBLE",
        "CANCELLED" => "CANCELLED",
        _ => "FAILED",
    };
    let status_colored = match status {
        "SOLVED" => format!("  {}  ", status_text).bright_green().bold().to_string(),
        "CANCELLED" => format!("  {}  ", status_text).yellow().bold().to_string(),
        _ => format!("  {}  ", status_text).bright_red().bold().to_string(),
    };
    let status_padding = 56 - status_text.len() - 4;
    let left_pad = status_padding / 2;
    let right_pad = status_padding - left_pad;
    output.push_str(&format!(
        "{}{}{}{}{}",
        "║".bright_cyan(),
        " ".repeat(left_pad),
        status_colored,
        " ".repeat(right_pad),
        "║".bright_cyan()
    ));
    output.push('\n');

    output.push_str(
        &"╠══════════════════════════════════════════════════════════╣"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');
    output.push_str(&format!(
        "{}  {:<18}{:>36}  {}",
        "║".bright_cyan(),
        "Solutions:",
        solutions.to_formatted_string(&Locale::en),
        "║".bright_cyan()
    ));
    output.push('\n');
    output.push_str(
        &"╚══════════════════════════════════════════════════════════╝"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    output
}

fn timestamp() -> String {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs() % 100000;
            let millis = d.subsec_millis();
            format!("{:5}.{:03}", secs, millis)
        })
        .unwrap_or_else(|_| "    0.000".to_string())
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

/// Upper bound on the assignment count, `resources ^ steps`.
fn problem_scale(steps: usize, resources: usize) -> String {
    if steps == 0 || resources == 0 {
        return "0".to_string();
    }

    let log_scale = (steps as f64) * (resources as f64).log10();
    let exponent = log_scale.floor() as i32;
    let mantissa = 10f64.powf(log_scale - exponent as f64);

    format!("{:.3} x 10^{}", mantissa, exponent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_scale() {
        assert_eq!(problem_scale(0, 5), "0");
        assert_eq!(problem_scale(2, 10), "1.000 x 10^2");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration_ms(250), "250ms");
        assert_eq!(format_duration_ms(1500), "1.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_unknown_event_is_silent() {
        let visitor = EventVisitor {
            event: Some("encoded".to_string()),
            ..EventVisitor::default()
        };
        assert!(format_match_event(&visitor).is_empty());
    }

    #[test]
    fn test_match_end_box() {
        let visitor = EventVisitor {
            event: Some("match_end".to_string()),
            status: Some("SOLVED".to_string()),
            solutions: Some(1234),
            ..EventVisitor::default()
        };
        let output = format_match_end(&visitor);
        assert!(output.contains("SOLVED"));
        assert!(output.contains("1,234"));
    }
}
