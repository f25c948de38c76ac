//! Output formatting for journey results

use console::{style, Term};
use verificar::SuiteResults;

/// Console reporter honoring quiet mode and color choice
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            use_color,
            quiet,
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let mark = if self.use_color {
            style("✓").green().to_string()
        } else {
            "OK".to_string()
        };
        let _ = self.term.write_line(&format!("{mark} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        let mark = if self.use_color {
            style("✗").red().to_string()
        } else {
            "FAIL".to_string()
        };
        let _ = self.term.write_line(&format!("{mark} {message}"));
    }

    /// Print an informational line
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let _ = self.term.write_line(message);
    }

    /// Print a suite summary
    pub fn summary(&self, results: &SuiteResults) {
        if self.quiet && results.all_passed() {
            return;
        }
        let line = format!(
            "{}: {} passed, {} failed ({:.1}s)",
            results.suite_name,
            results.passed_count(),
            results.failed_count(),
            results.duration.as_secs_f64()
        );
        if results.all_passed() {
            self.success(&line);
        } else {
            self.failure(&line);
            for failed in results.failures() {
                self.failure(&format!(
                    "  {}: {}",
                    failed.name,
                    failed.error.as_deref().unwrap_or("unknown")
                ));
            }
        }
    }
}
