//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use crate::progress::humanize_bytes;
use crate::progress::humanize_duration;
use anyhow::Result;
use console::Term;
use console::style;
use unzipset_core::RunReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_run_result(&self, _operation: &str, report: &RunReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let headline = format!(
            "Extracted {} archive{}",
            report.jobs.len(),
            if report.jobs.len() == 1 { "" } else { "s" }
        );
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {headline}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(&headline);
        }

        let _ = self.term.write_line(&format!(
            "  Files copied:  {}",
            Self::format_number(report.files_copied())
        ));
        if report.files_skipped() > 0 {
            let _ = self.term.write_line(&format!(
                "  Files skipped: {}",
                Self::format_number(report.files_skipped())
            ));
        }
        let _ = self.term.write_line(&format!(
            "  Directories:   {}",
            Self::format_number(report.directories_created())
        ));
        let _ = self.term.write_line(&format!(
            "  Total size:    {}",
            humanize_bytes(report.bytes_written())
        ));

        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Mode:          {}",
                if report.parallel { "parallel" } else { "sequential" }
            ));
            let _ = self.term.write_line(&format!(
                "  Duration:      {}",
                humanize_duration(report.duration)
            ));
            for job in &report.jobs {
                let _ = self.term.write_line(&format!(
                    "  {} -> {}: {} copied, {} skipped ({})",
                    job.source_archive.display(),
                    job.destination.display(),
                    job.files_copied,
                    job.files_skipped,
                    humanize_duration(job.duration)
                ));
            }
        }

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(999), "999");
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }
}
