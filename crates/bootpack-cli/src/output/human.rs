//! Human-readable output formatter with colors and styling.

use super::formatter::ElementKind;
use super::formatter::OutputFormatter;
use super::formatter::Resolution;
use super::formatter::SearchPathListing;
use super::formatter::VerificationReport;
use anyhow::Result;
use bootpack_core::Manifest;
use console::Term;
use console::style;

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

    fn format_size(bytes: usize) -> String {
        const KB: usize = 1024;
        const MB: usize = KB * 1024;

        if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn headline(&self, ok: bool, text: &str) {
        let line = match (self.use_colors, ok) {
            (true, true) => format!("{} {text}", style("✓").green().bold()),
            (true, false) => format!("{} {text}", style("✗").red().bold()),
            (false, _) => text.to_string(),
        };
        let _ = self.term.write_line(&line);
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_search_path(&self, listing: &SearchPathListing) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let _ = self.term.write_line(&format!(
            "Search path of {} (layout: {})",
            listing.archive, listing.layout
        ));
        if listing.elements.is_empty() {
            let _ = self
                .term
                .write_line("  (empty: every name falls through to the parent resolver)");
            return Ok(());
        }

        let width = listing
            .elements
            .iter()
            .map(|e| e.origin.len())
            .max()
            .unwrap_or(0);
        for element in &listing.elements {
            let detail = match element.kind {
                ElementKind::Directory => "module root".to_string(),
                ElementKind::Nested => format!("{} entries", element.entries),
            };
            let detail = if self.use_colors {
                style(detail).dim().to_string()
            } else {
                detail
            };
            let _ = self.term.write_line(&format!(
                "  {:>3}  {:<width$}  {detail}",
                element.position, element.origin
            ));
        }

        Ok(())
    }

    fn format_verification(&self, report: &VerificationReport) -> Result<()> {
        if self.quiet && report.passed() {
            return Ok(());
        }

        if report.passed() {
            self.headline(true, &format!("Verification passed: {}", report.archive));
        } else {
            self.headline(false, &format!("Verification failed: {}", report.archive));
        }

        let _ = self.term.write_line(&format!("  Layout:          {}", report.layout));
        let _ = self
            .term
            .write_line(&format!("  Nested archives: {}", report.nested_checked));
        if let Some(entry_point) = &report.entry_point {
            let _ = self
                .term
                .write_line(&format!("  Entry point:     {entry_point}"));
        }
        if self.verbose || report.entries_read > 0 {
            let _ = self
                .term
                .write_line(&format!("  Entries read:    {}", report.entries_read));
        }

        if !report.issues.is_empty() {
            let _ = self.term.write_line("");
            let _ = self.term.write_line("Issues:");
            for issue in &report.issues {
                let subject = if self.use_colors {
                    style(&issue.subject).red().to_string()
                } else {
                    issue.subject.clone()
                };
                let _ = self
                    .term
                    .write_line(&format!("  {subject}: {}", issue.message));
            }
        }

        Ok(())
    }

    fn format_resolution(&self, resolution: &Resolution) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let position = resolution
            .position
            .map_or_else(|| "parent".to_string(), |p| format!("position {p}"));
        let _ = self.term.write_line(&format!(
            "{} -> {} ({position}, {})",
            resolution.name,
            resolution.origin,
            Self::format_size(resolution.size)
        ));
        Ok(())
    }

    fn format_manifest(&self, archive: &str, manifest: &Manifest) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let _ = self.term.write_line(&format!("Launch metadata of {archive}"));
        let _ = self
            .term
            .write_line(&format!("  Entry point:     {}", manifest.entry_point));
        let _ = self
            .term
            .write_line(&format!("  Packaging:       {}", manifest.packaging));
        if let Some(index) = &manifest.classpath_index {
            let _ = self.term.write_line(&format!("  Classpath index: {index}"));
        }

        if self.verbose {
            let _ = self.term.write_line("");
            let _ = self.term.write_line("Attributes:");
            for (name, value) in manifest.attributes.iter() {
                let _ = self.term.write_line(&format!("  {name}: {value}"));
            }
        }

        Ok(())
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = term.write_line(&format!("Warning: {message}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(HumanFormatter::format_size(0), "0 B");
        assert_eq!(HumanFormatter::format_size(1023), "1023 B");
        assert_eq!(HumanFormatter::format_size(1536), "1.5 KB");
        assert_eq!(HumanFormatter::format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
