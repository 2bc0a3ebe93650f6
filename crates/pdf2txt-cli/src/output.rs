use std::io::Write;
use std::path::Path;

use owo_colors::OwoColorize;
use pdf2txt_core::{BatchEvent, BatchSummary, JobOutcome};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print one batch event as soon as it happens.
pub fn print_event(w: &mut dyn Write, event: &BatchEvent, color: ColorMode) -> std::io::Result<()> {
    match event {
        BatchEvent::Started { input, pages } => print_started(w, input, *pages),
        BatchEvent::Finished(outcome) => print_outcome(w, outcome, color),
    }
}

/// Announce a document before its pages are extracted.
pub fn print_started(w: &mut dyn Write, input: &Path, pages: usize) -> std::io::Result<()> {
    writeln!(w, "Converting {} ({} pages)...", input.display(), pages)
}

/// Print the result line for a finished job.
pub fn print_outcome(
    w: &mut dyn Write,
    outcome: &JobOutcome,
    color: ColorMode,
) -> std::io::Result<()> {
    match outcome {
        JobOutcome::Converted { job, .. } => {
            let msg = format!("Successfully converted to {}", job.output_path.display());
            if color.enabled() {
                writeln!(w, "{} {}", "✓".green(), msg)
            } else {
                writeln!(w, "✓ {}", msg)
            }
        }
        JobOutcome::Failed { job, reason } => {
            let msg = format!("Error converting {}: {}", job.input_path.display(), reason);
            if color.enabled() {
                writeln!(w, "{} {}", "✗".red(), msg)
            } else {
                writeln!(w, "✗ {}", msg)
            }
        }
        JobOutcome::Missing { input } => {
            let msg = format!("File not found: {}", input.display());
            if color.enabled() {
                writeln!(w, "{} {}", "✗".red(), msg)
            } else {
                writeln!(w, "✗ {}", msg)
            }
        }
    }
}

/// Print the final tally.
pub fn print_summary(
    w: &mut dyn Write,
    summary: &BatchSummary,
    color: ColorMode,
) -> std::io::Result<()> {
    let converted = summary.converted();
    let failed = summary.failed();
    let missing = summary.missing();

    if color.enabled() {
        writeln!(
            w,
            "{} {} converted, {} failed, {} not found",
            "Done:".bold(),
            converted.green(),
            failed.red(),
            missing.yellow()
        )
    } else {
        writeln!(
            w,
            "Done: {} converted, {} failed, {} not found",
            converted, failed, missing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf2txt_core::ConversionJob;

    fn render(f: impl FnOnce(&mut dyn Write) -> std::io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn started_line() {
        let out = render(|w| print_started(w, Path::new("a.pdf"), 2));
        assert_eq!(out, "Converting a.pdf (2 pages)...\n");
    }

    #[test]
    fn outcome_lines_plain() {
        let plain = ColorMode(false);
        let job = ConversionJob::for_input("a.pdf");

        let ok = render(|w| {
            print_outcome(
                w,
                &JobOutcome::Converted {
                    job: job.clone(),
                    pages: 2,
                },
                plain,
            )
        });
        assert_eq!(ok, "✓ Successfully converted to a.txt\n");

        let failed = render(|w| {
            print_outcome(
                w,
                &JobOutcome::Failed {
                    job: job.clone(),
                    reason: "failed to open PDF: no objects found".into(),
                },
                plain,
            )
        });
        assert_eq!(
            failed,
            "✗ Error converting a.pdf: failed to open PDF: no objects found\n"
        );

        let missing = render(|w| {
            print_outcome(
                w,
                &JobOutcome::Missing {
                    input: "b.pdf".into(),
                },
                plain,
            )
        });
        assert_eq!(missing, "✗ File not found: b.pdf\n");
    }

    #[test]
    fn colored_outcome_keeps_message() {
        let out = render(|w| {
            print_outcome(
                w,
                &JobOutcome::Missing {
                    input: "b.pdf".into(),
                },
                ColorMode(true),
            )
        });
        assert!(out.contains("\u{1b}["));
        assert!(out.ends_with("File not found: b.pdf\n"));
    }

    #[test]
    fn summary_line_plain() {
        let summary = BatchSummary {
            outcomes: vec![
                JobOutcome::Converted {
                    job: ConversionJob::for_input("a.pdf"),
                    pages: 1,
                },
                JobOutcome::Missing {
                    input: "b.pdf".into(),
                },
            ],
        };
        let out = render(|w| print_summary(w, &summary, ColorMode(false)));
        assert_eq!(out, "Done: 1 converted, 0 failed, 1 not found\n");
    }
}
