//! Sequential batch runner.
//!
//! Jobs run strictly one after another in input order. Every outcome is
//! reported through the event callback as soon as it is known, and a failed
//! job never stops the jobs after it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::backend::PdfBackend;
use crate::converter::Converter;
use crate::job::ConversionJob;

/// Options shared by every job of a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Directory for text files. `None` writes each one next to its input.
    pub output_dir: Option<PathBuf>,
}

impl BatchOptions {
    fn job_for(&self, input: &Path) -> ConversionJob {
        match &self.output_dir {
            Some(dir) => ConversionJob::for_input_in(input, dir),
            None => ConversionJob::for_input(input),
        }
    }
}

/// Outcome of a single job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Text was extracted and written to `job.output_path`.
    Converted { job: ConversionJob, pages: usize },
    /// The input path does not exist; nothing was attempted.
    Missing { input: PathBuf },
    /// Opening, parsing, extracting or writing failed.
    Failed { job: ConversionJob, reason: String },
}

/// Progress events emitted while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// The document opened and extraction is about to start.
    Started { input: PathBuf, pages: usize },
    /// A job finished, successfully or not.
    Finished(JobOutcome),
}

/// All outcomes of a batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<JobOutcome>,
}

impl BatchSummary {
    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Converted { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Failed { .. }))
    }

    pub fn missing(&self) -> usize {
        self.count(|o| matches!(o, JobOutcome::Missing { .. }))
    }

    fn count(&self, pred: impl Fn(&JobOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(*o)).count()
    }
}

/// Convert every input in order.
pub fn run_batch<P, F>(
    inputs: &[P],
    options: &BatchOptions,
    backend: &dyn PdfBackend,
    mut on_event: F,
) -> BatchSummary
where
    P: AsRef<Path>,
    F: FnMut(BatchEvent),
{
    let converter = Converter::new(backend);
    let mut summary = BatchSummary::default();
    let mut claimed = HashMap::new();

    for input in inputs {
        let input = input.as_ref();
        let outcome = run_job(&converter, input, options, &mut claimed, &mut on_event);
        on_event(BatchEvent::Finished(outcome.clone()));
        summary.outcomes.push(outcome);
    }

    tracing::info!(
        converted = summary.converted(),
        failed = summary.failed(),
        missing = summary.missing(),
        "batch complete"
    );
    summary
}

/// `claimed` maps each output path already written in this batch to the
/// input that produced it. A different input mapping onto a claimed path fails
/// instead of overwriting the earlier text.
fn run_job(
    converter: &Converter<'_>,
    input: &Path,
    options: &BatchOptions,
    claimed: &mut HashMap<PathBuf, PathBuf>,
    on_event: &mut impl FnMut(BatchEvent),
) -> JobOutcome {
    if !input.exists() {
        tracing::warn!(path = %input.display(), "input not found");
        return JobOutcome::Missing {
            input: input.to_path_buf(),
        };
    }

    let job = options.job_for(input);
    if let Some(earlier) = claimed.get(&job.output_path)
        && earlier.as_path() != input
    {
        tracing::warn!(
            path = %input.display(),
            output = %job.output_path.display(),
            earlier = %earlier.display(),
            "duplicate output path"
        );
        return JobOutcome::Failed {
            reason: format!(
                "output {} already written from {} in this batch",
                job.output_path.display(),
                earlier.display()
            ),
            job,
        };
    }

    let result = converter.convert_with(&job, |pages| {
        on_event(BatchEvent::Started {
            input: input.to_path_buf(),
            pages,
        })
    });

    match result {
        Ok(report) => {
            claimed.insert(job.output_path.clone(), input.to_path_buf());
            JobOutcome::Converted {
                pages: report.pages,
                job,
            }
        }
        Err(e) => {
            tracing::warn!(path = %input.display(), error = %e, "conversion failed");
            JobOutcome::Failed {
                reason: e.to_string(),
                job,
            }
        }
    }
}
