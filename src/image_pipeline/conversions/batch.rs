//! Directory-level orchestration.
//!
//! Every matching file is converted independently: a corrupt frame is logged
//! and recorded, and the run moves on to the next one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::image_pipeline::{
    common::error::{PipelineError, Result},
    config::ProcessingConfig,
    conversions::raw_to_tiff::RawToTiffPipeline,
    debayer::{CpuDebayer, Demosaicer},
    raw::{PackedRaw10Reader, RawFrameReader},
    tiff::{StandardTiffWriter, TiffWriter},
};

pub const OUTPUT_EXTENSION: &str = "tiff";

#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct FileFailure {
    pub input: PathBuf,
    pub error: PipelineError,
}

/// Outcome of one batch run, in sorted input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<ProcessedFile>,
    pub failures: Vec<FileFailure>,
    /// Directory entries ignored because they are not frames
    pub skipped: usize,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn malformed_count(&self) -> usize {
        self.failures.iter().filter(|f| f.error.is_malformed_frame()).count()
    }

    pub fn log_summary(&self) {
        info!(
            processed = self.processed.len(),
            failed = self.failures.len(),
            malformed = self.malformed_count(),
            skipped = self.skipped,
            "Batch complete"
        );
        for failure in &self.failures {
            error!(file = %failure.input.display(), "{}", failure.error);
        }
    }
}

pub struct BatchProcessor<R: RawFrameReader, D: Demosaicer, W: TiffWriter> {
    pipeline: RawToTiffPipeline<R, D, W>,
}

impl BatchProcessor<PackedRaw10Reader, CpuDebayer, StandardTiffWriter> {
    pub fn new(config: ProcessingConfig) -> Result<Self> {
        Ok(Self::with_pipeline(RawToTiffPipeline::new(config)?))
    }
}

impl<R: RawFrameReader, D: Demosaicer, W: TiffWriter> BatchProcessor<R, D, W> {
    pub fn with_pipeline(pipeline: RawToTiffPipeline<R, D, W>) -> Self {
        Self { pipeline }
    }

    pub fn config(&self) -> &ProcessingConfig {
        self.pipeline.config()
    }

    /// Lists frame files in the input directory, sorted, plus the count of
    /// entries that were passed over.
    pub fn collect_inputs(&self) -> Result<(Vec<PathBuf>, usize)> {
        let dir = &self.config().input_dir;
        let entries = std::fs::read_dir(dir).map_err(|e| {
            PipelineError::InputReadError(format!("{}: {}", dir.display(), e))
        })?;

        let mut inputs = Vec::new();
        let mut skipped = 0;
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    warn!(dir = %dir.display(), "Unreadable directory entry: {}", e);
                    skipped += 1;
                    continue;
                }
            };
            if path.is_file() && self.config().matches_input(&path) {
                inputs.push(path);
            } else {
                skipped += 1;
            }
        }
        inputs.sort();
        Ok((inputs, skipped))
    }

    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
        name.push(".");
        name.push(OUTPUT_EXTENSION);
        self.config().output_dir.join(name)
    }

    /// Pairs each input with the earlier input that already owns its output
    /// name, if any. `frame.raw` and `frame.RAW` both become `frame.tiff`.
    fn claim_outputs(&self, inputs: Vec<PathBuf>) -> Vec<(PathBuf, Option<PathBuf>)> {
        let mut owners: HashMap<PathBuf, PathBuf> = HashMap::new();
        inputs
            .into_iter()
            .map(|input| {
                let output = self.output_path_for(&input);
                let owner = match owners.get(&output) {
                    Some(first) => Some(first.clone()),
                    None => {
                        owners.insert(output, input.clone());
                        None
                    }
                };
                (input, owner)
            })
            .collect()
    }

    fn process_claimed(&self, input: &Path, owner: Option<&Path>) -> Result<ProcessedFile> {
        match owner {
            Some(first) => Err(PipelineError::OutputWriteError(format!(
                "{} already written from {}",
                self.output_path_for(input).display(),
                first.display()
            ))),
            None => self.process_one(input),
        }
    }

    fn process_one(&self, input: &Path) -> Result<ProcessedFile> {
        let _span = tracing::info_span!("frame", file = %input.display()).entered();
        let output = self.output_path_for(input);
        let timings = self.pipeline.convert_file(input, &output)?;
        info!(output = %output.display(), "Saved");
        Ok(ProcessedFile {
            input: input.to_path_buf(),
            output,
            elapsed: timings.total_duration(),
        })
    }
}

impl<R, D, W> BatchProcessor<R, D, W>
where
    R: RawFrameReader + Sync,
    D: Demosaicer + Sync,
    W: TiffWriter + Sync,
{
    /// Processes the whole input directory.
    ///
    /// Only a missing input directory or an uncreatable output directory fail
    /// the run; per-file problems end up in the report.
    pub fn run(&self) -> Result<BatchReport> {
        let config = self.config();
        let (inputs, skipped) = self.collect_inputs()?;
        if inputs.is_empty() {
            warn!(
                dir = %config.input_dir.display(),
                "No .{} files found", config.input_extension.trim_start_matches('.')
            );
        }

        // create_dir_all is a no-op when another worker or run got there first.
        std::fs::create_dir_all(&config.output_dir).map_err(|e| {
            PipelineError::OutputWriteError(format!("{}: {}", config.output_dir.display(), e))
        })?;

        info!(files = inputs.len(), jobs = config.jobs, "Processing batch");

        let work = self.claim_outputs(inputs);
        let outcomes: Vec<(PathBuf, Result<ProcessedFile>)> = if config.jobs > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.jobs)
                .build()
                .map_err(|e| PipelineError::Config(format!("worker pool: {e}")))?;
            pool.install(|| {
                work.par_iter()
                    .map(|(input, owner)| (input.clone(), self.process_claimed(input, owner.as_deref())))
                    .collect()
            })
        } else {
            work.iter()
                .map(|(input, owner)| (input.clone(), self.process_claimed(input, owner.as_deref())))
                .collect()
        };

        let mut report = BatchReport { skipped, ..BatchReport::default() };
        for (input, outcome) in outcomes {
            match outcome {
                Ok(done) => report.processed.push(done),
                Err(error) => {
                    warn!(file = %input.display(), "Failed: {}", error);
                    report.failures.push(FileFailure { input, error });
                }
            }
        }
        Ok(report)
    }
}
