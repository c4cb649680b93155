//! # Batch Runner
//!
//! Executes a [`BatchConfig`] on a bounded pool of blocking workers.
//!
//! Every job is independent: it loads its own image, runs the codec, and
//! writes its own output. At most `workers` jobs run at once. A failing job
//! is recorded and reported but never stops the others.

use anyhow::Result;
use log::{error, info};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::batch::metrics::BatchMetrics;
use crate::common::config::{BatchConfig, JobSpec};
use crate::processing::grid::BitWidth;
use crate::processing::steganography;

/// Result of one batch job, in the order the jobs were declared.
#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub index: usize,
    pub kind: String,
    pub input: String,
    pub success: bool,
    /// Human-readable result, or the error message on failure
    pub detail: String,
}

pub struct BatchRunner {
    config: BatchConfig,
    metrics: Option<Arc<Mutex<BatchMetrics>>>,
}

impl BatchRunner {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            metrics: None,
        }
    }

    /// Record per-job metrics into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<Mutex<BatchMetrics>>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run every job and return one outcome per job.
    pub async fn run(&self) -> Result<Vec<JobOutcome>> {
        self.run_with(run_job).await
    }

    async fn run_with<F>(&self, execute: F) -> Result<Vec<JobOutcome>>
    where
        F: Fn(&JobSpec, BitWidth) -> Result<String> + Send + Sync + Copy + 'static,
    {
        self.config.validate()?;

        let settings = &self.config.batch;
        info!(
            "Starting batch '{}': {} job(s), {} worker(s), default bit width {}",
            settings.name,
            self.config.jobs.len(),
            settings.workers,
            settings.bit_width
        );

        let semaphore = Arc::new(Semaphore::new(settings.workers));
        let mut handles = Vec::with_capacity(self.config.jobs.len());

        for (index, job) in self.config.jobs.iter().cloned().enumerate() {
            let semaphore = semaphore.clone();
            let metrics = self.metrics.clone();
            let default_width = settings.bit_width;

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await?;
                let kind = job.kind();
                let input = job.input().to_string();
                let started = Instant::now();

                // Codec work is CPU-bound: keep it off the async workers.
                // A panic is reported as a failed job, not propagated.
                let blocking = tokio::task::spawn_blocking(move || execute(&job, default_width));
                let result = match blocking.await {
                    Ok(result) => result,
                    Err(e) => Err(anyhow::anyhow!("job panicked: {}", e)),
                };

                let latency = started.elapsed();
                let outcome = match result {
                    Ok(detail) => {
                        info!("✅ Job #{} ({}) on {} done in {:?}", index, kind, input, latency);
                        JobOutcome {
                            index,
                            kind: kind.to_string(),
                            input,
                            success: true,
                            detail,
                        }
                    }
                    Err(e) => {
                        error!("❌ Job #{} ({}) on {} failed: {}", index, kind, input, e);
                        JobOutcome {
                            index,
                            kind: kind.to_string(),
                            input,
                            success: false,
                            detail: e.to_string(),
                        }
                    }
                };

                if let Some(metrics) = metrics {
                    if let Ok(mut metrics) = metrics.lock() {
                        let reason = (!outcome.success).then(|| outcome.detail.clone());
                        metrics.record_job(index, kind, latency, outcome.success, reason);
                    }
                }

                anyhow::Ok(outcome)
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            outcomes.push(handle.await??);
        }

        let failed = outcomes.iter().filter(|o| !o.success).count();
        info!(
            "Batch '{}' finished: {} succeeded, {} failed",
            settings.name,
            outcomes.len() - failed,
            failed
        );

        Ok(outcomes)
    }
}

fn run_job(job: &JobSpec, default_width: BitWidth) -> Result<String> {
    let bit_width = job.bit_width_or(default_width);
    let detail = match job {
        JobSpec::Encode {
            input,
            output,
            message,
            ..
        } => {
            let summary = steganography::encode_file(input, output, message, bit_width)?;
            format!(
                "wrote {} ({} bytes, PSNR {:.2} dB, {:.2}% samples changed)",
                summary.output,
                summary.payload_bytes,
                summary.fidelity.psnr,
                summary.fidelity.change_percentage
            )
        }
        JobSpec::Decode { input, .. } => {
            let message = steganography::decode_file(input, bit_width)?;
            format!("decoded: {}", message)
        }
        JobSpec::Info { input, .. } => {
            let report = steganography::info_file(input, bit_width)?;
            format!(
                "{}x{}, {} channels, {} characters at {} bit(s)",
                report.dimensions.0, report.dimensions.1, report.channels, report.characters, bit_width
            )
        }
    };
    Ok(detail)
}
