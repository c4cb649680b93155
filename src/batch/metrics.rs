//! # Batch Metrics
//!
//! Per-job latency and outcome for one batch run. [`BatchMetrics::aggregate`]
//! summarises success rate, latency percentiles over successful jobs, jobs per
//! kind and failure reasons; [`BatchMetrics::export_to_json`] writes the summary
//! and the raw job list, tagged with a random run id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMetric {
    pub job_index: usize,
    pub kind: String,
    pub start_time: i64, // milliseconds since epoch
    pub latency_ms: u64,
    pub success: bool,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AggregatedStats {
    pub total_jobs: usize,
    pub successful_jobs: usize,
    pub failed_jobs: usize,
    pub failure_rate: f64,

    // Latency statistics (milliseconds)
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    pub latency_avg_ms: f64,
    pub latency_p50_ms: u64,
    pub latency_p95_ms: u64,
    pub latency_p99_ms: u64,

    // Jobs per kind (encode / decode / info)
    pub kind_distribution: HashMap<String, usize>,

    // Failure reasons breakdown
    pub failure_reasons: HashMap<String, usize>,
}

#[derive(Debug)]
pub struct BatchMetrics {
    batch_name: String,
    run_id: Uuid,
    start_time: Instant,
    jobs: Vec<JobMetric>,
}

impl BatchMetrics {
    pub fn new(batch_name: String) -> Self {
        Self {
            batch_name,
            run_id: Uuid::new_v4(),
            start_time: Instant::now(),
            jobs: Vec::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn record_job(
        &mut self,
        job_index: usize,
        kind: &str,
        latency: Duration,
        success: bool,
        failure_reason: Option<String>,
    ) {
        self.jobs.push(JobMetric {
            job_index,
            kind: kind.to_string(),
            start_time: chrono::Utc::now().timestamp_millis() - latency.as_millis() as i64,
            latency_ms: latency.as_millis() as u64,
            success,
            failure_reason,
        });
    }

    pub fn aggregate(&self) -> AggregatedStats {
        let mut stats = AggregatedStats::default();

        if self.jobs.is_empty() {
            return stats;
        }

        stats.total_jobs = self.jobs.len();
        stats.successful_jobs = self.jobs.iter().filter(|j| j.success).count();
        stats.failed_jobs = stats.total_jobs - stats.successful_jobs;
        stats.failure_rate = (stats.failed_jobs as f64 / stats.total_jobs as f64) * 100.0;

        // Latency statistics over successful jobs
        let mut latencies: Vec<u64> = self
            .jobs
            .iter()
            .filter(|j| j.success)
            .map(|j| j.latency_ms)
            .collect();
        latencies.sort_unstable();

        if let (Some(&min), Some(&max)) = (latencies.first(), latencies.last()) {
            stats.latency_min_ms = min;
            stats.latency_max_ms = max;
            stats.latency_avg_ms = latencies.iter().sum::<u64>() as f64 / latencies.len() as f64;

            stats.latency_p50_ms = percentile(&latencies, 50.0);
            stats.latency_p95_ms = percentile(&latencies, 95.0);
            stats.latency_p99_ms = percentile(&latencies, 99.0);
        }

        for job in &self.jobs {
            *stats.kind_distribution.entry(job.kind.clone()).or_insert(0) += 1;
        }

        for job in self.jobs.iter().filter(|j| !j.success) {
            if let Some(reason) = &job.failure_reason {
                *stats.failure_reasons.entry(reason.clone()).or_insert(0) += 1;
            }
        }

        stats
    }

    pub fn export_to_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let stats = self.aggregate();

        let output = serde_json::json!({
            "batch_name": self.batch_name,
            "run_id": self.run_id,
            "duration_ms": self.start_time.elapsed().as_millis() as u64,
            "aggregated_stats": stats,
            "jobs": self.jobs,
        });

        let json_string = serde_json::to_string_pretty(&output)?;
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = File::create(path)?;
        file.write_all(json_string.as_bytes())?;

        Ok(())
    }
}

fn percentile(sorted_data: &[u64], percentile: f64) -> u64 {
    if sorted_data.is_empty() {
        return 0;
    }

    let index = (percentile / 100.0 * (sorted_data.len() - 1) as f64).round() as usize;
    sorted_data[index.min(sorted_data.len() - 1)]
}
