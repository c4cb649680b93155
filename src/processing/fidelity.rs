//! # Fidelity Analyzer
//!
//! Measures how much an embedding disturbed the cover grid.
//!
//! - **MSE**: mean of squared per-sample differences
//! - **PSNR**: `20 * log10(255 / sqrt(mse))`, infinite when the grids are identical
//! - **Changed samples**: how many samples differ, and what share of the total

use serde::Serialize;

use crate::processing::error::StegoError;
use crate::processing::grid::PixelGrid;

const MAX_SAMPLE: f64 = 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FidelityReport {
    pub mse: f64,
    /// Peak signal-to-noise ratio in dB; `f64::INFINITY` for identical grids.
    pub psnr: f64,
    pub changed_sample_count: usize,
    pub total_samples: usize,
    pub change_percentage: f64,
}

/// Compare two grids of identical shape.
///
/// # Errors
/// [`StegoError::ShapeMismatch`] when the shapes differ.
pub fn compare(original: &PixelGrid, modified: &PixelGrid) -> Result<FidelityReport, StegoError> {
    if original.shape() != modified.shape() {
        return Err(StegoError::ShapeMismatch {
            original: original.shape(),
            modified: modified.shape(),
        });
    }

    let mut squared_error: u64 = 0;
    let mut changed = 0usize;
    for (&a, &b) in original.samples().iter().zip(modified.samples()) {
        let diff = a.abs_diff(b) as u64;
        squared_error += diff * diff;
        if a != b {
            changed += 1;
        }
    }

    let total = original.len();
    let mse = squared_error as f64 / total as f64;
    let psnr = if mse == 0.0 {
        f64::INFINITY
    } else {
        20.0 * (MAX_SAMPLE / mse.sqrt()).log10()
    };

    Ok(FidelityReport {
        mse,
        psnr,
        changed_sample_count: changed,
        total_samples: total,
        change_percentage: changed as f64 / total as f64 * 100.0,
    })
}
