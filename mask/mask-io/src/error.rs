//! Error types for mask I/O operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for mask I/O operations.
pub type IoResult<T> = Result<T, MaskIoError>;

/// Errors that can occur while reading or writing mask images.
#[derive(Debug, Error)]
pub enum MaskIoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// Unrecognized file extension.
    #[error("unknown mask format: {path} (expected .nii or .nii.gz)")]
    UnknownFormat {
        /// Path with the unrecognized extension.
        path: PathBuf,
    },

    /// The NIfTI data could not be parsed.
    #[error("invalid NIfTI data: {0}")]
    Parse(#[from] nifti::NiftiError),

    /// The image is not a 3D (or 4D, reducible to 3D) volume.
    #[error("expected a 3D or 4D volume, got {ndim} dimensions")]
    NotAVolume {
        /// Dimensionality reported by the image.
        ndim: usize,
    },

    /// A volume extent exceeds what a NIfTI-1 header can record.
    #[error("volume extent {extent} exceeds the NIfTI-1 dimension limit {limit}")]
    ExtentOverflow {
        /// The offending extent.
        extent: usize,
        /// Maximum extent a NIfTI-1 header can hold.
        limit: usize,
    },

    /// The decoded data does not form a usable volume.
    #[error(transparent)]
    Volume(#[from] mask_types::VolumeError),

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
