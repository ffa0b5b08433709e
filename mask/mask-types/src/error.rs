//! Error types for volume storage.

use thiserror::Error;

/// Result type for volume operations.
pub type VolumeResult<T> = Result<T, VolumeError>;

/// Errors that can occur when building or reshaping volumes.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VolumeError {
    /// The volume extents are unusable (zero along an axis, or the voxel
    /// count overflows the address space).
    #[error("invalid volume dimensions: {nx}x{ny}x{nz}")]
    InvalidDimensions {
        /// Extent along X.
        nx: usize,
        /// Extent along Y.
        ny: usize,
        /// Extent along Z.
        nz: usize,
    },

    /// Storage for the requested volume could not be allocated.
    #[error("failed to allocate volume storage ({voxels} voxels)")]
    Allocation {
        /// Number of voxels requested.
        voxels: usize,
    },

    /// Raw data length does not match the shape's voxel count.
    #[error("data length {actual} does not match shape voxel count {expected}")]
    DataLength {
        /// Voxel count implied by the shape.
        expected: usize,
        /// Length of the supplied data.
        actual: usize,
    },
}
