//! Core types for binary voxel masks.
//!
//! This crate provides the foundational storage and addressing types shared
//! across the mask-processing workspace:
//!
//! - [`VoxelCoord`] - Integer voxel coordinates
//! - [`VolumeShape`] - Per-axis extents with raster index mapping
//! - [`MaskVolume`] - Dense 3D boolean grid
//! - [`VoxelRead`] / [`VoxelWrite`] - Narrow accessor capabilities that let
//!   any storage backend plug into the scanning algorithms unchanged
//!
//! # Storage Order
//!
//! Volumes are stored with X varying fastest, then Y, then Z (the native
//! order of NIfTI volumes). [`VolumeShape::iter`] walks coordinates in this
//! raster order, which the component-labeling scan in `mask-components`
//! relies on.
//!
//! # Example
//!
//! ```
//! use mask_types::{MaskVolume, VolumeShape, VoxelCoord};
//!
//! let shape = VolumeShape::new(8, 8, 8);
//! let mut mask = MaskVolume::try_new(shape)?;
//!
//! mask.set(VoxelCoord::new(4, 4, 4), true);
//! assert_eq!(mask.count_foreground(), 1);
//! # Ok::<(), mask_types::VolumeError>(())
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod access;
mod coord;
mod error;
mod shape;
mod volume;

pub use access::{VoxelRead, VoxelWrite};
pub use coord::VoxelCoord;
pub use error::{VolumeError, VolumeResult};
pub use shape::{RasterIter, VolumeShape};
pub use volume::MaskVolume;
