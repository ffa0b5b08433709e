//! Connected-component analysis for binary voxel masks.
//!
//! This crate is the algorithmic core of the mask-processing workspace. It
//! labels the connected structures of a 3D boolean mask with a two-pass
//! raster scan backed by an equivalence table, selects the largest
//! structure, and composes the same machinery twice (direct, then
//! inverted) to fill cavities enclosed by that structure.
//!
//! - [`EquivalenceTable`] - disjoint-set forest over tentative labels
//! - [`Connectivity`] - 6/18/26-neighborhood adjacency rules
//! - [`label_components`] / [`ComponentLabels`] - the labeling scan
//! - [`keep_largest_component`] - largest-structure extraction
//! - [`fill_enclosed_cavities`] / [`clean_mask`] - cleanup pipeline
//!
//! Input is anything implementing [`mask_types::VoxelRead`]; outputs are
//! freshly allocated [`mask_types::MaskVolume`]s. Each operation is a pure
//! function: all scratch state (label field, equivalence table, component
//! registry) lives and dies inside one call.
//!
//! # Example
//!
//! ```
//! use mask_components::{clean_mask, CleanParams};
//! use mask_types::{MaskVolume, VolumeShape, VoxelCoord};
//!
//! let mut mask = MaskVolume::try_new(VolumeShape::new(8, 8, 8))?;
//! // ... threshold an image into `mask` ...
//! mask.set(VoxelCoord::new(4, 4, 4), true);
//!
//! let params = CleanParams::default().with_fill(true);
//! let result = clean_mask(&mask, &params)?;
//! println!("{result}");
//! # Ok::<(), mask_types::VolumeError>(())
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod clean;
mod connectivity;
mod equivalence;
mod label;

pub use clean::{CleanParams, CleanResult, clean_mask, fill_enclosed_cavities};
pub use connectivity::{Connectivity, NeighborOffset};
pub use equivalence::EquivalenceTable;
pub use label::{ComponentLabels, keep_largest_component, label_components};
