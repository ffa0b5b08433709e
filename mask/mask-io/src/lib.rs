//! NIfTI-1 I/O for binary voxel masks.
//!
//! This crate moves masks between [`mask_types::MaskVolume`] and NIfTI-1
//! files (`.nii`, `.nii.gz`):
//!
//! - [`load_mask`] / [`save_mask`] - file-level entry points
//! - [`decode_mask`] / [`encode_mask`] - byte-level codec (useful when the
//!   image arrives over something other than the filesystem)
//! - [`MaskMeta`] - voxel size and affine carried from input to output
//!
//! Loading thresholds any nonzero sample to foreground and reduces 4D
//! inputs to their first volume. Saving writes a UINT8 volume and never
//! creates the output file until the whole image has been encoded.
//!
//! # Example
//!
//! ```no_run
//! use mask_io::{load_mask, save_mask};
//!
//! let (mask, meta) = load_mask("input.nii.gz").unwrap();
//! // ... process the mask ...
//! save_mask("output.nii.gz", &mask, &meta).unwrap();
//! ```

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod nifti1;

pub use error::{IoResult, MaskIoError};
pub use nifti1::{MaskMeta, decode_mask, encode_mask, load_mask, save_mask};
