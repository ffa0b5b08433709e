//! NIfTI-1 mask decoding and encoding.
//!
//! Reading goes through the `nifti` crate (gzip compression is detected by
//! magic bytes, not extension, so piped/renamed files still load). Writing
//! builds the 348-byte NIfTI-1 header directly: a mask is a UINT8 volume
//! with unit scaling, which needs none of the header machinery a general
//! image writer carries.

use std::io::Cursor;
use std::path::Path;

use flate2::read::GzDecoder;
use ndarray::{Array, IxDyn};
use nifti::volume::ndarray::IntoNdArray;
use nifti::{InMemNiftiObject, NiftiHeader, NiftiObject};
use tracing::{debug, info, warn};

use mask_types::{MaskVolume, VolumeShape};

use crate::error::{IoResult, MaskIoError};

/// NIfTI-1 header size in bytes.
const HEADER_SIZE: usize = 348;

/// Offset of the voxel data: header plus the 4-byte extension flag.
const VOX_OFFSET: usize = HEADER_SIZE + 4;

/// Largest extent a NIfTI-1 header dimension field can hold.
const DIM_LIMIT: usize = i16::MAX as usize;

/// Spatial metadata carried from an input mask to its cleaned output, so
/// the output stays registered to the same scanner space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskMeta {
    /// Voxel size along each axis, in mm.
    pub voxel_size: [f32; 3],
    /// 4x4 voxel-to-world affine, row-major.
    pub affine: [[f32; 4]; 4],
}

impl MaskMeta {
    /// Metadata for an unregistered volume: 1 mm isotropic voxels, identity
    /// orientation.
    #[must_use]
    pub const fn unregistered() -> Self {
        Self {
            voxel_size: [1.0, 1.0, 1.0],
            affine: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }
}

impl Default for MaskMeta {
    fn default() -> Self {
        Self::unregistered()
    }
}

/// Checks for the gzip magic bytes.
fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

/// Extracts the voxel-to-world affine from a header: the sform when set,
/// otherwise a voxel-size-scaled identity.
fn affine_from(header: &NiftiHeader) -> [[f32; 4]; 4] {
    if header.sform_code > 0 {
        [
            header.srow_x,
            header.srow_y,
            header.srow_z,
            [0.0, 0.0, 0.0, 1.0],
        ]
    } else {
        [
            [header.pixdim[1], 0.0, 0.0, 0.0],
            [0.0, header.pixdim[2], 0.0, 0.0],
            [0.0, 0.0, header.pixdim[3], 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }
}

/// Decodes a NIfTI-1 mask from raw bytes (`.nii` or `.nii.gz` content).
///
/// Any nonzero sample is foreground. A 4D input is reduced to 3D by taking
/// its first volume; higher dimensionalities are rejected.
///
/// # Errors
///
/// Returns [`MaskIoError::Parse`] for malformed NIfTI data,
/// [`MaskIoError::NotAVolume`] for non-3D/4D images, and
/// [`MaskIoError::Volume`] when the reported extents are unusable.
pub fn decode_mask(bytes: &[u8]) -> IoResult<(MaskVolume, MaskMeta)> {
    let object: InMemNiftiObject = if is_gzip(bytes) {
        debug!("gzip magic detected, decompressing");
        InMemNiftiObject::from_reader(GzDecoder::new(Cursor::new(bytes)))?
    } else {
        InMemNiftiObject::from_reader(Cursor::new(bytes))?
    };

    let header = object.header();
    let ndim = header.dim[0] as usize;
    if !(3..=4).contains(&ndim) {
        return Err(MaskIoError::NotAVolume { ndim });
    }

    let meta = MaskMeta {
        voxel_size: [header.pixdim[1], header.pixdim[2], header.pixdim[3]],
        affine: affine_from(header),
    };

    let array: Array<f32, IxDyn> = object.into_volume().into_ndarray::<f32>()?;
    let dims = array.shape().to_vec();
    if !(3..=4).contains(&dims.len()) || (dims.len() == 4 && dims[3] == 0) {
        return Err(MaskIoError::NotAVolume { ndim: dims.len() });
    }
    if dims.len() == 4 && dims[3] > 1 {
        warn!("4D input with {} volumes; taking the first", dims[3]);
    }

    let shape = VolumeShape::new(dims[0], dims[1], dims[2]);
    let voxels = shape.checked_num_voxels()?;

    // Flatten in storage order (x fastest), thresholding as we go.
    let mut data = Vec::with_capacity(voxels);
    for z in 0..shape.nz {
        for y in 0..shape.ny {
            for x in 0..shape.nx {
                let sample = if dims.len() == 3 {
                    array[[x, y, z]]
                } else {
                    array[[x, y, z, 0]]
                };
                data.push(sample != 0.0);
            }
        }
    }

    let mask = MaskVolume::from_raw(shape, data)?;
    Ok((mask, meta))
}

/// Encodes a mask as uncompressed NIfTI-1 bytes (UINT8 volume).
///
/// # Errors
///
/// Returns [`MaskIoError::ExtentOverflow`] if an extent does not fit the
/// header's 16-bit dimension fields.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn encode_mask(mask: &MaskVolume, meta: &MaskMeta) -> IoResult<Vec<u8>> {
    let shape = mask.shape();
    for extent in [shape.nx, shape.ny, shape.nz] {
        if extent > DIM_LIMIT {
            return Err(MaskIoError::ExtentOverflow {
                extent,
                limit: DIM_LIMIT,
            });
        }
    }

    let mut header = [0u8; HEADER_SIZE];

    // sizeof_hdr
    header[0..4].copy_from_slice(&348i32.to_le_bytes());

    // dim[0..7]: 3D volume
    let dim: [i16; 8] = [
        3,
        shape.nx as i16,
        shape.ny as i16,
        shape.nz as i16,
        1,
        1,
        1,
        1,
    ];
    for (i, value) in dim.iter().enumerate() {
        let offset = 40 + i * 2;
        header[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    // datatype = 2 (UINT8), bitpix = 8
    header[70..72].copy_from_slice(&2i16.to_le_bytes());
    header[72..74].copy_from_slice(&8i16.to_le_bytes());

    // pixdim[0..7]
    let pixdim: [f32; 8] = [
        1.0,
        meta.voxel_size[0],
        meta.voxel_size[1],
        meta.voxel_size[2],
        1.0,
        1.0,
        1.0,
        1.0,
    ];
    for (i, value) in pixdim.iter().enumerate() {
        let offset = 76 + i * 4;
        header[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
    }

    // vox_offset (stored as float), unit scaling
    header[108..112].copy_from_slice(&(VOX_OFFSET as f32).to_le_bytes());
    header[112..116].copy_from_slice(&1.0f32.to_le_bytes());
    header[116..120].copy_from_slice(&0.0f32.to_le_bytes());

    // sform_code = 1 (scanner anat) with the carried affine
    header[254..256].copy_from_slice(&1i16.to_le_bytes());
    for (row, base) in [(0usize, 280usize), (1, 296), (2, 312)] {
        for col in 0..4 {
            let offset = base + col * 4;
            header[offset..offset + 4].copy_from_slice(&meta.affine[row][col].to_le_bytes());
        }
    }

    // magic = "n+1\0" (single-file NIfTI-1)
    header[344..348].copy_from_slice(b"n+1\0");

    let mut buffer = Vec::with_capacity(VOX_OFFSET + mask.num_voxels());
    buffer.extend_from_slice(&header);
    // Extension flag: four zero bytes, no extensions.
    buffer.extend_from_slice(&[0u8; 4]);
    buffer.extend(mask.as_slice().iter().map(|&v| u8::from(v)));

    Ok(buffer)
}

/// Whether `path` names a gzip-compressed NIfTI file, `Some(false)` for a
/// plain one, `None` for an unsupported extension.
fn gzipped_by_extension(path: &Path) -> Option<bool> {
    let name = path.file_name()?.to_str()?;
    if name.ends_with(".nii.gz") {
        Some(true)
    } else if name.ends_with(".nii") {
        Some(false)
    } else {
        None
    }
}

/// Loads a binary mask from a `.nii` or `.nii.gz` file.
///
/// # Errors
///
/// Returns [`MaskIoError::FileNotFound`] if the path does not exist,
/// [`MaskIoError::UnknownFormat`] for an unsupported extension, and the
/// decode errors of [`decode_mask`].
///
/// # Example
///
/// ```no_run
/// use mask_io::load_mask;
///
/// let (mask, meta) = load_mask("mask.nii.gz").unwrap();
/// println!("{} foreground voxels", mask.count_foreground());
/// ```
pub fn load_mask<P: AsRef<Path>>(path: P) -> IoResult<(MaskVolume, MaskMeta)> {
    let path = path.as_ref();
    if gzipped_by_extension(path).is_none() {
        return Err(MaskIoError::UnknownFormat {
            path: path.to_path_buf(),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MaskIoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            MaskIoError::Io(e)
        }
    })?;

    let (mask, meta) = decode_mask(&bytes)?;
    let shape = mask.shape();
    info!(
        "loaded {}: {}x{}x{}, {} foreground voxels",
        path.display(),
        shape.nx,
        shape.ny,
        shape.nz,
        mask.count_foreground()
    );
    Ok((mask, meta))
}

/// Saves a binary mask to a `.nii` or `.nii.gz` file.
///
/// The whole image is encoded (and, for `.nii.gz`, compressed) in memory
/// before the file is created, so a failing run never leaves a partial
/// output that looks valid.
///
/// # Errors
///
/// Returns [`MaskIoError::UnknownFormat`] for an unsupported extension,
/// encode errors of [`encode_mask`], and [`MaskIoError::Io`] if the file
/// cannot be written.
pub fn save_mask<P: AsRef<Path>>(path: P, mask: &MaskVolume, meta: &MaskMeta) -> IoResult<()> {
    let path = path.as_ref();
    let Some(gz) = gzipped_by_extension(path) else {
        return Err(MaskIoError::UnknownFormat {
            path: path.to_path_buf(),
        });
    };

    let encoded = encode_mask(mask, meta)?;
    let bytes = if gz {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&encoded)?;
        encoder.finish()?
    } else {
        encoded
    };

    std::fs::write(path, bytes)?;
    info!("wrote {}", path.display());
    Ok(())
}
