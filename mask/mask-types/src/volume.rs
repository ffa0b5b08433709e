//! Dense boolean voxel volume.

use crate::access::{VoxelRead, VoxelWrite};
use crate::coord::VoxelCoord;
use crate::error::{VolumeError, VolumeResult};
use crate::shape::VolumeShape;

/// A dense 3D grid of booleans: foreground = `true`, background = `false`.
///
/// Storage is a flat `Vec<bool>` in the shape's raster order (X fastest).
/// Construction validates the shape and reserves storage fallibly, so an
/// oversized request surfaces as a typed error instead of an abort.
///
/// # Example
///
/// ```
/// use mask_types::{MaskVolume, VolumeShape, VoxelCoord};
///
/// let mut mask = MaskVolume::try_new(VolumeShape::new(4, 4, 4)).unwrap();
/// assert_eq!(mask.count_foreground(), 0);
///
/// mask.set(VoxelCoord::new(1, 2, 3), true);
/// assert!(mask.get(VoxelCoord::new(1, 2, 3)));
/// assert_eq!(mask.count_foreground(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaskVolume {
    shape: VolumeShape,
    data: Vec<bool>,
}

impl MaskVolume {
    /// Creates an all-background volume of the given shape.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::InvalidDimensions`] for a zero extent and
    /// [`VolumeError::Allocation`] if storage cannot be reserved.
    pub fn try_new(shape: VolumeShape) -> VolumeResult<Self> {
        Self::filled(shape, false)
    }

    /// Creates a volume of the given shape with every voxel set to `value`.
    ///
    /// # Errors
    ///
    /// Same as [`MaskVolume::try_new`].
    pub fn filled(shape: VolumeShape, value: bool) -> VolumeResult<Self> {
        let voxels = shape.checked_num_voxels()?;
        let mut data = Vec::new();
        data.try_reserve_exact(voxels)
            .map_err(|_| VolumeError::Allocation { voxels })?;
        data.resize(voxels, value);
        Ok(Self { shape, data })
    }

    /// Builds a volume from raw raster-order data.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::DataLength`] if `data.len()` does not match
    /// the shape's voxel count, or a shape error as in
    /// [`MaskVolume::try_new`].
    ///
    /// # Example
    ///
    /// ```
    /// use mask_types::{MaskVolume, VolumeShape};
    ///
    /// let mask = MaskVolume::from_raw(
    ///     VolumeShape::new(2, 2, 1),
    ///     vec![true, false, false, true],
    /// )
    /// .unwrap();
    /// assert_eq!(mask.count_foreground(), 2);
    /// ```
    pub fn from_raw(shape: VolumeShape, data: Vec<bool>) -> VolumeResult<Self> {
        let expected = shape.checked_num_voxels()?;
        if data.len() != expected {
            return Err(VolumeError::DataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Builds a volume by evaluating `f` at every coordinate.
    ///
    /// # Errors
    ///
    /// Same as [`MaskVolume::try_new`].
    pub fn from_fn<F>(shape: VolumeShape, mut f: F) -> VolumeResult<Self>
    where
        F: FnMut(VoxelCoord) -> bool,
    {
        let mut volume = Self::try_new(shape)?;
        for coord in shape.iter() {
            let value = f(coord);
            if value {
                volume.set(coord, true);
            }
        }
        Ok(volume)
    }

    /// The volume's extents.
    #[must_use]
    pub const fn shape(&self) -> VolumeShape {
        self.shape
    }

    /// Total number of voxels.
    #[must_use]
    pub fn num_voxels(&self) -> usize {
        self.data.len()
    }

    /// Value at `coord`.
    ///
    /// # Panics
    ///
    /// Panics if `coord` is out of bounds.
    #[must_use]
    pub fn get(&self, coord: VoxelCoord) -> bool {
        self.data[self.shape.index_of(coord)]
    }

    /// Sets the value at `coord`.
    ///
    /// # Panics
    ///
    /// Panics if `coord` is out of bounds.
    pub fn set(&mut self, coord: VoxelCoord, value: bool) {
        let index = self.shape.index_of(coord);
        self.data[index] = value;
    }

    /// Number of foreground voxels.
    #[must_use]
    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Whether any voxel is foreground.
    #[must_use]
    pub fn any_foreground(&self) -> bool {
        self.data.iter().any(|&v| v)
    }

    /// Raw raster-order data.
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    /// Flips every voxel in place.
    pub fn invert(&mut self) {
        for value in &mut self.data {
            *value = !*value;
        }
    }
}

impl VoxelRead for MaskVolume {
    fn shape(&self) -> VolumeShape {
        self.shape
    }

    fn get(&self, coord: VoxelCoord) -> bool {
        MaskVolume::get(self, coord)
    }
}

impl VoxelWrite for MaskVolume {
    fn set(&mut self, coord: VoxelCoord, value: bool) {
        MaskVolume::set(self, coord, value);
    }
}

impl std::ops::Not for MaskVolume {
    type Output = Self;

    /// Returns the voxel-wise complement, reusing the storage.
    ///
    /// # Example
    ///
    /// ```
    /// use mask_types::{MaskVolume, VolumeShape};
    ///
    /// let mask = MaskVolume::try_new(VolumeShape::new(2, 2, 2)).unwrap();
    /// let inverted = !mask;
    /// assert_eq!(inverted.count_foreground(), 8);
    /// ```
    fn not(mut self) -> Self {
        self.invert();
        self
    }
}
