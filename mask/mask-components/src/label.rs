//! Two-pass connected-component labeling over a raster scan.
//!
//! The scan walks the volume once in storage order, assigning tentative
//! labels from already-visited neighbors and recording merges in an
//! [`EquivalenceTable`]; a second pass resolves every tentative label to
//! its canonical root and tallies component sizes. The result answers
//! "which structure does this voxel belong to, and how big is it" without
//! ever revisiting the input.

use hashbrown::HashMap;
use mask_types::{MaskVolume, VolumeError, VolumeResult, VolumeShape, VoxelCoord, VoxelRead};
use tracing::debug;

use crate::connectivity::Connectivity;
use crate::equivalence::EquivalenceTable;

/// Resolved component labels for one mask, with per-component voxel counts.
///
/// Produced by [`label_components`]. Label `0` is background; every
/// positive label is canonical (already resolved through the equivalence
/// table), and two foreground voxels carry the same label exactly when
/// they are connected under the scan's adjacency rule.
#[derive(Debug, Clone)]
pub struct ComponentLabels {
    shape: VolumeShape,
    labels: Vec<u32>,
    counts: HashMap<u32, usize>,
}

impl ComponentLabels {
    /// Extents of the labeled volume.
    #[must_use]
    pub const fn shape(&self) -> VolumeShape {
        self.shape
    }

    /// Number of distinct connected components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.counts.len()
    }

    /// Total number of foreground voxels across all components.
    #[must_use]
    pub fn foreground_total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Canonical label at `coord` (0 for background).
    #[must_use]
    pub fn label_at(&self, coord: VoxelCoord) -> u32 {
        self.labels[self.shape.index_of(coord)]
    }

    /// Voxel count of the component with canonical label `label`.
    #[must_use]
    pub fn count_of(&self, label: u32) -> Option<usize> {
        self.counts.get(&label).copied()
    }

    /// Iterates over `(canonical label, voxel count)` pairs in no
    /// particular order.
    pub fn counts(&self) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.counts.iter().map(|(&label, &count)| (label, count))
    }

    /// The component with the most voxels, as `(canonical label, count)`.
    ///
    /// Returns `None` for an all-background mask. When several components
    /// share the maximum count, the one with the LOWEST canonical label
    /// wins; labels are issued in raster discovery order, so this is also
    /// the component discovered first in the scan.
    ///
    /// # Example
    ///
    /// ```
    /// use mask_components::{label_components, Connectivity};
    /// use mask_types::{MaskVolume, VolumeShape, VoxelCoord};
    ///
    /// let mut mask = MaskVolume::try_new(VolumeShape::new(5, 1, 1)).unwrap();
    /// mask.set(VoxelCoord::new(0, 0, 0), true);
    /// mask.set(VoxelCoord::new(2, 0, 0), true);
    /// mask.set(VoxelCoord::new(3, 0, 0), true);
    ///
    /// let labeled = label_components(&mask, Connectivity::Faces).unwrap();
    /// let (label, count) = labeled.largest().unwrap();
    /// assert_eq!(count, 2);
    /// assert_eq!(labeled.label_at(VoxelCoord::new(2, 0, 0)), label);
    /// ```
    #[must_use]
    pub fn largest(&self) -> Option<(u32, usize)> {
        let mut best: Option<(u32, usize)> = None;
        for (label, count) in self.counts() {
            let better = match best {
                None => true,
                Some((best_label, best_count)) => {
                    count > best_count || (count == best_count && label < best_label)
                }
            };
            if better {
                best = Some((label, count));
            }
        }
        best
    }

    /// Builds a fresh mask that is true exactly where the resolved label
    /// equals `label`.
    ///
    /// # Errors
    ///
    /// Propagates allocation failure for the output volume.
    pub fn mask_of(&self, label: u32) -> VolumeResult<MaskVolume> {
        let mut out = MaskVolume::try_new(self.shape)?;
        for (index, &voxel_label) in self.labels.iter().enumerate() {
            if voxel_label == label && label != 0 {
                out.set(self.shape.coord_of(index), true);
            }
        }
        Ok(out)
    }
}

/// Labels every connected component of `mask` under `connectivity`.
///
/// Two passes over the volume:
///
/// 1. **Raster pass**: each foreground voxel looks at the neighbors that
///    precede it in raster order. With no labeled neighbor it founds a new
///    tentative label; otherwise it adopts the minimum neighboring label
///    and records every other distinct neighbor label as equivalent (the
///    voxel bridges previously separate runs).
/// 2. **Resolution pass**: every tentative label is replaced by its
///    canonical root and component sizes are tallied.
///
/// The algorithm is total: an all-background mask yields a result with no
/// components and is not an error.
///
/// # Errors
///
/// Returns an error if the label field cannot be allocated or the shape
/// reported by `mask` is unusable.
///
/// # Example
///
/// ```
/// use mask_components::{label_components, Connectivity};
/// use mask_types::{MaskVolume, VolumeShape, VoxelCoord};
///
/// let mut mask = MaskVolume::try_new(VolumeShape::new(4, 4, 1)).unwrap();
/// mask.set(VoxelCoord::new(0, 0, 0), true);
/// mask.set(VoxelCoord::new(1, 0, 0), true);
/// mask.set(VoxelCoord::new(3, 3, 0), true);
///
/// let labeled = label_components(&mask, Connectivity::Faces).unwrap();
/// assert_eq!(labeled.component_count(), 2);
/// assert_eq!(labeled.foreground_total(), 3);
/// ```
pub fn label_components<V: VoxelRead>(
    mask: &V,
    connectivity: Connectivity,
) -> VolumeResult<ComponentLabels> {
    let shape = mask.shape();
    let voxels = shape.checked_num_voxels()?;

    let mut labels: Vec<u32> = Vec::new();
    labels
        .try_reserve_exact(voxels)
        .map_err(|_| VolumeError::Allocation { voxels })?;
    labels.resize(voxels, 0);

    let mut table = EquivalenceTable::new();
    let backward = connectivity.backward_offsets();

    // Raster pass: tentative labels and merges. The scan only consults
    // neighbors already behind it, so `labels` is final for every index it
    // reads.
    let mut neighbor_labels = [0u32; 13];
    for coord in shape.iter() {
        if !mask.get(coord) {
            continue;
        }

        let mut found = 0;
        for &[dx, dy, dz] in backward {
            let Some(neighbor) = coord.offset(dx, dy, dz) else {
                continue;
            };
            if !shape.contains(neighbor) {
                continue;
            }
            let label = labels[shape.index_of(neighbor)];
            if label != 0 {
                neighbor_labels[found] = label;
                found += 1;
            }
        }

        let index = shape.index_of(coord);
        if found == 0 {
            labels[index] = table.make_set();
        } else {
            let mut minimum = neighbor_labels[0];
            for &label in &neighbor_labels[1..found] {
                if label < minimum {
                    minimum = label;
                }
            }
            labels[index] = minimum;
            table.add_voxel(minimum);
            for &label in &neighbor_labels[..found] {
                if label != minimum {
                    table.union(minimum, label);
                }
            }
        }
    }

    debug!("raster pass issued {} tentative labels", table.len());

    // Resolution pass: canonicalize labels and tally component sizes.
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for label in &mut labels {
        if *label == 0 {
            continue;
        }
        let root = table.find(*label);
        *label = root;
        *counts.entry(root).or_insert(0) += 1;
    }

    debug!(
        "resolved {} components over {} foreground voxels",
        counts.len(),
        counts.values().sum::<usize>()
    );

    Ok(ComponentLabels {
        shape,
        labels,
        counts,
    })
}

/// Extracts the largest connected component of `mask` as a fresh volume.
///
/// An all-background input yields an all-background output; this is not an
/// error. The output is always a subset of the input.
///
/// # Errors
///
/// Propagates labeling and allocation failures.
///
/// # Example
///
/// ```
/// use mask_components::{keep_largest_component, Connectivity};
/// use mask_types::{MaskVolume, VolumeShape, VoxelCoord};
///
/// let mut mask = MaskVolume::try_new(VolumeShape::new(5, 1, 1)).unwrap();
/// mask.set(VoxelCoord::new(0, 0, 0), true);
/// mask.set(VoxelCoord::new(2, 0, 0), true);
/// mask.set(VoxelCoord::new(3, 0, 0), true);
///
/// let largest = keep_largest_component(&mask, Connectivity::Faces).unwrap();
/// assert!(!largest.get(VoxelCoord::new(0, 0, 0)));
/// assert!(largest.get(VoxelCoord::new(2, 0, 0)));
/// assert!(largest.get(VoxelCoord::new(3, 0, 0)));
/// ```
pub fn keep_largest_component<V: VoxelRead>(
    mask: &V,
    connectivity: Connectivity,
) -> VolumeResult<MaskVolume> {
    let labeled = label_components(mask, connectivity)?;
    match labeled.largest() {
        Some((label, _)) => labeled.mask_of(label),
        None => MaskVolume::try_new(labeled.shape()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mask_types::VolumeShape;

    fn mask_from(shape: VolumeShape, foreground: &[(usize, usize, usize)]) -> MaskVolume {
        let mut mask = MaskVolume::try_new(shape).unwrap();
        for &(x, y, z) in foreground {
            mask.set(VoxelCoord::new(x, y, z), true);
        }
        mask
    }

    #[test]
    fn all_background_yields_no_components() {
        let mask = MaskVolume::try_new(VolumeShape::new(4, 4, 4)).unwrap();
        let labeled = label_components(&mask, Connectivity::Faces).unwrap();

        assert_eq!(labeled.component_count(), 0);
        assert_eq!(labeled.foreground_total(), 0);
        assert!(labeled.largest().is_none());
    }

    #[test]
    fn all_background_keep_largest_is_all_background() {
        let mask = MaskVolume::try_new(VolumeShape::new(4, 4, 4)).unwrap();
        let largest = keep_largest_component(&mask, Connectivity::Faces).unwrap();
        assert!(!largest.any_foreground());
    }

    #[test]
    fn single_voxel() {
        let mask = mask_from(VolumeShape::new(3, 3, 3), &[(1, 1, 1)]);
        let labeled = label_components(&mask, Connectivity::Faces).unwrap();

        assert_eq!(labeled.component_count(), 1);
        assert_eq!(labeled.largest(), Some((1, 1)));
        assert_eq!(labeled.label_at(VoxelCoord::new(1, 1, 1)), 1);
        assert_eq!(labeled.label_at(VoxelCoord::new(0, 0, 0)), 0);
    }

    #[test]
    fn face_adjacent_voxels_share_a_label() {
        let mask = mask_from(VolumeShape::new(3, 3, 3), &[(1, 1, 1), (2, 1, 1)]);
        let labeled = label_components(&mask, Connectivity::Faces).unwrap();

        assert_eq!(labeled.component_count(), 1);
        assert_eq!(
            labeled.label_at(VoxelCoord::new(1, 1, 1)),
            labeled.label_at(VoxelCoord::new(2, 1, 1))
        );
    }

    #[test]
    fn corner_adjacency_depends_on_connectivity() {
        let corners = [(0, 0, 0), (1, 1, 1)];
        let mask = mask_from(VolumeShape::new(2, 2, 2), &corners);

        let faces = label_components(&mask, Connectivity::Faces).unwrap();
        assert_eq!(faces.component_count(), 2);

        let edges = label_components(&mask, Connectivity::FacesEdges).unwrap();
        assert_eq!(edges.component_count(), 2);

        let full = label_components(&mask, Connectivity::FacesEdgesCorners).unwrap();
        assert_eq!(full.component_count(), 1);
    }

    #[test]
    fn edge_adjacency_depends_on_connectivity() {
        let mask = mask_from(VolumeShape::new(2, 2, 1), &[(0, 0, 0), (1, 1, 0)]);

        let faces = label_components(&mask, Connectivity::Faces).unwrap();
        assert_eq!(faces.component_count(), 2);

        let edges = label_components(&mask, Connectivity::FacesEdges).unwrap();
        assert_eq!(edges.component_count(), 1);
    }

    #[test]
    fn bridge_voxel_merges_two_runs() {
        // Two separate runs in the first row get distinct tentative labels;
        // the second row's last voxel sees both and forces a merge.
        let mask = mask_from(
            VolumeShape::new(3, 2, 1),
            &[(0, 0, 0), (2, 0, 0), (0, 1, 0), (1, 1, 0), (2, 1, 0)],
        );
        let labeled = label_components(&mask, Connectivity::Faces).unwrap();

        assert_eq!(labeled.component_count(), 1);
        assert_eq!(labeled.foreground_total(), 5);
        let label = labeled.label_at(VoxelCoord::new(0, 0, 0));
        assert_eq!(labeled.count_of(label), Some(5));
    }

    #[test]
    fn three_islands_largest_wins() {
        // Two single-voxel islands and one 5-voxel island, mutually
        // non-adjacent.
        let mask = mask_from(
            VolumeShape::new(9, 3, 3),
            &[
                (0, 0, 0),
                (0, 2, 2),
                (4, 1, 1),
                (5, 1, 1),
                (6, 1, 1),
                (7, 1, 1),
                (8, 1, 1),
            ],
        );
        let labeled = label_components(&mask, Connectivity::Faces).unwrap();
        assert_eq!(labeled.component_count(), 3);

        let (label, count) = labeled.largest().unwrap();
        assert_eq!(count, 5);

        let largest = labeled.mask_of(label).unwrap();
        assert_eq!(largest.count_foreground(), 5);
        for x in 4..9 {
            assert!(largest.get(VoxelCoord::new(x, 1, 1)));
        }
        assert!(!largest.get(VoxelCoord::new(0, 0, 0)));
        assert!(!largest.get(VoxelCoord::new(0, 2, 2)));
    }

    #[test]
    fn counts_sum_to_foreground_total() {
        let mask = mask_from(
            VolumeShape::new(4, 4, 2),
            &[(0, 0, 0), (1, 0, 0), (3, 3, 1), (0, 3, 0), (0, 3, 1)],
        );
        let labeled = label_components(&mask, Connectivity::Faces).unwrap();

        let sum: usize = labeled.counts().map(|(_, count)| count).sum();
        assert_eq!(sum, mask.count_foreground());
        assert_eq!(labeled.foreground_total(), mask.count_foreground());
    }

    #[test]
    fn tie_break_picks_lowest_label() {
        // Two single-voxel components; the one discovered first in raster
        // order has the lower label and must win the tie.
        let mask = mask_from(VolumeShape::new(5, 1, 1), &[(1, 0, 0), (3, 0, 0)]);
        let labeled = label_components(&mask, Connectivity::Faces).unwrap();

        let (label, count) = labeled.largest().unwrap();
        assert_eq!(count, 1);
        assert_eq!(label, labeled.label_at(VoxelCoord::new(1, 0, 0)));
    }

    #[test]
    fn largest_output_is_subset_of_input() {
        let mask = mask_from(
            VolumeShape::new(4, 4, 4),
            &[(0, 0, 0), (1, 0, 0), (3, 3, 3), (2, 2, 2)],
        );
        let largest = keep_largest_component(&mask, Connectivity::Faces).unwrap();
        for coord in mask.shape().iter() {
            assert!(!largest.get(coord) || mask.get(coord));
        }
    }

    #[test]
    fn keep_largest_is_idempotent() {
        let mask = mask_from(
            VolumeShape::new(5, 5, 1),
            &[(0, 0, 0), (2, 2, 0), (2, 3, 0), (3, 2, 0)],
        );
        let once = keep_largest_component(&mask, Connectivity::Faces).unwrap();
        let twice = keep_largest_component(&once, Connectivity::Faces).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn mask_of_background_label_is_empty() {
        let mask = mask_from(VolumeShape::new(3, 3, 3), &[(1, 1, 1)]);
        let labeled = label_components(&mask, Connectivity::Faces).unwrap();
        let none = labeled.mask_of(0).unwrap();
        assert!(!none.any_foreground());
    }
}
