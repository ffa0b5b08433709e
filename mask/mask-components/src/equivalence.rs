//! Equivalence table over tentative labels (disjoint-set forest).
//!
//! The raster scan hands out tentative labels and merges them as it
//! discovers adjacency; this table tracks which tentative labels belong to
//! the same structure and how many voxels each merged set holds.
//!
//! Storage is arena-indexed: flat parent and count vectors keyed by the
//! label value itself, so lookups stay cache-friendly over large volumes
//! and there are no linked nodes to own. Label `0` is reserved as the
//! background sentinel and never participates in any operation.

/// Disjoint-set forest over tentative component labels.
///
/// - `find` applies full path compression: every label visited on the walk
///   to the root is relinked directly to that root.
/// - `union` is by size; the smaller set is attached under the larger one
///   and the surviving root's count becomes the sum. When sizes are equal
///   the numerically smaller root survives, which keeps canonical
///   identifiers low and the merge order deterministic.
///
/// # Example
///
/// ```
/// use mask_components::EquivalenceTable;
///
/// let mut table = EquivalenceTable::new();
/// let a = table.make_set();
/// let b = table.make_set();
/// assert_ne!(table.find(a), table.find(b));
///
/// let root = table.union(a, b);
/// assert_eq!(table.find(a), root);
/// assert_eq!(table.find(b), root);
/// assert_eq!(table.count_of(root), 2);
/// ```
#[derive(Debug, Clone)]
pub struct EquivalenceTable {
    /// Parent pointer per label; a root is its own parent. Entry 0 is the
    /// background sentinel.
    parent: Vec<u32>,
    /// Voxel count per label; only meaningful at roots.
    count: Vec<usize>,
}

impl EquivalenceTable {
    /// Creates an empty table (no labels issued yet).
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: vec![0],
            count: vec![0],
        }
    }

    /// Creates an empty table with capacity for `labels` tentative labels.
    #[must_use]
    pub fn with_capacity(labels: usize) -> Self {
        let mut parent = Vec::with_capacity(labels + 1);
        let mut count = Vec::with_capacity(labels + 1);
        parent.push(0);
        count.push(0);
        Self { parent, count }
    }

    /// Number of tentative labels issued so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len() - 1
    }

    /// Whether no labels have been issued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Issues a fresh tentative label rooting its own set with count 1.
    #[allow(clippy::cast_possible_truncation)]
    pub fn make_set(&mut self) -> u32 {
        // Label values stay well under u32::MAX: each label covers at least
        // one voxel, and voxel counts of that magnitude exceed addressable
        // mask volumes long before the cast could truncate.
        let label = self.parent.len() as u32;
        self.parent.push(label);
        self.count.push(1);
        label
    }

    /// Resolves a tentative label to its canonical label, compressing the
    /// path so every visited label points directly at the root.
    pub fn find(&mut self, label: u32) -> u32 {
        debug_assert!(label != 0, "background sentinel has no set");
        let mut root = label;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }
        let mut current = label;
        while current != root {
            let next = self.parent[current as usize];
            self.parent[current as usize] = root;
            current = next;
        }
        root
    }

    /// Merges the sets containing `a` and `b`, returning the surviving
    /// root. A no-op (returning the shared root) if already merged.
    pub fn union(&mut self, a: u32, b: u32) -> u32 {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return root_a;
        }

        let count_a = self.count[root_a as usize];
        let count_b = self.count[root_b as usize];

        // Union by size; on a tie the smaller label survives.
        let (survivor, absorbed) = if count_a > count_b || (count_a == count_b && root_a < root_b) {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };

        self.parent[absorbed as usize] = survivor;
        self.count[survivor as usize] = count_a + count_b;
        survivor
    }

    /// Credits one more voxel to the set containing `label`.
    ///
    /// Called when a scanned voxel adopts an existing tentative label
    /// instead of founding a new set, so set counts always equal voxel
    /// counts.
    pub fn add_voxel(&mut self, label: u32) {
        let root = self.find(label);
        self.count[root as usize] += 1;
    }

    /// Voxel count of the set containing `label`.
    pub fn count_of(&mut self, label: u32) -> usize {
        let root = self.find(label);
        self.count[root as usize]
    }
}

impl Default for EquivalenceTable {
    fn default() -> Self {
        Self::new()
    }
}
