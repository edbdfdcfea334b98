/// Tuning constants for the binned-SAH and spatial-split builders.
///
/// The original source hardcodes these as preprocessor constants, and two
/// SBVH implementations in it disagree on `COST_TRAVERSAL`/`ALPHA`
/// (0 vs 1.5, 0.01 vs 0.1 — see DESIGN.md). Bundling them into a struct
/// lets callers (and tests exercising S1-S6) override them per build
/// instead of picking one value globally at compile time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildConfig {
    /// Bins per axis used by the object-split (binned SAH) scan.
    pub n_obj_bins: usize,

    /// Bins per axis used by the spatial-split scan.
    pub n_spatial_bins: usize,

    /// Surface-area-overlap threshold above which a spatial split is even
    /// considered as an alternative to the best object split.
    pub alpha: f64,

    /// SAH cost of traversing an interior node.
    pub cost_traversal: f64,

    /// SAH cost of intersecting one primitive.
    pub cost_intersection: f64,

    /// A node with fewer primitives than this is never subdivided further.
    pub min_leaf_primitives: usize,

    /// Hard upper bound on a leaf's primitive count: a node over this cap
    /// is forced to split (bypassing the leaf-cost SAH gate) even if every
    /// candidate split scores worse than leaving it a leaf, short of
    /// hitting `max_depth` first.
    pub max_prims_per_leaf: usize,

    /// Safety cap: recursion stops at this depth regardless of SAH, so
    /// adversarial inputs can't recurse forever. Builders additionally cap
    /// at `log2(total_primitives) + this margin` per spec.
    pub max_depth_margin: u32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            n_obj_bins: 32,
            n_spatial_bins: 8,
            alpha: 0.05,
            cost_traversal: 1.5,
            cost_intersection: 1.0,
            min_leaf_primitives: 4,
            max_prims_per_leaf: 32,
            max_depth_margin: 8,
        }
    }
}

impl BuildConfig {
    /// The depth cap for a build over `total_primitives` primitives:
    /// `ceil(log2(n)) + max_depth_margin`, as a safety stop independent of
    /// the SAH termination test (spec.md S3).
    pub fn max_depth(&self, total_primitives: usize) -> u32 {
        let n = total_primitives.max(1) as f64;
        n.log2().ceil() as u32 + self.max_depth_margin
    }
}
