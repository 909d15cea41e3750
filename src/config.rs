/// All cleaning options in one struct.
/// Every flag defaults to off; the engine is then a pure regrouping
/// pass that leaves fills untouched and preserves input order per prefix.
#[derive(Debug, Clone, Default)]
pub struct CleanConfig {
    /// Discard any block whose content contains a rectangle (`re`)
    /// operator, clipping path included. Plotting toolkits emit these
    /// as axis frames and color-bar boxes that editors re-draw anyway.
    pub remove_boxes: bool,

    /// Flush the block registry whenever the current block's rendering
    /// state differs from the previous block's. Coalesces only runs of
    /// consecutive identical-state blocks, so painting order (Z-order)
    /// across state changes is preserved. Off = one output block per
    /// distinct state for the whole document, emitted in first-seen order.
    pub group_soft: bool,

    /// Merge adjacent filled polygons that share edges into single
    /// outlines. Off = fill blocks pass through untouched.
    pub combine_areas: bool,

    /// Insert the synthetic `1 setlinecap` before a linejoin operator
    /// even when the block uses `setdash`. The plotting tool's later
    /// revisions suppress the insertion in dash mode; set this to get
    /// the earlier behavior.
    pub dash_linecap: bool,
}
