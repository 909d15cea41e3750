//! Block state machine.
//!
//! Drives Prolog → Idle → Prefix → Content → Analyzed over the line
//! table. Everything outside `GS`/`GR` brackets streams straight to
//! the output; bracketed lines are split at the `N` boundary into a
//! state-setting prefix and path content, and accumulate in the
//! registry under the prefix. A `GR` balancing the outermost `GS`
//! ends the block; deeper brackets pass through inside it.

use crate::block::{Block, Registry};
use crate::config::CleanConfig;
use crate::line::{classify, operand, LineId, LineKind, Lines};
use crate::writer;
use crate::CleanStats;

/// One path in encounter order: the point ids of its `M`/`L` chain
/// and whether a `cp` closed it.
struct Subpath {
    pts: Vec<String>,
    closed: bool,
}

/// Everything accumulated for a single `GS`..`GR` occurrence before
/// it is committed under its (possibly clip-extended) prefix.
#[derive(Default)]
struct Occurrence {
    /// Every content line in input order; replayed verbatim when a
    /// fill block is left opaque.
    full: Vec<LineId>,
    /// Passthrough-only lines.
    pass: Vec<LineId>,
    /// Path data not yet assigned to stroke or fill.
    pending: Vec<Subpath>,
    /// Paths bound for the stroke graph (`S` seen, or leftovers).
    stroke_paths: Vec<Subpath>,
    /// Polygons bound for the fill graph (`f` seen, combining on).
    fill_polys: Vec<Subpath>,
    /// `re` seen with box removal on: drop the whole occurrence.
    bad: bool,
}

/// Run the engine over a line table. Infallible: every line the
/// machine does not understand is passed through.
pub fn run(lines: &Lines, config: &CleanConfig) -> (String, CleanStats) {
    let mut engine = Engine {
        lines,
        config,
        nl: lines.newline(),
        out: String::new(),
        registry: Registry::default(),
        prev_prefix: None,
        stats: CleanStats::default(),
    };
    engine.stats.lines = lines.len();
    engine.execute();
    (engine.out, engine.stats)
}

struct Engine<'a> {
    lines: &'a Lines<'a>,
    config: &'a CleanConfig,
    nl: &'static str,
    out: String,
    registry: Registry,
    /// Previous committed prefix, for the soft-grouping flush.
    prev_prefix: Option<String>,
    stats: CleanStats,
}

impl<'a> Engine<'a> {
    fn execute(&mut self) {
        let n = self.lines.len();

        // Prolog passes through byte-for-byte, `%%EndPageSetup`
        // included. Without the marker the whole file is prolog.
        let mut i = 0;
        loop {
            if i >= n {
                self.out.push_str(self.lines.raw(0, n));
                return;
            }
            if classify(self.lines.content(i)) == LineKind::PageSetupEnd {
                break;
            }
            i += 1;
        }
        self.out.push_str(self.lines.raw(0, i + 1));
        i += 1;

        // Idle: between blocks.
        while i < n {
            match classify(self.lines.content(i)) {
                LineKind::Gsave => {
                    i = self.parse_block(i + 1);
                }
                LineKind::Trailer => {
                    self.flush_all();
                    self.out.push_str(self.lines.raw(i, n));
                    return;
                }
                // Stray grestore with no open block: drop it.
                LineKind::Grestore => i += 1,
                _ => {
                    self.out.push_str(self.lines.raw(i, i + 1));
                    i += 1;
                }
            }
        }
        self.flush_all();
    }

    /// Parse one block starting just after its `GS`. Returns the index
    /// of the first line after the block.
    fn parse_block(&mut self, mut i: LineId) -> LineId {
        let n = self.lines.len();
        let nl = self.nl;
        let mut prefix = String::new();
        let mut nesting: u32 = 0;
        let mut has_line_cap = false;
        let mut is_dash_mode = false;

        // -- Prefix: state-setting lines up to the `N` boundary --
        loop {
            if i >= n {
                self.commit(prefix, Occurrence::default());
                return i;
            }
            let line = self.lines.content(i);
            match classify(line) {
                LineKind::Newpath => {
                    i += 1;
                    break;
                }
                LineKind::Gsave => {
                    nesting += 1;
                    push_line(&mut prefix, line, nl);
                }
                LineKind::Grestore => {
                    if nesting == 0 {
                        // Block with no content at all.
                        self.commit(prefix, Occurrence::default());
                        return i + 1;
                    }
                    nesting -= 1;
                    push_line(&mut prefix, line, nl);
                }
                LineKind::BitmapBegin => {
                    // Raw bitmap region: byte-for-byte, no tokenization
                    // until the matching end marker.
                    push_line(&mut prefix, line, nl);
                    i += 1;
                    while i < n {
                        let raw = self.lines.content(i);
                        push_line(&mut prefix, raw, nl);
                        if classify(raw) == LineKind::BitmapEnd {
                            break;
                        }
                        i += 1;
                    }
                }
                LineKind::SetLineCap => {
                    has_line_cap = true;
                    push_line(&mut prefix, line, nl);
                }
                LineKind::SetDash => {
                    is_dash_mode = true;
                    push_line(&mut prefix, line, nl);
                }
                LineKind::LineJoin => {
                    // Blocks differing only in implicit linecap state
                    // must still group: normalize it before the
                    // linejoin. Dash mode leaves the cap implicit
                    // unless configured otherwise.
                    if !has_line_cap && (!is_dash_mode || self.config.dash_linecap) {
                        push_line(&mut prefix, "1 setlinecap", nl);
                        has_line_cap = true;
                    }
                    push_line(&mut prefix, line, nl);
                }
                _ => push_line(&mut prefix, line, nl),
            }
            i += 1;
        }

        // -- Content: path data after `N` --
        let mut occ = Occurrence::default();
        while i < n {
            let line = self.lines.content(i);
            match classify(line) {
                LineKind::Grestore => {
                    if nesting == 0 {
                        occ.stroke_paths.append(&mut occ.pending);
                        self.commit(prefix, occ);
                        return i + 1;
                    }
                    nesting -= 1;
                    occ.full.push(i);
                    occ.pass.push(i);
                }
                LineKind::Gsave => {
                    nesting += 1;
                    occ.full.push(i);
                    occ.pass.push(i);
                }
                LineKind::MoveTo => {
                    occ.full.push(i);
                    occ.pending.push(Subpath {
                        pts: vec![operand(line).to_owned()],
                        closed: false,
                    });
                }
                LineKind::LineTo => {
                    occ.full.push(i);
                    let id = operand(line).to_owned();
                    match occ.pending.last_mut() {
                        Some(sp) if !sp.closed => sp.pts.push(id),
                        Some(sp) => {
                            // lineto after closepath continues from
                            // the closed subpath's start point.
                            let start = sp.pts[0].clone();
                            occ.pending.push(Subpath {
                                pts: vec![start, id],
                                closed: false,
                            });
                        }
                        None => {
                            // lineto with no current point: not ours.
                            occ.pass.push(i);
                        }
                    }
                }
                LineKind::ClosePath => {
                    occ.full.push(i);
                    if let Some(sp) = occ.pending.last_mut() {
                        sp.closed = true;
                    }
                }
                LineKind::Stroke => {
                    // The polyline emitter issues its own S.
                    occ.stroke_paths.append(&mut occ.pending);
                }
                LineKind::Fill => {
                    occ.full.push(i);
                    if self.config.combine_areas {
                        // An f right after cp is regenerated by the
                        // fill emitter; any other f is preserved.
                        let after_cp =
                            i > 0 && classify(self.lines.content(i - 1)) == LineKind::ClosePath;
                        if !after_cp {
                            occ.pass.push(i);
                        }
                        occ.fill_polys.append(&mut occ.pending);
                    } else {
                        // Not asked to merge fills: give up on this
                        // occurrence and replay it verbatim.
                        occ.pass = occ.full.clone();
                        occ.pending.clear();
                        occ.stroke_paths.clear();
                        occ.fill_polys.clear();
                    }
                }
                LineKind::Rect => {
                    if self.config.remove_boxes {
                        occ.bad = true;
                    } else {
                        occ.full.push(i);
                        occ.pass.push(i);
                    }
                }
                LineKind::Clip => {
                    // The path so far becomes rendering state: fold it
                    // and the clip into the prefix, re-keying the
                    // block, and restart content accumulation. A box
                    // disqualification survives the fold — the block
                    // is discarded clipping path and all.
                    let bad = occ.bad;
                    for &id in &occ.full {
                        push_line(&mut prefix, self.lines.content(id), nl);
                    }
                    push_line(&mut prefix, "clip", nl);
                    occ = Occurrence::default();
                    occ.bad = bad;
                }
                LineKind::BitmapBegin => {
                    occ.full.push(i);
                    occ.pass.push(i);
                    i += 1;
                    while i < n {
                        occ.full.push(i);
                        occ.pass.push(i);
                        if classify(self.lines.content(i)) == LineKind::BitmapEnd {
                            break;
                        }
                        i += 1;
                    }
                }
                _ => {
                    occ.full.push(i);
                    occ.pass.push(i);
                }
            }
            i += 1;
        }

        // Input ended inside the block: keep what we have.
        occ.stroke_paths.append(&mut occ.pending);
        self.commit(prefix, occ);
        i
    }

    /// Analyzed: merge the occurrence into the registry under its
    /// prefix, soft-flushing first on a prefix change.
    fn commit(&mut self, prefix: String, occ: Occurrence) {
        if occ.bad {
            return;
        }
        self.stats.blocks_in += 1;

        if self.config.group_soft {
            let changed = self.prev_prefix.as_deref().is_some_and(|p| p != prefix);
            if changed && !self.registry.is_empty() {
                let flushed = self.registry.drain_except(&prefix);
                self.write_blocks(flushed);
            }
            self.prev_prefix = Some(prefix.clone());
        }

        let block = self.registry.entry(&prefix);
        block.passthrough.extend(occ.pass);
        for sp in &occ.stroke_paths {
            self.stats.segments_in += sp.pts.len().saturating_sub(1) + usize::from(sp.closed);
            for pair in sp.pts.windows(2) {
                block.stroke.add_segment(&pair[0], &pair[1]);
            }
            if sp.closed && sp.pts.len() > 1 {
                block.stroke.add_segment(&sp.pts[sp.pts.len() - 1], &sp.pts[0]);
            }
        }
        for sp in &occ.fill_polys {
            self.stats.polygons_in += 1;
            block.fill.add_polygon(&sp.pts, sp.closed);
        }
    }

    fn flush_all(&mut self) {
        let blocks = self.registry.drain();
        self.write_blocks(blocks);
    }

    fn write_blocks(&mut self, blocks: Vec<(String, Block)>) {
        for (prefix, mut block) in blocks {
            writer::write_block(
                &mut self.out,
                &prefix,
                &mut block,
                self.lines,
                self.nl,
                &mut self.stats,
            );
        }
    }
}

fn push_line(buf: &mut String, line: &str, nl: &str) {
    buf.push_str(line);
    buf.push_str(nl);
}
