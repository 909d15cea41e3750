//! Output assembly for retained blocks.

use crate::block::Block;
use crate::line::Lines;
use crate::{fill, stroke, CleanStats};

/// Emit one block: `GS`, prefix, reconstructed or passthrough
/// content, `GR`.
pub fn write_block(
    out: &mut String,
    prefix: &str,
    block: &mut Block,
    lines: &Lines,
    nl: &str,
    stats: &mut CleanStats,
) {
    out.push_str("GS");
    out.push_str(nl);
    out.push_str(prefix);

    if block.has_paths() {
        stats.polylines_out += stroke::emit(&mut block.stroke, out, nl);
        let outcome = fill::emit(&block.fill, out, nl);
        stats.polygons_merged += outcome.merges;
        write_passthrough(out, block, lines, nl);
    } else {
        // A prefix ending in a folded clip path already established
        // the current path; starting a new one would discard it.
        if !ends_with_clip(prefix, nl) {
            out.push_str("N");
            out.push_str(nl);
        }
        write_passthrough(out, block, lines, nl);
    }

    out.push_str("GR");
    out.push_str(nl);
    stats.blocks_out += 1;
}

fn write_passthrough(out: &mut String, block: &Block, lines: &Lines, nl: &str) {
    for &id in &block.passthrough {
        out.push_str(lines.content(id));
        out.push_str(nl);
    }
}

/// True when the prefix's last line is exactly `clip` (not merely a
/// line that happens to end in those letters).
fn ends_with_clip(prefix: &str, nl: &str) -> bool {
    let tail = format!("clip{nl}");
    prefix == tail || prefix.ends_with(&format!("{nl}{tail}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_tail_detection() {
        assert!(ends_with_clip("clip\n", "\n"));
        assert!(ends_with_clip("0 setgray\n0 0 M\nclip\n", "\n"));
        assert!(!ends_with_clip("0 setgray\n", "\n"));
        assert!(!ends_with_clip("W eoclip\n", "\n"));
        assert!(!ends_with_clip("clip\n0 setgray\n", "\n"));
    }
}
