//! End-to-end tests over whole synthetic EPS documents.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use epsclean::{clean_file, clean_str, CleanConfig};

const PROLOG: &str = "%!PS-Adobe-3.0 EPSF-3.0\n%%BoundingBox: 0 0 100 100\n%%EndPageSetup\n";
const TRAILER: &str = "%%Trailer\nend showpage\n";

fn doc(body: &str) -> String {
    format!("{PROLOG}{body}{TRAILER}")
}

fn clean(body: &str, config: &CleanConfig) -> String {
    clean_str(&doc(body), config).output
}

fn combine() -> CleanConfig {
    CleanConfig {
        combine_areas: true,
        ..CleanConfig::default()
    }
}

// -- Scenario: trivial passthrough ------------------------------------

#[test]
fn trivial_block_gains_stroke() {
    let out = clean("GS\n1 setlinewidth\nN\n0 0 M\n1 1 L\nGR\n", &CleanConfig::default());
    assert_eq!(
        out,
        doc("GS\n1 setlinewidth\nN\n0 0 M\n1 1 L\nS\nGR\n"),
    );
}

// -- Scenario: segment rejoining --------------------------------------

#[test]
fn consecutive_segments_rejoin() {
    let body = "GS\n1 setlinewidth\nN\n0 0 M\n1 0 L\nGR\n\
                GS\n1 setlinewidth\nN\n1 0 M\n2 0 L\nGR\n";
    let out = clean(body, &CleanConfig::default());
    assert_eq!(
        out,
        doc("GS\n1 setlinewidth\nN\n0 0 M\n1 0 L\n2 0 L\nS\nGR\n"),
    );
}

#[test]
fn duplicate_segments_collapse() {
    let body = "GS\n1 setlinewidth\nN\n0 0 M\n1 0 L\nGR\n\
                GS\n1 setlinewidth\nN\n0 0 M\n1 0 L\nGR\n";
    let out = clean(body, &CleanConfig::default());
    assert_eq!(out, doc("GS\n1 setlinewidth\nN\n0 0 M\n1 0 L\nS\nGR\n"));
}

// -- Scenario: closed polygon ----------------------------------------

#[test]
fn closed_polygon_survives_combining() {
    let body = "GS\n0 setgray\nN\n0 0 M\n1 0 L\n1 1 L\n0 1 L\ncp\nf\nGR\n";
    let out = clean(body, &combine());
    assert_eq!(
        out,
        doc("GS\n0 setgray\nN\n0 0 M\n1 0 L\n1 1 L\n0 1 L\ncp\nf\nGR\n"),
    );
}

// -- Scenario: two touching squares ----------------------------------

const SQUARES: &str = "GS\n0 setgray\nN\n0 0 M\n1 0 L\n1 1 L\n0 1 L\ncp\nf\nGR\n\
                       GS\n0 setgray\nN\n1 0 M\n2 0 L\n2 1 L\n1 1 L\ncp\nf\nGR\n";

#[test]
fn touching_squares_merge_when_combining() {
    let result = clean_str(&doc(SQUARES), &combine());
    assert_eq!(
        result.output,
        doc("GS\n0 setgray\nN\n0 0 M\n1 0 L\n2 0 L\n2 1 L\n1 1 L\n0 1 L\ncp\nf\nGR\n"),
    );
    assert_eq!(result.stats.polygons_in, 2);
    assert_eq!(result.stats.polygons_merged, 1);
}

#[test]
fn touching_squares_stay_apart_by_default() {
    let out = clean(SQUARES, &CleanConfig::default());
    // Opaque passthrough: both rectangles replayed verbatim, grouped
    // under their shared prefix.
    assert_eq!(
        out,
        doc("GS\n0 setgray\nN\n0 0 M\n1 0 L\n1 1 L\n0 1 L\ncp\nf\n\
             1 0 M\n2 0 L\n2 1 L\n1 1 L\ncp\nf\nGR\n"),
    );
}

// -- Scenario: Z-order ------------------------------------------------

const RED_GREEN_RED: &str = "GS\n1 0 0 setrgbcolor\nN\n0 0 M\n1 0 L\nGR\n\
                             GS\n0 1 0 setrgbcolor\nN\n5 5 M\n6 5 L\nGR\n\
                             GS\n1 0 0 setrgbcolor\nN\n1 0 M\n2 0 L\nGR\n";

#[test]
fn soft_grouping_preserves_z_order() {
    let config = CleanConfig {
        group_soft: true,
        ..CleanConfig::default()
    };
    let out = clean(RED_GREEN_RED, &config);
    assert_eq!(
        out,
        doc("GS\n1 0 0 setrgbcolor\nN\n0 0 M\n1 0 L\nS\nGR\n\
             GS\n0 1 0 setrgbcolor\nN\n5 5 M\n6 5 L\nS\nGR\n\
             GS\n1 0 0 setrgbcolor\nN\n1 0 M\n2 0 L\nS\nGR\n"),
    );
}

#[test]
fn strict_grouping_unifies_across_z_order() {
    let out = clean(RED_GREEN_RED, &CleanConfig::default());
    assert_eq!(
        out,
        doc("GS\n1 0 0 setrgbcolor\nN\n0 0 M\n1 0 L\n2 0 L\nS\nGR\n\
             GS\n0 1 0 setrgbcolor\nN\n5 5 M\n6 5 L\nS\nGR\n"),
    );
}

#[test]
fn soft_grouping_still_coalesces_runs() {
    let body = "GS\nA\nN\n0 0 M\n1 0 L\nGR\n\
                GS\nA\nN\n1 0 M\n2 0 L\nGR\n\
                GS\nB\nN\n5 5 M\n6 5 L\nGR\n";
    let config = CleanConfig {
        group_soft: true,
        ..CleanConfig::default()
    };
    let out = clean(body, &config);
    assert_eq!(
        out,
        doc("GS\nA\nN\n0 0 M\n1 0 L\n2 0 L\nS\nGR\n\
             GS\nB\nN\n5 5 M\n6 5 L\nS\nGR\n"),
    );
}

// -- Scenario: clip paths ---------------------------------------------

#[test]
fn clip_path_folds_into_prefix() {
    let body = "GS\n0 setgray\nN\n0 0 M\n100 0 L\n100 100 L\ncp\nclip\n5 5 M\n10 10 L\nGR\n";
    let out = clean(body, &CleanConfig::default());
    assert_eq!(
        out,
        doc("GS\n0 setgray\n0 0 M\n100 0 L\n100 100 L\ncp\nclip\nN\n5 5 M\n10 10 L\nS\nGR\n"),
    );
}

#[test]
fn clip_prefix_suppresses_newpath_for_opaque_content() {
    let body = "GS\n0 setgray\nN\n0 0 M\n100 0 L\ncp\nclip\n(label) show\nGR\n";
    let out = clean(body, &CleanConfig::default());
    assert_eq!(
        out,
        doc("GS\n0 setgray\n0 0 M\n100 0 L\ncp\nclip\n(label) show\nGR\n"),
    );
}

#[test]
fn blocks_group_under_clip_extended_key() {
    // Identical clip paths on both blocks: same re-keyed prefix, so
    // the segments coalesce into one block.
    let clip_block = |seg: &str| {
        format!("GS\n0 setgray\nN\n0 0 M\n100 0 L\ncp\nclip\n{seg}\nGR\n")
    };
    let body = format!(
        "{}{}",
        clip_block("5 5 M\n6 5 L"),
        clip_block("6 5 M\n7 5 L"),
    );
    let out = clean(&body, &CleanConfig::default());
    assert_eq!(
        out,
        doc("GS\n0 setgray\n0 0 M\n100 0 L\ncp\nclip\nN\n5 5 M\n6 5 L\n7 5 L\nS\nGR\n"),
    );
}

// -- Scenario: box removal --------------------------------------------

#[test]
fn remove_boxes_discards_rect_blocks() {
    let body = "GS\n0 setgray\nN\n0 0 10 10 re\nf\nGR\n\
                GS\n1 setlinewidth\nN\n0 0 M\n1 1 L\nGR\n";
    let config = CleanConfig {
        remove_boxes: true,
        ..CleanConfig::default()
    };
    let out = clean(body, &config);
    assert!(!out.contains("re"), "rect operator leaked: {out}");
    assert_eq!(out, doc("GS\n1 setlinewidth\nN\n0 0 M\n1 1 L\nS\nGR\n"));
}

#[test]
fn remove_boxes_discards_clip_box_blocks() {
    // An axis-frame box used as a clip path: the whole block goes,
    // clipping path included, even though the clip re-keys the block
    // after the disqualifying rect.
    let body = "GS\n0 setgray\nN\n0 0 10 10 re\nclip\n5 5 M\n6 6 L\nGR\n";
    let config = CleanConfig {
        remove_boxes: true,
        ..CleanConfig::default()
    };
    let out = clean(body, &config);
    assert_eq!(out, doc(""));
}

#[test]
fn rect_blocks_pass_through_by_default() {
    let body = "GS\n0 setgray\nN\n0 0 10 10 re\nf\nGR\n";
    let out = clean(body, &CleanConfig::default());
    assert_eq!(out, doc("GS\n0 setgray\nN\n0 0 10 10 re\nf\nGR\n"));
}

// -- Invariants --------------------------------------------------------

#[test]
fn prolog_and_trailer_are_byte_identical() {
    let body = "junk between setup and first block\n\
                GS\n1 setlinewidth\nN\n0 0 M\n1 1 L\nGR\n\
                more junk\n";
    let out = clean(body, &CleanConfig::default());
    assert!(out.starts_with(PROLOG));
    assert!(out.ends_with(TRAILER));
    // Idle lines stream through in order, before the deferred blocks.
    assert!(out.contains("junk between setup and first block\nmore junk\n"));
}

#[test]
fn unknown_content_lines_are_preserved() {
    let body = "GS\n1 setlinewidth\nN\n0 0 M\n1 1 L\n%%CustomMarker data\n(text) show\nGR\n";
    let out = clean(body, &CleanConfig::default());
    assert_eq!(out.matches("%%CustomMarker data\n").count(), 1);
    assert_eq!(out.matches("(text) show\n").count(), 1);
}

#[test]
fn bitmap_region_passes_through_untokenized() {
    // The region's payload lines would classify as operators; they
    // must not be interpreted.
    let body = "GS\n0 setgray\nN\n%AXGBegin 2 2\n0 0 M\nGR\n%AXGEnd\n0 0 M\n1 1 L\nGR\n";
    let out = clean(body, &CleanConfig::default());
    assert!(
        out.contains("%AXGBegin 2 2\n0 0 M\nGR\n%AXGEnd\n"),
        "bitmap region mangled: {out}"
    );
    assert!(out.contains("N\n0 0 M\n1 1 L\nS\n"), "{out}");
}

#[test]
fn bitmap_region_in_prefix_keeps_blocks_distinct() {
    let block = |payload: &str| {
        format!("GS\n%AXGBegin 1 1\n{payload}\n%AXGEnd\nN\n0 0 M\n1 1 L\nGR\n")
    };
    let body = format!("{}{}", block("aa"), block("bb"));
    let out = clean(&body, &CleanConfig::default());
    // Different raw payload = different prefix = two blocks.
    assert_eq!(out.matches("GS\n").count(), 2);
}

#[test]
fn idempotent_with_default_options() {
    let body = format!("{SQUARES}{RED_GREEN_RED}");
    let config = CleanConfig::default();
    let once = clean_str(&doc(&body), &config).output;
    let twice = clean_str(&once, &config).output;
    assert_eq!(once, twice);
}

#[test]
fn idempotent_with_all_options() {
    let body = format!(
        "{SQUARES}{RED_GREEN_RED}GS\n0 setgray\nN\n0 0 M\n100 0 L\ncp\nclip\n5 5 M\n10 10 L\nGR\n"
    );
    let config = CleanConfig {
        remove_boxes: true,
        group_soft: true,
        combine_areas: true,
        dash_linecap: false,
    };
    let once = clean_str(&doc(&body), &config).output;
    let twice = clean_str(&once, &config).output;
    assert_eq!(once, twice);
}

#[test]
fn crlf_input_keeps_crlf_output() {
    let body = "GS\r\n1 setlinewidth\r\nN\r\n0 0 M\r\n1 1 L\r\nGR\r\n";
    let text = format!(
        "%!PS\r\n%%EndPageSetup\r\n{body}%%Trailer\r\nend\r\n"
    );
    let out = clean_str(&text, &CleanConfig::default()).output;
    assert_eq!(
        out,
        "%!PS\r\n%%EndPageSetup\r\nGS\r\n1 setlinewidth\r\nN\r\n0 0 M\r\n1 1 L\r\nS\r\nGR\r\n%%Trailer\r\nend\r\n"
    );
}

#[test]
fn preserved_fill_without_closepath() {
    // An f with no preceding cp is kept in the passthrough list; the
    // emitter's own f comes first. Reproduces source behavior.
    let body = "GS\n0 setgray\nN\n0 0 M\n1 0 L\n1 1 L\nf\nGR\n";
    let out = clean(body, &combine());
    assert!(out.contains("N\n0 0 M\n1 0 L\n1 1 L\nf\nf\nGR\n"), "{out}");
}

// -- File-level entry point -------------------------------------------

struct TestDir {
    path: PathBuf,
}

impl TestDir {
    fn new(tag: &str) -> Self {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let path =
            std::env::temp_dir().join(format!("epsclean_{tag}_{}_{}", std::process::id(), ts));
        fs::create_dir_all(&path).expect("create temp test dir");
        Self { path }
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

#[test]
fn in_place_rewrite_replaces_input() {
    let dir = TestDir::new("inplace");
    let input = dir.path.join("figure.eps");
    fs::write(&input, doc("GS\n1 setlinewidth\nN\n0 0 M\n1 1 L\nGR\n")).expect("write input");

    let stats = clean_file(&input, None, &CleanConfig::default()).expect("clean in place");
    assert_eq!(stats.blocks_in, 1);

    let rewritten = fs::read_to_string(&input).expect("read rewritten input");
    assert_eq!(rewritten, doc("GS\n1 setlinewidth\nN\n0 0 M\n1 1 L\nS\nGR\n"));
    // No leftover temp file.
    let names: Vec<_> = fs::read_dir(&dir.path)
        .expect("list test dir")
        .map(|e| e.expect("dir entry").file_name())
        .collect();
    assert_eq!(names, vec!["figure.eps"]);
}

#[test]
fn separate_output_leaves_input_untouched() {
    let dir = TestDir::new("output");
    let input = dir.path.join("figure.eps");
    let output = dir.path.join("clean.eps");
    let original = doc("GS\n1 setlinewidth\nN\n0 0 M\n1 1 L\nGR\n");
    fs::write(&input, &original).expect("write input");

    clean_file(&input, Some(&output), &CleanConfig::default()).expect("clean to output");

    assert_eq!(fs::read_to_string(&input).expect("read input"), original);
    let cleaned = fs::read_to_string(&output).expect("read output");
    assert!(cleaned.contains("S\nGR\n"));
}

#[test]
fn missing_input_reports_read_error() {
    let dir = TestDir::new("missing");
    let input = dir.path.join("nope.eps");
    let err = clean_file(&input, None, &CleanConfig::default()).unwrap_err();
    assert!(err.to_string().contains("failed to read"));
}
