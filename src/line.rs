//! Line-oriented input model and token classification.
//!
//! The engine never sees characters, only whole lines. Input is split
//! once into a line table addressable by index; the prolog and trailer
//! are re-emitted as raw byte slices so their separators survive
//! untouched. Classification is by exact match, suffix, or marker
//! prefix:
//!
//! | Input line           | Kind                                  |
//! |----------------------|---------------------------------------|
//! | `GS` / `GR`          | `Gsave` / `Grestore`                  |
//! | `N`                  | `Newpath` (prefix→content boundary)   |
//! | `cp`, `f`, `S`       | `ClosePath`, `Fill`, `Stroke`         |
//! | `clip`               | `Clip`                                |
//! | `123 456 M`          | `MoveTo` (operand `"123 456"`)        |
//! | `123 456 L`          | `LineTo`                              |
//! | `0 0 10 10 re`       | `Rect`                                |
//! | `1 setlinecap`       | `SetLineCap`                          |
//! | `[4 4] 0 setdash`    | `SetDash`                             |
//! | `1 LJ`               | `LineJoin`                            |
//! | `%AXGBegin…`/`%AXGEnd…` | `BitmapBegin` / `BitmapEnd`        |
//! | `%%EndPageSetup`     | `PageSetupEnd`                        |
//! | `%%Trailer`          | `Trailer`                             |
//! | anything else        | `Other` (opaque passthrough)          |

/// Index into a [`Lines`] table.
pub type LineId = usize;

/// The input split into lines, with enough bookkeeping to recover
/// raw byte ranges (terminators included) for verbatim re-emission.
pub struct Lines<'a> {
    text: &'a str,
    /// Per line: (content end, line end). Content excludes the
    /// terminator; line end includes it. Line start is the previous
    /// line's end (or 0).
    spans: Vec<(usize, usize)>,
    newline: &'static str,
}

impl<'a> Lines<'a> {
    /// Split `text` into lines. Accepts LF and CRLF, also mixed;
    /// the dominant separator (first one seen) becomes the separator
    /// used for reconstructed output.
    pub fn split(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        let mut spans = Vec::new();
        let mut newline = None;
        let mut start = 0;

        for (i, &b) in bytes.iter().enumerate() {
            if b == b'\n' {
                let content_end = if i > start && bytes[i - 1] == b'\r' {
                    i - 1
                } else {
                    i
                };
                if newline.is_none() {
                    newline = Some(if content_end < i { "\r\n" } else { "\n" });
                }
                spans.push((content_end, i + 1));
                start = i + 1;
            }
        }
        if start < bytes.len() {
            // Final line without terminator.
            spans.push((bytes.len(), bytes.len()));
        }

        Self {
            text,
            spans,
            newline: newline.unwrap_or("\n"),
        }
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Line content without its terminator.
    pub fn content(&self, id: LineId) -> &'a str {
        let start = if id == 0 { 0 } else { self.spans[id - 1].1 };
        &self.text[start..self.spans[id].0]
    }

    /// Raw bytes of lines `from..to` (terminators included).
    pub fn raw(&self, from: LineId, to: LineId) -> &'a str {
        if from >= to {
            return "";
        }
        let start = if from == 0 { 0 } else { self.spans[from - 1].1 };
        &self.text[start..self.spans[to - 1].1]
    }

    /// The separator used for all reconstructed output.
    pub fn newline(&self) -> &'static str {
        self.newline
    }
}

/// What a line means to the engine. Everything outside the recognized
/// operator subset classifies as `Other` and passes through verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Gsave,
    Grestore,
    Newpath,
    ClosePath,
    Fill,
    Stroke,
    Clip,
    MoveTo,
    LineTo,
    Rect,
    SetLineCap,
    SetDash,
    LineJoin,
    BitmapBegin,
    BitmapEnd,
    PageSetupEnd,
    Trailer,
    Other,
}

/// Classify one line. Case-sensitive, whitespace-sensitive; exact
/// matches are checked before suffixes so `cp` never reads as a
/// `setlinecap` fragment.
pub fn classify(line: &str) -> LineKind {
    match line {
        "GS" => LineKind::Gsave,
        "GR" => LineKind::Grestore,
        "N" => LineKind::Newpath,
        "cp" => LineKind::ClosePath,
        "f" => LineKind::Fill,
        "S" => LineKind::Stroke,
        "clip" => LineKind::Clip,
        "%%EndPageSetup" => LineKind::PageSetupEnd,
        "%%Trailer" => LineKind::Trailer,
        _ => {
            if line.starts_with("%AXGBegin") {
                LineKind::BitmapBegin
            } else if line.starts_with("%AXGEnd") {
                LineKind::BitmapEnd
            } else if line.ends_with("setlinecap") {
                LineKind::SetLineCap
            } else if line.ends_with("setdash") {
                LineKind::SetDash
            } else if line.ends_with("LJ") {
                LineKind::LineJoin
            } else if line.ends_with("re") {
                LineKind::Rect
            } else if line.ends_with('M') {
                LineKind::MoveTo
            } else if line.ends_with('L') {
                LineKind::LineTo
            } else {
                LineKind::Other
            }
        }
    }
}

/// Strip the trailing operator letter and the whitespace before it:
/// `"123 456 M"` → `"123 456"`. The result is the point id — compared
/// by byte equality, never re-formatted.
pub fn operand(line: &str) -> &str {
    line[..line.len() - 1].trim_end()
}
