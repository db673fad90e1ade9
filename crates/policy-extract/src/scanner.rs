//! Low-level text scanners used by the extractor.
//!
//! Two grammars are recognised:
//!
//! * a fenced block: the opener "```json", a body, and the next "```";
//! * a balanced JSON object: `{` ... `}` where braces and brackets nest
//!   correctly and any delimiter inside a string literal is ignored.
//!
//! Both work on byte offsets. Every delimiter is ASCII, so offsets always
//! fall on UTF-8 character boundaries.

use std::ops::ControlFlow;

/// Opening marker of a fenced JSON block.
pub const FENCE_OPEN: &str = "```json";
/// Closing marker of a fenced block.
pub const FENCE_CLOSE: &str = "```";

// ---------------------------------------------------------------------------
// Fenced blocks
// ---------------------------------------------------------------------------

/// A fenced block located in a larger text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FencedBlock<'a> {
    /// The raw body between the opener and the closing fence.
    pub body: &'a str,
    /// Byte offset of the opener.
    pub offset: usize,
}

/// Return the first fenced JSON block in `text`, if it is closed.
///
/// Only the first opener is considered: any later closing fence would end
/// the first block anyway, so a missing close means there is no block.
pub fn fenced_block(text: &str) -> Option<FencedBlock<'_>> {
    let offset = text.find(FENCE_OPEN)?;
    let body_start = offset + FENCE_OPEN.len();
    let body_len = text[body_start..].find(FENCE_CLOSE)?;
    Some(FencedBlock {
        body: &text[body_start..body_start + body_len],
        offset,
    })
}

// ---------------------------------------------------------------------------
// Balanced objects
// ---------------------------------------------------------------------------

/// A balanced JSON object located in a larger text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSpan<'a> {
    /// The object text, from its `{` to the matching `}` inclusive.
    pub text: &'a str,
    /// Byte offset of the opening brace.
    pub offset: usize,
    /// Keys found at the object's top level, in order of appearance. Raw
    /// string contents; escapes are not decoded.
    pub keys: Vec<&'a str>,
}

impl ObjectSpan<'_> {
    /// Whether the top-level keys contain `first` and, somewhere after it,
    /// `then`.
    pub fn has_keys_in_order(&self, first: &str, then: &str) -> bool {
        self.keys
            .iter()
            .position(|k| *k == first)
            .is_some_and(|pos| self.keys[pos + 1..].iter().any(|k| *k == then))
    }
}

/// The balanced object with the lowest offset whose top level has a `first`
/// key followed by a `then` key.
///
/// Nested objects are candidates too, so a policy wrapped in an outer object
/// is still found. The text is scanned once.
pub fn first_object_with_keys<'a>(
    text: &'a str,
    first: &str,
    then: &str,
) -> Option<ObjectSpan<'a>> {
    let mut best: Option<ObjectSpan<'a>> = None;
    scan_objects(text, |span, open| {
        if span.has_keys_in_order(first, then)
            && best.as_ref().map_or(true, |b| span.offset < b.offset)
        {
            best = Some(span);
        }
        // Only an enclosing object, still open, can start earlier.
        if best.is_some() && open == 0 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    best
}

/// An open `{` or `[` on the scan stack.
struct Frame<'a> {
    open: u8,
    offset: usize,
    keys: Vec<&'a str>,
    // Set after `{` or `,`, where the next string is a key.
    expect_key: bool,
}

/// Single pass over `text`, calling `visit` with every balanced object as its
/// closing brace is reached, together with the number of frames still open.
///
/// Outside any open object quotes are prose and are skipped. A closer that
/// does not match its opener discards every open frame. An unterminated
/// string literal ends the scan.
fn scan_objects<'a, F>(text: &'a str, mut visit: F)
where
    F: FnMut(ObjectSpan<'a>, usize) -> ControlFlow<()>,
{
    let bytes = text.as_bytes();
    let mut stack: Vec<Frame<'a>> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' if !stack.is_empty() => {
                let Some(end) = string_end(bytes, i) else {
                    return;
                };
                if let Some(top) = stack.last_mut() {
                    if top.open == b'{' && top.expect_key {
                        top.keys.push(&text[i + 1..end]);
                        top.expect_key = false;
                    }
                }
                i = end;
            }
            open @ (b'{' | b'[') => stack.push(Frame {
                open,
                offset: i,
                keys: Vec::new(),
                expect_key: open == b'{',
            }),
            close @ (b'}' | b']') => match stack.pop() {
                Some(frame) if (frame.open, close) == (b'{', b'}') => {
                    let span = ObjectSpan {
                        text: &text[frame.offset..=i],
                        offset: frame.offset,
                        keys: frame.keys,
                    };
                    if visit(span, stack.len()).is_break() {
                        return;
                    }
                }
                Some(frame) if (frame.open, close) == (b'[', b']') => {}
                Some(_) => stack.clear(),
                None => {}
            },
            b',' => {
                if let Some(top) = stack.last_mut() {
                    top.expect_key = top.open == b'{';
                }
            }
            _ => {}
        }
        i += 1;
    }
}

/// Index of the quote closing the string literal that opens at `start`.
fn string_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}
