//! Greedy partitioning of transcript segments into retrieval chunks.

use crate::store::Segment;
use std::ops::Range;

/// A chunk before embedding: text plus the segment span it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkDraft {
    /// Start of the earliest source segment.
    pub start: f64,
    /// End of the latest source segment.
    pub end: f64,
    /// Whitespace-normalized concatenation of the source segment texts.
    pub text: String,
    /// Indices into the source segment list covered by this chunk.
    pub segments: Range<usize>,
}

/// Partitions segments into chunks bounded by duration and text length.
///
/// Greedy left-to-right: a chunk closes when adding the next segment would
/// push it past `max_seconds` or `max_chars`, whichever is crossed first.
/// Boundaries always fall on segment boundaries; a single segment larger
/// than either limit still forms its own chunk. Every segment lands in
/// exactly one chunk, so the drafts cover the transcript with no gaps or
/// overlaps.
pub fn partition(segments: &[Segment], max_seconds: f64, max_chars: usize) -> Vec<ChunkDraft> {
    let mut drafts = Vec::new();
    let mut first = 0;

    while first < segments.len() {
        let chunk_start = segments[first].start;
        let mut text = normalize(&segments[first].text);
        let mut last = first;

        for (i, segment) in segments.iter().enumerate().skip(first + 1) {
            let would_be_duration = segment.end - chunk_start;
            let addition = normalize(&segment.text);
            let would_be_chars = text.len() + 1 + addition.len();

            if would_be_duration > max_seconds || would_be_chars > max_chars {
                break;
            }

            if !addition.is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(&addition);
            }
            last = i;
        }

        drafts.push(ChunkDraft {
            start: chunk_start,
            end: segments[last].end,
            text,
            segments: first..last + 1,
        });
        first = last + 1;
    }

    drafts
}

/// Collapses all whitespace runs to single spaces and trims the ends.
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
