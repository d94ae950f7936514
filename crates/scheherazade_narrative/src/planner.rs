//! Segment planning: pure arithmetic over a page target.
//!
//! Long targets are split into fixed-size segments so each continuity
//! analysis covers a manageable amount of text; the trade favors
//! analysis quality over call count.

use derive_getters::Getters;
use tracing::debug;

/// Page count at or above which a run is split into multiple segments.
pub const LONG_FORM_THRESHOLD: u32 = 50;

/// Pages per segment for long-form runs.
pub const LONG_SEGMENT_PAGES: u32 = 10;

/// A generation plan: how many segments, and how large.
///
/// Guarantees `segment_count * pages_per_segment >= target_pages` and
/// `segment_count >= 1`. The final segment carries the remainder and is
/// never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Getters)]
pub struct SegmentPlan {
    /// Number of segments to generate
    segment_count: u32,
    /// Nominal pages per segment
    pages_per_segment: u32,
    /// The (clamped) page target this plan covers
    target_pages: u32,
}

impl SegmentPlan {
    /// Pages assigned to segment `index` (0-based).
    ///
    /// All segments carry `pages_per_segment` except the last, which
    /// carries the remainder when the target is not an exact multiple.
    pub fn pages_for(&self, index: u32) -> u32 {
        if index + 1 < self.segment_count {
            self.pages_per_segment
        } else {
            let before_last = self.pages_per_segment * (self.segment_count - 1);
            self.target_pages - before_last
        }
    }

    /// True when this plan enters the multi-segment path.
    pub fn is_multi_segment(&self) -> bool {
        self.segment_count > 1
    }
}

/// Compute a segment plan for the given page target.
///
/// Targets at or above [`LONG_FORM_THRESHOLD`] split into
/// [`LONG_SEGMENT_PAGES`]-page segments; below it a single segment
/// carries the whole target. Non-positive targets clamp to one
/// full-length segment.
///
/// # Examples
///
/// ```
/// use scheherazade_narrative::planner::plan;
///
/// let p = plan(80);
/// assert_eq!(*p.segment_count(), 8);
/// assert_eq!(*p.pages_per_segment(), 10);
///
/// let p = plan(12);
/// assert_eq!(*p.segment_count(), 1);
/// ```
pub fn plan(target_pages: i64) -> SegmentPlan {
    if target_pages <= 0 {
        debug!(target_pages, "Degenerate page target, clamping to one segment");
        return SegmentPlan {
            segment_count: 1,
            pages_per_segment: LONG_SEGMENT_PAGES,
            target_pages: LONG_SEGMENT_PAGES,
        };
    }

    let target = target_pages as u32;
    if target < LONG_FORM_THRESHOLD {
        return SegmentPlan {
            segment_count: 1,
            pages_per_segment: target,
            target_pages: target,
        };
    }

    let segment_count = target.div_ceil(LONG_SEGMENT_PAGES);
    debug!(
        target_pages = target,
        segment_count,
        pages_per_segment = LONG_SEGMENT_PAGES,
        "Planned multi-segment run"
    );

    SegmentPlan {
        segment_count,
        pages_per_segment: LONG_SEGMENT_PAGES,
        target_pages: target,
    }
}
