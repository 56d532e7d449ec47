//! water_breaks.rs: Automatic rest intervals
//!
//! One 5-minute break per full 45 minutes of drill time, counted once from raw
//! drill minutes. Break minutes are never fed back into the interval count.

use crate::duration::block_duration;
use crate::model::{Minutes, SessionBlock};

pub const WATER_BREAK_INTERVAL: Minutes = 45;
pub const WATER_BREAK_DURATION: Minutes = 5;

/// Breaks owed for `used_minutes` of drill time. Nothing is owed until the
/// first interval is exceeded.
pub fn water_breaks_needed(used_minutes: Minutes) -> u32 {
    if used_minutes <= WATER_BREAK_INTERVAL {
        return 0;
    }
    used_minutes / WATER_BREAK_INTERVAL
}

/// Insertion indices for break hints: index `i + 1` means "after block `i`".
///
/// At most one hint is recorded per block, even when a long block spans several
/// intervals; the threshold then advances by a single interval.
pub fn water_break_positions(blocks: &[SessionBlock]) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut cumulative: Minutes = 0;
    let mut next_break_at = WATER_BREAK_INTERVAL;

    for (i, block) in blocks.iter().enumerate() {
        cumulative = cumulative.saturating_add(block_duration(block));
        if cumulative >= next_break_at {
            positions.push(i + 1);
            next_break_at = next_break_at.saturating_add(WATER_BREAK_INTERVAL);
        }
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(water_breaks_needed(0), 0);
        assert_eq!(water_breaks_needed(44), 0);
        assert_eq!(water_breaks_needed(45), 0);
        assert_eq!(water_breaks_needed(46), 1);
        assert_eq!(water_breaks_needed(89), 1);
        assert_eq!(water_breaks_needed(90), 2);
        assert_eq!(water_breaks_needed(136), 3);
    }

    #[test]
    fn positions_follow_cumulative_time() {
        let blocks = vec![
            SessionBlock::single("a", "d1", 20),
            SessionBlock::single("b", "d2", 30), // 50
            SessionBlock::single("c", "d3", 30), // 80
            SessionBlock::single("d", "d4", 15), // 95
        ];
        assert_eq!(water_break_positions(&blocks), vec![2, 4]);
    }

    #[test]
    fn long_block_records_one_hint() {
        let blocks = vec![
            SessionBlock::single("a", "d1", 100),
            SessionBlock::single("b", "d2", 1),
        ];
        // threshold moves 45 -> 90 after the first block, the second block then crosses it
        assert_eq!(water_break_positions(&blocks), vec![1, 2]);
    }

    #[test]
    fn no_blocks_no_positions() {
        assert!(water_break_positions(&[]).is_empty());
    }

    #[test]
    fn huge_blocks_do_not_overflow() {
        let blocks = vec![
            SessionBlock::single("a", "d1", Minutes::MAX),
            SessionBlock::single("b", "d2", Minutes::MAX),
        ];
        assert_eq!(water_break_positions(&blocks), vec![1, 2]);
        assert_eq!(water_breaks_needed(Minutes::MAX), Minutes::MAX / WATER_BREAK_INTERVAL);
    }
}
