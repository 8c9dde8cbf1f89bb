use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Widest pattern the compiled masks can hold.
///
/// Longer patterns keep their last `MAX_PATTERN_WIDTH` positions; earlier
/// positions shift out of the masks.
pub const MAX_PATTERN_WIDTH: u32 = 64;

/// A compiled ternary identifier pattern.
///
/// Each pattern position is one of:
/// - `'1'`: the identifier bit must be set
/// - `'0'`: the identifier bit must be clear
/// - anything else (`x`, `*`, `_`, ...): no constraint
///
/// The leftmost character maps to the most significant bit of the pattern
/// width. Compilation happens once; [`FilterPattern::matches`] is two mask
/// comparisons with no per-bit loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FilterPattern {
    ones: u64,
    zeros: u64,
    width: u32,
}

impl FilterPattern {
    /// Compile a pattern string. Never fails.
    pub fn compile(pattern: &str) -> Self {
        let mut ones = 0u64;
        let mut zeros = 0u64;
        let mut width = 0u32;

        for c in pattern.chars() {
            ones <<= 1;
            zeros <<= 1;
            match c {
                '1' => ones |= 1,
                '0' => zeros |= 1,
                _ => {}
            }
            width = width.saturating_add(1);
        }

        Self {
            ones,
            zeros,
            width: width.min(MAX_PATTERN_WIDTH),
        }
    }

    /// Returns true if `id` satisfies every constrained position.
    pub fn matches(&self, id: u32) -> bool {
        let candidate = u64::from(id);

        let inverted = candidate ^ self.width_mask();
        if inverted & self.zeros != self.zeros {
            return false;
        }

        candidate & self.ones == self.ones
    }

    /// Positions required to be `1`.
    pub fn ones(&self) -> u64 {
        self.ones
    }

    /// Positions required to be `0`.
    pub fn zeros(&self) -> u64 {
        self.zeros
    }

    /// Number of pattern positions held by the masks.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// True when no position is constrained.
    pub fn is_wildcard(&self) -> bool {
        self.ones == 0 && self.zeros == 0
    }

    fn width_mask(&self) -> u64 {
        if self.width >= MAX_PATTERN_WIDTH {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }
}

impl fmt::Display for FilterPattern {
    /// Renders the compiled pattern with `x` for unconstrained positions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pos in (0..self.width).rev() {
            let bit = 1u64 << pos;
            let c = if self.ones & bit != 0 {
                '1'
            } else if self.zeros & bit != 0 {
                '0'
            } else {
                'x'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl FromStr for FilterPattern {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::compile(s))
    }
}

impl From<&str> for FilterPattern {
    fn from(pattern: &str) -> Self {
        Self::compile(pattern)
    }
}
