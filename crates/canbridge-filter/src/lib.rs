//! Ternary bitmask filter for CAN identifiers.
//!
//! A pattern such as `"101x"` or `"***_****_0000"` is compiled once into two
//! masks (`ones` and `zeros`). Matching an identifier is then two AND/compare
//! steps, independent of the pattern length.
//!
//! ```
//! use canbridge_filter::FilterPattern;
//!
//! let filter = FilterPattern::compile("101x");
//! assert!(filter.matches(0b1010));
//! assert!(filter.matches(0b1011));
//! assert!(!filter.matches(0b1110));
//! ```

pub mod pattern;
pub mod set;

pub use pattern::{FilterPattern, MAX_PATTERN_WIDTH};
pub use set::FilterSet;
