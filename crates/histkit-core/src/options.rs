//! Axis boundary options
//!
//! An axis can carry four independent boundary behaviours. They are stored
//! as bitflags so that a combined option is simply the union of its parts,
//! and every operation here is a `const fn` so option values can be fixed at
//! compile time:
//!
//! ```rust
//! use histkit_core::{get_option, AxisOptions};
//!
//! const WRAPPING: AxisOptions = get_option::<false, true, true, false>();
//! assert!(WRAPPING.circular());
//! assert!(!WRAPPING.underflow());
//! ```
//!
//! Whether a combination is meaningful for a particular axis kind (growth
//! together with circular indexing, for example) is decided by the axis
//! constructors, not here.

use bitflags::bitflags;

bitflags! {
    /// Boundary behaviours of a single axis
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AxisOptions: u8 {
        /// An extra bin below the first inner bin
        const UNDERFLOW = 0b0001;
        /// An extra bin above the last inner bin
        const OVERFLOW = 0b0010;
        /// Coordinates wrap around the axis range
        const CIRCULAR = 0b0100;
        /// The axis extends itself to cover out-of-range coordinates
        const GROWTH = 0b1000;
    }
}

impl AxisOptions {
    /// No boundary behaviour at all
    pub const NONE: Self = Self::empty();

    /// Underflow and overflow bins, the default for numeric axes
    pub const DEFAULT: Self = Self::UNDERFLOW.union(Self::OVERFLOW);

    /// Whether an underflow bin is present
    #[inline]
    pub const fn underflow(self) -> bool {
        self.contains(Self::UNDERFLOW)
    }

    /// Whether an overflow bin is present
    #[inline]
    pub const fn overflow(self) -> bool {
        self.contains(Self::OVERFLOW)
    }

    /// Whether coordinates wrap around
    #[inline]
    pub const fn circular(self) -> bool {
        self.contains(Self::CIRCULAR)
    }

    /// Whether the axis may grow
    #[inline]
    pub const fn growth(self) -> bool {
        self.contains(Self::GROWTH)
    }

    /// Number of flow bins added to the inner bins (0, 1 or 2)
    #[inline]
    pub const fn flow_bins(self) -> usize {
        self.underflow() as usize + self.overflow() as usize
    }
}

impl Default for AxisOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[inline]
const fn select(enabled: bool, option: AxisOptions) -> AxisOptions {
    if enabled {
        option
    } else {
        AxisOptions::NONE
    }
}

/// Compose an option value from four compile-time switches
///
/// Each enabled switch contributes its option, each disabled one contributes
/// the neutral value; the result is their union.
pub const fn get_option<
    const UNDERFLOW: bool,
    const OVERFLOW: bool,
    const CIRCULAR: bool,
    const GROWTH: bool,
>() -> AxisOptions {
    select(UNDERFLOW, AxisOptions::UNDERFLOW)
        .union(select(OVERFLOW, AxisOptions::OVERFLOW))
        .union(select(CIRCULAR, AxisOptions::CIRCULAR))
        .union(select(GROWTH, AxisOptions::GROWTH))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected(u: bool, o: bool, c: bool, g: bool) -> AxisOptions {
        let mut opts = AxisOptions::NONE;
        if u {
            opts |= AxisOptions::UNDERFLOW;
        }
        if o {
            opts |= AxisOptions::OVERFLOW;
        }
        if c {
            opts |= AxisOptions::CIRCULAR;
        }
        if g {
            opts |= AxisOptions::GROWTH;
        }
        opts
    }

    macro_rules! check_combinations {
        ($(($u:literal, $o:literal, $c:literal, $g:literal)),+ $(,)?) => {
            $(
                assert_eq!(
                    get_option::<$u, $o, $c, $g>(),
                    expected($u, $o, $c, $g),
                    "combination u={} o={} c={} g={}", $u, $o, $c, $g
                );
            )+
        };
    }

    #[test]
    fn test_all_combinations_are_unions() {
        check_combinations!(
            (false, false, false, false),
            (false, false, false, true),
            (false, false, true, false),
            (false, false, true, true),
            (false, true, false, false),
            (false, true, false, true),
            (false, true, true, false),
            (false, true, true, true),
            (true, false, false, false),
            (true, false, false, true),
            (true, false, true, false),
            (true, false, true, true),
            (true, true, false, false),
            (true, true, false, true),
            (true, true, true, false),
            (true, true, true, true),
        );
    }

    #[test]
    fn test_const_evaluation() {
        const NONE: AxisOptions = get_option::<false, false, false, false>();
        const ALL: AxisOptions = get_option::<true, true, true, true>();
        assert_eq!(NONE, AxisOptions::NONE);
        assert_eq!(ALL, AxisOptions::all());
        assert_eq!(NONE.flow_bins(), 0);
        assert_eq!(ALL.flow_bins(), 2);
    }

    #[test]
    fn test_predicates() {
        let opts = AxisOptions::OVERFLOW | AxisOptions::GROWTH;
        assert!(!opts.underflow());
        assert!(opts.overflow());
        assert!(!opts.circular());
        assert!(opts.growth());
        assert_eq!(opts.flow_bins(), 1);
        assert_eq!(AxisOptions::default(), AxisOptions::DEFAULT);
    }
}
