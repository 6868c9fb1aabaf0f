//! Quadrature direction decoding.
//!
//! The decoder looks only at whether the two channels agreed before and
//! after a transition, not at which channel moved:
//!
//! | before | after | direction |
//! |--------|-------|-----------|
//! | A == B | A == B | CCW |
//! | A == B | A != B | CW |
//! | A != B | A == B | CW |
//! | A != B | A != B | CCW |
//!
//! This two-case rule is not a full 4-state Gray-code decoder and can
//! disagree with one for some sequences (e.g. a simultaneous flip of both
//! channels). Deployed readings depend on exactly this rule, so it is kept
//! as is.
//!
//! # Example
//!
//! ```rust
//! use quad_tach::decoder::{decode, Direction};
//!
//! // A rises while B stays low: pair goes from matched to unmatched.
//! assert_eq!(decode(false, false, true, false), Direction::Cw);
//!
//! // B follows A high: unmatched to matched.
//! assert_eq!(decode(true, false, true, true), Direction::Cw);
//! ```

use crate::traits::ChannelPair;

/// Shaft rotation direction.
///
/// There is no "unknown" value: before the first transition the direction
/// is [`Ccw`](Self::Ccw).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum Direction {
    /// Clockwise.
    Cw,
    /// Counter-clockwise.
    #[default]
    Ccw,
}

impl Direction {
    /// Label printed on the status line.
    ///
    /// # Examples
    ///
    /// ```
    /// use quad_tach::Direction;
    ///
    /// assert_eq!(Direction::Cw.label(), "CW");
    /// assert_eq!(Direction::Ccw.label(), "CCW");
    /// ```
    #[inline]
    pub const fn label(&self) -> &'static str {
        match self {
            Direction::Cw => "CW",
            Direction::Ccw => "CCW",
        }
    }

    /// Parse a status line label. Input is trimmed and case-insensitive.
    ///
    /// # Examples
    ///
    /// ```
    /// use quad_tach::Direction;
    ///
    /// assert_eq!(Direction::from_label("CW"), Some(Direction::Cw));
    /// assert_eq!(Direction::from_label(" ccw\n"), Some(Direction::Ccw));
    /// assert_eq!(Direction::from_label("forward"), None);
    /// ```
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("cw") {
            Some(Direction::Cw)
        } else if s.eq_ignore_ascii_case("ccw") {
            Some(Direction::Ccw)
        } else {
            None
        }
    }
}

/// Direction of a transition from `(prev_a, prev_b)` to `(cur_a, cur_b)`.
///
/// Only meaningful when at least one bit changed. Pure and O(1).
#[inline]
pub const fn decode(prev_a: bool, prev_b: bool, cur_a: bool, cur_b: bool) -> Direction {
    let was_matched = prev_a == prev_b;
    let is_matched = cur_a == cur_b;
    if was_matched == is_matched {
        Direction::Ccw
    } else {
        Direction::Cw
    }
}

/// [`decode`] over sampled channel pairs.
#[inline]
pub const fn decode_pair(prev: ChannelPair, cur: ChannelPair) -> Direction {
    decode(prev.a, prev.b, cur.a, cur.b)
}
