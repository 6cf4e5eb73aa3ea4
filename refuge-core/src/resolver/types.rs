//! Attempt states and the values a resolution reports.

use crate::Destination;

use super::config::ResolverConfig;

/// Search tier of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Tier {
    /// First attempt at the primary radius.
    Primary,
    /// The single retry at the narrower fallback radius.
    Fallback,
}

impl Tier {
    /// The tier to move to on a capacity signal, if any.
    ///
    /// # Examples
    /// ```
    /// use refuge_core::Tier;
    ///
    /// assert_eq!(Tier::Primary.next(), Some(Tier::Fallback));
    /// assert_eq!(Tier::Fallback.next(), None);
    /// ```
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Primary => Some(Self::Fallback),
            Self::Fallback => None,
        }
    }
}

/// A single ranked search at a fixed radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attempt {
    /// Search radius in metres.
    pub radius_meters: u32,
    /// Tier the attempt belongs to.
    pub tier: Tier,
}

impl Attempt {
    /// Build the attempt for `tier` under `config`.
    #[must_use]
    pub const fn new(tier: Tier, config: &ResolverConfig) -> Self {
        let radius_meters = match tier {
            Tier::Primary => config.primary_radius_meters(),
            Tier::Fallback => config.fallback_radius_meters(),
        };
        Self {
            radius_meters,
            tier,
        }
    }

    /// Whether this is the fallback attempt.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self.tier, Tier::Fallback)
    }
}

/// How a resolution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Outcome {
    /// A destination was chosen by walking distance.
    Found,
    /// No destination lies within the searched radius.
    NoneInRadius,
    /// Walking distances were unavailable; chosen by straight-line distance.
    DegradedStraightLine,
}

/// Terminal value of a resolution.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolutionResult {
    /// How the resolution ended.
    pub outcome: Outcome,
    /// Radius the result's candidates were collected at.
    ///
    /// This is the terminating attempt's radius, except when an empty
    /// fallback tier reuses the primary candidates; then it is the primary
    /// radius.
    pub radius_meters: u32,
    /// The chosen destination, absent for [`Outcome::NoneInRadius`].
    pub selected: Option<Destination>,
    /// Walking distance, or rounded straight-line distance when degraded.
    pub distance_meters: Option<u32>,
    /// Walking time as display text; only set for [`Outcome::Found`].
    pub duration_text: Option<String>,
}

impl ResolutionResult {
    /// A result reporting that `radius_meters` contained no destination.
    #[must_use]
    pub const fn none_in_radius(radius_meters: u32) -> Self {
        Self {
            outcome: Outcome::NoneInRadius,
            radius_meters,
            selected: None,
            distance_meters: None,
            duration_text: None,
        }
    }
}

/// Advisory events raised while narrowing the candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ResolutionNotice {
    /// Too many candidates or an over-quota provider; retrying closer in.
    RetryingAtSmallerRadius {
        /// Radius that produced the capacity signal.
        from_meters: u32,
        /// Radius of the retry.
        to_meters: u32,
    },
    /// The fallback set was cut down to the nearest `limit` candidates.
    CappedToNearest {
        /// Number of candidates kept.
        limit: usize,
        /// Number of candidates before truncation.
        available: usize,
    },
}

/// Full report of one resolver run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution {
    /// The terminal result.
    pub result: ResolutionResult,
    /// Notices raised along the way, in order.
    pub notices: Vec<ResolutionNotice>,
    /// Attempts taken, in order. Never more than two.
    pub attempts: Vec<Attempt>,
    /// Size of the candidate set the result was chosen from.
    pub candidate_count: usize,
}
