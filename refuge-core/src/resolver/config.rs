use thiserror::Error;

/// Default radius of the primary attempt, in metres.
pub const DEFAULT_PRIMARY_RADIUS_METERS: u32 = 700;
/// Default radius of the fallback attempt, in metres.
pub const DEFAULT_FALLBACK_RADIUS_METERS: u32 = 500;
/// Default maximum number of candidates sent to the distance provider.
pub const DEFAULT_CANDIDATE_CAP: usize = 25;

/// Tunables for [`crate::Resolver`].
///
/// # Examples
/// ```
/// use refuge_core::ResolverConfig;
///
/// let config = ResolverConfig::new(1_000, 600, 10)?;
/// assert_eq!(config.candidate_cap(), 10);
///
/// assert!(ResolverConfig::new(500, 700, 10).is_err());
/// # Ok::<(), refuge_core::ResolverConfigError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    primary_radius_meters: u32,
    fallback_radius_meters: u32,
    candidate_cap: usize,
}

/// Errors returned by [`ResolverConfig::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolverConfigError {
    /// A zero cap would never allow a provider call.
    #[error("candidate cap must be at least one")]
    ZeroCandidateCap,
    /// The fallback radius must shrink the candidate set.
    #[error("fallback radius {fallback}m must be smaller than primary radius {primary}m")]
    FallbackNotNarrower {
        /// Configured primary radius.
        primary: u32,
        /// Configured fallback radius.
        fallback: u32,
    },
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            primary_radius_meters: DEFAULT_PRIMARY_RADIUS_METERS,
            fallback_radius_meters: DEFAULT_FALLBACK_RADIUS_METERS,
            candidate_cap: DEFAULT_CANDIDATE_CAP,
        }
    }
}

impl ResolverConfig {
    /// Validate and construct a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverConfigError::ZeroCandidateCap`] when `candidate_cap`
    /// is zero and [`ResolverConfigError::FallbackNotNarrower`] unless the
    /// fallback radius is strictly smaller than the primary radius.
    pub const fn new(
        primary_radius_meters: u32,
        fallback_radius_meters: u32,
        candidate_cap: usize,
    ) -> Result<Self, ResolverConfigError> {
        if candidate_cap == 0 {
            return Err(ResolverConfigError::ZeroCandidateCap);
        }
        if fallback_radius_meters >= primary_radius_meters {
            return Err(ResolverConfigError::FallbackNotNarrower {
                primary: primary_radius_meters,
                fallback: fallback_radius_meters,
            });
        }
        Ok(Self {
            primary_radius_meters,
            fallback_radius_meters,
            candidate_cap,
        })
    }

    /// Radius of the primary attempt, in metres.
    #[must_use]
    pub const fn primary_radius_meters(&self) -> u32 {
        self.primary_radius_meters
    }

    /// Radius of the fallback attempt, in metres.
    #[must_use]
    pub const fn fallback_radius_meters(&self) -> u32 {
        self.fallback_radius_meters
    }

    /// Maximum number of candidates handed to the provider.
    #[must_use]
    pub const fn candidate_cap(&self) -> usize {
        self.candidate_cap
    }
}
