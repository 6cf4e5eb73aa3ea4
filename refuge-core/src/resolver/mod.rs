//! Two-tier resolution of the nearest evacuation destination.
//!
//! A resolution starts with a [`Tier::Primary`] attempt. A capacity signal
//! (too many candidates, or an over-quota provider) moves it to the single
//! [`Tier::Fallback`] attempt at a smaller radius. The fallback never
//! escalates again: an oversized set is truncated, and a second quota signal
//! degrades to straight-line selection.
//!
//! Every path terminates with a [`ResolutionResult`]; the resolver has no
//! error type.

mod config;
mod types;

pub use config::{
    DEFAULT_CANDIDATE_CAP, DEFAULT_FALLBACK_RADIUS_METERS, DEFAULT_PRIMARY_RADIUS_METERS,
    ResolverConfig, ResolverConfigError,
};
pub use types::{Attempt, Outcome, Resolution, ResolutionNotice, ResolutionResult, Tier};

use geo::Coord;
use log::{debug, info, warn};

use crate::candidates::{self, Candidate};
use crate::selection::{nearest_straight_line, reduce};
use crate::{CallStatus, Catalog, DistanceMatrixProvider, whole_meters};

/// Resolves an origin to its nearest reachable destination.
///
/// # Examples
///
/// ```
/// use refuge_core::{Catalog, Destination, Outcome, Resolver, ResolverConfig, coordinate};
/// use refuge_core::test_support::ScriptedDistanceMatrix;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let catalog = Catalog::from_destinations(vec![Destination::new(
///     "Far away",
///     coordinate(42.0, 141.0),
/// )]);
/// let resolver = Resolver::new(ScriptedDistanceMatrix::new(25), ResolverConfig::default());
///
/// let resolution = resolver.resolve(coordinate(41.775, 140.726), &catalog).await;
/// assert_eq!(resolution.result.outcome, Outcome::NoneInRadius);
/// assert_eq!(resolution.result.radius_meters, 700);
/// # });
/// ```
#[derive(Debug)]
pub struct Resolver<P> {
    provider: P,
    config: ResolverConfig,
}

/// Mutable bookkeeping for one run.
#[derive(Default)]
struct Trace {
    notices: Vec<ResolutionNotice>,
    attempts: Vec<Attempt>,
}

impl Trace {
    fn notice(&mut self, notice: ResolutionNotice) {
        info!("resolution notice: {notice:?}");
        self.notices.push(notice);
    }

    fn finish(self, result: ResolutionResult, candidate_count: usize) -> Resolution {
        debug!(
            "resolution finished with {:?} at {}m over {candidate_count} candidates",
            result.outcome, result.radius_meters
        );
        Resolution {
            result,
            notices: self.notices,
            attempts: self.attempts,
            candidate_count,
        }
    }
}

impl<P: DistanceMatrixProvider> Resolver<P> {
    /// Create a resolver querying `provider` under `config`.
    pub const fn new(provider: P, config: ResolverConfig) -> Self {
        Self { provider, config }
    }

    /// The active configuration.
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The underlying distance provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Resolve `origin` against a snapshot of `catalog`.
    ///
    /// The provider call is the only suspension point. Identical inputs and
    /// provider answers always yield an identical [`Resolution`].
    pub async fn resolve(&self, origin: Coord<f64>, catalog: &Catalog) -> Resolution {
        let cap = self.config.candidate_cap();
        let mut trace = Trace::default();
        let mut tier = Tier::Primary;
        // Wider-tier candidates and their radius, kept across a capacity escalation.
        let mut escalated_from: Option<(u32, Vec<Candidate<'_>>)> = None;

        loop {
            let attempt = Attempt::new(tier, &self.config);
            trace.attempts.push(attempt);
            let mut candidates =
                candidates::collect(origin, attempt.radius_meters, catalog.destinations());
            debug!(
                "{:?} attempt at {}m found {} candidates",
                attempt.tier,
                attempt.radius_meters,
                candidates.len()
            );

            // Radius the candidates were actually collected at.
            let mut radius_meters = attempt.radius_meters;
            if candidates.is_empty() {
                let Some((wider_radius, wider)) = escalated_from.take() else {
                    return trace.finish(ResolutionResult::none_in_radius(radius_meters), 0);
                };
                // The narrower radius is empty; keep the nearest wider-tier candidates.
                radius_meters = wider_radius;
                candidates = wider;
            }

            if candidates.len() > cap {
                if let Some(next) = tier.next() {
                    trace.notice(self.retry_notice(tier, next));
                    escalated_from = Some((radius_meters, candidates));
                    tier = next;
                    continue;
                }
                trace.notice(ResolutionNotice::CappedToNearest {
                    limit: cap,
                    available: candidates.len(),
                });
                candidates::nearest(&mut candidates, cap);
            }

            let destinations: Vec<Coord<f64>> = candidates
                .iter()
                .map(|candidate| candidate.destination.location)
                .collect();

            match self.provider.query(origin, &destinations).await {
                Ok(row) => {
                    let result = reduce(&candidates, &row).and_then(|selection| {
                        let chosen = candidates.get(selection.index)?;
                        Some(ResolutionResult {
                            outcome: Outcome::Found,
                            radius_meters,
                            selected: Some(chosen.destination.clone()),
                            distance_meters: Some(selection.distance_meters),
                            duration_text: Some(selection.duration_text),
                        })
                    });
                    let count = candidates.len();
                    return match result {
                        Some(found) => trace.finish(found, count),
                        None => {
                            warn!("no reachable destination among {count} candidates; degrading");
                            trace.finish(degrade(radius_meters, &candidates), count)
                        }
                    };
                }
                Err(err) if err.status() == CallStatus::OverQuota => {
                    if let Some(next) = tier.next() {
                        info!("distance provider over quota at {}m: {err}", attempt.radius_meters);
                        trace.notice(self.retry_notice(tier, next));
                        escalated_from = Some((radius_meters, candidates));
                        tier = next;
                        continue;
                    }
                    warn!("distance provider still over quota on fallback: {err}; degrading");
                    return trace.finish(degrade(radius_meters, &candidates), candidates.len());
                }
                Err(err) => {
                    warn!("distance provider failed: {err}; degrading");
                    return trace.finish(degrade(radius_meters, &candidates), candidates.len());
                }
            }
        }
    }

    fn retry_notice(&self, from: Tier, to: Tier) -> ResolutionNotice {
        ResolutionNotice::RetryingAtSmallerRadius {
            from_meters: Attempt::new(from, &self.config).radius_meters,
            to_meters: Attempt::new(to, &self.config).radius_meters,
        }
    }
}

/// Straight-line selection used whenever walking distances are unusable.
fn degrade(radius_meters: u32, candidates: &[Candidate<'_>]) -> ResolutionResult {
    let Some(nearest) = nearest_straight_line(candidates) else {
        return ResolutionResult::none_in_radius(radius_meters);
    };
    ResolutionResult {
        outcome: Outcome::DegradedStraightLine,
        radius_meters,
        selected: Some(nearest.destination.clone()),
        distance_meters: Some(round_meters(nearest.straight_line_meters)),
        duration_text: None,
    }
}

/// Straight-line distances never exceed half the Earth's circumference.
fn round_meters(meters: f64) -> u32 {
    whole_meters(meters).unwrap_or(u32::MAX)
}
