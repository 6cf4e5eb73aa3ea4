//! Generation-guarded dispatch of resolutions.
//!
//! Origins can change faster than a provider answers. Each call to
//! [`ResolutionController::set_origin`] takes a fresh generation number; a
//! resolution is only published when its generation is still the latest once
//! the provider returns. Superseded answers are dropped without touching the
//! published slot or emitting events.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use geo::Coord;
use log::{debug, info};
use tokio::sync::{mpsc, watch};

use crate::{Catalog, Destination, DistanceMatrixProvider, ResolutionNotice, ResolutionResult, Resolver};

/// The most recently published resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentResolution {
    /// Generation the result belongs to.
    pub generation: u64,
    /// Origin the result was resolved for.
    pub origin: Coord<f64>,
    /// The published result.
    pub result: ResolutionResult,
}

/// What happened to a dispatched origin.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The result was published as the current resolution.
    Current(ResolutionResult),
    /// A newer origin arrived while resolving; the result was discarded.
    Superseded {
        /// Generation of the discarded resolution.
        generation: u64,
    },
    /// The catalog has not finished loading; nothing was resolved.
    CatalogLoading,
}

/// Events emitted for published resolutions only.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionEvent {
    /// A notice raised while resolving.
    Notice {
        /// Generation that raised the notice.
        generation: u64,
        /// The notice itself.
        notice: ResolutionNotice,
    },
    /// A result became current.
    Resolved {
        /// Generation of the result.
        generation: u64,
        /// The published result.
        result: ResolutionResult,
    },
}

/// Owns the catalog and the current resolution slot.
///
/// # Examples
/// ```
/// use refuge_core::test_support::StraightLineDistanceMatrix;
/// use refuge_core::{
///     Catalog, Destination, Dispatch, Outcome, ResolutionController, Resolver, ResolverConfig,
///     coordinate,
/// };
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let resolver = Resolver::new(StraightLineDistanceMatrix::default(), ResolverConfig::default());
/// let (controller, _events) = ResolutionController::new(resolver, Catalog::expecting(1));
/// let origin = coordinate(41.775, 140.726);
///
/// assert_eq!(controller.set_origin(origin).await, Dispatch::CatalogLoading);
///
/// controller.merge_source(vec![Destination::new("School", coordinate(41.776, 140.726))]);
/// let Dispatch::Current(result) = controller.set_origin(origin).await else {
///     panic!("expected a published result");
/// };
/// assert_eq!(result.outcome, Outcome::Found);
/// # });
/// ```
#[derive(Debug)]
pub struct ResolutionController<P> {
    resolver: Resolver<P>,
    catalog: watch::Sender<Arc<Catalog>>,
    generation: AtomicU64,
    current: watch::Sender<Option<CurrentResolution>>,
    events: mpsc::UnboundedSender<ResolutionEvent>,
}

impl<P: DistanceMatrixProvider> ResolutionController<P> {
    /// Create a controller and the receiving end of its event stream.
    pub fn new(
        resolver: Resolver<P>,
        catalog: Catalog,
    ) -> (Self, mpsc::UnboundedReceiver<ResolutionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let controller = Self {
            resolver,
            catalog: watch::channel(Arc::new(catalog)).0,
            generation: AtomicU64::new(0),
            current: watch::channel(None).0,
            events,
        };
        (controller, receiver)
    }

    /// The wrapped resolver.
    pub const fn resolver(&self) -> &Resolver<P> {
        &self.resolver
    }

    /// Latest generation handed out.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Snapshot of the catalog.
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog.borrow())
    }

    /// Append a loaded source to the catalog.
    ///
    /// In-flight resolutions keep the snapshot they started with.
    pub fn merge_source<I>(&self, source: I)
    where
        I: IntoIterator<Item = Destination>,
    {
        self.catalog.send_modify(|catalog| {
            Arc::make_mut(catalog).merge_source(source);
            info!(
                "catalog holds {} destinations (ready: {})",
                catalog.len(),
                catalog.is_ready()
            );
        });
    }

    /// The currently published resolution, if any.
    pub fn current(&self) -> Option<CurrentResolution> {
        self.current.borrow().clone()
    }

    /// Watch the published resolution slot.
    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentResolution>> {
        self.current.subscribe()
    }

    /// Resolve `origin` and publish the result unless a newer origin arrived.
    pub async fn set_origin(&self, origin: Coord<f64>) -> Dispatch {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let catalog = self.catalog();
        if !catalog.is_ready() {
            debug!("generation {generation}: catalog still loading");
            return Dispatch::CatalogLoading;
        }

        let resolution = self.resolver.resolve(origin, &catalog).await;

        let published = self.current.send_if_modified(|slot| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *slot = Some(CurrentResolution {
                generation,
                origin,
                result: resolution.result.clone(),
            });
            true
        });
        if !published {
            debug!("generation {generation} superseded; discarding result");
            return Dispatch::Superseded { generation };
        }

        for notice in resolution.notices {
            self.emit(ResolutionEvent::Notice { generation, notice });
        }
        self.emit(ResolutionEvent::Resolved {
            generation,
            result: resolution.result.clone(),
        });
        Dispatch::Current(resolution.result)
    }

    fn emit(&self, event: ResolutionEvent) {
        if self.events.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }
}
