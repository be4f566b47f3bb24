//! Process-wide loader for the external player library
//!
//! The player library is loaded by injecting a script once per process. Every
//! controller that mounts before the library is usable registers a ready
//! subscription; the single ready signal fans out to all of them. Mounts
//! unsubscribe independently, so one view never clobbers another's hook.

use crate::error::{PlaybackError, Result};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};

/// Triggers the asynchronous load of the player library (e.g. a script tag)
///
/// The host reports completion through [`PlayerLoader::mark_ready`] or
/// [`PlayerLoader::mark_failed`].
pub trait ScriptInjector {
    fn inject(&self) -> Result<()>;
}

/// Load status of the player library
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing requested yet
    Idle,
    /// Script injected, waiting for the ready signal
    Loading,
    /// Library usable
    Ready,
    /// Load failed; no retry
    Failed(String),
}

/// Identifier returned by [`PlayerLoader::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type ReadyCallback = Box<dyn FnOnce(Result<()>)>;

struct LoaderInner {
    status: LoadStatus,
    injector: Rc<dyn ScriptInjector>,
    subscribers: Vec<(SubscriptionId, ReadyCallback)>,
    next_subscription: u64,
    holders: usize,
}

thread_local! {
    static SHARED_LOADER: RefCell<Option<PlayerLoader>> = const { RefCell::new(None) };
}

/// Shared handle to the library loader
#[derive(Clone)]
pub struct PlayerLoader {
    inner: Rc<RefCell<LoaderInner>>,
}

impl PlayerLoader {
    /// Create an independent loader
    pub fn new(injector: impl ScriptInjector + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LoaderInner {
                status: LoadStatus::Idle,
                injector: Rc::new(injector),
                subscribers: Vec::new(),
                next_subscription: 0,
                holders: 0,
            })),
        }
    }

    /// The process-wide loader, created with `make_injector` on first use
    ///
    /// Later calls return the same loader and ignore `make_injector`.
    pub fn shared<I, F>(make_injector: F) -> Self
    where
        I: ScriptInjector + 'static,
        F: FnOnce() -> I,
    {
        SHARED_LOADER.with(|slot| {
            slot.borrow_mut()
                .get_or_insert_with(|| Self::new(make_injector()))
                .clone()
        })
    }

    pub fn status(&self) -> LoadStatus {
        self.inner.borrow().status.clone()
    }

    /// Inject the library script unless a load is in flight or complete
    pub fn ensure_loaded(&self) {
        let injector = {
            let mut inner = self.inner.borrow_mut();
            if inner.status != LoadStatus::Idle {
                return;
            }
            inner.status = LoadStatus::Loading;
            Rc::clone(&inner.injector)
        };

        info!("Injecting player library");
        if let Err(e) = injector.inject() {
            self.mark_failed(e.to_string());
        }
    }

    /// Register a callback for the ready signal
    ///
    /// If the load has already settled the callback runs immediately.
    pub fn subscribe(&self, callback: impl FnOnce(Result<()>) + 'static) -> SubscriptionId {
        let (id, settled) = {
            let mut inner = self.inner.borrow_mut();
            let id = SubscriptionId(inner.next_subscription);
            inner.next_subscription += 1;

            match inner.status.clone() {
                LoadStatus::Ready => (id, Some(Ok(()))),
                LoadStatus::Failed(reason) => (id, Some(Err(PlaybackError::LibraryLoad(reason)))),
                LoadStatus::Idle | LoadStatus::Loading => {
                    inner.subscribers.push((id, Box::new(callback)));
                    return id;
                }
            }
        };

        if let Some(outcome) = settled {
            callback(outcome);
        }
        id
    }

    /// Remove a pending subscription, returns whether it was still pending
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sub, _)| *sub != id);
        before != inner.subscribers.len()
    }

    /// Number of subscriptions waiting for the ready signal
    pub fn pending(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// Report that the library is usable; fans out to every subscriber once
    pub fn mark_ready(&self) {
        let subscribers = {
            let mut inner = self.inner.borrow_mut();
            if inner.status == LoadStatus::Ready {
                debug!("Player library already ready, ignoring repeat signal");
                return;
            }
            inner.status = LoadStatus::Ready;
            std::mem::take(&mut inner.subscribers)
        };

        info!("Player library ready, releasing {} pending attach(es)", subscribers.len());
        for (_, callback) in subscribers {
            callback(Ok(()));
        }
    }

    /// Report that the library failed to load
    pub fn mark_failed(&self, reason: impl Into<String>) {
        let reason = reason.into();
        let subscribers = {
            let mut inner = self.inner.borrow_mut();
            if inner.status == LoadStatus::Ready {
                return;
            }
            inner.status = LoadStatus::Failed(reason.clone());
            std::mem::take(&mut inner.subscribers)
        };

        warn!("Player library failed to load: {}", reason);
        for (_, callback) in subscribers {
            callback(Err(PlaybackError::LibraryLoad(reason.clone())));
        }
    }

    /// Register a user of the library; released when the lease drops
    pub fn acquire(&self) -> LoaderLease {
        let holders = {
            let mut inner = self.inner.borrow_mut();
            inner.holders += 1;
            inner.holders
        };
        debug!("Player library acquired ({} holder(s))", holders);
        LoaderLease {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Number of live leases
    pub fn holders(&self) -> usize {
        self.inner.borrow().holders
    }
}

/// Reference-counted claim on the loader held by a mounted controller
pub struct LoaderLease {
    inner: Rc<RefCell<LoaderInner>>,
}

impl Drop for LoaderLease {
    fn drop(&mut self) {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            return;
        };
        inner.holders = inner.holders.saturating_sub(1);
        if inner.holders == 0 {
            debug!(
                "Last player released the library loader ({} subscription(s) pending)",
                inner.subscribers.len()
            );
        }
    }
}
