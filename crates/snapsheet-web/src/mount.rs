#![forbid(unsafe_code)]

//! Render-target resolution for portal mounting.
//!
//! A host that wants the sheet layered under an app shell passes a
//! `container_selector`. The selector is resolved through a
//! [`RenderTargetResolver`] once per selector change and cached. A missing
//! node is not an error: the sheet renders in place.

use std::fmt;

use rustc_hash::FxHashMap;

/// Host-assigned id of a render target element. The JS layer keeps the
/// id to element table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(pub u32);

/// Looks up host render targets by selector.
pub trait RenderTargetResolver {
    type Handle: Clone + PartialEq + fmt::Debug;

    fn resolve(&mut self, selector: &str) -> Option<Self::Handle>;
}

/// Where the sheet renders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MountTarget<H> {
    /// The sheet's normal parent.
    #[default]
    InPlace,
    Portal(H),
}

impl<H> MountTarget<H> {
    #[must_use]
    pub const fn is_portal(&self) -> bool {
        matches!(self, Self::Portal(_))
    }

    #[must_use]
    pub const fn handle(&self) -> Option<&H> {
        match self {
            Self::Portal(handle) => Some(handle),
            Self::InPlace => None,
        }
    }
}

/// Caches the resolved target for the current selector.
#[derive(Debug, Clone)]
pub struct MountTargetCache<H> {
    selector: Option<String>,
    target: MountTarget<H>,
    resolutions: u64,
}

impl<H> Default for MountTargetCache<H> {
    fn default() -> Self {
        Self {
            selector: None,
            target: MountTarget::InPlace,
            resolutions: 0,
        }
    }
}

impl<H: Clone + PartialEq + fmt::Debug> MountTargetCache<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn target(&self) -> &MountTarget<H> {
        &self.target
    }

    #[must_use]
    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    /// Number of resolver lookups performed so far.
    #[must_use]
    pub const fn resolutions(&self) -> u64 {
        self.resolutions
    }

    /// Resolve `selector` if it differs from the cached one.
    ///
    /// Returns `true` when the mount target changed.
    pub fn update<R>(&mut self, selector: Option<&str>, resolver: &mut R) -> bool
    where
        R: RenderTargetResolver<Handle = H> + ?Sized,
    {
        if selector == self.selector.as_deref() {
            return false;
        }
        self.selector = selector.map(str::to_owned);
        let next = match selector {
            None => MountTarget::InPlace,
            Some(selector) => {
                self.resolutions = self.resolutions.saturating_add(1);
                match resolver.resolve(selector) {
                    Some(handle) => MountTarget::Portal(handle),
                    None => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(selector, "portal target missing; rendering in place");
                        MountTarget::InPlace
                    }
                }
            }
        };
        if next == self.target {
            return false;
        }
        self.target = next;
        true
    }

    /// Drop the cached selector so the next [`update`](Self::update)
    /// resolves again, e.g. after the host rebuilt its shell.
    pub fn invalidate(&mut self) {
        self.selector = None;
        self.target = MountTarget::InPlace;
    }
}

/// Map-backed resolver for hosts with a fixed set of targets, and for tests.
#[derive(Debug, Clone)]
pub struct StaticRenderTargets<H> {
    targets: FxHashMap<String, H>,
}

impl<H> Default for StaticRenderTargets<H> {
    fn default() -> Self {
        Self {
            targets: FxHashMap::default(),
        }
    }
}

impl<H> StaticRenderTargets<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, selector: impl Into<String>, handle: H) -> Option<H> {
        self.targets.insert(selector.into(), handle)
    }

    pub fn remove(&mut self, selector: &str) -> Option<H> {
        self.targets.remove(selector)
    }
}

impl<H: Clone + PartialEq + fmt::Debug> RenderTargetResolver for StaticRenderTargets<H> {
    type Handle = H;

    fn resolve(&mut self, selector: &str) -> Option<H> {
        self.targets.get(selector).cloned()
    }
}
