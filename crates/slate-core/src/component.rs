use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crossbeam_utils::atomic::AtomicCell;
use geom::Rect;
use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::scroll::Scrollable;
use crate::touch::TouchHandler;

/// Source for component ids. Ids start at one; zero is the "no owner"
/// sentinel in [`ComponentCore::owner_id`].
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// An immutable snapshot of a container's children, oldest first. Later
/// entries are drawn on top and hit-tested first.
pub type Children = Arc<[Arc<dyn Component>]>;

/// The drawable unit of the tree.
///
/// Concrete components own a [`ComponentCore`] (or a [`ContainerCore`]) plus
/// whatever gesture/scroll helpers they need, and surface the optional
/// capabilities through the `as_*` queries. The display loop checks each
/// capability once per visit instead of inspecting concrete types.
pub trait Component: Send + Sync {
    /// The lifecycle/state core backing this component.
    fn core(&self) -> &ComponentCore;

    /// Render this component. The canvas frame on top of the stack is this
    /// component's own; implementations must not mutate tree structure here.
    fn draw(&self, canvas: &Canvas, platform: &mut dyn Platform) {
        let _ = (canvas, platform);
    }

    /// This component as a container of children, if it is one.
    fn as_container(&self) -> Option<&dyn Container> {
        None
    }

    /// This component's pointer-input handler, if it has one.
    fn as_touch_handler(&self) -> Option<&dyn TouchHandler> {
        None
    }

    /// This component's frame-tick listener, if it has one.
    fn as_frame_listener(&self) -> Option<&dyn FrameListener> {
        None
    }

    /// This component's scroll-offset source, if it has one.
    fn as_scrollable(&self) -> Option<&dyn Scrollable> {
        None
    }

    /// This component's overlay renderer, if it has one.
    fn as_post_draw(&self) -> Option<&dyn PostDraw> {
        None
    }

    /// The component's position and size, relative to its owner's region.
    fn bounds(&self) -> Rect {
        self.core().bounds()
    }

    /// Set the component's position and size.
    fn set_bounds(&self, r: Rect) {
        self.core().set_bounds(r)
    }

    /// Whether the component is visible.
    fn is_visible(&self) -> bool {
        self.core().is_visible()
    }

    /// Set the component's visibility.
    fn set_visible(&self, visible: bool) {
        self.core().set_visible(visible)
    }

    /// Close the component: mark it closed, detach it from its owner, and -
    /// for containers - close all children. Idempotent and infallible.
    fn close(&self) {
        match self.as_container() {
            Some(c) => c.container_core().close(),
            None => self.core().close(),
        }
    }
}

/// A component that owns an ordered list of child components. The drawing
/// area of the children is clipped to the container's region.
pub trait Container: Component {
    /// The child-list core backing this container.
    fn container_core(&self) -> &ContainerCore;

    /// A snapshot of the owned components. Children are drawn in list order,
    /// so the last entry renders on top and is hit-tested first.
    fn children(&self) -> Children {
        self.container_core().children()
    }

    /// Policy hook invoked to produce the child list with `child` added.
    ///
    /// Called while the container's structural lock is held, so overrides
    /// must not call back into this container. The default brings an already
    /// present child to the end of the list (on top) instead of duplicating
    /// it, and appends a new child at the end.
    fn on_add_child(
        &self,
        child: &Arc<dyn Component>,
        children: &[Arc<dyn Component>],
    ) -> Result<Vec<Arc<dyn Component>>> {
        let mut next = Vec::with_capacity(children.len() + 1);
        for c in children {
            if !same_component(&**c, &**child) {
                next.push(Arc::clone(c));
            }
        }
        next.push(Arc::clone(child));
        Ok(next)
    }
}

/// Capability contract for components that want a tick on every frame,
/// regardless of visibility or clipping.
pub trait FrameListener: Send + Sync {
    /// Called once per frame. `millis` is the frame loop's monotonic
    /// millisecond counter - usable for measuring intervals between frames,
    /// not for telling wall-clock time.
    fn on_frame(&self, millis: i64);
}

/// Capability contract for overlay rendering: invoked after a container's
/// children have been drawn, so the output lands on top of them.
pub trait PostDraw: Send + Sync {
    /// Render the overlay.
    fn draw_after(&self, canvas: &Canvas, platform: &mut dyn Platform);
}

/// Identity comparison: two handles denote the same component when they
/// share a state core.
pub(crate) fn same_component(a: &dyn Component, b: &dyn Component) -> bool {
    std::ptr::eq(a.core(), b.core())
}

/// Register `component` as a child of `owner`. Fails if the component is
/// already owned, owns itself, or the owner is not a container, was closed,
/// or rejected the insertion; no partial state is left behind on failure.
pub fn attach<T: Component + 'static>(
    component: &Arc<T>,
    owner: &Arc<dyn Component>,
) -> Result<()> {
    let handle: Arc<dyn Component> = component.clone();
    handle.core().init(&handle, owner)
}

/// Structural state shared by every component: bounds, visibility and
/// lifecycle flags, plus the owner linkage.
///
/// The hot fields (bounds, visibility, closed) are lock-free so the frame
/// thread never blocks on unrelated structural changes elsewhere in the
/// tree; the mutex guards only the owner/self handles.
pub struct ComponentCore {
    id: u64,
    visible: AtomicBool,
    closed: AtomicBool,
    owner_id: AtomicU64,
    bounds: AtomicCell<Rect>,
    inner: Mutex<CoreInner>,
}

#[derive(Default)]
struct CoreInner {
    /// Weak self-handle, set exactly once at registration. Needed so the
    /// component can identify itself to its owner when detaching.
    this: Option<Weak<dyn Component>>,
    owner: Option<Weak<dyn Component>>,
}

impl Default for ComponentCore {
    fn default() -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            visible: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            owner_id: AtomicU64::new(0),
            bounds: AtomicCell::new(Rect::default()),
            inner: Mutex::new(CoreInner::default()),
        }
    }
}

impl ComponentCore {
    /// A process-unique id for this component.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Register the component into `owner`'s child list and capture the
    /// owner reference. `this` must be the handle of the component this core
    /// belongs to. Exactly-once: a second call fails with `Invalid`.
    pub fn init(&self, this: &Arc<dyn Component>, owner: &Arc<dyn Component>) -> Result<()> {
        if !std::ptr::eq(this.core(), self) {
            return Err(Error::Invalid(
                "init() must be passed the component's own handle".into(),
            ));
        }
        if std::ptr::eq(owner.core(), self) {
            return Err(Error::Invalid(format!(
                "component #{} cannot be added to itself",
                self.id
            )));
        }
        let Some(container) = owner.as_container() else {
            return Err(Error::Invalid(format!(
                "owner #{} is not a container",
                owner.core().id
            )));
        };
        let mut inner = self.lock_if_alive().ok_or_else(|| {
            Error::Closed(format!("component #{} is closed", self.id))
        })?;
        if inner.owner.is_some() {
            return Err(Error::Invalid(format!(
                "component #{} already has an owner",
                self.id
            )));
        }
        self.visible.store(true, Ordering::Release);
        inner.this = Some(Arc::downgrade(this));
        // Child lock is held across the owner registration, mirroring the
        // init/close lock order (child before owner) everywhere.
        match container.container_core().add_child(Arc::clone(this)) {
            Ok(()) => {
                inner.owner = Some(Arc::downgrade(owner));
                self.owner_id.store(owner.core().id, Ordering::Release);
                Ok(())
            }
            Err(e) => {
                inner.this = None;
                Err(e)
            }
        }
    }

    /// The component's bounds, relative to its owner's region.
    pub fn bounds(&self) -> Rect {
        self.bounds.load()
    }

    /// Set the component's bounds.
    pub fn set_bounds(&self, r: Rect) {
        self.bounds.store(r);
    }

    /// Whether the component is visible.
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    /// Set the component's visibility.
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
    }

    /// Whether the component was closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Whether the component is currently registered with an owner.
    pub fn is_attached(&self) -> bool {
        self.owner_id.load(Ordering::Acquire) != 0
    }

    pub(crate) fn owner_id(&self) -> u64 {
        self.owner_id.load(Ordering::Acquire)
    }

    /// Mark the component closed and detach it from its owner. Safe to call
    /// any number of times.
    pub fn close(&self) {
        let Some(mut inner) = self.lock_if_alive() else {
            return;
        };
        self.closed.store(true, Ordering::Release);
        let owner = inner.owner.take();
        let this = inner.this.take();
        self.owner_id.store(0, Ordering::Release);
        drop(inner);
        detach(owner, this);
    }

    /// Install the self-handle without an owner. Only the display's root
    /// container is constructed this way.
    pub(crate) fn adopt_this(&self, this: Weak<dyn Component>) {
        let mut inner = self.inner.lock();
        inner.this = Some(this);
        self.visible.store(true, Ordering::Release);
    }

    /// Acquire the structural lock unless the component is closed, and
    /// re-check the flag under the lock so a concurrent `close` cannot slip
    /// between the check and the acquisition.
    fn lock_if_alive(&self) -> Option<MutexGuard<'_, CoreInner>> {
        if self.is_closed() {
            return None;
        }
        let guard = self.inner.lock();
        if self.is_closed() { None } else { Some(guard) }
    }
}

/// Detach a component from its owner's child list; a no-op when either side
/// is already gone or closed.
fn detach(owner: Option<Weak<dyn Component>>, this: Option<Weak<dyn Component>>) {
    let owner = owner.and_then(|w| w.upgrade());
    let this = this.and_then(|w| w.upgrade());
    let (Some(owner), Some(this)) = (owner, this) else {
        return;
    };
    if let Some(cont) = owner.as_container() {
        cont.container_core().remove_child(&this);
    }
}

/// A [`ComponentCore`] plus the owned-children list. The child list is an
/// immutable snapshot swapped under the structural lock, so the frame
/// thread's walks read it without blocking writers elsewhere.
pub struct ContainerCore {
    core: ComponentCore,
    children: RwLock<Children>,
}

impl Default for ContainerCore {
    fn default() -> Self {
        Self {
            core: ComponentCore::default(),
            children: RwLock::new(Vec::new().into()),
        }
    }
}

impl ContainerCore {
    /// The component core backing this container.
    pub fn component_core(&self) -> &ComponentCore {
        &self.core
    }

    /// A snapshot of the owned components.
    pub fn children(&self) -> Children {
        self.children.read().clone()
    }

    /// Re-add an existing child, moving it to the end of the list so it
    /// draws on top. The component must already belong to this container.
    pub fn bring_to_top(&self, child: &Arc<dyn Component>) -> Result<()> {
        if child.core().owner_id() != self.core.id {
            return Err(Error::Invalid(format!(
                "component #{} is not a child of container #{}",
                child.core().id,
                self.core.id
            )));
        }
        self.add_child(Arc::clone(child))
    }

    /// Run the container's insertion policy and publish the new child list.
    /// Called with no child-side checks from `ComponentCore::init`, which
    /// has already validated the candidate.
    pub(crate) fn add_child(&self, child: Arc<dyn Component>) -> Result<()> {
        let Some(inner) = self.core.lock_if_alive() else {
            return Err(Error::Closed(format!(
                "container #{} is closed",
                self.core.id
            )));
        };
        let this = inner.this.as_ref().and_then(Weak::upgrade).ok_or_else(|| {
            Error::Invalid(format!("container #{} is not initialized", self.core.id))
        })?;
        let Some(cont) = this.as_container() else {
            return Err(Error::Invalid(format!(
                "component #{} is not a container",
                self.core.id
            )));
        };
        let current = self.children.read().clone();
        let next = cont.on_add_child(&child, &current)?;
        *self.children.write() = next.into();
        drop(inner);
        Ok(())
    }

    /// Remove a component from the child list. Returns false when the
    /// container is closed or the component is not present.
    pub(crate) fn remove_child(&self, child: &Arc<dyn Component>) -> bool {
        let Some(_guard) = self.core.lock_if_alive() else {
            return false;
        };
        let current = self.children.read().clone();
        let Some(idx) = current.iter().position(|c| same_component(&**c, &**child)) else {
            return false;
        };
        let mut next: Vec<Arc<dyn Component>> = current.to_vec();
        next.remove(idx);
        *self.children.write() = next.into();
        true
    }

    /// Close the container and, transitively, all its children. The child
    /// list is captured and cleared under the lock, and the children are
    /// closed after it is released so no lock is held across a subtree
    /// close.
    pub fn close(&self) {
        let Some(mut inner) = self.core.lock_if_alive() else {
            return;
        };
        self.core.closed.store(true, Ordering::Release);
        let owner = inner.owner.take();
        let this = inner.this.take();
        self.core.owner_id.store(0, Ordering::Release);
        let children = std::mem::replace(&mut *self.children.write(), Vec::new().into());
        drop(inner);
        detach(owner, this);
        for child in children.iter() {
            child.close();
        }
    }
}
