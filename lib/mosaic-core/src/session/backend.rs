use crate::config::ConfigRef;
use crate::geometry::{Bounds, Position};
use crate::session::{
    BridgeEvent, EventBridge, EventDispatcher, PointerDragEvent, PointerDragTracker, RenderSurface, ShutdownHandle,
    SurfaceError, SurfaceEvent, SurfaceId,
};
use crate::tree::{
    create_balanced_tree_from_leaves, create_corner_update, create_drag_to_updates_with_split, create_remove_update,
    create_split_update, find_leaf_at, find_split_at, format_path, get_closest_distance_from_side, get_leaves,
    get_node_at_path, get_preview_for_side, rebase_path_after_drag, split_percentage_at, update_tree, Corner,
    LayoutError, MosaicBranch, MosaicDirection, MosaicNode, MosaicParent, MosaicPatch, MosaicPath, MosaicTree,
    MosaicUpdate, Side,
};
use indexmap::IndexMap;
use log::{debug, trace, warn};
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Surface {0} is already registered")]
    SurfaceAlreadyRegistered(SurfaceId),

    #[error("Surface {0} is not registered")]
    SurfaceNotRegistered(SurfaceId),

    #[error("Surface {id} could not be acquired: {source}")]
    SurfaceUnavailable {
        id: SurfaceId,
        #[source]
        source: SurfaceError,
    },

    #[error("Surface {id} hosts {} which is not part of the layout", format_path(.path))]
    StaleHostedPath { id: SurfaceId, path: MosaicPath },

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// What subscribers see after every commit.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSnapshot<T> {
    pub revision: u64,
    pub root: MosaicTree<T>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionOutcome {
    /// Nothing changed
    Ignored,
    /// A session is open; its preview did not change
    Tracking,
    /// The drop target or prospective split moved
    PreviewChanged,
    /// A new tree was published under this revision
    Committed(u64),
    /// The session ended without touching the tree
    Cancelled,
}

/// Where a dragged pane would land if released now.
#[derive(Debug, Clone, PartialEq)]
pub struct DropTarget {
    pub surface: SurfaceId,
    pub path: MosaicPath,
    pub side: Side,
    /// Area of the target highlighted on `surface`, in its coordinates
    pub preview: Bounds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaneDrag {
    pub origin: SurfaceId,
    pub source: MosaicPath,
    pub target: Option<DropTarget>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitDrag {
    pub surface: SurfaceId,
    pub path: MosaicPath,
    pub direction: MosaicDirection,
    /// Bounds of the split on `surface`
    pub bounds: Bounds,
    /// Percentage that will be committed on release
    pub split_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Pressed {
        surface: SurfaceId,
        position: Position,
    },
    Dragging(PaneDrag),
    Resizing(SplitDrag),
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DragState::Idle)
    }

    pub fn origin_surface(&self) -> Option<SurfaceId> {
        match self {
            DragState::Idle => None,
            DragState::Pressed { surface, .. } => Some(*surface),
            DragState::Dragging(drag) => Some(drag.origin),
            DragState::Resizing(split) => Some(split.surface),
        }
    }
}

#[derive(Debug, Clone)]
struct SurfaceEntry {
    viewport: Bounds,
    hosted_path: MosaicPath,
}

/// Owns the committed layout and runs the drag session shared by every
/// registered surface. All mutation goes through here, one commit at a time.
pub struct MosaicBackend<T> {
    config: ConfigRef,
    tree: MosaicTree<T>,
    revision: u64,
    create_node: Box<dyn FnMut() -> T>,
    surfaces: IndexMap<SurfaceId, SurfaceEntry>,
    bridge: EventBridge,
    tracker: PointerDragTracker,
    state: DragState,
    notifier: watch::Sender<LayoutSnapshot<T>>,
}

impl<T: Clone + Debug + 'static> MosaicBackend<T> {
    pub fn new(config: ConfigRef, tree: MosaicTree<T>, create_node: impl FnMut() -> T + 'static) -> Self {
        let tracker = PointerDragTracker::new(config.drag_threshold);
        let (notifier, _) = watch::channel(LayoutSnapshot {
            revision: 0,
            root: tree.clone(),
        });

        Self {
            config,
            tree,
            revision: 0,
            create_node: Box::new(create_node),
            surfaces: IndexMap::new(),
            bridge: EventBridge::new(),
            tracker,
            state: DragState::Idle,
            notifier,
        }
    }

    pub fn tree(&self) -> &MosaicTree<T> {
        &self.tree
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> LayoutSnapshot<T> {
        LayoutSnapshot {
            revision: self.revision,
            root: self.tree.clone(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<LayoutSnapshot<T>> {
        self.notifier.subscribe()
    }

    pub fn session(&self) -> &DragState {
        &self.state
    }

    pub fn surfaces(&self) -> impl Iterator<Item = SurfaceId> + '_ {
        self.surfaces.keys().copied()
    }

    pub fn hosted_path(&self, surface: SurfaceId) -> Option<&MosaicPath> {
        self.surfaces.get(&surface).map(|entry| &entry.hosted_path)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.bridge.shutdown_handle()
    }

    /// Registers a surface and returns the dispatcher it sends its events
    /// through. A failure leaves the layout and other surfaces untouched.
    pub fn add_event_source(&mut self, surface: &dyn RenderSurface) -> SessionResult<EventDispatcher> {
        let id = surface.id();
        if self.surfaces.contains_key(&id) {
            return Err(SessionError::SurfaceAlreadyRegistered(id));
        }

        let viewport = surface
            .viewport()
            .map_err(|source| SessionError::SurfaceUnavailable { id, source })?;

        let hosted_path = surface.hosted_path();
        if !path_exists(&self.tree, &hosted_path) {
            return Err(SessionError::StaleHostedPath { id, path: hosted_path });
        }

        debug!(
            "Registered surface {id} hosting {} in {:?}",
            format_path(&hosted_path),
            viewport
        );
        self.surfaces.insert(id, SurfaceEntry { viewport, hosted_path });
        Ok(self.bridge.dispatcher(id))
    }

    /// Deregisters a surface. A session that started on it is cancelled and
    /// a drop target on it is cleared.
    pub fn remove_event_source(&mut self, surface: SurfaceId) -> SessionResult<SessionOutcome> {
        if self.surfaces.shift_remove(&surface).is_none() {
            return Err(SessionError::SurfaceNotRegistered(surface));
        }
        debug!("Removed surface {surface}");

        if self.state.origin_surface() == Some(surface) {
            return Ok(self.cancel_session("origin surface was removed"));
        }
        Ok(self.clear_target_on(surface))
    }

    pub fn handle_event(&mut self, surface: SurfaceId, event: SurfaceEvent) -> SessionOutcome {
        trace!("Surface {surface}: {:?}", event);

        let Some(entry) = self.surfaces.get_mut(&surface) else {
            warn!("Ignoring {:?} from unregistered surface {surface}", event);
            return SessionOutcome::Ignored;
        };

        match &event {
            SurfaceEvent::Resized(viewport) => {
                entry.viewport = viewport.clone();
                return SessionOutcome::Ignored;
            }
            SurfaceEvent::Closed => {
                return self
                    .remove_event_source(surface)
                    .unwrap_or(SessionOutcome::Ignored);
            }
            SurfaceEvent::PointerLeft => return self.clear_target_on(surface),
            _ => {}
        }

        let Some(drag_event) = self.tracker.handle_event(surface, &event) else {
            return if self.state.is_idle() {
                SessionOutcome::Ignored
            } else {
                SessionOutcome::Tracking
            };
        };

        match drag_event {
            PointerDragEvent::Press { surface, position } => {
                self.state = DragState::Pressed { surface, position };
                SessionOutcome::Tracking
            }
            PointerDragEvent::Start {
                origin_surface,
                origin,
                surface,
                position,
            } => self.start_session(origin_surface, &origin, surface, &position),
            PointerDragEvent::Drag { surface, position } => self.update_session(surface, &position),
            PointerDragEvent::End { surface, position } => self.finish_session(surface, &position),
            PointerDragEvent::Cancel => self.cancel_session("pointer released before dragging or cancelled"),
        }
    }

    /// Handles every queued event without waiting.
    pub fn pump(&mut self) -> Vec<SessionOutcome> {
        let mut outcomes = Vec::new();
        while let Some(event) = self.bridge.try_next_event() {
            match event {
                BridgeEvent::Surface(surface, event) => outcomes.push(self.handle_event(surface, event)),
                BridgeEvent::Shutdown => trace!("Ignoring shutdown while pumping"),
            }
        }
        outcomes
    }

    /// Handles events as they arrive until a shutdown is requested.
    pub async fn run(&mut self) {
        debug!("Backend event loop started");
        while let Some(event) = self.bridge.next_event().await {
            match event {
                BridgeEvent::Surface(surface, event) => {
                    self.handle_event(surface, event);
                }
                BridgeEvent::Shutdown => break,
            }
        }
        self.cancel_session("event loop stopped");
        debug!("Backend event loop stopped at revision {}", self.revision);
    }

    pub fn add_pane_at_corner(&mut self, corner: Corner) -> SessionResult<u64> {
        self.cancel_session("layout changed");

        let new_root = match &self.tree {
            None => MosaicNode::leaf((self.create_node)()),
            Some(root) => {
                let update = create_corner_update(root, corner, self.config.root_split_direction, || {
                    (self.create_node)()
                })?;
                let update = with_split_percentage(update, self.config.default_split_percentage);
                update_tree(root, &[update])?
            }
        };

        debug!("Added pane at {:?}", corner);
        Ok(self.commit(Some(new_root)))
    }

    /// Rebuilds the layout as a balanced tree of the current panes.
    pub fn auto_arrange(&mut self) -> u64 {
        self.cancel_session("layout changed");
        let leaves = get_leaves(self.tree.as_deref());
        debug!("Arranging {} pane(s)", leaves.len());
        self.commit(create_balanced_tree_from_leaves(leaves))
    }

    pub fn split_pane(&mut self, path: &[MosaicBranch], direction: MosaicDirection) -> SessionResult<u64> {
        self.cancel_session("layout changed");

        let root = self
            .tree
            .as_ref()
            .ok_or_else(|| LayoutError::StalePath(path.to_vec()))?;
        let update = create_split_update(root, path, direction, || (self.create_node)())?;
        let update = with_split_percentage(update, self.config.default_split_percentage);
        let new_root = update_tree(root, &[update])?;

        debug!("Split {} into a {direction}", format_path(path));
        Ok(self.commit(Some(new_root)))
    }

    /// Removes the node at `path`. Removing the root empties the layout.
    pub fn remove_pane(&mut self, path: &[MosaicBranch]) -> SessionResult<u64> {
        self.cancel_session("layout changed");

        let root = self
            .tree
            .as_ref()
            .ok_or_else(|| LayoutError::StalePath(path.to_vec()))?;
        if path.is_empty() {
            debug!("Removed the last pane");
            return Ok(self.commit(None));
        }

        let update = create_remove_update(root, path)?;
        let new_root = update_tree(root, &[update])?;

        debug!("Removed {}", format_path(path));
        Ok(self.commit(Some(new_root)))
    }

    /// Moves the node at `source` against `side` of the node at
    /// `destination` in a single commit. Hosted paths follow the nodes they
    /// pointed at.
    pub fn move_pane(&mut self, source: &[MosaicBranch], destination: &[MosaicBranch], side: Side) -> SessionResult<u64> {
        self.cancel_session("layout changed");

        let root = self
            .tree
            .as_ref()
            .ok_or_else(|| LayoutError::StalePath(source.to_vec()))?;
        let updates =
            create_drag_to_updates_with_split(root, source, destination, side, self.config.default_split_percentage)?;
        let new_root = update_tree(root, &updates)?;

        for entry in self.surfaces.values_mut() {
            entry.hosted_path = rebase_path_after_drag(&entry.hosted_path, source, destination, side);
        }

        debug!(
            "Moved pane {} to the {:?} of {}",
            format_path(source),
            side,
            format_path(destination)
        );
        Ok(self.commit(Some(new_root)))
    }

    pub fn replace_tree(&mut self, tree: MosaicTree<T>) -> u64 {
        self.cancel_session("layout replaced");
        self.commit(tree)
    }

    fn commit(&mut self, root: MosaicTree<T>) -> u64 {
        self.tree = root;
        self.revision += 1;

        let tree = &self.tree;
        for (id, entry) in self.surfaces.iter_mut() {
            if !path_exists(tree, &entry.hosted_path) {
                warn!(
                    "Surface {id} hosted {} which no longer exists, showing the root instead",
                    format_path(&entry.hosted_path)
                );
                entry.hosted_path.clear();
            }
        }

        self.notifier.send_replace(self.snapshot());
        debug!(
            "Committed revision {} with {} pane(s)",
            self.revision,
            self.tree.as_ref().map_or(0, |root| root.leaves().count())
        );
        self.revision
    }

    fn cancel_session(&mut self, reason: &str) -> SessionOutcome {
        self.tracker.reset();
        if self.state.is_idle() {
            return SessionOutcome::Ignored;
        }

        debug!("Session cancelled: {reason}");
        self.state = DragState::Idle;
        SessionOutcome::Cancelled
    }

    fn clear_target_on(&mut self, surface: SurfaceId) -> SessionOutcome {
        if let DragState::Dragging(drag) = &mut self.state {
            if drag.target.as_ref().is_some_and(|target| target.surface == surface) {
                drag.target = None;
                return SessionOutcome::PreviewChanged;
            }
        }
        SessionOutcome::Ignored
    }

    fn start_session(
        &mut self,
        origin_surface: SurfaceId,
        origin: &Position,
        surface: SurfaceId,
        position: &Position,
    ) -> SessionOutcome {
        let Some(state) = self.hit_test_press(origin_surface, origin) else {
            debug!("Press on surface {origin_surface} did not land on a pane or split");
            self.tracker.reset();
            self.state = DragState::Idle;
            return SessionOutcome::Cancelled;
        };

        match &state {
            DragState::Dragging(drag) => debug!("Dragging pane {}", format_path(&drag.source)),
            DragState::Resizing(split) => debug!("Resizing split {}", format_path(&split.path)),
            _ => {}
        }
        self.state = state;

        match self.update_session(surface, position) {
            SessionOutcome::PreviewChanged => SessionOutcome::PreviewChanged,
            _ => SessionOutcome::Tracking,
        }
    }

    /// Decides what a press starts: a resize when it is on a split bar,
    /// otherwise a drag of the pane under it.
    fn hit_test_press(&self, surface: SurfaceId, position: &Position) -> Option<DragState> {
        let entry = self.surfaces.get(&surface)?;
        let root = self.tree.as_ref()?;
        let node = get_node_at_path(root, &entry.hosted_path)?;

        let threshold = self.config.resize_handle_width / 2;
        if let Some(hit) = find_split_at(node, &entry.viewport, position, threshold) {
            let split_percentage = get_node_at_path(node, &hit.path)
                .and_then(|split| split.as_parent())
                .map(|split| split.split_percentage)?;
            return Some(DragState::Resizing(SplitDrag {
                surface,
                path: join_paths(&entry.hosted_path, &hit.path),
                direction: hit.direction,
                bounds: hit.bounds,
                split_percentage,
            }));
        }

        let (leaf_path, _) = find_leaf_at(node, &entry.viewport, position)?;
        Some(DragState::Dragging(PaneDrag {
            origin: surface,
            source: join_paths(&entry.hosted_path, &leaf_path),
            target: None,
        }))
    }

    fn update_session(&mut self, surface: SurfaceId, position: &Position) -> SessionOutcome {
        let target = match &self.state {
            DragState::Dragging(drag) => self.find_drop_target(&drag.source, surface, position),
            _ => None,
        };
        let min_split_percentage = self.config.min_split_percentage;

        match &mut self.state {
            DragState::Dragging(drag) => {
                if drag.target == target {
                    return SessionOutcome::Tracking;
                }
                trace!("Drop target: {:?}", target);
                drag.target = target;
                SessionOutcome::PreviewChanged
            }
            DragState::Resizing(split) => {
                // Other surfaces do not share the split's coordinates
                if split.surface != surface {
                    return SessionOutcome::Tracking;
                }
                let percentage = split_percentage_at(&split.bounds, split.direction, position, min_split_percentage);
                if percentage == split.split_percentage {
                    return SessionOutcome::Tracking;
                }
                split.split_percentage = percentage;
                SessionOutcome::PreviewChanged
            }
            _ => SessionOutcome::Ignored,
        }
    }

    fn find_drop_target(&self, source: &[MosaicBranch], surface: SurfaceId, position: &Position) -> Option<DropTarget> {
        let entry = self.surfaces.get(&surface)?;
        let root = self.tree.as_ref()?;
        let node = get_node_at_path(root, &entry.hosted_path)?;
        let (leaf_path, bounds) = find_leaf_at(node, &entry.viewport, position)?;

        let path = join_paths(&entry.hosted_path, &leaf_path);
        if path.starts_with(source) {
            return None;
        }

        let (_, side) = get_closest_distance_from_side(&bounds, position);
        Some(DropTarget {
            surface,
            path,
            side,
            preview: get_preview_for_side(&bounds, side, self.config.drop_preview_ratio),
        })
    }

    fn finish_session(&mut self, surface: SurfaceId, position: &Position) -> SessionOutcome {
        if self.surfaces.contains_key(&surface) {
            self.update_session(surface, position);
        }

        match std::mem::take(&mut self.state) {
            DragState::Dragging(drag) => {
                let Some(target) = drag.target else {
                    debug!("Pane {} released outside any drop target", format_path(&drag.source));
                    return SessionOutcome::Cancelled;
                };
                match self.move_pane(&drag.source, &target.path, target.side) {
                    Ok(revision) => SessionOutcome::Committed(revision),
                    Err(e) => {
                        warn!("Failed to move pane {}: {e}", format_path(&drag.source));
                        SessionOutcome::Cancelled
                    }
                }
            }
            DragState::Resizing(split) => match self.commit_resize(&split) {
                Ok(Some(revision)) => SessionOutcome::Committed(revision),
                Ok(None) => {
                    debug!("Split {} released at its current percentage", format_path(&split.path));
                    SessionOutcome::Cancelled
                }
                Err(e) => {
                    warn!("Failed to resize split {}: {e}", format_path(&split.path));
                    SessionOutcome::Cancelled
                }
            },
            DragState::Idle | DragState::Pressed { .. } => SessionOutcome::Cancelled,
        }
    }

    /// Returns `None` when the split already has the released percentage.
    fn commit_resize(&mut self, split: &SplitDrag) -> SessionResult<Option<u64>> {
        let root = self
            .tree
            .as_ref()
            .ok_or_else(|| LayoutError::StalePath(split.path.clone()))?;
        let current = get_node_at_path(root, &split.path)
            .ok_or_else(|| LayoutError::StalePath(split.path.clone()))?
            .as_parent()
            .ok_or_else(|| LayoutError::NotAParent(split.path.clone()))?;
        if current.split_percentage == split.split_percentage {
            return Ok(None);
        }

        let new_root = update_tree(
            root,
            &[MosaicUpdate::split_percentage(split.path.clone(), split.split_percentage)],
        )?;
        Ok(Some(self.commit(Some(new_root))))
    }
}

fn path_exists<T>(tree: &MosaicTree<T>, path: &[MosaicBranch]) -> bool {
    match tree {
        Some(root) => get_node_at_path(root, path).is_some(),
        None => path.is_empty(),
    }
}

fn join_paths(prefix: &[MosaicBranch], suffix: &[MosaicBranch]) -> MosaicPath {
    prefix.iter().chain(suffix).copied().collect()
}

/// Gives a split created by `update` the configured percentage.
fn with_split_percentage<T: Clone>(update: MosaicUpdate<T>, split_percentage: f64) -> MosaicUpdate<T> {
    let MosaicPatch::Set(node) = &update.patch else {
        return update;
    };
    let MosaicNode::Parent(parent) = node.as_ref() else {
        return update;
    };
    if parent.split_percentage == split_percentage {
        return update;
    }

    let node = Arc::new(MosaicNode::Parent(MosaicParent {
        split_percentage,
        ..parent.clone()
    }));
    MosaicUpdate::set(update.path, node)
}
