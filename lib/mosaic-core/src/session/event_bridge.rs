use crate::geometry::{Bounds, Position};
use crate::session::SurfaceId;
use tokio::sync::mpsc;

/// Input a surface forwards to the backend. Positions are in the surface's
/// own coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    PointerDown(Position),
    PointerMoved(Position),
    PointerUp(Position),
    /// The pointer left the surface
    PointerLeft,
    /// Abort the open drag, e.g. on escape
    Cancel,
    Resized(Bounds),
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    Surface(SurfaceId, SurfaceEvent),
    Shutdown,
}

pub struct EventBridge {
    sender: mpsc::UnboundedSender<BridgeEvent>,
    receiver: mpsc::UnboundedReceiver<BridgeEvent>,
    pending_event: Option<BridgeEvent>,
}

impl EventBridge {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver,
            pending_event: None,
        }
    }

    pub fn dispatcher(&self, surface: SurfaceId) -> EventDispatcher {
        EventDispatcher::new(surface, self.sender.clone())
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            sender: self.sender.clone(),
        }
    }

    pub async fn next_event(&mut self) -> Option<BridgeEvent> {
        if let Some(event) = self.pending_event.take() {
            return Some(event);
        }

        let event = self.receiver.recv().await?;
        Some(self.coalesce(event))
    }

    /// Like [`next_event`](Self::next_event), but returns `None` instead of
    /// waiting when nothing is queued.
    pub fn try_next_event(&mut self) -> Option<BridgeEvent> {
        if let Some(event) = self.pending_event.take() {
            return Some(event);
        }

        let event = self.receiver.try_recv().ok()?;
        Some(self.coalesce(event))
    }

    /// Only the newest of a run of moves from the same surface is kept.
    fn coalesce(&mut self, mut event: BridgeEvent) -> BridgeEvent {
        let BridgeEvent::Surface(surface, SurfaceEvent::PointerMoved(_)) = event else {
            return event;
        };

        loop {
            match self.receiver.try_recv() {
                Ok(BridgeEvent::Surface(next, SurfaceEvent::PointerMoved(position))) if next == surface => {
                    event = BridgeEvent::Surface(surface, SurfaceEvent::PointerMoved(position));
                }
                Ok(other_event) => {
                    self.pending_event = Some(other_event);
                    break;
                }
                Err(_) => break,
            }
        }

        event
    }
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle a surface uses to forward its events. Cheap to clone and usable
/// from any thread.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    surface: SurfaceId,
    sender: mpsc::UnboundedSender<BridgeEvent>,
}

impl EventDispatcher {
    pub fn new(surface: SurfaceId, sender: mpsc::UnboundedSender<BridgeEvent>) -> Self {
        Self { surface, sender }
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn send(&self, event: SurfaceEvent) {
        // Fails only once the backend has been dropped
        let _ = self.sender.send(BridgeEvent::Surface(self.surface, event));
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: mpsc::UnboundedSender<BridgeEvent>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        let _ = self.sender.send(BridgeEvent::Shutdown);
    }
}
