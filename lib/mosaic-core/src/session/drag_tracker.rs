use crate::geometry::Position;
use crate::session::{SurfaceEvent, SurfaceId};
use log::{trace, warn};

pub const DEFAULT_DRAG_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum PointerDragEvent {
    /// A press that may still turn into a drag
    Press { surface: SurfaceId, position: Position },
    /// The pointer moved past the threshold. `origin` is where it was pressed.
    Start {
        origin_surface: SurfaceId,
        origin: Position,
        surface: SurfaceId,
        position: Position,
    },
    Drag { surface: SurfaceId, position: Position },
    End { surface: SurfaceId, position: Position },
    /// The press ended without becoming a drag, or the drag was aborted
    Cancel,
}

#[derive(Debug)]
struct PressContext {
    surface: SurfaceId,
    start_position: Position,
    started: bool,
}

/// Turns raw pointer events from every surface into a single press/drag
/// sequence. Only one sequence is tracked at a time.
#[derive(Debug)]
pub struct PointerDragTracker {
    threshold: i32,
    current: Option<PressContext>,
}

impl PointerDragTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold as i32,
            current: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn origin_surface(&self) -> Option<SurfaceId> {
        self.current.as_ref().map(|press| press.surface)
    }

    /// Drops the tracked press. Returns whether one was open.
    pub fn reset(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub fn handle_event(&mut self, surface: SurfaceId, event: &SurfaceEvent) -> Option<PointerDragEvent> {
        match event {
            SurfaceEvent::PointerDown(position) => {
                if let Some(press) = &self.current {
                    warn!(
                        "Ignoring press on surface {surface}, a press from surface {} is still open",
                        press.surface
                    );
                    return None;
                }

                self.current = Some(PressContext {
                    surface,
                    start_position: position.clone(),
                    started: false,
                });
                Some(PointerDragEvent::Press {
                    surface,
                    position: position.clone(),
                })
            }
            SurfaceEvent::PointerMoved(position) => {
                let threshold = self.threshold;
                let press = self.current.as_mut()?;

                if press.started {
                    return Some(PointerDragEvent::Drag {
                        surface,
                        position: position.clone(),
                    });
                }

                // Coordinates of different surfaces are not comparable; leaving the origin counts as moving
                let moved_far_enough = surface != press.surface
                    || press.start_position.max_axis_distance(position) > threshold;
                if !moved_far_enough {
                    return None;
                }

                trace!("Pointer passed drag threshold on surface {surface}");
                press.started = true;
                Some(PointerDragEvent::Start {
                    origin_surface: press.surface,
                    origin: press.start_position.clone(),
                    surface,
                    position: position.clone(),
                })
            }
            SurfaceEvent::PointerUp(position) => {
                let press = self.current.take()?;
                if press.started {
                    Some(PointerDragEvent::End {
                        surface,
                        position: position.clone(),
                    })
                } else {
                    Some(PointerDragEvent::Cancel)
                }
            }
            SurfaceEvent::Cancel => self.current.take().map(|_| PointerDragEvent::Cancel),
            _ => None,
        }
    }
}

impl Default for PointerDragTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(x: i32, y: i32) -> SurfaceEvent {
        SurfaceEvent::PointerDown(Position::new(x, y))
    }

    fn moved(x: i32, y: i32) -> SurfaceEvent {
        SurfaceEvent::PointerMoved(Position::new(x, y))
    }

    fn up(x: i32, y: i32) -> SurfaceEvent {
        SurfaceEvent::PointerUp(Position::new(x, y))
    }

    #[test]
    fn test_tracker_new() {
        let tracker = PointerDragTracker::default();
        assert_eq!(tracker.threshold, 5);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_moves_without_press_are_ignored() {
        let mut tracker = PointerDragTracker::new(5);
        assert_eq!(tracker.handle_event(1, &moved(50, 50)), None);
        assert_eq!(tracker.handle_event(1, &up(50, 50)), None);
    }

    #[test]
    fn test_click_does_not_start_drag() {
        let mut tracker = PointerDragTracker::new(5);
        assert!(matches!(tracker.handle_event(1, &down(10, 10)), Some(PointerDragEvent::Press { .. })));
        assert_eq!(tracker.handle_event(1, &moved(15, 10)), None);
        assert_eq!(tracker.handle_event(1, &up(15, 10)), Some(PointerDragEvent::Cancel));
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_drag_sequence() {
        let mut tracker = PointerDragTracker::new(5);
        tracker.handle_event(1, &down(10, 10));
        assert_eq!(
            tracker.handle_event(1, &moved(10, 16)),
            Some(PointerDragEvent::Start {
                origin_surface: 1,
                origin: Position::new(10, 10),
                surface: 1,
                position: Position::new(10, 16),
            })
        );
        assert_eq!(
            tracker.handle_event(1, &moved(12, 18)),
            Some(PointerDragEvent::Drag {
                surface: 1,
                position: Position::new(12, 18)
            })
        );
        assert_eq!(
            tracker.handle_event(2, &up(1, 1)),
            Some(PointerDragEvent::End {
                surface: 2,
                position: Position::new(1, 1)
            })
        );
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_move_on_other_surface_starts_drag() {
        let mut tracker = PointerDragTracker::new(5);
        tracker.handle_event(1, &down(10, 10));
        assert!(matches!(
            tracker.handle_event(2, &moved(10, 10)),
            Some(PointerDragEvent::Start {
                origin_surface: 1,
                surface: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_second_press_is_ignored() {
        let mut tracker = PointerDragTracker::new(5);
        tracker.handle_event(1, &down(10, 10));
        assert_eq!(tracker.handle_event(2, &down(50, 50)), None);
        assert_eq!(tracker.origin_surface(), Some(1));
    }

    #[test]
    fn test_cancel() {
        let mut tracker = PointerDragTracker::new(5);
        assert_eq!(tracker.handle_event(1, &SurfaceEvent::Cancel), None);
        tracker.handle_event(1, &down(10, 10));
        tracker.handle_event(1, &moved(40, 40));
        assert_eq!(tracker.handle_event(1, &SurfaceEvent::Cancel), Some(PointerDragEvent::Cancel));
        assert_eq!(tracker.handle_event(1, &moved(50, 50)), None);
    }

    #[test]
    fn test_reset() {
        let mut tracker = PointerDragTracker::new(5);
        assert!(!tracker.reset());
        tracker.handle_event(3, &down(0, 0));
        assert!(tracker.reset());
        assert!(!tracker.is_active());
    }
}
