use crate::id::InputId;
use glam::Vec2;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEventKind {
    KeyDown,
    KeyUp,
    MouseDown,
    MouseMove,
    MouseUp,
}

impl fmt::Display for InputEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::MouseUp => "mouseup",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputPayload {
    Key(InputId),
    /// Cursor position in window pixels.
    Pointer(Vec2),
}

/// Read-only copy of the active input state: id to time of activation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    active: BTreeMap<InputId, Instant>,
}

impl InputSnapshot {
    /// Whether `id` was active when the snapshot was taken.
    pub fn is_active(&self, id: InputId) -> bool {
        self.active.contains_key(&id)
    }

    /// When `id` became active, if it is.
    pub fn activated_at(&self, id: InputId) -> Option<Instant> {
        self.active.get(&id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (InputId, Instant)> + '_ {
        self.active.iter().map(|(id, at)| (*id, *at))
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// One emitted input event.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub kind: InputEventKind,
    /// State after this event was applied.
    pub snapshot: InputSnapshot,
    pub payload: InputPayload,
}

impl InputEvent {
    /// Cursor position for mouse events.
    pub fn pointer(&self) -> Option<Vec2> {
        match self.payload {
            InputPayload::Pointer(p) => Some(p),
            InputPayload::Key(_) => None,
        }
    }

    /// Key for key events.
    pub fn key(&self) -> Option<InputId> {
        match self.payload {
            InputPayload::Key(id) => Some(id),
            InputPayload::Pointer(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<C> = Box<dyn FnMut(&mut C, &InputEvent)>;

/// Aggregates raw device events into a queryable state and an event stream.
///
/// Listeners receive the context `C` the host passes into each raw event
/// (typically the scene), so they can mutate it directly.
pub struct InputTracker<C> {
    active: BTreeMap<InputId, Instant>,
    listeners: Vec<(ListenerId, InputEventKind, Listener<C>)>,
    next_listener: u64,
}

impl<C> InputTracker<C> {
    /// Tracker with nothing active and no listeners.
    pub fn new() -> Self {
        Self {
            active: BTreeMap::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// Subscribe to one event kind. Listeners of a kind run in subscription order.
    pub fn on(
        &mut self,
        kind: InputEventKind,
        listener: impl FnMut(&mut C, &InputEvent) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, kind, Box::new(listener)));
        id
    }

    /// Unsubscribe. Returns false if `id` was not subscribed.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _, _)| *l != id);
        self.listeners.len() != before
    }

    /// Drop every listener.
    pub fn clear_listeners(&mut self) {
        if !self.listeners.is_empty() {
            tracing::debug!(count = self.listeners.len(), "input listeners cleared");
        }
        self.listeners.clear();
    }

    /// Number of subscribed listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// A key went down. Ignored (no event, timestamp kept) if already active.
    pub fn key_down(&mut self, id: InputId, at: Instant, ctx: &mut C) -> bool {
        if self.active.contains_key(&id) {
            return false;
        }
        self.active.insert(id, at);
        self.emit(InputEventKind::KeyDown, InputPayload::Key(id), ctx);
        true
    }

    /// A key went up. Always emits.
    pub fn key_up(&mut self, id: InputId, ctx: &mut C) {
        self.active.remove(&id);
        self.emit(InputEventKind::KeyUp, InputPayload::Key(id), ctx);
    }

    /// Record a press at `position` and emit `mousedown`.
    pub fn mouse_down(&mut self, position: Vec2, at: Instant, ctx: &mut C) {
        self.active.insert(InputId::MouseDown, at);
        self.active.remove(&InputId::MouseUp);
        self.emit(InputEventKind::MouseDown, InputPayload::Pointer(position), ctx);
    }

    /// Record the cursor at `position` and emit `mousemove`.
    pub fn mouse_move(&mut self, position: Vec2, at: Instant, ctx: &mut C) {
        self.active.insert(InputId::MouseMove, at);
        self.emit(InputEventKind::MouseMove, InputPayload::Pointer(position), ctx);
    }

    /// Record a release at `position` and emit `mouseup`.
    pub fn mouse_up(&mut self, position: Vec2, at: Instant, ctx: &mut C) {
        self.active.remove(&InputId::MouseDown);
        self.active.insert(InputId::MouseUp, at);
        self.emit(InputEventKind::MouseUp, InputPayload::Pointer(position), ctx);
    }

    /// Override the state of one id without emitting anything.
    pub fn set_state(&mut self, id: InputId, at: Option<Instant>) {
        match at {
            Some(at) => self.active.insert(id, at),
            None => self.active.remove(&id),
        };
    }

    /// Whether `id` is active right now.
    pub fn is_active(&self, id: InputId) -> bool {
        self.active.contains_key(&id)
    }

    /// Copy of the current activation map.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            active: self.active.clone(),
        }
    }

    fn emit(&mut self, kind: InputEventKind, payload: InputPayload, ctx: &mut C) {
        let event = InputEvent {
            kind,
            snapshot: self.snapshot(),
            payload,
        };
        tracing::trace!(%kind, ?payload, "input event");
        for (_, listens_to, listener) in self.listeners.iter_mut() {
            if *listens_to == kind {
                listener(ctx, &event);
            }
        }
    }
}

impl<C> Default for InputTracker<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for InputTracker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputTracker")
            .field("active", &self.active)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
