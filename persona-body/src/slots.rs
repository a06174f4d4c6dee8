//! Active and fading-out action slots

use crate::mixer::{ActionId, PlaybackAction};
use persona_core::ScheduledTask;

/// An action on its way out, with the task that will release it
#[derive(Debug)]
pub struct FadingAction {
    pub action: PlaybackAction,
    release: ScheduledTask,
}

impl FadingAction {
    pub fn new(action: PlaybackAction, release: ScheduledTask) -> Self {
        Self { action, release }
    }

    /// Stop the pending release; the caller now owns the action's lifetime
    pub fn cancel_release(&self) {
        self.release.cancel();
    }
}

/// At most one active action plus at most one fading out during a crossfade
///
/// The fading slot only exists for the crossfade window. Starting another
/// fade evicts whatever was still fading; the caller must release it.
#[derive(Debug, Default)]
pub struct ActionSlots {
    active: Option<PlaybackAction>,
    fading_out: Option<FadingAction>,
}

impl ActionSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&PlaybackAction> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut PlaybackAction> {
        self.active.as_mut()
    }

    pub fn fading(&self) -> Option<&PlaybackAction> {
        self.fading_out.as_ref().map(|fading| &fading.action)
    }

    /// Install a new active action, returning the previous one
    pub fn replace_active(&mut self, action: PlaybackAction) -> Option<PlaybackAction> {
        self.active.replace(action)
    }

    pub fn clear_active(&mut self) -> Option<PlaybackAction> {
        self.active.take()
    }

    /// Move an action into the fading slot, evicting any earlier fade
    pub fn begin_fade(&mut self, fading: FadingAction) -> Option<FadingAction> {
        self.fading_out.replace(fading)
    }

    /// Take the fading action if it is `id`; a later fade may have replaced it
    pub fn finish_fade(&mut self, id: ActionId) -> Option<PlaybackAction> {
        match &self.fading_out {
            Some(fading) if fading.action.id == id => self.fading_out.take().map(|f| f.action),
            _ => None,
        }
    }

    /// Pull `id` back out of the fading slot when it is being played again
    pub fn revive(&mut self, id: ActionId) -> Option<PlaybackAction> {
        match &self.fading_out {
            Some(fading) if fading.action.id == id => self.fading_out.take().map(|fading| {
                fading.cancel_release();
                fading.action
            }),
            _ => None,
        }
    }

    pub fn take_fading(&mut self) -> Option<FadingAction> {
        self.fading_out.take()
    }

    /// Number of actions currently held in the mixer by the state machine
    pub fn occupied(&self) -> usize {
        usize::from(self.active.is_some()) + usize::from(self.fading_out.is_some())
    }
}
