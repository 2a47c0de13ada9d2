use std::fmt;

/// Soft-delete state of a user or dataset row.
///
/// Persisted as the boolean `is_delete` column: `false` is [`Lifecycle::Active`],
/// `true` is [`Lifecycle::Deleted`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Visible to every live-row lookup.
    Active,
    /// Retained in storage but hidden until restored or purged.
    Deleted,
}

/// An event that moves a row through its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Delete,
    Restore,
    PermanentDelete,
}

/// Where a row ends up after a legal transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// The row stays in storage in the given state.
    To(Lifecycle),
    /// The row is removed from storage.
    Removed,
}

/// A transition that is not legal from the row's current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("cannot apply {event:?} to a row in state {from}")]
pub struct IllegalTransition {
    pub from: Lifecycle,
    pub event: LifecycleEvent,
}

impl Lifecycle {
    pub fn from_is_delete(is_delete: bool) -> Self {
        if is_delete { Self::Deleted } else { Self::Active }
    }

    pub fn is_delete(self) -> bool {
        matches!(self, Self::Deleted)
    }

    /// Apply `event` to a row currently in `self`.
    ///
    /// | From    | Event           | To      |
    /// |---------|-----------------|---------|
    /// | Active  | Delete          | Deleted |
    /// | Deleted | Restore         | Active  |
    /// | any     | PermanentDelete | removed |
    pub fn apply(self, event: LifecycleEvent) -> Result<Transition, IllegalTransition> {
        match (self, event) {
            (Self::Active, LifecycleEvent::Delete) => Ok(Transition::To(Self::Deleted)),
            (Self::Deleted, LifecycleEvent::Restore) => Ok(Transition::To(Self::Active)),
            (_, LifecycleEvent::PermanentDelete) => Ok(Transition::Removed),
            (from, event) => Err(IllegalTransition { from, event }),
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("Active"),
            Self::Deleted => f.write_str("Deleted"),
        }
    }
}

impl LifecycleEvent {
    /// The state a row must be in for this event to apply, if only one is legal.
    pub fn required_state(self) -> Option<Lifecycle> {
        match self {
            Self::Delete => Some(Lifecycle::Active),
            Self::Restore => Some(Lifecycle::Deleted),
            Self::PermanentDelete => None,
        }
    }
}

/// Which lifecycle states a lookup may see.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LifecycleFilter {
    /// Only `is_delete = false` rows.
    #[default]
    Live,
    /// Only `is_delete = true` rows.
    Deleted,
    /// No filter on `is_delete`.
    Any,
}

impl LifecycleFilter {
    /// The `is_delete` value to filter on, or `None` for no filter.
    pub fn is_delete(self) -> Option<bool> {
        match self {
            Self::Live => Some(false),
            Self::Deleted => Some(true),
            Self::Any => None,
        }
    }

    /// The filter a lookup needs to find rows that `event` can be applied to.
    pub fn for_event(event: LifecycleEvent) -> Self {
        match event.required_state() {
            Some(Lifecycle::Active) => Self::Live,
            Some(Lifecycle::Deleted) => Self::Deleted,
            None => Self::Any,
        }
    }
}
