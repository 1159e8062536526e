// src/nav/store.rs
//! Shared navigation state store
//!
//! One ingestion pipeline writes, any number of HTTP handlers read. All
//! access goes through [`NavStore::apply`], [`NavStore::capture_raw`] and
//! [`NavStore::snapshot`]; the lock itself is never handed out, so a reader
//! can only ever see whole field values.

use super::data::NavigationFix;
use chrono::{DateTime, Utc};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// How a single field should be merged into the store
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FieldUpdate<T> {
    /// Leave the stored value untouched
    #[default]
    Keep,
    /// Overwrite with a new value
    Set(T),
    /// Reset to "no value"
    Clear,
}

impl<T> FieldUpdate<T> {
    /// `Set` when a value is present, otherwise `Keep`
    pub fn set_if_present(value: Option<T>) -> Self {
        value.map_or(FieldUpdate::Keep, FieldUpdate::Set)
    }

    /// `Set` when a value is present, otherwise `Clear`
    pub fn set_or_clear(value: Option<T>) -> Self {
        value.map_or(FieldUpdate::Clear, FieldUpdate::Set)
    }

    pub fn is_keep(&self) -> bool {
        matches!(self, FieldUpdate::Keep)
    }

    /// Merge into `slot`; returns whether the stored value may have changed
    fn merge_into(self, slot: &mut Option<T>) -> bool {
        match self {
            FieldUpdate::Keep => false,
            FieldUpdate::Set(value) => {
                *slot = Some(value);
                true
            }
            // clearing an already unset field is not a change
            FieldUpdate::Clear => slot.take().is_some(),
        }
    }
}

/// Field writes derived from one sentence
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixUpdate {
    pub latitude: FieldUpdate<f64>,
    pub longitude: FieldUpdate<f64>,
    pub speed_knots: FieldUpdate<f64>,
    pub heading_degrees: FieldUpdate<f64>,
}

impl FixUpdate {
    pub fn is_empty(&self) -> bool {
        self.latitude.is_keep()
            && self.longitude.is_keep()
            && self.speed_knots.is_keep()
            && self.heading_degrees.is_keep()
    }
}

/// Cloneable handle to the process-wide navigation record
#[derive(Debug, Clone, Default)]
pub struct NavStore {
    inner: Arc<RwLock<NavigationFix>>,
}

impl NavStore {
    /// Create a store with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one sentence's field writes.
    ///
    /// All writes land under a single write lock. `last_update` advances
    /// only if a field was set, or a stored value was cleared.
    pub fn apply(&self, update: &FixUpdate) -> bool {
        if update.is_empty() {
            return false;
        }

        let mut fix = self.write();
        let mut written = false;
        written |= update.latitude.merge_into(&mut fix.latitude);
        written |= update.longitude.merge_into(&mut fix.longitude);
        written |= update.speed_knots.merge_into(&mut fix.speed_knots);
        written |= update.heading_degrees.merge_into(&mut fix.heading_degrees);

        if written {
            touch(&mut fix, Utc::now());
        }
        written
    }

    /// Replace the raw debug capture with a copy of `chunk`
    ///
    /// `touch` advances `last_update`; only raw capture mode passes `true`.
    pub fn capture_raw(&self, chunk: &[u8], touch_update: bool) {
        let mut fix = self.write();
        fix.raw_debug = Some(chunk.to_vec());
        if touch_update {
            touch(&mut fix, Utc::now());
        }
    }

    /// Consistent copy of the whole record
    pub fn snapshot(&self) -> NavigationFix {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, NavigationFix> {
        // A panicking writer cannot leave a torn field behind, so the data is still usable.
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, NavigationFix> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `last_update` never moves backwards, even if the wall clock does
fn touch(fix: &mut NavigationFix, now: DateTime<Utc>) {
    fix.last_update = Some(match fix.last_update {
        Some(prev) if prev > now => prev,
        _ => now,
    });
}
