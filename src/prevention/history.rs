// src/prevention/history.rs
// Bounded histories behind rewinds and the consecutive-check debounce.

use glam::Vec3;

use crate::prevention::PreventionReason;
use crate::ring::RingBuffer;

/// Known-safe headset and camera-rig positions, saved in lockstep.
#[derive(Debug, Clone)]
pub struct SafePositionHistory {
    headset: RingBuffer<Vec3>,
    rig: RingBuffer<Vec3>,
    last_saved_headset: Option<Vec3>,
}

impl SafePositionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            headset: RingBuffer::new(capacity),
            rig: RingBuffer::new(capacity),
            last_saved_headset: None,
        }
    }

    pub fn len(&self) -> usize {
        self.headset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headset.is_empty()
    }

    pub fn latest(&self) -> Option<(Vec3, Vec3)> {
        Some((self.headset.latest()?, self.rig.latest()?))
    }

    pub fn headset_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.headset.iter()
    }

    pub fn rig_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.rig.iter()
    }

    /// True once the headset is more than `min_distance` from the last saved entry.
    pub fn moved_enough(&self, headset: Vec3, min_distance: f32) -> bool {
        match self.last_saved_headset {
            Some(last) => headset.distance(last) > min_distance,
            None => true,
        }
    }

    pub fn record(&mut self, headset: Vec3, rig: Vec3) {
        self.headset.push(headset);
        self.rig.push(rig);
        self.last_saved_headset = Some(headset);
    }

    /// Drop up to `count` newest entries, always keeping the oldest one, and
    /// return the `(headset, rig)` pair now on top.
    pub fn rewind(&mut self, count: usize) -> Option<(Vec3, Vec3)> {
        let droppable = self.len().saturating_sub(1).min(count);
        if droppable < count {
            tracing::debug!(
                "Rewind asked for {} positions but only {} are available, using the oldest",
                count,
                droppable
            );
        }
        for _ in 0..droppable {
            self.headset.pop_back();
            self.rig.pop_back();
        }
        let top = self.latest();
        self.last_saved_headset = top.map(|(headset, _)| headset);
        top
    }

    pub fn resize(&mut self, capacity: usize) {
        if self.headset.capacity() != capacity {
            self.headset.resize(capacity);
            self.rig.resize(capacity);
        }
    }

    pub fn clear(&mut self) {
        self.headset.clear();
        self.rig.clear();
        self.last_saved_headset = None;
    }
}

/// Most recent check outcomes for one check family. Fires only when every slot
/// holds a violation, i.e. after `required` consecutive out-of-bounds checks.
#[derive(Debug, Clone)]
pub struct PreventionReasonHistory {
    outcomes: RingBuffer<PreventionReason>,
}

impl PreventionReasonHistory {
    pub fn new(required: usize) -> Self {
        Self {
            outcomes: RingBuffer::new(required.max(1)),
        }
    }

    pub fn required(&self) -> usize {
        self.outcomes.capacity()
    }

    pub fn set_required(&mut self, required: usize) {
        if required.max(1) != self.outcomes.capacity() {
            self.outcomes.resize(required.max(1));
        }
    }

    pub fn record(&mut self, outcome: PreventionReason) {
        self.outcomes.push(outcome);
    }

    /// The newest check was out of bounds.
    pub fn latest_is_violation(&self) -> bool {
        self.outcomes.latest().is_some_and(|r| r.is_violation())
    }

    /// Returns the reason to correct for once the queue is entirely out of bounds.
    pub fn triggered(&self) -> Option<PreventionReason> {
        if self.outcomes.is_full() && self.outcomes.iter().all(|r| r.is_violation()) {
            self.outcomes.latest()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.outcomes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debounce_needs_consecutive_violations() {
        let mut history = PreventionReasonHistory::new(3);
        history.record(PreventionReason::Climbing);
        assert_eq!(history.triggered(), None);
        history.record(PreventionReason::Climbing);
        history.record(PreventionReason::None);
        history.record(PreventionReason::Climbing);
        assert_eq!(history.triggered(), None);
        history.record(PreventionReason::Climbing);
        assert_eq!(history.triggered(), None);
        history.record(PreventionReason::Falling);
        assert_eq!(history.triggered(), Some(PreventionReason::Falling));
    }

    #[test]
    fn test_rewind_pops_requested_depth() {
        let mut history = SafePositionHistory::new(28);
        for i in 0..10 {
            let p = Vec3::new(i as f32, 0.0, 0.0);
            history.record(p, p);
        }
        let (headset, _) = history.rewind(7).unwrap();
        assert_eq!(headset.x, 2.0);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_rewind_with_short_history_uses_oldest() {
        let mut history = SafePositionHistory::new(28);
        for i in 0..3 {
            let p = Vec3::new(i as f32, 0.0, 0.0);
            history.record(p, p);
        }
        let (headset, _) = history.rewind(7).unwrap();
        assert_eq!(headset.x, 0.0);
        assert_eq!(history.len(), 1);
        assert!(SafePositionHistory::new(4).rewind(2).is_none());
    }

    #[test]
    fn test_store_not_greater_than_rewind_lands_on_oldest() {
        let mut history = SafePositionHistory::new(3);
        for i in 0..6 {
            let p = Vec3::new(i as f32, 0.0, 0.0);
            history.record(p, p);
        }
        // only 3 stored: [3, 4, 5]; asking for 3 can go back at most 2
        let (headset, _) = history.rewind(3).unwrap();
        assert_eq!(headset.x, 3.0);
    }

    #[test]
    fn test_moved_enough() {
        let mut history = SafePositionHistory::new(4);
        assert!(history.moved_enough(Vec3::ZERO, 0.05));
        history.record(Vec3::ZERO, Vec3::ZERO);
        assert!(!history.moved_enough(Vec3::new(0.04, 0.0, 0.0), 0.05));
        assert!(history.moved_enough(Vec3::new(0.06, 0.0, 0.0), 0.05));
    }
}
