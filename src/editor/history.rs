//! Snapshot-based undo/redo over the persistent buffer
//!
//! Every entry is a full, losslessly encoded copy of the buffer. Saving after
//! an undo discards the undone entries; the oldest entry is dropped once the
//! stack exceeds its depth.

use anyhow::Context;
use image::RgbaImage;

use crate::capture::image::write_png;

pub const DEFAULT_MAX_DEPTH: usize = 50;

#[derive(Clone, Debug)]
pub struct HistoryStack {
    snapshots: Vec<Vec<u8>>,
    /// Index of the snapshot matching the current buffer
    step: usize,
    max_depth: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl HistoryStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            step: 0,
            max_depth: max_depth.max(1),
        }
    }

    /// Record the buffer as the newest state
    pub fn save(&mut self, buffer: &RgbaImage) -> anyhow::Result<()> {
        let snapshot = encode(buffer)?;
        self.push(snapshot);
        Ok(())
    }

    /// Record the buffer unless it already matches the current snapshot
    pub fn save_if_changed(&mut self, buffer: &RgbaImage) -> anyhow::Result<bool> {
        let snapshot = encode(buffer)?;
        if self.snapshots.get(self.step) == Some(&snapshot) {
            return Ok(false);
        }
        self.push(snapshot);
        Ok(true)
    }

    fn push(&mut self, snapshot: Vec<u8>) {
        if !self.is_empty() {
            self.snapshots.truncate(self.step + 1);
        }
        self.snapshots.push(snapshot);
        self.step = self.snapshots.len() - 1;

        if self.snapshots.len() > self.max_depth {
            self.snapshots.remove(0);
            self.step -= 1;
        }
        log::debug!("History saved: step {} of {}", self.step, self.snapshots.len());
    }

    /// Step back, overwriting `buffer`; returns false when there is nothing to undo
    pub fn undo(&mut self, buffer: &mut RgbaImage) -> anyhow::Result<bool> {
        if !self.can_undo() {
            return Ok(false);
        }
        *buffer = self.decode(self.step - 1)?;
        self.step -= 1;
        Ok(true)
    }

    /// Step forward, overwriting `buffer`; returns false when there is nothing to redo
    pub fn redo(&mut self, buffer: &mut RgbaImage) -> anyhow::Result<bool> {
        if !self.can_redo() {
            return Ok(false);
        }
        *buffer = self.decode(self.step + 1)?;
        self.step += 1;
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty() && self.step > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.snapshots.is_empty() && self.step + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    fn decode(&self, index: usize) -> anyhow::Result<RgbaImage> {
        let image = image::load_from_memory(&self.snapshots[index])
            .with_context(|| format!("failed to decode history snapshot {index}"))?;
        Ok(image.into_rgba8())
    }
}

fn encode(buffer: &RgbaImage) -> anyhow::Result<Vec<u8>> {
    let mut snapshot = Vec::new();
    write_png(&mut snapshot, buffer).context("failed to encode history snapshot")?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// 2x2 image filled with a value identifying the state
    fn state(n: u8) -> RgbaImage {
        RgbaImage::from_pixel(2, 2, Rgba([n, n, n, 255]))
    }

    fn saved(history: &mut HistoryStack, states: impl IntoIterator<Item = u8>) {
        for n in states {
            history.save(&state(n)).unwrap();
        }
    }

    #[test]
    fn test_length_bounded_by_depth() {
        for (saves, depth) in [(3, 50), (50, 50), (51, 50), (120, 50), (7, 1), (10, 4)] {
            let mut history = HistoryStack::new(depth);
            saved(&mut history, (0..saves).map(|n| n as u8));
            assert_eq!(history.len(), saves.min(depth), "{saves} saves, depth {depth}");
            assert_eq!(history.step(), history.len() - 1);
        }
    }

    #[test]
    fn test_undo_then_redo() {
        let mut history = HistoryStack::default();
        saved(&mut history, [1, 2, 3]);
        let mut buffer = state(3);

        assert!(history.undo(&mut buffer).unwrap());
        assert_eq!(buffer, state(2));
        assert!(history.redo(&mut buffer).unwrap());
        assert_eq!(buffer, state(3));
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let mut history = HistoryStack::default();
        let mut buffer = state(9);
        assert!(!history.undo(&mut buffer).unwrap());

        saved(&mut history, [1]);
        assert!(!history.undo(&mut buffer).unwrap());
        assert!(!history.redo(&mut buffer).unwrap());
        assert_eq!(buffer, state(9));
    }

    #[test]
    fn test_save_after_undo_truncates() {
        let mut history = HistoryStack::default();
        saved(&mut history, 0..5);
        let mut buffer = state(4);
        history.undo(&mut buffer).unwrap();
        history.undo(&mut buffer).unwrap();
        assert_eq!(history.step(), 2);
        assert_eq!(buffer, state(2));

        history.save(&state(7)).unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history.step(), 3);
        assert!(!history.can_redo());

        history.undo(&mut buffer).unwrap();
        assert_eq!(buffer, state(2));
    }

    #[test]
    fn test_unchanged_buffer_not_saved_twice() {
        let mut history = HistoryStack::default();
        assert!(history.is_empty());
        assert!(history.save_if_changed(&state(1)).unwrap());
        assert!(!history.save_if_changed(&state(1)).unwrap());
        assert!(history.save_if_changed(&state(2)).unwrap());
        assert_eq!(history.len(), 2);

        let mut buffer = state(2);
        history.undo(&mut buffer).unwrap();
        assert!(history.save_if_changed(&state(2)).unwrap());
        assert_eq!(history.len(), 2);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_eviction_shifts_cursor() {
        let mut history = HistoryStack::new(3);
        saved(&mut history, [1, 2, 3, 4]);
        let mut buffer = state(4);
        assert!(history.undo(&mut buffer).unwrap());
        assert!(history.undo(&mut buffer).unwrap());
        assert_eq!(buffer, state(2));
        // State 1 was evicted
        assert!(!history.undo(&mut buffer).unwrap());
    }
}
