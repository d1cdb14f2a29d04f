use std::collections::VecDeque;
use std::sync::Arc;

use image::RgbaImage;

use crate::canvas::PixelBuffer;

/// Default number of snapshots kept in the undo log.
pub const DEFAULT_HISTORY_CAP: usize = 20;

// ============================================================================
// HISTORY ENTRY — immutable full-buffer snapshot
// ============================================================================

/// A frozen copy of a [`PixelBuffer`].
///
/// The pixels sit behind an `Arc`, so cloning an entry never copies pixel
/// data, and nothing can mutate them after capture.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    label: String,
    pixels: Arc<RgbaImage>,
}

impl HistoryEntry {
    /// Copy `buffer` into a new entry.
    pub fn capture(label: impl Into<String>, buffer: &PixelBuffer) -> Self {
        Self {
            label: label.into(),
            pixels: Arc::new(buffer.as_image().clone()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Overwrite `buffer` with this snapshot, dimensions included.
    pub fn restore_into(&self, buffer: &mut PixelBuffer) {
        *buffer = self.to_buffer();
    }

    /// A fresh, independently owned buffer holding this snapshot.
    pub fn to_buffer(&self) -> PixelBuffer {
        PixelBuffer::from_image(self.pixels.as_ref().clone())
    }

    pub fn memory_size(&self) -> usize {
        self.pixels.as_raw().len() + self.label.len()
    }
}

// ============================================================================
// HISTORY STACK — bounded linear undo/redo over snapshots
// ============================================================================

/// Linear undo/redo log of full-buffer snapshots.
///
/// `past` runs oldest → newest and its last element is the current state; the
/// first element is the floor and is never undone. `future` holds undone
/// states with the most recently undone on top.
pub struct HistoryStack {
    past: VecDeque<HistoryEntry>,
    future: Vec<HistoryEntry>,
    capacity: usize,
    /// Running memory total across both stacks.
    total_memory: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl HistoryStack {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            past: VecDeque::with_capacity(capacity.max(1) + 1),
            future: Vec::new(),
            capacity: capacity.max(1),
            total_memory: 0,
        }
    }

    /// Record `buffer` as the newest state.
    pub fn commit(&mut self, buffer: &PixelBuffer) {
        self.commit_labeled("Snapshot", buffer);
    }

    /// Record `buffer` under a description shown in [`undo_history`](Self::undo_history).
    ///
    /// Clears the redo branch and silently evicts the oldest states beyond the cap.
    pub fn commit_labeled(&mut self, label: impl Into<String>, buffer: &PixelBuffer) {
        for entry in self.future.drain(..) {
            self.total_memory = self.total_memory.saturating_sub(entry.memory_size());
        }

        let entry = HistoryEntry::capture(label, buffer);
        self.total_memory += entry.memory_size();
        self.past.push_back(entry);

        self.prune();
    }

    /// Step back one state. Returns the state to apply, or `None` at the floor.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if self.past.len() <= 1 {
            return None;
        }
        let top = self.past.pop_back()?;
        self.future.push(top);
        self.past.back()
    }

    /// Step forward one state. Returns the state to apply, or `None` when
    /// nothing has been undone since the last commit.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let entry = self.future.pop()?;
        self.past.push_back(entry);
        self.past.back()
    }

    pub fn can_undo(&self) -> bool {
        self.past.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// The state the buffer should currently hold.
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.past.back()
    }

    /// Entries in the undo log, floor included.
    pub fn undo_count(&self) -> usize {
        self.past.len()
    }

    pub fn redo_count(&self) -> usize {
        self.future.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.past.is_empty()
    }

    /// Labels of the undo log, most recent first.
    pub fn undo_history(&self) -> Vec<String> {
        self.past.iter().rev().map(|e| e.label.clone()).collect()
    }

    /// Labels of the redo branch, next redo first.
    pub fn redo_history(&self) -> Vec<String> {
        self.future.iter().rev().map(|e| e.label.clone()).collect()
    }

    /// Bytes held by both stacks.
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.total_memory = 0;
    }

    fn prune(&mut self) {
        while self.past.len() > self.capacity {
            if let Some(removed) = self.past.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
            }
        }
    }
}
