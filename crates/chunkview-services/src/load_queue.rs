//! Load queue: deduplicates chunk requests and bounds concurrent loads.
//!
//! Per-coordinate lifecycle:
//!
//! ```text
//!   Unrequested → Queued → Loading → Resident
//!                                  ↘ Failed
//! ```
//!
//! Resident and Failed are terminal for the session. A coordinate is either in
//! `pending` or counted in `in_flight`, never both and never twice, so at most
//! one request per coordinate is ever outstanding.
//!
//! The queue is plain data. It is owned and mutated by exactly one task (the
//! coordinator); nothing here is shared or locked.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use chunkview_core::ChunkCoordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    Unrequested,
    Queued,
    Loading,
    Resident,
    Failed,
}

/// How a dispatched load ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Resident,
    Failed,
}

/// Point-in-time counts, for status reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub queued: usize,
    pub loading: usize,
    pub resident: usize,
    pub failed: usize,
    pub max_concurrent_loads: usize,
}

#[derive(Debug)]
pub struct LoadQueue {
    // Every coordinate ever requested. Doubles as the dedup set.
    states: HashMap<ChunkCoordinate, LoadState>,
    pending: VecDeque<ChunkCoordinate>,
    in_flight: usize,
    max_concurrent_loads: usize,
}

impl LoadQueue {
    /// A cap of 0 is raised to 1 so the queue can always make progress.
    pub fn new(max_concurrent_loads: usize) -> Self {
        Self {
            states: HashMap::new(),
            pending: VecDeque::new(),
            in_flight: 0,
            max_concurrent_loads: max_concurrent_loads.max(1),
        }
    }

    pub fn state(&self, coord: ChunkCoordinate) -> LoadState {
        self.states
            .get(&coord)
            .copied()
            .unwrap_or(LoadState::Unrequested)
    }

    /// Queue `coord` if it has never been requested. Returns true if it was
    /// newly queued; repeated calls are no-ops.
    pub fn ensure_queued(&mut self, coord: ChunkCoordinate) -> bool {
        if self.states.contains_key(&coord) {
            return false;
        }
        self.states.insert(coord, LoadState::Queued);
        self.pending.push_back(coord);
        tracing::trace!(chunk_x = coord.x, chunk_z = coord.z, "chunk queued");
        true
    }

    /// Queue every visible coordinate, then admit pending loads up to the
    /// concurrency cap. Returns the coordinates to dispatch, in FIFO order.
    pub fn tick<I>(&mut self, visible: I) -> Vec<ChunkCoordinate>
    where
        I: IntoIterator<Item = ChunkCoordinate>,
    {
        let newly_queued = visible
            .into_iter()
            .filter(|coord| self.ensure_queued(*coord))
            .count();
        if newly_queued > 0 {
            tracing::debug!(newly_queued, pending = self.pending.len(), "new chunks in view");
        }
        self.admit()
    }

    /// Move pending coordinates to Loading while under the cap.
    pub fn admit(&mut self) -> Vec<ChunkCoordinate> {
        let mut dispatched = Vec::new();
        while self.in_flight < self.max_concurrent_loads {
            let Some(coord) = self.pending.pop_front() else {
                break;
            };
            self.states.insert(coord, LoadState::Loading);
            self.in_flight += 1;
            dispatched.push(coord);
        }
        dispatched
    }

    /// Record the end of a load. Returns false, changing nothing, if `coord`
    /// was not Loading (stale or duplicate completion).
    pub fn complete(&mut self, coord: ChunkCoordinate, outcome: LoadOutcome) -> bool {
        let current = self.state(coord);
        if current != LoadState::Loading {
            tracing::debug!(
                chunk_x = coord.x,
                chunk_z = coord.z,
                state = ?current,
                "completion for chunk that is not loading, ignoring"
            );
            return false;
        }

        let next = match outcome {
            LoadOutcome::Resident => LoadState::Resident,
            LoadOutcome::Failed => LoadState::Failed,
        };
        self.states.insert(coord, next);
        self.in_flight -= 1;
        true
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn max_concurrent_loads(&self) -> usize {
        self.max_concurrent_loads
    }

    pub fn stats(&self) -> QueueStats {
        let mut stats = QueueStats {
            max_concurrent_loads: self.max_concurrent_loads,
            ..QueueStats::default()
        };
        for state in self.states.values() {
            match state {
                LoadState::Queued => stats.queued += 1,
                LoadState::Loading => stats.loading += 1,
                LoadState::Resident => stats.resident += 1,
                LoadState::Failed => stats.failed += 1,
                LoadState::Unrequested => {}
            }
        }
        stats
    }
}
