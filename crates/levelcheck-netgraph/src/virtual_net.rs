//! Virtual-net maps (C7): for each net, the next hop toward its driving
//! supply and the accumulated resistance to get there, for one of the five
//! voltage-propagation kinds (min, max, sim, min-leak, max-leak).
//!
//! One concrete `VirtualNetMap` type is shared by all five kinds rather than
//! hand-copied five times; callers in [`levelcheck_propagate`] hold one
//! instance per kind.

use std::cell::RefCell;

use levelcheck_core::{NetId, Resistance};

#[derive(Debug, Clone, Copy)]
struct Edge {
    next: NetId,
    /// Accumulated resistance from this net to its eventual driver, i.e.
    /// this edge's own resistance plus whatever `next`'s accumulated
    /// resistance was at install time.
    resistance: Resistance,
}

/// The `{nextNetId, resistance, finalNetId}` triplet per net, for one
/// propagation kind. `finalNetId` is memoized lazily with path compression.
#[derive(Debug)]
pub struct VirtualNetMap {
    edges: Vec<Option<Edge>>,
    final_cache: RefCell<Vec<Option<NetId>>>,
}

impl VirtualNetMap {
    pub fn new(net_count: usize) -> Self {
        Self { edges: vec![None; net_count], final_cache: RefCell::new(vec![None; net_count]) }
    }

    pub fn next_net(&self, net: NetId) -> Option<NetId> {
        self.edges[net.as_usize()].map(|e| e.next)
    }

    /// Accumulated resistance from `net` to its driver, or zero if `net`
    /// has no installed edge (it is itself a driver, or unreached).
    pub fn resistance(&self, net: NetId) -> Resistance {
        self.edges[net.as_usize()].map(|e| e.resistance).unwrap_or(Resistance::ZERO)
    }

    pub fn has_edge(&self, net: NetId) -> bool {
        self.edges[net.as_usize()].is_some()
    }

    /// The terminal (driving) net reached by following `nextNetId` from
    /// `net`, with memoized path compression. A net with no edge is its
    /// own final net.
    pub fn final_net(&self, net: NetId) -> NetId {
        if let Some(cached) = self.final_cache.borrow()[net.as_usize()] {
            return cached;
        }
        let mut path = vec![net];
        let mut cursor = net;
        let terminal = loop {
            match self.next_net(cursor) {
                Some(next) if next != cursor => {
                    path.push(next);
                    cursor = next;
                }
                _ => break cursor,
            }
        };
        let mut cache = self.final_cache.borrow_mut();
        for visited in path {
            cache[visited.as_usize()] = Some(terminal);
        }
        terminal
    }

    /// Install the edge `from -> to` with per-edge resistance
    /// `edge_resistance`, invalidating any cached final net for `from` (and
    /// transitively anything that pointed through it, which will simply
    /// recompute on next query since the cache only ever shortens paths).
    /// Callers are responsible for the update-rule comparison (distilled
    /// spec §4.3): only install when the candidate strictly improves the
    /// existing bound for `from`, or `from` was previously unknown.
    pub fn install(&mut self, from: NetId, to: NetId, edge_resistance: Resistance) {
        let accumulated = edge_resistance.saturating_add(self.resistance(to));
        self.edges[from.as_usize()] = Some(Edge { next: to, resistance: accumulated });
        self.invalidate(from);
    }

    fn invalidate(&mut self, net: NetId) {
        self.final_cache.borrow_mut()[net.as_usize()] = None;
    }
}
