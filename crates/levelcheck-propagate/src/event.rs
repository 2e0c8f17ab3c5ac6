//! Events dispatched from the three resistance-priority queues (C8): one
//! event per (device, queue kind) at a time.

use levelcheck_core::{DeviceId, Resistance};

/// Which of the three coupled propagation queues an event belongs to.
/// Min-leak and max-leak passes reuse the `Min`/`Max` queue machinery in a
/// separate [`crate::queue::EventQueue`] instance rather than adding two
/// more kinds (distilled spec §3: "three coupled event queues").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    Min,
    Max,
    Sim,
}

/// One dequeued unit of work: re-evaluate `device` under `kind`, having been
/// enqueued at `enqueue_resistance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub device: DeviceId,
    pub kind: QueueKind,
    pub enqueue_resistance: Resistance,
}
