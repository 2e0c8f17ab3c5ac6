//! Connectivity index (C6) and virtual-net maps (C7): read-only structures
//! built once over an [`levelcheck_elaborate::Elaboration`] that the
//! propagation engine and rule checker query while walking the netlist.

pub mod connectivity;
pub mod equivalence;
pub mod link;
pub mod view;
pub mod virtual_net;

pub use connectivity::{ConnectivityIndex, Terminal};
pub use equivalence::EquivalenceClasses;
pub use link::{DeviceProfile, LinkedModels};
pub use view::{device_view, iter_devices, net_name, DeviceView, Terminals};
pub use virtual_net::VirtualNetMap;
