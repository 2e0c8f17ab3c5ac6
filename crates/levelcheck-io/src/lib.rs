//! Ambient file readers (SPEC_FULL §6a): minimal, line-oriented parsers for
//! the model, power, fuse-override, and flat-netlist formats described in
//! the distilled spec's §6. These are deliberately small subsets of the
//! real grammars — a full SPICE lexer/tokenizer remains out of scope (§1)
//! — but they are enough to build a [`levelcheck_circuit::CircuitLibrary`],
//! [`levelcheck_model::ModelLibrary`], and [`levelcheck_power::PowerSpec`]
//! end to end for the CLI and for this workspace's own tests.

pub mod error;
pub mod fuse_file;
pub mod model_file;
pub mod netlist_file;
pub mod power_file;

pub use error::{IoError, Result};
pub use fuse_file::{FuseOverride, FuseOverrides};
pub use model_file::read_model_file;
pub use netlist_file::read_netlist_file;
pub use power_file::read_power_file;
