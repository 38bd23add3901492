//! Routing protocol selection and installation.
//!
//! Maps a numeric protocol code onto a closed set of protocols and binds the
//! chosen one to every node through its installation path. The protocols
//! themselves belong to the simulation engine; this module only decides what
//! gets installed and how.

pub mod installer;
pub mod types;

pub use installer::{install, InstallError, RoutingHandle, RoutingStack};
pub use types::{InstallPath, ListRouting, ProtocolChoice, LIST_ROUTING_PRIORITY};
