//! IP address allocation.
//!
//! Hands out node addresses from a base network and mask, one per node in
//! node order, the way an ns-3 address helper numbers interfaces.

pub mod allocator;

pub use allocator::AddressAllocator;
