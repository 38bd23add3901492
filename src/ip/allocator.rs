//! Sequential IPv4 address allocation within one subnet.

use crate::config::ConfigError;
use std::net::Ipv4Addr;

/// Allocates host addresses of `network/mask` in ascending order, skipping
/// the network and broadcast addresses.
#[derive(Debug, Clone)]
pub struct AddressAllocator {
    network: u32,
    mask: u32,
    next_host: u32,
}

impl AddressAllocator {
    pub fn new(base: Ipv4Addr, mask: Ipv4Addr) -> Result<Self, ConfigError> {
        let mask = u32::from(mask);
        // Contiguous ones followed by zeros.
        if mask.leading_ones() + mask.trailing_zeros() != 32 {
            return Err(ConfigError::Invalid(format!(
                "network mask {} is not contiguous",
                Ipv4Addr::from(mask)
            )));
        }
        if mask.trailing_zeros() < 2 {
            return Err(ConfigError::Invalid(format!(
                "network mask {} leaves no host addresses",
                Ipv4Addr::from(mask)
            )));
        }
        Ok(AddressAllocator {
            network: u32::from(base) & mask,
            mask,
            next_host: 1,
        })
    }

    /// Number of assignable host addresses in the subnet.
    pub fn capacity(&self) -> usize {
        (!self.mask - 1) as usize
    }

    pub fn remaining(&self) -> usize {
        self.capacity() + 1 - self.next_host as usize
    }

    pub fn allocate(&mut self) -> Option<Ipv4Addr> {
        if self.next_host >= !self.mask {
            return None;
        }
        let addr = Ipv4Addr::from(self.network | self.next_host);
        self.next_host += 1;
        Some(addr)
    }

    /// Allocate `count` addresses, or none at all if the subnet is too small.
    pub fn assign(&mut self, count: usize) -> Result<Vec<Ipv4Addr>, ConfigError> {
        if count > self.remaining() {
            return Err(ConfigError::AddressSpace {
                nodes: count,
                capacity: self.remaining(),
            });
        }
        Ok((0..count).filter_map(|_| self.allocate()).collect())
    }
}
