//! IPv4 CIDR block utilities.
//!
//! This file contains the address-range type used throughout the
//! synthesizer, with containment and overlap checks for validating
//! subnet layouts against their parent network.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Maximum prefix length for an IPv4 CIDR block (32 bits).
pub const MAX_PREFIX_LEN: u8 = 32;

/// Errors produced when parsing a CIDR string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CidrParseError {
    #[error("expected 'address/prefix' notation, got '{0}'")]
    MissingPrefix(String),
    #[error("invalid IPv4 address '{0}'")]
    InvalidAddress(String),
    #[error("invalid prefix length '{0}'")]
    InvalidPrefix(String),
    #[error("prefix length {0} exceeds {MAX_PREFIX_LEN}")]
    PrefixTooLong(u8),
}

/// An IPv4 address range in CIDR notation (e.g. `10.0.1.0/24`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CidrBlock {
    pub addr: Ipv4Addr,
    pub prefix_len: u8,
}

/// The all-addresses range used as the default route destination.
pub const DEFAULT_ROUTE: CidrBlock = CidrBlock {
    addr: Ipv4Addr::UNSPECIFIED,
    prefix_len: 0,
};

impl CidrBlock {
    /// Parse a CIDR string such as `"10.0.0.0/16"`.
    pub fn parse(s: &str) -> Result<Self, CidrParseError> {
        s.parse()
    }

    /// The subnet mask as a raw u32.
    fn mask(&self) -> u32 {
        // prefix_len is 0..=32 by construction; shifting a u64 avoids the
        // undefined full-width shift at prefix_len == 0.
        let host_bits = u32::from(MAX_PREFIX_LEN - self.prefix_len);
        ((u64::from(u32::MAX) >> host_bits) << host_bits) as u32
    }

    /// Lowest address in the range (the network address).
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.addr) & self.mask())
    }

    /// Highest address in the range (the broadcast address).
    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from((u32::from(self.addr) & self.mask()) | !self.mask())
    }

    /// Returns true if `other` is entirely contained within this block.
    pub fn contains(&self, other: &CidrBlock) -> bool {
        self.prefix_len <= other.prefix_len
            && (u32::from(other.addr) & self.mask()) == u32::from(self.network())
    }

    /// Returns true if the two ranges share at least one address.
    pub fn overlaps(&self, other: &CidrBlock) -> bool {
        u32::from(self.network()) <= u32::from(other.broadcast())
            && u32::from(other.network()) <= u32::from(self.broadcast())
    }
}

impl FromStr for CidrBlock {
    type Err = CidrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (addr_part, prefix_part) = s
            .split_once('/')
            .ok_or_else(|| CidrParseError::MissingPrefix(s.to_string()))?;
        let addr: Ipv4Addr = addr_part
            .parse()
            .map_err(|_| CidrParseError::InvalidAddress(addr_part.to_string()))?;
        let prefix_len: u8 = prefix_part
            .parse()
            .map_err(|_| CidrParseError::InvalidPrefix(prefix_part.to_string()))?;
        if prefix_len > MAX_PREFIX_LEN {
            return Err(CidrParseError::PrefixTooLong(prefix_len));
        }
        Ok(CidrBlock { addr, prefix_len })
    }
}

impl std::fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

impl Serialize for CidrBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CidrBlock {
    fn deserialize<D>(deserializer: D) -> Result<CidrBlock, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let cidr = CidrBlock::parse("10.0.1.0/24").unwrap();
        assert_eq!(cidr.addr, Ipv4Addr::new(10, 0, 1, 0));
        assert_eq!(cidr.prefix_len, 24);
        assert_eq!(cidr.to_string(), "10.0.1.0/24");

        assert_eq!(
            CidrBlock::parse("10.0.0.0").unwrap_err(),
            CidrParseError::MissingPrefix("10.0.0.0".to_string())
        );
        assert!(matches!(
            CidrBlock::parse("10.0.0.300/24").unwrap_err(),
            CidrParseError::InvalidAddress(_)
        ));
        assert!(matches!(
            CidrBlock::parse("10.0.0.0/ab").unwrap_err(),
            CidrParseError::InvalidPrefix(_)
        ));
        assert_eq!(
            CidrBlock::parse("10.0.0.0/33").unwrap_err(),
            CidrParseError::PrefixTooLong(33)
        );
    }

    #[test]
    fn test_network_and_broadcast() {
        let cidr = CidrBlock::parse("192.168.1.42/24").unwrap();
        assert_eq!(cidr.network(), Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(cidr.broadcast(), Ipv4Addr::new(192, 168, 1, 255));

        let wide = CidrBlock::parse("10.1.2.3/8").unwrap();
        assert_eq!(wide.network(), Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(wide.broadcast(), Ipv4Addr::new(10, 255, 255, 255));

        assert_eq!(DEFAULT_ROUTE.network(), Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(DEFAULT_ROUTE.broadcast(), Ipv4Addr::new(255, 255, 255, 255));
    }

    #[test]
    fn test_contains() {
        let vpc = CidrBlock::parse("10.0.0.0/16").unwrap();
        let inside = CidrBlock::parse("10.0.1.0/24").unwrap();
        let outside = CidrBlock::parse("10.1.0.0/24").unwrap();
        let wider = CidrBlock::parse("10.0.0.0/8").unwrap();

        assert!(vpc.contains(&inside));
        assert!(vpc.contains(&vpc));
        assert!(!vpc.contains(&outside));
        assert!(!vpc.contains(&wider));
    }

    #[test]
    fn test_overlaps() {
        let a = CidrBlock::parse("10.0.1.0/24").unwrap();
        let b = CidrBlock::parse("10.0.1.128/25").unwrap();
        let c = CidrBlock::parse("10.0.2.0/24").unwrap();

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!b.overlaps(&c));
        assert!(a.overlaps(&a));
    }
}
