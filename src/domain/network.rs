// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use thiserror::Error;

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4, 0-128 for IPv6)")]
    InvalidPrefixLength(u8),

    #[error("CIDR block {cidr} has host bits set (did you mean {network}?)")]
    HostBitsSet { cidr: String, network: String },

    #[error("Address space must contain at least one CIDR block")]
    EmptyAddressSpace,
}

/// Network block in CIDR notation
///
/// Invariants:
/// - Valid IPv4 or IPv6 network address
/// - Prefix length within range for the address family
/// - Host bits are zero (canonical network address)
///
/// # Examples
///
/// ```rust
/// use aks_infrastructure::domain::CidrBlock;
///
/// let vnet = CidrBlock::new("10.0.0.0/8").unwrap();
/// let subnet = CidrBlock::new("10.240.0.0/16").unwrap();
/// assert!(vnet.contains(&subnet));
/// assert!(CidrBlock::new("10.0.0.1/8").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CidrBlock {
    network: IpAddr,
    prefix_length: u8,
}

impl CidrBlock {
    /// Parse a CIDR block
    ///
    /// # Invariants
    /// - Prefix is mandatory
    /// - Prefix length 0-32 for IPv4, 0-128 for IPv6
    /// - Address is the network address of the block
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref().trim();

        let (addr_str, prefix_str) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(cidr.to_string()))?;

        let address = IpAddr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        let prefix_length = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        let block = Self::from_parts(address, prefix_length)?;
        if block.network != address {
            return Err(NetworkError::HostBitsSet {
                cidr: cidr.to_string(),
                network: block.to_string(),
            });
        }

        Ok(block)
    }

    /// Build the block containing `address`, masking host bits away
    pub fn from_parts(address: IpAddr, prefix_length: u8) -> Result<Self, NetworkError> {
        let width = address_width(&address);
        if prefix_length > width {
            return Err(NetworkError::InvalidPrefixLength(prefix_length));
        }

        let bits = to_bits(&address) & mask(width, prefix_length);
        Ok(Self {
            network: from_bits(&address, bits),
            prefix_length,
        })
    }

    /// Network address
    pub fn network(&self) -> IpAddr {
        self.network
    }

    /// Prefix length
    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    pub fn is_ipv4(&self) -> bool {
        self.network.is_ipv4()
    }

    pub fn is_ipv6(&self) -> bool {
        self.network.is_ipv6()
    }

    /// True if `address` falls inside this block
    pub fn contains_addr(&self, address: IpAddr) -> bool {
        if self.network.is_ipv4() != address.is_ipv4() {
            return false;
        }
        let width = address_width(&address);
        to_bits(&address) & mask(width, self.prefix_length) == to_bits(&self.network)
    }

    /// True if `other` lies entirely inside this block
    pub fn contains(&self, other: &CidrBlock) -> bool {
        self.prefix_length <= other.prefix_length && self.contains_addr(other.network)
    }

    /// True if the two blocks share at least one address
    pub fn overlaps(&self, other: &CidrBlock) -> bool {
        self.contains(other) || other.contains(self)
    }

    /// First host address; the network address itself for /31, /32 and their IPv6 peers
    pub fn first_host(&self) -> IpAddr {
        let host_bits = address_width(&self.network) - self.prefix_length;
        if host_bits < 2 {
            return self.network;
        }
        from_bits(&self.network, to_bits(&self.network) + 1)
    }

    /// Number of addresses in the block, saturating for very large IPv6 blocks
    pub fn size(&self) -> u128 {
        let host_bits = u32::from(address_width(&self.network) - self.prefix_length);
        1u128.checked_shl(host_bits).unwrap_or(u128::MAX)
    }
}

fn address_width(address: &IpAddr) -> u8 {
    match address {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

fn to_bits(address: &IpAddr) -> u128 {
    match address {
        IpAddr::V4(v4) => u128::from(u32::from(*v4)),
        IpAddr::V6(v6) => u128::from(*v6),
    }
}

fn from_bits(family: &IpAddr, bits: u128) -> IpAddr {
    match family {
        // Bits were masked to the 32-bit width, truncation is lossless
        IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::from(bits as u32)),
        IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::from(bits)),
    }
}

fn mask(width: u8, prefix_length: u8) -> u128 {
    if prefix_length == 0 {
        return 0;
    }
    let full = if width == 128 {
        u128::MAX
    } else {
        (1u128 << width) - 1
    };
    (full << (width - prefix_length)) & full
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_length)
    }
}

impl FromStr for CidrBlock {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for CidrBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CidrBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}

/// Ordered, non-empty set of CIDR blocks assigned to a virtual network
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AddressSpace(Vec<CidrBlock>);

impl AddressSpace {
    /// Build an address space, dropping duplicate blocks while keeping order
    pub fn new(blocks: impl IntoIterator<Item = CidrBlock>) -> Result<Self, NetworkError> {
        let mut unique: Vec<CidrBlock> = Vec::new();
        for block in blocks {
            if !unique.contains(&block) {
                unique.push(block);
            }
        }

        if unique.is_empty() {
            return Err(NetworkError::EmptyAddressSpace);
        }
        Ok(Self(unique))
    }

    /// Parse every entry as a CIDR block
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self, NetworkError> {
        let blocks = entries
            .iter()
            .map(|entry| CidrBlock::new(entry.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(blocks)
    }

    pub fn blocks(&self) -> &[CidrBlock] {
        &self.0
    }

    /// True when some block of the space fully contains `block`
    pub fn contains(&self, block: &CidrBlock) -> bool {
        self.0.iter().any(|candidate| candidate.contains(block))
    }

    /// True when some block of the space shares addresses with `block`
    pub fn overlaps(&self, block: &CidrBlock) -> bool {
        self.overlapping(block).is_some()
    }

    /// First block of the space that shares addresses with `block`
    pub fn overlapping(&self, block: &CidrBlock) -> Option<&CidrBlock> {
        self.0.iter().find(|candidate| candidate.overlaps(block))
    }
}

impl<'de> Deserialize<'de> for AddressSpace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let blocks = Vec::<CidrBlock>::deserialize(deserializer)?;
        Self::new(blocks).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", rendered.join(", "))
    }
}
