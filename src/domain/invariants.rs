// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Definition Set Invariants
//!
//! Single-field rules live on the value objects. This module holds the
//! cross-field rules of the definition set and the error type that reports
//! a violation of either kind against the input that caused it.
//!
//! All functions are pure (no I/O, deterministic).

use std::net::IpAddr;

use crate::domain::{AddressSpace, CidrBlock, ClusterError, NameError, NetworkError, TagError};

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Option is not part of the definition set's contract
    #[error("Unrecognized option: {0}")]
    UnknownOption(String),

    /// Option value has the wrong shape
    #[error("Option {option} has an invalid value: {reason}")]
    InvalidType { option: String, reason: String },

    /// Option has no default and was not supplied
    #[error("Required option {0} is missing")]
    Missing(&'static str),

    #[error("{field}: {source}")]
    Name {
        field: &'static str,
        #[source]
        source: NameError,
    },

    #[error("{field}: {source}")]
    Network {
        field: &'static str,
        #[source]
        source: NetworkError,
    },

    #[error("tags: {0}")]
    Tags(#[source] TagError),

    #[error("{field}: {source}")]
    Cluster {
        field: &'static str,
        #[source]
        source: ClusterError,
    },

    #[error("{field}: invalid IP address {value}")]
    InvalidIpAddress { field: &'static str, value: String },

    /// Subnet prefix is not inside any block of the VNet address space
    #[error("Subnet prefix {subnet} is not contained in address space {address_space}")]
    SubnetOutsideAddressSpace {
        subnet: String,
        address_space: String,
    },

    /// Kubernetes service range collides with the VNet
    #[error("Service CIDR {service_cidr} overlaps address space block {block}")]
    ServiceCidrOverlapsVnet { service_cidr: String, block: String },

    /// DNS service address must be a usable address of the service range
    #[error("DNS service IP {ip} is not a usable address of service CIDR {service_cidr}")]
    DnsServiceIpOutsideServiceCidr { ip: String, service_cidr: String },
}

/// Validate the subnet prefix lies inside the VNet address space
///
/// # Rules
/// - Some block of the address space fully contains the subnet
/// - Address families must match (an IPv4 space never contains an IPv6 subnet)
pub fn validate_subnet_in_address_space(
    subnet: &CidrBlock,
    address_space: &AddressSpace,
) -> ValidationResult {
    if !address_space.contains(subnet) {
        return Err(ValidationError::SubnetOutsideAddressSpace {
            subnet: subnet.to_string(),
            address_space: address_space.to_string(),
        });
    }
    Ok(())
}

/// Validate the cluster service range is disjoint from the VNet
pub fn validate_service_cidr(
    service_cidr: &CidrBlock,
    address_space: &AddressSpace,
) -> ValidationResult {
    if let Some(block) = address_space.overlapping(service_cidr) {
        return Err(ValidationError::ServiceCidrOverlapsVnet {
            service_cidr: service_cidr.to_string(),
            block: block.to_string(),
        });
    }
    Ok(())
}

/// Validate the DNS service address
///
/// # Rules
/// - Inside the service range
/// - Not the network address of the range
pub fn validate_dns_service_ip(ip: IpAddr, service_cidr: &CidrBlock) -> ValidationResult {
    if !service_cidr.contains_addr(ip) || ip == service_cidr.network() {
        return Err(ValidationError::DnsServiceIpOutsideServiceCidr {
            ip: ip.to_string(),
            service_cidr: service_cidr.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cidr(s: &str) -> CidrBlock {
        CidrBlock::new(s).unwrap()
    }

    #[test]
    fn test_subnet_containment() {
        let space = AddressSpace::parse(&["10.0.0.0/8"]).unwrap();
        assert!(validate_subnet_in_address_space(&cidr("10.240.0.0/16"), &space).is_ok());

        let err = validate_subnet_in_address_space(&cidr("192.168.0.0/24"), &space).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Subnet prefix 192.168.0.0/24 is not contained in address space [10.0.0.0/8]"
        );
    }

    #[test]
    fn test_subnet_wider_than_space() {
        let space = AddressSpace::parse(&["10.240.0.0/16"]).unwrap();
        assert!(validate_subnet_in_address_space(&cidr("10.0.0.0/8"), &space).is_err());
    }

    #[test]
    fn test_service_cidr_overlap() {
        let space = AddressSpace::parse(&["10.0.0.0/8"]).unwrap();
        assert!(validate_service_cidr(&cidr("172.16.0.0/16"), &space).is_ok());
        assert_eq!(
            validate_service_cidr(&cidr("10.0.0.0/16"), &space),
            Err(ValidationError::ServiceCidrOverlapsVnet {
                service_cidr: "10.0.0.0/16".to_string(),
                block: "10.0.0.0/8".to_string(),
            })
        );
    }

    #[test]
    fn test_dns_service_ip() {
        let service = cidr("172.16.0.0/16");
        assert!(validate_dns_service_ip("172.16.0.10".parse().unwrap(), &service).is_ok());
        assert!(validate_dns_service_ip("172.16.0.0".parse().unwrap(), &service).is_err());
        assert!(validate_dns_service_ip("10.0.0.10".parse().unwrap(), &service).is_err());
    }
}
