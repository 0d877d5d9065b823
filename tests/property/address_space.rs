// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for CIDR Containment
//!
//! The subnet and service range checks rest on `contains` and `overlaps`;
//! these properties pin their behavior for arbitrary IPv4 blocks.

use aks_infrastructure::domain::invariants::validate_subnet_in_address_space;
use aks_infrastructure::domain::{AddressSpace, CidrBlock};
use proptest::prelude::*;
use std::net::{IpAddr, Ipv4Addr};

// ============================================================================
// Strategies
// ============================================================================

fn ipv4() -> impl Strategy<Value = IpAddr> {
    any::<u32>().prop_map(|bits| IpAddr::V4(Ipv4Addr::from(bits)))
}

/// Arbitrary canonical IPv4 block
fn block() -> impl Strategy<Value = CidrBlock> {
    (ipv4(), 0u8..=32).prop_map(|(addr, prefix)| CidrBlock::from_parts(addr, prefix).unwrap())
}

/// A block and a block nested inside it
fn nested() -> impl Strategy<Value = (CidrBlock, CidrBlock)> {
    (ipv4(), 0u8..=32, 0u8..=32).prop_map(|(addr, outer, extra)| {
        let inner = outer.saturating_add(extra).min(32);
        (
            CidrBlock::from_parts(addr, outer).unwrap(),
            CidrBlock::from_parts(addr, inner).unwrap(),
        )
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: masking produces a canonical block that parses back unchanged
    #[test]
    fn prop_canonical_blocks_round_trip(cidr in block()) {
        let parsed = CidrBlock::new(cidr.to_string()).unwrap();
        prop_assert_eq!(parsed, cidr);
    }

    /// Property: every block contains itself and its own network address
    #[test]
    fn prop_containment_is_reflexive(cidr in block()) {
        prop_assert!(cidr.contains(&cidr));
        prop_assert!(cidr.contains_addr(cidr.network()));
        prop_assert!(cidr.overlaps(&cidr));
    }

    /// Property: a nested block is contained and overlaps in both directions
    #[test]
    fn prop_nested_blocks_are_contained((outer, inner) in nested()) {
        prop_assert!(outer.contains(&inner));
        prop_assert!(outer.overlaps(&inner));
        prop_assert!(inner.overlaps(&outer));
        prop_assert!(outer.size() >= inner.size());
    }

    /// Property: containment is antisymmetric
    #[test]
    fn prop_containment_is_antisymmetric(a in block(), b in block()) {
        if a.contains(&b) && b.contains(&a) {
            prop_assert_eq!(a, b);
        }
    }

    /// Property: CIDR blocks either nest or are disjoint
    #[test]
    fn prop_blocks_nest_or_are_disjoint(a in block(), b in block(), addr in ipv4()) {
        if !a.overlaps(&b) {
            prop_assert!(!(a.contains_addr(addr) && b.contains_addr(addr)));
        }
    }

    /// Property: a subnet is accepted exactly when some block of the space contains it
    #[test]
    fn prop_subnet_check_matches_containment(
        blocks in prop::collection::vec(block(), 1..4),
        subnet in block(),
    ) {
        let space = AddressSpace::new(blocks.clone()).unwrap();
        let expected = blocks.iter().any(|b| b.contains(&subnet));
        prop_assert_eq!(validate_subnet_in_address_space(&subnet, &space).is_ok(), expected);
    }

    /// Property: setting any host bit is rejected with the canonical suggestion
    #[test]
    fn prop_host_bits_are_rejected(addr in ipv4(), prefix in 0u8..32) {
        let canonical = CidrBlock::from_parts(addr, prefix).unwrap();
        let text = format!("{addr}/{prefix}");
        match CidrBlock::new(&text) {
            Ok(parsed) => prop_assert_eq!(parsed.network(), addr),
            Err(err) => prop_assert!(err.to_string().contains(&canonical.to_string())),
        }
    }
}
