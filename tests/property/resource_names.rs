// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Resource Names

use aks_infrastructure::domain::{AksName, ResourceGroupName};
use aks_infrastructure::suite::unique_name;
use proptest::prelude::*;

proptest! {
    /// Property: a valid base always yields a valid, suffixed resource group name
    #[test]
    fn prop_unique_names_stay_valid(base in "[a-zA-Z0-9_()-]{1,120}") {
        let name = unique_name(&base);
        prop_assert!(ResourceGroupName::new(name.as_str()).is_ok(), "{}", name);
        prop_assert!(name.len() <= ResourceGroupName::MAX_LENGTH);
    }

    /// Property: cluster names accept exactly alphanumeric ends
    #[test]
    fn prop_aks_name_edges(body in "[a-z0-9-]{0,20}", first in "[a-z0-9-]", last in "[a-z0-9-]") {
        let name = format!("{first}{body}{last}");
        let ok = !first.starts_with('-') && !last.starts_with('-');
        prop_assert_eq!(AksName::new(name).is_ok(), ok);
    }
}
