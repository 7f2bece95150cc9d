//! Property tests for the projector.
//!
//! Inputs are arbitrary entity/edge lists, not extractor output, so edges
//! may dangle, repeat, or loop.

use std::collections::HashSet;

use flowmap_core::model::{Category, EdgeKind, Entity, Group, RawEdge};
use flowmap_view::{ToggleMap, project};
use proptest::prelude::*;

fn arb_category() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

fn arb_kind() -> impl Strategy<Value = EdgeKind> {
    prop::sample::select(EdgeKind::ALL.to_vec())
}

fn arb_entities() -> impl Strategy<Value = Vec<Entity>> {
    prop::collection::vec(arb_category(), 0..24).prop_map(|categories| {
        categories
            .into_iter()
            .enumerate()
            .map(|(i, category)| Entity::new(format!("e{i}"), format!("label {i}"), category))
            .collect()
    })
}

fn arb_edges() -> impl Strategy<Value = Vec<RawEdge>> {
    // Ids up to e29 so some endpoints dangle.
    prop::collection::vec((0..30_usize, 0..30_usize, arb_kind()), 0..48).prop_map(|triples| {
        triples
            .into_iter()
            .map(|(s, t, kind)| RawEdge::new(format!("e{s}"), format!("e{t}"), kind))
            .collect()
    })
}

fn arb_toggles() -> impl Strategy<Value = ToggleMap> {
    prop::collection::vec(any::<bool>(), Group::ALL.len()).prop_map(|flags| {
        Group::ALL
            .iter()
            .zip(flags)
            .filter_map(|(&g, on)| on.then_some(g))
            .collect()
    })
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn projection_is_idempotent(
        entities in arb_entities(),
        edges in arb_edges(),
        toggles in arb_toggles(),
    ) {
        let first = project(&entities, &edges, &toggles);
        let second = project(&entities, &edges, &toggles);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn toggle_round_trip_restores_output(
        entities in arb_entities(),
        edges in arb_edges(),
        mut toggles in arb_toggles(),
        group in prop::sample::select(Group::ALL.to_vec()),
    ) {
        let before = project(&entities, &edges, &toggles);
        toggles.toggle(group);
        let _ = project(&entities, &edges, &toggles);
        toggles.toggle(group);
        prop_assert_eq!(before, project(&entities, &edges, &toggles));
    }

    #[test]
    fn no_visible_self_loops(
        entities in arb_entities(),
        edges in arb_edges(),
        toggles in arb_toggles(),
    ) {
        let out = project(&entities, &edges, &toggles);
        for link in &out.links {
            prop_assert_ne!(&link.source, &link.target);
        }
    }

    #[test]
    fn group_counts_conserve_members(
        entities in arb_entities(),
        edges in arb_edges(),
        toggles in arb_toggles(),
    ) {
        let out = project(&entities, &edges, &toggles);
        prop_assert_eq!(out.represented_count(), entities.len());

        for node in out.nodes.iter().filter(|n| n.is_group) {
            let group = node.group_of();
            prop_assert!(!toggles.is_expanded(group));
            let members = entities
                .iter()
                .filter(|e| e.category.group() == group)
                .count();
            prop_assert_eq!(node.count, Some(members));
        }
    }

    #[test]
    fn edges_unique_per_pair_and_closed(
        entities in arb_entities(),
        edges in arb_edges(),
        toggles in arb_toggles(),
    ) {
        let out = project(&entities, &edges, &toggles);
        let ids: HashSet<&str> = out.nodes.iter().map(|n| n.id.as_str()).collect();

        let mut pairs = HashSet::new();
        for link in &out.links {
            prop_assert!(pairs.insert((link.source.as_str(), link.target.as_str())));
            prop_assert!(ids.contains(link.source.as_str()));
            prop_assert!(ids.contains(link.target.as_str()));
        }
    }
}
