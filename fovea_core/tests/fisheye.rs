// Copyright 2026 the Fovea Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Degree-of-interest filtering over larger trees and graphs.

use std::sync::Arc;

use fovea_core::activity::Scheduler;
use fovea_core::filter::{FisheyeConfig, FisheyeGraphFilter, FisheyeTreeFilter};
use fovea_core::graph::{Entity, NodeId};
use fovea_core::item::ItemClass;
use fovea_core::pipeline::Pipeline;
use fovea_core::registry::{Registry, RegistryHandle};
use fovea_core::render::NoRepaint;

fn visible_doi(r: &mut Registry, node: NodeId) -> Option<f64> {
    let id = r.node_item(ItemClass::NODE, node, false).unwrap()?;
    let item = r.get(id)?;
    item.is_visible().then_some(item.doi)
}

/// A chain `c0 → c1 → … → c{n-1}`, with a leaf hanging off every link.
fn comb(r: &mut Registry, n: usize) -> (Vec<NodeId>, Vec<NodeId>) {
    let g = r.graph_mut();
    let chain: Vec<NodeId> = (0..n).map(|i| g.add_node(format!("c{i}"))).collect();
    let mut leaves = Vec::new();
    for i in 1..n {
        g.add_child(chain[i - 1], chain[i]);
        let leaf = g.add_node(format!("l{i}"));
        g.add_child(chain[i - 1], leaf);
        leaves.push(leaf);
    }
    (chain, leaves)
}

fn run_pipeline(registry: &RegistryHandle, pipeline: &mut Pipeline) {
    let scheduler = Scheduler::new(registry.clone(), Arc::new(NoRepaint));
    let report = scheduler.run_now(pipeline);
    assert!(report.is_clean(), "{:?}", report.failures);
}

#[test]
fn interest_decays_with_distance_below_the_focus() {
    let mut r = Registry::with_default_classes();
    let (chain, _) = comb(&mut r, 10);
    r.default_focus_mut().add(Entity::Node(chain[5]));
    let registry = RegistryHandle::new(r);
    let mut pipeline = Pipeline::new("fisheye").with(FisheyeTreeFilter::new(
        FisheyeConfig::DEFAULT.with_distance(3).with_root(false),
    ));
    run_pipeline(&registry, &mut pipeline);

    let mut r = registry.lock();
    for &node in &chain[..=5] {
        assert_eq!(visible_doi(&mut r, node), Some(0.0), "ancestors sit on the path");
    }
    let below: Vec<f64> = chain[6..9]
        .iter()
        .map(|&n| visible_doi(&mut r, n).unwrap())
        .collect();
    assert_eq!(below, vec![-1.0, -2.0, -3.0]);
    assert_eq!(visible_doi(&mut r, chain[9]), None, "beyond the distance");
}

#[test]
fn every_shown_node_clears_the_threshold() {
    let mut r = Registry::with_default_classes();
    let (chain, leaves) = comb(&mut r, 8);
    r.default_focus_mut().add(Entity::Node(chain[3]));
    let config = FisheyeConfig::DEFAULT.with_distance(2);
    let filter = FisheyeTreeFilter::new(config);
    let registry = RegistryHandle::new(r);
    run_pipeline(&registry, &mut Pipeline::new("first").with(filter.clone()));

    let mut r = registry.lock();
    let mut shown = 0;
    for &node in chain.iter().chain(&leaves) {
        if let Some(doi) = visible_doi(&mut r, node) {
            shown += 1;
            assert!(doi <= 0.0, "nothing above a focus: {doi}");
            assert!(doi.ceil() >= filter.config().min_doi, "admitted: {doi}");
        }
    }
    assert!(shown < chain.len() + leaves.len(), "some nodes filtered out");

    // Same inputs, same answer.
    let before = r.snapshot();
    drop(r);
    run_pipeline(&registry, &mut Pipeline::new("again").with(filter));
    let after = registry.lock().snapshot();
    assert_eq!(before.len(), after.len());
    for (a, b) in before.iter().zip(&after) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.doi.to_bits(), b.doi.to_bits(), "stable DOI");
    }
}

#[test]
fn several_foci_take_the_highest_interest() {
    let mut r = Registry::with_default_classes();
    let (chain, leaves) = comb(&mut r, 6);
    r.default_focus_mut()
        .set([Entity::Node(chain[1]), Entity::Node(chain[5])]);
    let config = FisheyeConfig::DEFAULT.with_root(false);
    let registry = RegistryHandle::new(r);
    run_pipeline(
        &registry,
        &mut Pipeline::new("fisheye").with(FisheyeTreeFilter::new(config)),
    );

    let mut r = registry.lock();
    // Everything up from c5 is on a focus path.
    for &node in &chain {
        assert_eq!(visible_doi(&mut r, node), Some(0.0));
    }
    // l2 hangs off c1, a focus; l1 off c0, an ancestor.
    assert!(visible_doi(&mut r, leaves[1]).is_some(), "child of a focus");
    assert!(visible_doi(&mut r, leaves[0]).is_some(), "sibling on the path");
    drop(r);

    registry.with(|r| r.default_focus_mut().set([Entity::Node(chain[0])]));
    run_pipeline(
        &registry,
        &mut Pipeline::new("narrow").with(FisheyeTreeFilter::new(config)),
    );
    let mut r = registry.lock();
    assert_eq!(visible_doi(&mut r, chain[1]), Some(-1.0));
    assert_eq!(visible_doi(&mut r, chain[3]), None, "hidden after refocus");
    let c3 = r.node_item(ItemClass::NODE, chain[3], false).unwrap();
    assert!(c3.is_some(), "kept for one cycle before eviction");
}

#[test]
fn grid_neighborhood_is_a_diamond() {
    const N: usize = 5;
    let mut r = Registry::with_default_classes();
    let g = r.graph_mut();
    let cells: Vec<NodeId> = (0..N * N).map(|i| g.add_node(format!("{i}"))).collect();
    for y in 0..N {
        for x in 0..N {
            if x + 1 < N {
                g.add_edge(cells[y * N + x], cells[y * N + x + 1], false);
            }
            if y + 1 < N {
                g.add_edge(cells[y * N + x], cells[(y + 1) * N + x], false);
            }
        }
    }
    let center = cells[2 * N + 2];
    r.default_focus_mut().add(Entity::Node(center));
    let registry = RegistryHandle::new(r);
    run_pipeline(
        &registry,
        &mut Pipeline::new("grid").with(FisheyeGraphFilter::new(
            FisheyeConfig::DEFAULT.with_distance(2),
        )),
    );

    let mut r = registry.lock();
    for y in 0..N {
        for x in 0..N {
            let d = x.abs_diff(2) + y.abs_diff(2);
            let doi = visible_doi(&mut r, cells[y * N + x]);
            if d <= 2 {
                assert_eq!(doi, Some(-(d as f64)), "({x}, {y})");
            } else {
                assert_eq!(doi, None, "({x}, {y}) outside");
            }
        }
    }
    let stats = r.stats();
    assert_eq!(stats.class(ItemClass::NODE).unwrap().visible, 13);
    assert_eq!(stats.class(ItemClass::EDGE).unwrap().visible, 16);
}
