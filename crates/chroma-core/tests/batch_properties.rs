//! Property tests for batch assembly.
//!
//! Covers: symmetry of the block adjacency, block-diagonal placement,
//! color rectangle placement, size bookkeeping, and reassembly idempotence.

use chroma_core::{GraphInstance, assemble};
use proptest::prelude::*;

fn instance_strategy() -> impl Strategy<Value = GraphInstance> {
    (1usize..7, 1usize..5).prop_flat_map(|(n, colors)| {
        prop::collection::vec(any::<bool>(), n * n).prop_map(move |bits| {
            let mut adj = GraphInstance::empty_adjacency(n);
            for (idx, bit) in bits.into_iter().enumerate() {
                adj[(idx / n, idx % n)] = bit;
            }
            GraphInstance::new(adj, colors, None, format!("gen-{n}-{colors}"))
        })
    })
}

fn instances_strategy() -> impl Strategy<Value = Vec<GraphInstance>> {
    prop::collection::vec(instance_strategy(), 1..6)
}

/// Which instance a global vertex index belongs to.
fn owner(counts: &[usize], row: usize) -> usize {
    let mut acc = 0;
    for (i, &n) in counts.iter().enumerate() {
        acc += n;
        if row < acc {
            return i;
        }
    }
    unreachable!("row {row} beyond total {acc}")
}

proptest! {
    #[test]
    fn adjacency_block_is_symmetric(instances in instances_strategy()) {
        let batch = assemble(&instances, false).expect("non-empty");
        prop_assert_eq!(&batch.adjacency_block, &batch.adjacency_block.transpose());
    }

    #[test]
    fn cross_instance_cells_are_zero(instances in instances_strategy()) {
        let batch = assemble(&instances, false).expect("non-empty");
        let counts = &batch.per_instance_vertex_counts;
        let total = batch.total_vertices();
        prop_assert_eq!(batch.adjacency_block.shape(), (total, total));
        for r in 0..total {
            for s in 0..total {
                if owner(counts, r) != owner(counts, s) {
                    prop_assert_eq!(batch.adjacency_block[(r, s)], 0.0);
                }
            }
        }
    }

    #[test]
    fn blocks_mirror_either_direction_of_source(instances in instances_strategy()) {
        let batch = assemble(&instances, false).expect("non-empty");
        for (instance, range) in instances.iter().zip(batch.instance_ranges()) {
            let off = range.vertices.start;
            for x in 0..instance.vertex_count() {
                for y in 0..instance.vertex_count() {
                    let expected = if instance.has_edge(x, y) { 1.0 } else { 0.0 };
                    prop_assert_eq!(batch.adjacency_block[(off + x, off + y)], expected);
                }
            }
        }
    }

    #[test]
    fn color_candidates_are_exact_rectangles(instances in instances_strategy()) {
        let batch = assemble(&instances, true).expect("non-empty");
        let ranges = batch.instance_ranges();
        prop_assert_eq!(
            batch.color_candidates.shape(),
            (batch.total_vertices(), batch.total_colors())
        );
        for r in 0..batch.total_vertices() {
            for c in 0..batch.total_colors() {
                let inside = ranges
                    .iter()
                    .any(|range| range.vertices.contains(&r) && range.colors.contains(&c));
                let expected = if inside { 1.0 } else { 0.0 };
                prop_assert_eq!(batch.color_candidates[(r, c)], expected);
            }
        }
    }

    #[test]
    fn bookkeeping_mirrors_input_order(instances in instances_strategy()) {
        let batch = assemble(&instances, false).expect("non-empty");
        let vertices: Vec<usize> = instances.iter().map(GraphInstance::vertex_count).collect();
        let edges: Vec<usize> = instances.iter().map(GraphInstance::edge_count).collect();
        let colors: Vec<usize> = instances.iter().map(GraphInstance::chromatic_target).collect();
        prop_assert_eq!(&batch.per_instance_vertex_counts, &vertices);
        prop_assert_eq!(&batch.per_instance_edge_counts, &edges);
        prop_assert_eq!(&batch.per_instance_colors, &colors);
        prop_assert_eq!(batch.adjacency_block.nrows(), vertices.iter().sum::<usize>());
        prop_assert_eq!(batch.last_source_id.as_str(), instances[instances.len() - 1].source_id());
        let expected_flags: Vec<u8> = (0..instances.len()).map(|i| u8::from(i % 2 == 0)).collect();
        prop_assert_eq!(&batch.sat_flags, &expected_flags);
    }

    #[test]
    fn reassembly_is_bit_identical(instances in instances_strategy()) {
        let first = assemble(&instances, false).expect("non-empty");
        let second = assemble(&instances, false).expect("non-empty");
        prop_assert_eq!(first, second);
    }
}
