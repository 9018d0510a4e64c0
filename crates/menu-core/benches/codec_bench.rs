//! Criterion benchmarks for the menu codec.
//!
//! Measures the save path (JSON decode → YAML encode → YAML validate) for
//! menus of increasing size, so regressions in the hand-written YAML writer or
//! the schema checks show up before they reach the editor.
//!
//! Run with:
//! ```bash
//! cargo bench --package menu-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use menu_core::{decode_payload, encode_document, encode_payload, validate_document, MenuNode, MenuTree};

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// Builds a menu with `top` entries, each holding `per_level` children two
/// levels deep.
fn make_menu(top: usize, per_level: usize) -> MenuTree {
    (0..top)
        .map(|i| {
            let grandchildren = |j: usize| {
                (0..per_level)
                    .map(|k| {
                        MenuNode::new()
                            .with("label", format!("Item {i}.{j}.{k}"))
                            .with("link", format!("/section-{i}/page-{j}/{k}"))
                    })
                    .collect::<Vec<_>>()
            };
            MenuNode::new()
                .with("label", format!("Section {i}"))
                .with("path", format!("page/section-{i}"))
                .with_children(
                    (0..per_level)
                        .map(|j| {
                            MenuNode::new()
                                .with("label", format!("Page {i}.{j}"))
                                .with("class", "nav-item")
                                .with_children(grandchildren(j))
                        })
                        .collect(),
                )
        })
        .collect()
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_encode_document(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_document");
    for (top, per_level) in [(5, 3), (20, 5), (50, 10)] {
        let tree = make_menu(top, per_level);
        group.bench_with_input(
            BenchmarkId::from_parameter(tree.node_count()),
            &tree,
            |b, tree| b.iter(|| encode_document(black_box(tree))),
        );
    }
    group.finish();
}

fn bench_save_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("save_pipeline");
    for (top, per_level) in [(5, 3), (20, 5), (50, 10)] {
        let tree = make_menu(top, per_level);
        let payload = encode_payload(&tree).expect("encode payload");
        group.bench_with_input(
            BenchmarkId::from_parameter(tree.node_count()),
            &payload,
            |b, payload| {
                b.iter(|| {
                    let tree = decode_payload(black_box(payload)).expect("decode");
                    let text = encode_document(&tree);
                    validate_document(&text).expect("validate");
                    text
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_encode_document, bench_save_pipeline);
criterion_main!(benches);
