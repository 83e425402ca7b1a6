use collapser::resolve_path;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dom::{DomArena, NodeId};

/// `depth` nested levels, each with `width` same-tag siblings
fn build_tree(depth: usize, width: usize) -> (DomArena, NodeId) {
    let mut arena = DomArena::new();
    let doc = arena.create_document();
    let html = arena.create_element("html");
    let body = arena.create_element("body");
    arena.append_child(doc, html).unwrap();
    arena.append_child(html, body).unwrap();

    let mut parent = body;
    for _ in 0..depth {
        let mut last = parent;
        for _ in 0..width {
            last = arena.create_element("div");
            arena.append_child(parent, last).unwrap();
        }
        parent = last;
    }
    (arena, parent)
}

fn bench_resolve_path(c: &mut Criterion) {
    let (shallow, shallow_leaf) = build_tree(4, 2);
    let (deep, deep_leaf) = build_tree(32, 16);

    c.bench_function("resolve_path shallow", |b| {
        b.iter(|| resolve_path(black_box(&shallow), black_box(shallow_leaf)))
    });
    c.bench_function("resolve_path deep wide", |b| {
        b.iter(|| resolve_path(black_box(&deep), black_box(deep_leaf)))
    });
}

criterion_group!(benches, bench_resolve_path);
criterion_main!(benches);
