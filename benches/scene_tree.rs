use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stlvr::render::Rgb;
use stlvr::scene::{part_attributes, ModelIndex, SceneTree, TreeModel, VISIBLE_COLUMN};

/// A tree with `width` top-level parts, each holding `width` sub-parts.
fn build_tree(width: usize) -> SceneTree {
    let mut tree = SceneTree::default();
    for i in 0..width {
        let part = tree
            .append_child(None, part_attributes(format!("part_{}", i)))
            .unwrap();
        for j in 0..width {
            tree.append_child(Some(part), part_attributes(format!("part_{}_{}", i, j)))
                .unwrap();
        }
    }
    tree
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append_child");

    for width in [8, 32, 128] {
        group.bench_with_input(BenchmarkId::new("square", width), &width, |b, &width| {
            b.iter(|| black_box(build_tree(width)));
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for width in [8, 32, 128] {
        let tree = build_tree(width);
        let root = tree.root();

        group.bench_with_input(BenchmarkId::new("child_row", width), &tree, |b, tree| {
            b.iter(|| {
                let mut rows = 0;
                for row in 0..tree.child_count(root) {
                    let child = tree.child_at(root, row).unwrap();
                    rows += tree.row_of(child);
                }
                black_box(rows)
            });
        });

        group.bench_with_input(BenchmarkId::new("descendants", width), &tree, |b, tree| {
            b.iter(|| black_box(tree.descendants(root).len()));
        });
    }

    group.finish();
}

fn bench_model_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_edits");

    let mut model = TreeModel::new(build_tree(64));
    group.bench_function("toggle_visibility", |b| {
        let mut visible = false;
        b.iter(|| {
            for row in 0..64 {
                let index = model.index(row, VISIBLE_COLUMN, ModelIndex::invalid());
                model.set_data(index, visible.into());
            }
            visible = !visible;
        });
    });

    let mut tree = build_tree(64);
    let root = tree.root();
    group.bench_function("set_colour", |b| {
        b.iter(|| {
            for row in 0..64 {
                let node = tree.child_at(root, row).unwrap();
                tree.set_colour(node, black_box(Rgb::new(row as u8, 0, 255)));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_append, bench_lookup, bench_model_edits);
criterion_main!(benches);
