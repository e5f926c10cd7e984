// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Vec2};
use understory_split_tree::SplitTree;
use understory_wspd::Wspd;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_uniform_points(count: usize, extent: f64) -> Vec<(u32, Point)> {
    let mut rng = Rng::new(0xFACE_FEED_CAFE_BABE);
    (0..count as u32)
        .map(|i| (i, Point::new(rng.next_f64() * extent, rng.next_f64() * extent)))
        .collect()
}

fn gen_clustered_points(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<(u32, Point)> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push((rng.next_f64() * 2000.0, rng.next_f64() * 2000.0));
    }
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let dx = (rng.next_f64() - 0.5) * spread;
            let dy = (rng.next_f64() - 0.5) * spread;
            out.push((out.len() as u32, Point::new(cx + dx, cy + dy)));
        }
    }
    out
}

/// Points on a line with geometrically shrinking gaps: a deep, lopsided tree.
fn gen_geometric_points(count: usize) -> Vec<(u32, Point)> {
    let mut x = 0.0;
    let mut gap = 1.0;
    (0..count as u32)
        .map(|i| {
            x += gap;
            gap *= 0.97;
            (i, Point::new(x, 0.0))
        })
        .collect()
}

const SIZES: [usize; 5] = [256, 512, 1024, 2048, 4096];

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_tree_build");
    for &n in &SIZES {
        let points = gen_uniform_points(n, 1000.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("uniform_n{}", n), |b| {
            b.iter(|| {
                let tree = SplitTree::build(points.iter().copied()).unwrap();
                black_box(tree.node_count());
            })
        });
    }
    let points = gen_clustered_points(16, 256, 40.0);
    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("clustered_n4096", |b| {
        b.iter(|| {
            let tree = SplitTree::build(points.iter().copied()).unwrap();
            black_box(tree.node_count());
        })
    });
    let points = gen_geometric_points(1024);
    group.throughput(Throughput::Elements(points.len() as u64));
    group.bench_function("geometric_n1024", |b| {
        b.iter(|| {
            let tree = SplitTree::build(points.iter().copied()).unwrap();
            black_box(tree.depth());
        })
    });
    group.finish();
}

fn bench_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_tree_geometry");
    for &n in &SIZES {
        let points = gen_uniform_points(n, 1000.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("recompute_n{}", n), |b| {
            b.iter_batched(
                || SplitTree::build(points.iter().copied()).unwrap(),
                |mut tree| {
                    tree.recompute_all_bounding_rectangles();
                    tree.recompute_all_barycenters();
                    black_box(tree.barycenter(tree.root()));
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_wspd(c: &mut Criterion) {
    let mut group = c.benchmark_group("wspd");
    for &n in &SIZES {
        let points = gen_uniform_points(n, 1000.0);
        let tree = SplitTree::build(points.iter().copied()).unwrap();
        tree.bounding_rectangle(tree.root());
        group.throughput(Throughput::Elements(n as u64));
        for s in [1.0, 2.0] {
            group.bench_function(format!("build_s{}_n{}", s, n), |b| {
                b.iter(|| {
                    let wspd = Wspd::build(&tree, s).unwrap();
                    black_box(wspd.len());
                })
            });
        }
    }
    group.finish();
}

fn bench_repulsion_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("repulsion_pass");
    for &n in &[1024usize, 4096] {
        let points = gen_uniform_points(n, 1000.0);
        let tree = SplitTree::build(points.iter().copied()).unwrap();
        let wspd = Wspd::build(&tree, 1.0).unwrap();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("pairs_n{}", n), |b| {
            b.iter(|| {
                tree.reset_all_forces();
                for pair in &wspd {
                    let d = tree.barycenter(pair.first) - tree.barycenter(pair.second);
                    let push = d / d.hypot2().max(1e-9);
                    tree.add_force(pair.first, push * tree.subtree_size(pair.second) as f64);
                    tree.add_force(pair.second, -push * tree.subtree_size(pair.first) as f64);
                }
                let forces = tree.leaf_forces();
                black_box(forces.iter().fold(Vec2::ZERO, |acc, f| acc + *f));
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_geometry,
    bench_wspd,
    bench_repulsion_pass,
);
criterion_main!(benches);
