use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quadwarp::{compute, invert, world_to_normalized, CornerSet, Point2, QuadImage, RectTransform};

fn bench_homography(c: &mut Criterion) {
    let corners = CornerSet::from([[0.1, 0.2], [0.9, 0.1], [0.8, 0.95], [0.05, 0.7]]);

    c.bench_function("compute", |b| b.iter(|| compute(black_box(&corners))));

    let h = compute(&corners);
    c.bench_function("invert", |b| b.iter(|| invert(black_box(&h))));
}

fn bench_fit(c: &mut Criterion) {
    let rect = RectTransform {
        pivot: Point2::new(0.3, 0.7),
        lossy_scale: Point2::new(1.5, 1.5),
        ..Default::default()
    };
    let world = [
        Point2::new(-40.0, 10.0),
        Point2::new(60.0, 0.0),
        Point2::new(50.0, 80.0),
        Point2::new(-30.0, 70.0),
    ];

    c.bench_function("world_to_normalized", |b| {
        b.iter(|| world_to_normalized(black_box(&world), &rect.layout(), |fit| rect.with_fit(fit)))
    });

    let mut image = QuadImage::new(rect);
    c.bench_function("set_points_world", |b| {
        b.iter(|| image.set_points_world(black_box(&world)))
    });
}

criterion_group!(benches, bench_homography, bench_fit);
criterion_main!(benches);
