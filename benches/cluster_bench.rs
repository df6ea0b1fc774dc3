//! Cluster decomposition benchmarks
//!
//! The number of connected subsets grows exponentially with the number of
//! parts kept after pruning, so the cost is measured against max_part_count.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keysiglib::pixels::FOREGROUND;
use keysiglib::*;

/// Key area of one slice holding a grid of small dots, all mutually close.
fn dotted_area() -> PixelSource {
    let mut source = PixelSource::blank(30, 50).expect("valid buffer");
    for row in 0..6 {
        for col in 0..3 {
            let (x0, y0) = (4 + col * 6, 5 + row * 6);
            for x in x0..x0 + 3 {
                for y in y0..y0 + 3 {
                    source.set(x, y, FOREGROUND);
                }
            }
        }
    }
    source
}

fn classify(glyph: &Glyph, _interline: u32) -> Vec<Evaluation> {
    let grade = (glyph.weight % 10) as f64 / 10.0;
    vec![Evaluation::new(Shape::Sharp, grade)]
}

fn bench_retrieve_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("retrieve_candidates");
    let source = dotted_area();

    for max_part_count in [4, 6, 8, 10] {
        let config = ExtractorConfig {
            max_part_count,
            ..ExtractorConfig::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{max_part_count}_parts")),
            &config,
            |b, config| {
                b.iter(|| {
                    let mut extractor = KeyExtractor::new(
                        Staff::new(1, 10, 25.0),
                        KeyRange::new(0, 29),
                        Vec::new(),
                        KeyRoi::with_slices(0, 50, &[(0, 29)]),
                        &source,
                        &classify,
                        config.clone(),
                    )
                    .expect("valid extractor");
                    black_box(extractor.retrieve_candidates(black_box(&[Shape::Sharp])))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_retrieve_candidates);
criterion_main!(benches);
