use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use onslaught::{
    FactionSnapshot, FactionTag, LevelFactory, LevelTypeSelector, LevelTypeTag, ProgressionTier,
    RosterSnapshot, StaticFactionState, StaticRoster,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_selection(c: &mut Criterion) {
    let selector = LevelTypeSelector::new();
    let mut rng = StdRng::seed_from_u64(1);

    let mut group = c.benchmark_group("select");
    for tier in [5i64, 50, 500] {
        let tier = ProgressionTier::clamped(tier);
        group.bench_with_input(BenchmarkId::from_parameter(tier), &tier, |b, tier| {
            b.iter(|| selector.select(black_box(*tier), Some(FactionTag::ThraxArmada), &mut rng))
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let factory = LevelFactory::new();
    let factions = FactionSnapshot::capture(&StaticFactionState::default());
    let roster = RosterSnapshot::capture(&StaticRoster::default());
    let tier = ProgressionTier::clamped(40);
    let mut rng = StdRng::seed_from_u64(2);

    let mut group = c.benchmark_group("build");
    for tag in LevelTypeTag::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(tag), &tag, |b, tag| {
            b.iter(|| factory.build(black_box(*tag), tier, &factions, &roster, &mut rng))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_selection, bench_build);
criterion_main!(benches);
