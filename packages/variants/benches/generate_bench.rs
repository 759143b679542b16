use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stonecat_model::{Attribute, AttributeSet};
use stonecat_variants::{generate, TemplateId, VariantIndex};

fn wide_set(dims: usize, values: usize) -> AttributeSet {
    (0..dims)
        .map(|d| {
            (0..values).fold(Attribute::new(format!("A{}", d), format!("a{}", d)), |a, v| {
                a.with_value(format!("v{}", v), format!("Value {}", v))
            })
        })
        .collect()
}

fn generate_template(c: &mut Criterion) {
    let set = TemplateId::TumbaRitualnaya.attribute_set();

    c.bench_function("generate_tumba_template", |b| {
        b.iter(|| generate(black_box(&set)))
    });
}

fn generate_wide(c: &mut Criterion) {
    let set = wide_set(4, 8);

    c.bench_function("generate_4x8", |b| b.iter(|| generate(black_box(&set))));
}

fn index_lookup(c: &mut Criterion) {
    let set = wide_set(2, 40);
    let variants = generate(&set).unwrap();

    c.bench_function("index_with_axes_40x40", |b| {
        b.iter(|| VariantIndex::with_axes(black_box(&variants), "a0", "a1"))
    });
}

criterion_group!(benches, generate_template, generate_wide, index_lookup);
criterion_main!(benches);
