use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sproxy_codegen::{java_source, Emitter};
use sproxy_model::{ClassSpec, ClassSpecBuilder, MethodDecl};
use sproxy_types::{ImportTable, TypeCatalogue};

fn spec(methods: usize) -> ClassSpec {
    let catalogue = TypeCatalogue::new(ImportTable::new().with("String", "java.lang.String"));
    let mut b = ClassSpecBuilder::new(&catalogue, "bench.pkg", "Wide").unwrap();
    for i in 0..methods {
        b.method(
            &format!("m{}", i),
            MethodDecl::new("long").args(["int", "String", "double[]"]),
        )
        .unwrap();
    }
    b.build().unwrap()
}

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit");
    let emitter = Emitter::default();

    for methods in [1usize, 16, 256] {
        let spec = spec(methods);
        group.bench_with_input(BenchmarkId::new("class_bytes", methods), &spec, |b, spec| {
            b.iter(|| emitter.emit_bytes(black_box(spec)).unwrap());
        });
    }

    group.finish();
}

fn bench_java_source(c: &mut Criterion) {
    let spec = spec(64);
    c.bench_function("java_source_64", |b| {
        b.iter(|| java_source(black_box(&spec)));
    });
}

criterion_group!(benches, bench_emit, bench_java_source);
criterion_main!(benches);
