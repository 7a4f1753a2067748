use criterion::{black_box, criterion_group, criterion_main, Criterion};
use papyrus_clr::translator::{
    FieldDecl, FieldRef, LocalDecl, MethodDecl, MethodRef, SourceBody, SourceModule, TypeDecl,
    TypeRef,
};
use papyrus_clr::{decode, encode, DecodeOptions, TranslateOptions, Translator, VersionTarget};

/// Module with `count` types, each holding a counting loop and a call-heavy method
fn module(count: usize) -> SourceModule {
    let mut module = SourceModule::new("Bench");
    for i in 0..count {
        let owner = TypeRef::new("Bench", format!("Quest{}", i));
        let counter = FieldRef::new(owner.clone(), "counter", TypeRef::int32());
        let trace = MethodRef::new(TypeRef::new("Game", "Debug"), "Trace")
            .param("message", TypeRef::string());

        // i = 0; while i < 100 { counter = counter + i; i = i + 1 }
        let body = SourceBody::new()
            .ldc_i4(0)
            .stloc(0)
            .br(13)
            .ldarg(0)
            .ldarg(0)
            .ldfld(counter.clone())
            .ldloc(0)
            .add()
            .stfld(counter.clone())
            .ldloc(0)
            .ldc_i4(1)
            .add()
            .stloc(0)
            .ldloc(0)
            .ldc_i4(100)
            .blt(3)
            .ret();

        let ty = TypeDecl::new("Bench", format!("Quest{}", i))
            .field(FieldDecl::new("counter", TypeRef::int32()))
            .method(
                MethodDecl::new("Count")
                    .local(LocalDecl::named("i", TypeRef::int32()))
                    .body(body),
            )
            .method(MethodDecl::new("Report").body(
                (0..20)
                    .fold(SourceBody::new(), |b, n| b.ldstr(format!("line {}", n)).call(trace.clone()))
                    .ret(),
            ));
        module = module.with_type(ty);
    }
    module
}

fn translate_benchmark(c: &mut Criterion) {
    let module = module(16);
    let sequential = Translator::default();
    let mut options = TranslateOptions::default();
    options.parallel = true;
    let parallel = Translator::new(options);

    c.bench_function("translate 16 types", |b| {
        b.iter(|| sequential.translate(black_box(&module)).unwrap())
    });
    c.bench_function("translate 16 types (parallel)", |b| {
        b.iter(|| parallel.translate(black_box(&module)).unwrap())
    });
}

fn codec_benchmark(c: &mut Criterion) {
    for target in VersionTarget::all() {
        let output = Translator::new(TranslateOptions::new(target))
            .translate(&module(16))
            .unwrap();
        let bytes = encode(&output.assembly).unwrap();

        c.bench_function(&format!("encode {}", target), |b| {
            b.iter(|| encode(black_box(&output.assembly)).unwrap())
        });
        c.bench_function(&format!("decode {}", target), |b| {
            b.iter(|| decode(black_box(&bytes), DecodeOptions::default()).unwrap())
        });
    }
}

criterion_group!(benches, translate_benchmark, codec_benchmark);
criterion_main!(benches);
