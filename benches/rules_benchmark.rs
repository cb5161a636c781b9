use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fixlens::config::{Config, Preset};
use fixlens::rules::IssueDetector;
use fixlens::scanner::{FileRecord, Language};

// Python module with a sprinkling of defects every few lines
fn python_source(functions: usize) -> String {
    let mut source = String::from("import os\nimport subprocess\n\n");
    for i in 0..functions {
        source.push_str(&format!(
            "def handler{i}(request, cache={{}}):\n    \
             if request == None:\n        \
             return None\n    \
             try:\n        \
             subprocess.run(request.cmd, shell=True)\n    \
             except:\n        \
             pass\n    \
             if type(request) == dict:\n        \
             return request\n    \
             return os.path.join('a', str({i}))\n\n"
        ));
    }
    source
}

fn javascript_source(functions: usize) -> String {
    let mut source = String::new();
    for i in 0..functions {
        source.push_str(&format!(
            "function render{i}(node, value) {{\n  \
             var label = value;\n  \
             if (value == null) {{ console.log('missing'); }}\n  \
             node.innerHTML = label;\n  \
             return label != '';\n\
             }}\n\n"
        ));
    }
    source
}

fn benchmark_python_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_python");
    let detector = IssueDetector::default();

    for functions in [10usize, 100, 1000] {
        let source = python_source(functions);
        group.bench_with_input(BenchmarkId::from_parameter(functions), &source, |b, source| {
            b.iter(|| {
                let issues = detector
                    .analyze_source(Language::Python, black_box(source))
                    .unwrap();
                black_box(issues);
            });
        });
    }

    group.finish();
}

fn benchmark_javascript_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_javascript");
    let detector = IssueDetector::default();

    for functions in [10usize, 100, 1000] {
        let source = javascript_source(functions);
        group.bench_with_input(BenchmarkId::from_parameter(functions), &source, |b, source| {
            b.iter(|| {
                let issues = detector
                    .analyze_source(Language::JavaScript, black_box(source))
                    .unwrap();
                black_box(issues);
            });
        });
    }

    group.finish();
}

fn benchmark_presets(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_preset");
    let record = FileRecord::from_content("bench.py", python_source(100));

    for preset in Preset::all() {
        let detector = IssueDetector::new(&Config::from_preset(preset));
        group.bench_with_input(
            BenchmarkId::from_parameter(preset.name()),
            &record,
            |b, record| {
                b.iter(|| {
                    let issues = detector.analyze(black_box(record)).unwrap();
                    black_box(issues);
                });
            },
        );
    }

    group.finish();
}

fn benchmark_context_analysis(c: &mut Criterion) {
    let detector = IssueDetector::default();
    let record = FileRecord::from_content("bench.py", python_source(200));

    c.bench_function("analyze_context", |b| {
        b.iter(|| {
            let issues = detector.analyze_context(black_box(&record)).unwrap();
            black_box(issues);
        });
    });
}

criterion_group!(
    benches,
    benchmark_python_analysis,
    benchmark_javascript_analysis,
    benchmark_presets,
    benchmark_context_analysis,
);
criterion_main!(benches);
