use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use zedit_theme_build::compiler::{build_theme, StyleCompiler};
use zedit_theme_build::config::ThemeLayout;
use zedit_theme_build::error::ThemeError;
use zedit_theme_build::packager::package_release;
use zedit_theme_build::theme::ThemeDescriptor;

/// Returns pre-rendered CSS so only the pipeline around Sass is measured
struct StaticCss(String);

impl StyleCompiler for StaticCss {
    fn compile(&self, _entry: &Path) -> Result<String, ThemeError> {
        Ok(self.0.clone())
    }
}

fn make_css(rules: usize) -> String {
    (0..rules)
        .map(|i| format!(".widget-{i} {{ color: #{:06x}; margin: {}px; }}\n", i * 97, i % 16))
        .collect()
}

fn create_project(dir: &TempDir) {
    fs::write(
        dir.path().join("theme.json"),
        r#"{"id":"midnight","version":"1.2.0","name":"Midnight","author":"bench"}"#,
    )
    .unwrap();
    fs::write(dir.path().join("index.scss"), "").unwrap();
}

/// Benchmark descriptor parsing and header rendering
fn bench_header_comment(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    create_project(&temp);
    let path = temp.path().join("theme.json");

    c.bench_function("descriptor_header_comment", |b| {
        b.iter(|| {
            let descriptor = ThemeDescriptor::load(black_box(&path)).unwrap();
            descriptor.header_comment()
        })
    });
}

/// Benchmark build + release packaging for different stylesheet sizes
fn bench_release(c: &mut Criterion) {
    let mut group = c.benchmark_group("release");

    for rules in [100, 1_000, 10_000].iter() {
        let temp = TempDir::new().unwrap();
        create_project(&temp);
        let layout = ThemeLayout::new(temp.path());
        let compiler = StaticCss(make_css(*rules));

        group.throughput(Throughput::Bytes(compiler.0.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rules), rules, |b, _| {
            b.iter(|| {
                let artifact = build_theme(&layout, &compiler).unwrap();
                package_release(&layout, black_box(&artifact)).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_header_comment, bench_release);
criterion_main!(benches);
