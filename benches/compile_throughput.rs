//! Expression compilation and whole-stylesheet transpilation benchmarks.
//!
//! Run benchmarks: `cargo bench --bench compile_throughput`

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use downlevel::Transpiler;
use downlevel::dom::Document;
use downlevel::xpath::ExpressionContext;
use std::hint::black_box;

const EXPRESSIONS: &[&str] = &[
    "count(item[@type = 'a']) > 2",
    "count(current-group())",
    "upper-case(concat(@first, ' ', @last))",
    "sum(//line/(@price * @qty)) div count(//line)",
];

/// A stylesheet with `count` grouped templates.
fn generate_stylesheet(count: usize) -> String {
    let templates: String = (0..count)
        .map(|i| {
            format!(
                r#"<xsl:template match="item[{i}]">
  <xsl:for-each select="entry" group-id="g{i}">
    <row id="r{i}-{{position()}}" size="{{count(current-group())}}">
      <xsl:if test="upper-case(@kind) = 'X'"><xsl:value-of select="current-grouping-key()"/></xsl:if>
    </row>
  </xsl:for-each>
</xsl:template>"#
            )
        })
        .collect();
    format!(
        r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform" version="2.0">{}</xsl:stylesheet>"#,
        templates
    )
}

fn bench_compile(c: &mut Criterion) {
    let transpiler = Transpiler::builder().build();
    let doc = Document::parse("<xsl:stylesheet xmlns:xsl=\"http://www.w3.org/1999/XSL/Transform\"/>")
        .expect("valid document");
    let root = doc.document_element().expect("root element");
    let context = ExpressionContext::element(&doc, root);
    let compiler = transpiler.context().compiler();

    let mut group = c.benchmark_group("compile_expression");
    for (i, expression) in EXPRESSIONS.iter().enumerate() {
        group.bench_with_input(BenchmarkId::from_parameter(i), expression, |b, expr| {
            b.iter(|| compiler.compile(black_box(expr), &context).expect("compiles"))
        });
    }
    group.finish();
}

fn bench_transpile(c: &mut Criterion) {
    let transpiler = Transpiler::builder().build();
    let mut group = c.benchmark_group("transpile_stylesheet");
    for templates in [1, 10, 100] {
        let source = generate_stylesheet(templates);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(templates), &source, |b, src| {
            b.iter(|| transpiler.transpile_str(black_box(src)).expect("transpiles"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compile, bench_transpile);
criterion_main!(benches);
