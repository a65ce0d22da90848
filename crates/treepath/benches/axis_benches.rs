use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use treepath::expr::{Expr, ancestor, child, child_named, descendant, descendant_named, where_};
use treepath::{Context, Document, Selection, SimpleNode, TreeNode, compile, elem, text};

fn sample_queries() -> Vec<&'static str> {
    vec![
        "child::*",
        "descendant::item",
        "descendant::item[@type='a']",
        "child::section[descendant::item[contains(text(), 'Two')]]",
        "descendant::item/ancestor::*",
        "child::section/child::item | descendant::*[not(child::*)]",
    ]
}

fn build_sample_document(sections: usize, items: usize) -> SimpleNode {
    let mut root = elem("root").attr("xml:lang", "en").ns("", "urn:sample");
    for s in 0..sections {
        let mut section = elem("section").attr("name", &format!("s{s}"));
        for i in 0..items {
            let kind = if i % 2 == 0 { "a" } else { "b" };
            section = section.child(
                elem("item")
                    .attr("id", &format!("item-{s}-{i}"))
                    .attr("type", kind)
                    .child(text(if i == 1 { "Two" } else { "Other" })),
            );
        }
        root = root.child(section);
    }
    root.build()
}

fn benchmark_compile(c: &mut Criterion) {
    let queries = sample_queries();
    c.bench_function("parser/compile", |b| {
        b.iter(|| {
            for q in &queries {
                let compiled = compile(black_box(q)).expect("compile failure");
                black_box(compiled);
            }
        })
    });
}

fn benchmark_axes(c: &mut Criterion) {
    let document = build_sample_document(20, 20);
    let axes: [(&str, Expr); 4] = [
        ("child", child() / child()),
        ("descendant", descendant()),
        ("ancestor", descendant_named("item") / ancestor()),
        ("where", child() / where_(child_named("item") / descendant())),
    ];
    let mut group = c.benchmark_group("axis/count");
    for (name, expr) in &axes {
        let selection = Selection::from_node(document.clone(), expr.clone());
        group.bench_with_input(BenchmarkId::from_parameter(name), &selection, |b, sel| {
            b.iter(|| black_box(sel.count()));
        });
    }
    group.finish();
}

fn benchmark_queries(c: &mut Criterion) {
    let document = build_sample_document(10, 10);
    let mut group = c.benchmark_group("query/evaluate");
    for q in sample_queries() {
        let selection = Selection::from_node(document.clone(), compile(q).expect("compile failure"));
        group.bench_with_input(BenchmarkId::from_parameter(q), &selection, |b, sel| {
            b.iter(|| black_box(sel.count()));
        });
    }
    group.finish();
}

fn benchmark_xml_loading(c: &mut Criterion) {
    let xml = build_sample_document(20, 20).serialize();
    c.bench_function("xml/parse", |b| {
        b.iter(|| {
            let doc = Document::parse(black_box(&xml)).expect("parse failure");
            black_box(Context::from(doc.root()).has_children());
        })
    });
}

criterion_group!(benches, benchmark_compile, benchmark_axes, benchmark_queries, benchmark_xml_loading);
criterion_main!(benches);
