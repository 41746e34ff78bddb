use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use jsonxml::{Format, Node, convert, from_json, from_xml_str, to_json};

const XML_INPUT: &str = concat!(
    "<?xml version=\"1.0\" encoding=\"utf-8\"?>",
    "<catalog xmlns:x=\"urn:x\">",
    "<!-- inventory -->",
    "<book id=\"1\"><title>Rust</title><x:tag>systems</x:tag><x:tag>lang</x:tag></book>",
    "<book id=\"2\"><title>XML</title><note>mixed <b>content</b> here</note></book>",
    "<empty/><blank></blank>",
    "</catalog>",
);

fn bench_xml_to_json(c: &mut Criterion) {
    c.bench_function("convert_xml_json", |b| {
        b.iter(|| convert(black_box(XML_INPUT), Format::Xml, Format::Json))
    });
}

fn bench_json_to_xml(c: &mut Criterion) {
    let json = convert(XML_INPUT, Format::Xml, Format::Json).unwrap_or_default();
    c.bench_function("convert_json_xml", |b| {
        b.iter(|| convert(black_box(&json), Format::Json, Format::Xml))
    });
}

fn bench_tree_writer(c: &mut Criterion) {
    let Ok(doc) = from_xml_str(XML_INPUT) else {
        return;
    };
    let node = Node::Document(doc);
    c.bench_function("write_tree_json", |b| b.iter(|| to_json(Some(black_box(&node)))));
}

fn bench_tree_reader(c: &mut Criterion) {
    let json = convert(XML_INPUT, Format::Xml, Format::Json).unwrap_or_default();
    c.bench_function("read_tree_json", |b| b.iter(|| from_json(black_box(&json))));
}

criterion_group!(
    benches,
    bench_xml_to_json,
    bench_json_to_xml,
    bench_tree_writer,
    bench_tree_reader
);
criterion_main!(benches);
