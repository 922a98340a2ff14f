//! Benchmarks for Metalink parsing.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use metalink_core::parse_str;

/// Build a synthetic document with `files` entries, each carrying mirrors,
/// checksums, and a pieces block.
fn synthetic_document(files: usize) -> String {
    let mut xml = String::from("<metalink><files>");
    for i in 0..files {
        xml.push_str(&format!(
            "<file name=\"file-{i}.tar.gz\">\
             <size>1048576</size>\
             <version>1.{i}</version>\
             <verification>\
             <hash type=\"sha1\">a96cf3f0266b91d87d5124cf94326422800b627d</hash>\
             <pieces type=\"sha1\" length=\"262144\">\
             <hash piece=\"0\">179463a88d79cbf0b1923991708aead914f26142</hash>\
             <hash piece=\"1\">fecf8bc9a1647505fe16746f94e97a477597dbf3</hash>\
             </pieces>\
             </verification>\
             <resources maxconnections=\"4\">\
             <url type=\"ftp\" location=\"jp\" preference=\"100\">ftp://host/file-{i}</url>\
             <url type=\"http\" preference=\"90\">http://host/file-{i}</url>\
             </resources>\
             </file>"
        ));
    }
    xml.push_str("</files></metalink>");
    xml
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for files in [1usize, 100, 1000] {
        let input = synthetic_document(files);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_function(format!("{files}_files"), |b| {
            b.iter(|| parse_str(black_box(&input)).unwrap().files.len())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
