use std::hint::black_box;

use bencher::{TestCase, TestFile};
use bytes::Bytes;
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use micro_fetch::Request;
use micro_fetch::ResponseDecoder;
use micro_fetch::codec::CodecTable;
use micro_fetch_http::codec::HeaderDecoder;

static JSON_SMALL: TestFile =
    TestFile::new(include_str!("../resources/response/json_small.head"), include_str!("../resources/response/json_small.body"));
static XML_VENDOR: TestFile =
    TestFile::new(include_str!("../resources/response/xml_vendor.head"), include_str!("../resources/response/xml_vendor.body"));
static CSV_REPORT: TestFile =
    TestFile::new(include_str!("../resources/response/csv_report.head"), include_str!("../resources/response/csv_report.body"));
static LARGE_HEADER: TestFile =
    TestFile::new(include_str!("../resources/response/large_header.head"), include_str!("../resources/response/json_small.body"));

fn create_test_cases() -> Vec<TestCase> {
    vec![
        TestCase::small("json_small", JSON_SMALL),
        TestCase::small("xml_vendor", XML_VENDOR),
        TestCase::small("csv_report", CSV_REPORT),
        TestCase::large("large_header", LARGE_HEADER),
    ]
}

fn benchmark_header_decoder(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("header_decoder");

    for case in create_test_cases() {
        group.throughput(Throughput::Bytes(case.file().head().len() as u64));
        group.bench_with_input(BenchmarkId::new(case.group().label(), case.name()), &case, |b, case| {
            b.iter(|| {
                let head = HeaderDecoder.decode(black_box(case.file().head())).expect("fixture should be a valid response head");
                black_box(head);
            });
        });
    }

    group.finish();
}

fn benchmark_response_decoder(criterion: &mut Criterion) {
    let codecs = CodecTable::new();
    let request = Request::init();
    let mut group = criterion.benchmark_group("response_decoder");

    for case in create_test_cases() {
        group.throughput(Throughput::Bytes(case.file().len() as u64));
        group.bench_with_input(BenchmarkId::new(case.group().label(), case.name()), &case, |b, case| {
            let decoder = ResponseDecoder::new(&codecs);
            b.iter_batched(
                || Bytes::from_static(case.file().body().as_bytes()),
                |body| {
                    let response =
                        decoder.decode(case.file().head(), body, &request).expect("fixture should decode with the built-in codecs");
                    black_box(response);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(decoder, benchmark_header_decoder, benchmark_response_decoder);
criterion_main!(decoder);
