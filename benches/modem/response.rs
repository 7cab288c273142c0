use criterion::{Criterion, Throughput};
use std::hint::black_box;
use fieldlink::modem::response;
use fieldlink::modem::transport::ModemResponse;

const CSQ: &str = "AT+CSQ\r\r\n+CSQ: 17,99\r\n\r\nOK\r\n";
const CREG: &str = "\r\n+CREG: 2,5,\"00A1\",\"3F2C\"\r\n\r\nOK\r\n";
const CPIN: &str = "\r\n+CPIN: READY\r\n\r\nOK\r\n";
const CIFSR: &str = "\r\n10.152.33.7\r\n";

pub fn bench_tokenizers(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenizers");
    group.bench_function("signal_quality", |b| {
        b.iter(|| response::signal_quality(black_box(CSQ)))
    });
    group.bench_function("registration_status", |b| {
        b.iter(|| response::registration_status(black_box(CREG)))
    });
    group.bench_function("sim_ready", |b| {
        b.iter(|| response::sim_ready(black_box(CPIN)))
    });
    group.bench_function("local_address", |b| {
        b.iter(|| response::local_address(black_box(CIFSR)))
    });
    group.finish();
}

pub fn bench_noisy_capture(c: &mut Criterion) {
    let mut capture = Vec::new();
    for i in 0..60 {
        capture.extend_from_slice(format!("+CIPRXGET: {},{}\r\n", i, i * 7).as_bytes());
    }
    capture.extend_from_slice(b"\r\nCLOSED\r\n");

    let mut group = c.benchmark_group("capture");
    group.throughput(Throughput::Bytes(capture.len() as u64));
    group.bench_function("fill_and_search", |b| {
        b.iter(|| {
            let response = ModemResponse::from_bytes(black_box(&capture));
            response.contains("CLOSED")
        })
    });
    group.finish();
}
