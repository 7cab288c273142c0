use criterion::{Criterion, Throughput};
use std::hint::black_box;
use fieldlink::network::application::http::{Request, Response};

const SUBMISSION: &[u8] = br#"{"device_id":"ESP32-001","api_key":"k-123","temperature":21.5,"humidity":48.0,"soil_moisture":46,"soil_raw":2900,"battery_level":100.0,"signal_strength":17}"#;

const REPLY: &str = "\r\nSEND OK\r\nHTTP/1.1 200 OK\r\nServer: WSGIServer/0.2\r\n\
Content-Type: application/json\r\nContent-Length: 75\r\n\r\n\
{\"success\":true,\"device_id\":\"ESP32-001\",\"api_key\":\"k-123\",\"created\":true}\r\nCLOSED\r\n";

pub fn bench_encode(c: &mut Criterion) {
    let request = Request::post_json("/api/submit/", SUBMISSION);
    let mut group = c.benchmark_group("http");
    group.throughput(Throughput::Bytes(SUBMISSION.len() as u64));
    group.bench_function("encode_submission", |b| {
        b.iter(|| black_box(&request).encode("192.168.0.152"))
    });
    group.finish();
}

pub fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("http");
    group.throughput(Throughput::Bytes(REPLY.len() as u64));
    group.bench_function("parse_reply", |b| {
        b.iter(|| Response::parse(black_box(REPLY)).map(|r| r.body.len()))
    });
    group.finish();
}
