use criterion::{criterion_group, criterion_main};

mod modem;
mod network;

criterion_group!(
    benches,
    modem::response::bench_tokenizers,
    modem::response::bench_noisy_capture,
    network::application::http::client::bench_encode,
    network::application::http::client::bench_parse
);
criterion_main!(benches);
