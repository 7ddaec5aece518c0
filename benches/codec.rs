//! Codec benchmark suite.
//!
//! Measures the hot paths of both byte streams:
//! - WebSocket frame decode (masked client frames, all length tiers)
//! - WebSocket text frame encode
//! - IPC length-prefixed decode with small read chunks
//!
//! Run with: cargo bench --features bench --bench codec
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use serde_json::json;

use firefox_mcp_host::server::codec::{FrameDecoder, Opcode, encode_client_frame, encode_text};
use firefox_mcp_host::transport::IpcDecoder;
use firefox_mcp_host::transport::framing;

// ============================================================================
// Benchmark Parameters
// ============================================================================

/// Payload sizes covering the 7-bit, 16-bit and 64-bit length forms.
const PAYLOAD_SIZES: &[usize] = &[64, 1024, 70_000];

/// Read chunk size used for the IPC stream.
const IPC_CHUNK: usize = 512;

const MASK: [u8; 4] = [0x37, 0xfa, 0x21, 0x3d];

// ============================================================================
// Benchmark: Frame Decode
// ============================================================================

fn bench_frame_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_decode");

    for &size in PAYLOAD_SIZES {
        let payload = "a".repeat(size);
        let frame = encode_client_frame(true, Opcode::Text, payload.as_bytes(), MASK);
        group.throughput(Throughput::Bytes(frame.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &frame, |b, frame| {
            b.iter(|| {
                let mut decoder = FrameDecoder::new();
                decoder.feed(black_box(frame));
                black_box(decoder.decode())
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Frame Encode
// ============================================================================

fn bench_frame_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_encode");

    for &size in PAYLOAD_SIZES {
        let text = "a".repeat(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &text, |b, text| {
            b.iter(|| black_box(encode_text(black_box(text))));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: IPC Decode
// ============================================================================

fn bench_ipc_decode(c: &mut Criterion) {
    let mut stream = Vec::new();
    for id in 0..100u64 {
        let reply = json!({"id": id, "result": {"status": "ok", "url": "https://example.com"}});
        if let Ok(frame) = framing::encode(&reply) {
            stream.extend_from_slice(&frame);
        }
    }

    let mut group = c.benchmark_group("ipc_decode");
    group.throughput(Throughput::Bytes(stream.len() as u64));

    group.bench_function("100_replies", |b| {
        b.iter(|| {
            let mut decoder = IpcDecoder::new();
            let mut decoded = 0;
            for chunk in stream.chunks(IPC_CHUNK) {
                decoded += decoder.feed(black_box(chunk)).len();
            }
            black_box(decoded)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_frame_decode,
    bench_frame_encode,
    bench_ipc_decode
);
criterion_main!(benches);
