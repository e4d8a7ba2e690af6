//! Bounded scan benchmarks.

use std::ffi::c_char;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use boundlen_abi::string_abi::boundlen_strnlen;
use boundlen_core::{str_len, str_len_clamped};
use boundlen_membrane::config::{SafetyLevel, pin_safety_level};

const SIZES: &[usize] = &[16, 64, 256, 1024, 4096, 65536];

fn terminated(size: usize) -> Vec<u8> {
    let mut s = vec![b'A'; size];
    s.push(0); // null terminator
    s
}

fn bench_core(c: &mut Criterion) {
    let mut group = c.benchmark_group("str_len_core");

    for &size in SIZES {
        let s = terminated(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("checked", size), &size, |b, _| {
            b.iter(|| black_box(str_len(black_box(&s), s.len())));
        });
        group.bench_with_input(BenchmarkId::new("clamped", size), &size, |b, _| {
            b.iter(|| black_box(str_len_clamped(black_box(&s), usize::MAX)));
        });
    }
    group.finish();
}

fn bench_abi_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("boundlen_strnlen");

    for &size in SIZES {
        let s = terminated(size);
        let ptr: *const c_char = s.as_ptr().cast();
        group.throughput(Throughput::Bytes(size as u64));

        for level in [SafetyLevel::Off, SafetyLevel::Strict, SafetyLevel::Hardened] {
            pin_safety_level(level);
            group.bench_with_input(BenchmarkId::new(level.as_str(), size), &size, |b, _| {
                // SAFETY: `s` is NUL-terminated and outlives the iteration.
                b.iter(|| black_box(unsafe { boundlen_strnlen(black_box(ptr), s.len()) }));
            });
        }

        group.bench_with_input(BenchmarkId::new("host_strnlen", size), &size, |b, _| {
            // SAFETY: as above.
            b.iter(|| black_box(unsafe { libc::strnlen(black_box(ptr), s.len()) }));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_core, bench_abi_modes);
criterion_main!(benches);
