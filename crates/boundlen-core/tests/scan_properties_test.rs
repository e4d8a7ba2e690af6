//! Integration test: bounded scan properties.
//!
//! Validates that:
//! 1. The result always lies in [0, max_length].
//! 2. The first terminator inside the bound decides the result.
//! 3. Unterminated prefixes yield exactly max_length.
//! 4. Repeated and concurrent scans of one buffer agree.
//!
//! Run: cargo test -p boundlen-core --test scan_properties_test

use std::sync::Arc;
use std::thread;

use boundlen_core::{BoundedView, ScanError, TERMINATOR, str_len, str_len_clamped};

/// Deterministic byte patterns over the alphabet {0, 'a', 0xFF}, every length up to 6.
fn corpus() -> Vec<Vec<u8>> {
    let alphabet = [TERMINATOR, b'a', 0xFF];
    let mut out = vec![Vec::new()];
    let mut frontier = vec![Vec::new()];
    for _ in 0..6 {
        let mut next = Vec::new();
        for prefix in &frontier {
            for &b in &alphabet {
                let mut v: Vec<u8> = prefix.clone();
                v.push(b);
                next.push(v);
            }
        }
        out.extend(next.iter().cloned());
        frontier = next;
    }
    out
}

fn reference_scan(buf: &[u8], max_length: usize) -> usize {
    let mut length = 0;
    while length < max_length && buf[length] != TERMINATOR {
        length += 1;
    }
    length
}

#[test]
fn result_is_within_bound_and_matches_reference() {
    for buf in corpus() {
        for m in 0..=buf.len() {
            let n = str_len(&buf, m).expect("bound within buffer");
            assert!(n <= m, "buf={buf:?} m={m} n={n}");
            assert_eq!(n, reference_scan(&buf, m), "buf={buf:?} m={m}");
        }
    }
}

#[test]
fn first_terminator_decides() {
    for buf in corpus() {
        let Some(k) = buf.iter().position(|&b| b == TERMINATOR) else {
            continue;
        };
        for m in (k + 1)..=buf.len() {
            assert_eq!(str_len(&buf, m), Ok(k), "buf={buf:?} m={m}");
        }
    }
}

#[test]
fn unterminated_prefix_yields_bound() {
    for buf in corpus() {
        let clean = buf.iter().take_while(|&&b| b != TERMINATOR).count();
        for m in 0..=clean {
            assert_eq!(str_len(&buf, m), Ok(m), "buf={buf:?} m={m}");
        }
    }
}

#[test]
fn checked_clamped_and_view_agree() {
    for buf in corpus() {
        for m in 0..=buf.len() {
            let checked = str_len(&buf, m).unwrap();
            assert_eq!(str_len_clamped(&buf, m), checked);
            assert_eq!(BoundedView::new(&buf, m).unwrap().len_to_terminator(), checked);
        }
        let past = buf.len() + 1;
        assert_eq!(
            str_len(&buf, past),
            Err(ScanError::BoundExceedsBuffer {
                max_length: past,
                available: buf.len()
            })
        );
        assert_eq!(str_len_clamped(&buf, past), str_len_clamped(&buf, buf.len()));
    }
}

#[test]
fn scenario_table() {
    assert_eq!(str_len(b"hello\0\0\0\0\0", 10), Ok(5));
    assert_eq!(str_len_clamped(b"hello\0", 10), 5);
    assert_eq!(str_len(b"hello", 3), Ok(3));
    assert_eq!(str_len(b"\0abc", 4), Ok(0));
    assert_eq!(str_len(b"", 0), Ok(0));
    assert_eq!(str_len(b"abc\0def\0", 8), Ok(3));
}

#[test]
fn repeated_and_concurrent_scans_agree() {
    let mut buf = vec![b'x'; 4096];
    buf[1777] = TERMINATOR;
    let buf: Arc<[u8]> = buf.into();
    let expected = str_len(&buf, buf.len()).unwrap();
    assert_eq!(expected, 1777);

    for _ in 0..16 {
        assert_eq!(str_len(&buf, buf.len()), Ok(expected));
    }

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let buf = Arc::clone(&buf);
            thread::spawn(move || {
                (0..64)
                    .map(|_| str_len(&buf, buf.len()).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();
    for handle in handles {
        for n in handle.join().unwrap() {
            assert_eq!(n, expected);
        }
    }
}
