#![no_main]
use libfuzzer_sys::fuzz_target;

use boundlen_abi::string_abi::boundlen_strnlen;
use boundlen_core::{BoundedView, TERMINATOR, str_len, str_len_clamped};

fuzz_target!(|data: &[u8]| {
    // First byte picks the bound; the rest is the buffer.
    let Some((&seed, buf)) = data.split_first() else {
        return;
    };
    let max_length = usize::from(seed) % (buf.len() + 1);

    let len = match str_len(buf, max_length) {
        Ok(len) => len,
        Err(err) => panic!("bound {max_length} within {} bytes rejected: {err}", buf.len()),
    };
    assert!(len <= max_length);
    assert!(!buf[..len].contains(&TERMINATOR));
    if len < max_length {
        assert_eq!(buf[len], TERMINATOR);
    }

    // Out-of-range bounds fail the checked scan and clamp in the lenient one.
    let oversized = buf.len() + usize::from(seed) + 1;
    assert!(str_len(buf, oversized).is_err());
    assert_eq!(
        str_len_clamped(buf, oversized),
        str_len_clamped(buf, buf.len())
    );

    let view = BoundedView::new(buf, max_length).expect("bound within buffer");
    assert_eq!(view.len_to_terminator(), len);

    // SAFETY: `buf` is readable for `max_length` bytes.
    let abi_len = unsafe { boundlen_strnlen(buf.as_ptr().cast(), max_length) };
    assert_eq!(abi_len, len);
});
