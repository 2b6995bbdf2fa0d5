#![no_main]

use libfuzzer_sys::fuzz_target;
use parley_core::token;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    assert_eq!(token::decode(&token::encode(text)).as_deref(), Ok(text));

    // decoding arbitrary input must fail cleanly or re-encode to the same token
    if let Ok(decoded) = token::decode(text) {
        assert_eq!(token::encode(&decoded), text);
    }
});
