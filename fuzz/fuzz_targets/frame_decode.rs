#![no_main]

use libfuzzer_sys::fuzz_target;
use parley_proto::{Control, Frame};

fuzz_target!(|data: &[u8]| {
    let Ok(frame) = Frame::decode(data) else {
        return;
    };

    assert_eq!(frame.payload().as_ref(), data);
    if let Some(Control::Pseudonym(Some(name))) = frame.control() {
        assert!(!name.is_empty());
        assert!(!name.contains('$'));
        assert!(frame.as_str().starts_with("pseudo$"));
    }
});
