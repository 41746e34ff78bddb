#![no_main]
use libfuzzer_sys::fuzz_target;
use jsonxml::{from_json, to_json, Node};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(Some(doc)) = from_json(s) {
            let _ = to_json(Some(&Node::Document(doc)));
        }
    }
});
