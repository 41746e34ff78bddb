#![no_main]
use libfuzzer_sys::fuzz_target;
use jsonxml::{from_json, from_xml_str, to_json, Node};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(doc) = from_xml_str(s) {
            if let Ok(json) = to_json(Some(&Node::Document(doc))) {
                let _ = from_json(&json);
            }
        }
    }
});
