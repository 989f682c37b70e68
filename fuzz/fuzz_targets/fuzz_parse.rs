#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    match ds_parser::parse(input) {
        Ok(graph) => {
            for (_, node) in graph.iter() {
                for id in node.parents.iter().chain(&node.precursors) {
                    assert!(graph.node(*id).is_some_and(|n| n.is_revision()));
                }
            }
        }
        Err(err) => {
            let _ = err.code().as_str();
        }
    }
});
