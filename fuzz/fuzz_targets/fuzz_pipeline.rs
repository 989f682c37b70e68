#![no_main]

use ds_render_tikz::{TikzRenderConfig, render_tikz_document};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(graph) = ds_parser::parse(input) else {
        return;
    };
    let _ = graph.dump();
    let _ = render_tikz_document(&graph, &TikzRenderConfig::standalone());

    let json = serde_json::to_string(&graph).expect("graph serializes");
    let decoded: ds_core::Graph = serde_json::from_str(&json).expect("graph deserializes");
    assert_eq!(decoded, graph);
});
