#![no_main]
use libfuzzer_sys::fuzz_target;
use product_runtime::toc::{EntryFactoryRegistry, TocLoader};

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz the table of contents loader.
///
/// Wraps input in a `ProductDataToc` envelope so entry parsing is reached
/// even when the fuzzer has not discovered the root element.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let loader = TocLoader::new()
            .with_registry(EntryFactoryRegistry::builtin().with_extension_tags(["Formula"]));

        // Try raw input
        if let Ok(toc) = loader.load_str(s) {
            // Anything that loads must serialize and load again
            let xml = toc.to_xml().expect("loaded index serializes");
            loader.load_str(&xml).expect("serialized index reloads");
        }

        // Try wrapping in a table of contents envelope
        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!(r#"<ProductDataToc productDataVersion="1.0">{s}</ProductDataToc>"#);
            let _ = loader.load_str(&wrapped);
        }
    }
});
