#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        // A parsed spec must also render without panicking
        if let Ok(spec) = tscfg_build::parse_spec(source, Path::new("fuzz.spec.conf")) {
            let options = tscfg_build::GenerationOptions::default();
            let _ = tscfg_build::ConfigTextGenerator::new(&options).generate(&spec.root, "fuzz");
        }
    }
});
