#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        if let Ok((manifest, _)) =
            tscfg_build::config::parse_with_warnings(content, Path::new("tscfg.toml"))
        {
            let _ = manifest.resolve_units(Path::new("tscfg.toml"));
        }
    }
});
