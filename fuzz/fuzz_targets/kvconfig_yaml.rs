#![no_main]

use kayvee_router::parse_config;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // YAML 파서는 &str을 받으므로 UTF-8 변환 필요
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_config(text, "fuzz-input.yml");
    }
});
