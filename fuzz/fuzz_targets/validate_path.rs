#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else { return };
    let Ok(normalized) = helmkust_stage::validate_path(s) else { return };

    assert!(!normalized.as_str().is_empty());
    assert!(normalized.is_relative());
    assert!(
        normalized
            .components()
            .all(|c| matches!(c, camino::Utf8Component::Normal(_))),
        "{s:?} normalized to {normalized}"
    );
});
