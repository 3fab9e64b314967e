#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok((patched, _)) = helmkust_overlay::ensure_aggregate_included(data) else { return };

    // A second pass finds the aggregate already listed.
    let (again, changed) =
        helmkust_overlay::ensure_aggregate_included(&patched).expect("patched output parses");
    assert!(!changed);
    assert_eq!(again, patched);
});
