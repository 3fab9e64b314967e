#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(manifests) = helmkust_stream::decode(data) else { return };
    let Ok(encoded) = helmkust_stream::encode(&manifests) else { return };

    // Canonical output must decode to the same documents and re-encode identically.
    let again = helmkust_stream::decode(&encoded).expect("canonical output decodes");
    assert_eq!(again.len(), manifests.len());
    let reencoded = helmkust_stream::encode(&again).expect("re-encode");
    assert_eq!(encoded, reencoded);
});
