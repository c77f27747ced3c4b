use std::{fs, path::Path};

use c_embed::{Metadata, decompress};

include!(concat!(env!("OUT_DIR"), "/resources.rs"));

const GENERATED: &str = include_str!(concat!(env!("OUT_DIR"), "/blobs.c"));

/// Returns the text between the braces of `blobs_resource_data_<index>`.
fn array_body(index: usize) -> &'static str {
    let open = format!("static const char* blobs_resource_data_{index}[] = {{");
    let start = GENERATED.find(&open).expect("array not generated") + open.len();
    let len = GENERATED[start..].find(" 0};\n").expect("array not closed");
    &GENERATED[start..start + len]
}

fn main() {
    assert!(GENERATED.contains("blobs_inflate_begin"));
    assert!(GENERATED.contains("#ifndef blobs_header_only\n"));
    assert!(GENERATED.contains("#define blobs_SEGMENT_LENGTH (1024)\n#endif\n"));
    assert!(GENERATED.contains("static const int blobs_resource_metadata[] = {\n0,1, 0};"));
    assert!(GENERATED.contains("int blobs_get_resource(const char* name"));
    assert!(!GENERATED.contains("__RESCUE"));
    assert_eq!(RESOURCES.len(), 2);

    for (index, &(path, compressed, inflated, deflated)) in RESOURCES.iter().enumerate() {
        let metadata = Metadata {
            inflated,
            deflated,
            compressed,
        };
        let data = decompress(array_body(index).as_bytes(), &metadata)
            .unwrap_or_else(|e| panic!("could not decode {path}: {e}"));

        let original = fs::read(Path::new(env!("CARGO_MANIFEST_DIR")).join(path))
            .expect("original file is missing");
        assert_eq!(data, original, "{path} does not match");

        println!("{path}: compressed={compressed} {inflated} -> {deflated}");
        if path.ends_with("file.txt") {
            assert!(!compressed);
            print!("{}", String::from_utf8(data).expect("data is not valid UTF-8"));
        } else {
            assert!(compressed);
        }
    }

    println!("Decoded data matches original.");
}
