// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::io::Result;

#[cfg(feature = "generate-protobuf")]
use {
    std::env,
    std::fs::{self, File},
    std::io::{Read, Write},
    std::path::Path,
};

// to re-generate protobuf structs, run cargo build --features generate-protobuf
fn main() -> Result<()> {
    #[cfg(feature = "generate-protobuf")]
    {
        // protoc is required to compile proto files. The vendored binary is used so that no system
        // install is needed.
        std::env::set_var("PROTOC", protoc_bin_vendored::protoc_bin_path().unwrap());

        // compiles the .proto files into rust structs
        generate_protobuf();
    }
    Ok(())
}

#[cfg(feature = "generate-protobuf")]
fn generate_protobuf() {
    let mut config = prost_build::Config::new();

    let cur_working_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let current_working_dir_path = Path::new(&cur_working_dir);
    let output_path = current_working_dir_path.join(Path::new("src"));

    config.out_dir(output_path.clone());

    // Label and attribute maps are encoded in key order so that two encodings of the same span are
    // byte-identical. The message sizer relies on this when comparing against real requests.
    config.btree_map(["."]);

    config
        .compile_protos(&["src/pb/trace_v1.proto", "src/pb/trace_v2.proto"], &["src/pb/"])
        .unwrap();

    let license = "// Copyright 2026-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

"
    .as_bytes();

    for (generated, target) in [
        ("google.devtools.cloudtrace.v1.rs", "v1.rs"),
        ("google.devtools.cloudtrace.v2.rs", "v2.rs"),
    ] {
        let target = output_path.join(target);
        fs::rename(output_path.join(generated), &target).unwrap();
        prepend_to_file(license, &target);
    }
}

#[cfg(feature = "generate-protobuf")]
fn prepend_to_file(data: &[u8], file_path: &Path) {
    let mut f = File::open(file_path).unwrap();
    let mut content = data.to_owned();
    f.read_to_end(&mut content).unwrap();

    let mut f = File::create(file_path).unwrap();
    f.write_all(content.as_slice()).unwrap();
}
