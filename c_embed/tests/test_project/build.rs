use std::{
    env,
    fmt::Write as _,
    fs,
    io::{self, Write},
    path::PathBuf,
};

use c_embed::Packed;

/// Writes the lookup tables the accessor glue reads.
fn emit_tables(identifier: &str, packed: &[Packed], out: &mut dyn Write) -> io::Result<()> {
    write!(out, "static const char** {identifier}_resource_data[] = {{")?;
    for resource in packed {
        write!(out, "{identifier}_resource_data_{},", resource.index)?;
    }
    writeln!(out, " 0}};")?;

    writeln!(out, "static const char* {identifier}_resource_names[] = {{")?;
    for resource in packed {
        write!(out, "{:?},", resource.path.display().to_string())?;
    }
    writeln!(out, " 0}};")?;

    writeln!(out, "static const int {identifier}_resource_metadata[] = {{")?;
    for resource in packed {
        write!(out, "{},", resource.metadata.flag())?;
    }
    writeln!(out, " 0}};")?;

    writeln!(out, "static const size_t {identifier}_resource_length_inflated[] = {{")?;
    for resource in packed {
        write!(out, "{},", resource.metadata.inflated)?;
    }
    writeln!(out, " 0}};")?;

    writeln!(out, "static const size_t {identifier}_resource_length_deflated[] = {{")?;
    for resource in packed {
        write!(out, "{},", resource.metadata.deflated)?;
    }
    writeln!(out, " 0}};")
}

fn main() {
    let packed = c_embed::Config::new("blobs")
        .identifier("blobs")
        .tables(emit_tables)
        .build()
        .expect("Failed to pack blobs");

    // Hand the same table data to the binary so it can decode the arrays.
    let mut table = String::from("pub const RESOURCES: &[(&str, bool, u64, u64)] = &[\n");
    for resource in &packed {
        writeln!(
            table,
            "    ({:?}, {}, {}, {}),",
            resource.path.display().to_string(),
            resource.metadata.compressed,
            resource.metadata.inflated,
            resource.metadata.deflated,
        )
        .unwrap();
    }
    table.push_str("];\n");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set"));
    fs::write(out_dir.join("resources.rs"), table).expect("Failed to write resource table");
}
