//! Unwrap a `.p7m` file: print text payloads, save binary ones.
//!
//! ```text
//! cargo run --example unwrap_file -- fattura.xml.p7m [output-dir]
//! ```

use std::path::{Path, PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args_os().skip(1);
    let input = PathBuf::from(args.next().ok_or("usage: unwrap_file <file.p7m> [output-dir]")?);
    let output_dir = args.next().map(PathBuf::from).unwrap_or_else(|| ".".into());

    let name = input
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or("input path has no file name")?;
    if !p7m::is_p7m_file_name(name) {
        eprintln!("warning: {name} does not end in .p7m");
    }

    let envelope = std::fs::read(&input)?;
    let nested = p7m::unwrap_nested(&envelope, name)?;
    let payload = &nested.payload;

    eprintln!(
        "{} ({}, {} bytes, {} signature layer(s))",
        payload.suggested_name,
        payload.mime_type,
        payload.bytes.len(),
        nested.layers
    );

    match payload.text() {
        Some(text) => println!("{text}"),
        None => {
            let path = payload.save_in(Path::new(&output_dir))?;
            eprintln!("saved to {}", path.display());
        }
    }

    Ok(())
}
