use anyhow::{Context, Result};
use std::path::PathBuf;

use fcsframe::fcs::FcsReader;
use fcsframe::persist;

use super::load_frame;

/// Display information about an FCS file or saved frame
pub fn run(file: PathBuf, show_keywords: bool) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }
    let bytes = std::fs::read(&file).context("Failed to read file")?;

    println!("FCS File Information");
    println!("====================");
    println!("File: {}", file.display());
    println!();

    if bytes.starts_with(&persist::MAGIC) {
        println!("Format: saved frame (version {})", persist::FORMAT_VERSION);
    } else {
        let meta = FcsReader::default()
            .metadata(&bytes)
            .context("Failed to read FCS header and TEXT")?;
        println!("Format: {}", meta.header.version);
        println!(
            "  TEXT:     {}..={}",
            meta.header.text.begin, meta.header.text.end
        );
        match meta.data {
            Some(data) => println!("  DATA:     {}..={}", data.begin, data.end),
            None => println!("  DATA:     <none>"),
        }
        if let Some(analysis) = meta.header.analysis {
            println!("  ANALYSIS: {}..={}", analysis.begin, analysis.end);
        }
        if let Ok(layout) = meta.layout() {
            println!(
                "  Layout:   {} {:?}, {} bytes per event",
                layout.data_type.as_str(),
                layout.endianness,
                layout.row_bytes()
            );
        }
        println!();
    }

    let frame = load_frame(&file)?;
    println!("Name:       {}", frame.preferred_name());
    println!("Id:         {}", frame.id());
    println!("Events:     {}", frame.row_count());
    println!("Parameters: {}", frame.column_count());
    match frame.spillover() {
        Some(spill) => println!(
            "Spillover:  {0}x{0} ({1})",
            spill.size(),
            spill.parameter_names().join(", ")
        ),
        None => println!("Spillover:  <none>"),
    }
    if frame.compensation_id().is_some() {
        println!("Compensated: yes");
    }
    println!();

    println!("Parameters:");
    for dim in frame.dimensions() {
        let transform = dim
            .preferred_transform()
            .map(|t| format!("{:?}", t.kind()))
            .unwrap_or_else(|| "-".to_string());
        let range = dim
            .range_hint()
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:3}. {:<24} range {:<10} transform {}",
            dim.index(),
            dim.display_name(),
            range,
            transform
        );
    }

    if show_keywords {
        println!();
        println!("Keywords:");
        for (key, value) in frame.keywords() {
            let preview = if value.chars().count() > 100 {
                let head: String = value.chars().take(100).collect();
                format!("{}... ({} bytes)", head, value.len())
            } else {
                value.clone()
            };
            println!("  {}: {}", key, preview);
        }
    }

    Ok(())
}
