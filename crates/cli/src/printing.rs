use genestore_codec::{Header, VaultRecord};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Human readable size: base 1024, at most two decimals (`1.5 KB`, `0 Bytes`).
pub fn format_bytes(bytes: u64) -> String {
    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < SIZE_UNITS.len() && bytes >= scale * 1024 {
        scale *= 1024;
        unit += 1;
    }
    let value = (bytes as f64 / scale as f64 * 100.0).round() / 100.0;
    format!("{value} {}", SIZE_UNITS[unit])
}

pub fn print_header(header: &Header) {
    println!("\n📄 Original File");
    println!("  • Name: {}", header.filename);
    println!("  • Type: {}", header.mime_type);
    println!(
        "  • Size: {} ({} bytes)",
        format_bytes(header.original_size),
        header.original_size
    );

    println!("\n🧬 DNA Sequence");
    println!("  • Length: {} symbols", header.symbol_sequence_length);
    println!(
        "  • Created: {}",
        header.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  • Format Version: {}", header.format_version);
    println!();
}

/// Fixed-width excerpt of a sequence, for terminal display.
pub fn preview(symbols: &str, width: usize) -> String {
    if symbols.len() <= width {
        symbols.to_string()
    } else {
        format!("{}… ({} more)", &symbols[..width], symbols.len() - width)
    }
}

pub fn print_records(user: &str, records: &[VaultRecord]) {
    println!("\n🗄️  Vault of {user}");
    println!("{}", "=".repeat(86));

    if records.is_empty() {
        println!("No records yet. Encode or decode with --user {user} to add some.");
        return;
    }

    println!(
        "{:<15} {:<8} {:<28} {:>12} {:>20}",
        "ID", "Type", "File", "Size", "Time (UTC)"
    );
    println!("{}", "-".repeat(86));
    for record in records {
        println!(
            "{:<15} {:<8} {:<28} {:>12} {:>20}",
            record.id,
            record.operation,
            truncate(&record.filename, 28),
            format_bytes(record.size),
            record.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!("\nTotal records: {}", records.len());
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width - 1).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(1), "1 Bytes");
        assert_eq!(format_bytes(1023), "1023 Bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(10 * 1024 * 1024), "10 MB");
        assert_eq!(format_bytes(1_234_567), "1.18 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("TACT", 10), "TACT");
        assert_eq!(preview("TACTTACT", 4), "TACT… (4 more)");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short.txt", 28), "short.txt");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
