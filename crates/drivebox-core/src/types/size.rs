//! Human-readable size formatting.

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Format a byte count using binary units with two decimal places.
///
/// Values below one kibibyte are reported as exact byte counts.
pub fn format_size(bytes: u64) -> String {
    if bytes >= GIB {
        format!("{:.2} GB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.2} MB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.2} KB", bytes as f64 / KIB as f64)
    } else if bytes > 1 {
        format!("{bytes} bytes")
    } else if bytes == 1 {
        "1 byte".to_string()
    } else {
        "0 bytes".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0 bytes");
        assert_eq!(format_size(1), "1 byte");
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn test_format_size_boundary_below_unit() {
        assert_eq!(format_size(1023), "1023 bytes");
        assert_eq!(format_size(1024 * 1024 - 1), "1024.00 KB");
    }
}
