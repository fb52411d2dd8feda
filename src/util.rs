// Binary size units, largest first. u64 tops out in the exbibyte range.
const SIZE_UNITS: [(u64, &str); 7] = [
    (1 << 60, "EB"),
    (1 << 50, "PB"),
    (1 << 40, "TB"),
    (1 << 30, "GB"),
    (1 << 20, "MB"),
    (1 << 10, "KB"),
    (1, "B"),
];

/// Human readable byte count with a single fractional digit, e.g. `1.5 KB`.
///
/// The fraction is truncated rather than rounded so a label never claims
/// more than was actually transferred.
pub fn size_label(bytes: u64) -> String {
    let (unit, suffix) = SIZE_UNITS
        .iter()
        .copied()
        .find(|(unit, _)| bytes >= *unit)
        .unwrap_or((1, "B"));

    let tenths = u128::from(bytes) * 10 / u128::from(unit);
    format!("{}.{} {}", tenths / 10, tenths % 10, suffix)
}

/// Right-justified kilobyte figure used for the graph's axis labels.
pub fn axis_label(bytes: u64) -> String {
    format!("{:>4}", bytes / 1024)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_bytes() {
        assert_eq!(size_label(0), "0.0 B");
    }

    #[test]
    fn unit_boundaries() {
        assert_eq!(size_label(1023), "1023.0 B");
        assert_eq!(size_label(1024), "1.0 KB");
        assert_eq!(size_label(1536), "1.5 KB");
        assert_eq!(size_label(1 << 20), "1.0 MB");
        assert_eq!(size_label(5 * (1 << 30) + (1 << 29)), "5.5 GB");
    }

    #[test]
    fn fraction_is_truncated() {
        // 1.99 KB
        assert_eq!(size_label(2038), "1.9 KB");
    }

    #[test]
    fn largest_value() {
        assert_eq!(size_label(u64::MAX), "15.9 EB");
    }

    #[test]
    fn axis_labels_are_padded() {
        assert_eq!(axis_label(0), "   0");
        assert_eq!(axis_label(45056), "  44");
        assert_eq!(axis_label(1024 * 12345), "12345");
    }
}
