use crate::types::Points;

/// Render points with comma thousands separators: 1234567 -> "1,234,567".
pub fn format_points(points: Points) -> String {
    let digits = points.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::format_points;

    #[test]
    fn groups_by_thousands() {
        assert_eq!(format_points(0), "0");
        assert_eq!(format_points(999), "999");
        assert_eq!(format_points(1_000), "1,000");
        assert_eq!(format_points(12_345), "12,345");
        assert_eq!(format_points(1_234_567), "1,234,567");
    }
}
