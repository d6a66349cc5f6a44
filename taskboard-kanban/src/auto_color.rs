//! Deterministic color assignment for tags created without an explicit color.
//!
//! Maps a tag name onto the fixed palette using a simple hash, so the same
//! name always suggests the same color.

use crate::types::TagColor;

/// Return a deterministic palette color for a tag name.
///
/// Case and surrounding whitespace do not affect the result.
pub fn auto_color(name: &str) -> TagColor {
    let hash = fnv1a(&name.trim().to_lowercase());
    let idx = (hash as usize) % TagColor::PALETTE.len();
    TagColor::PALETTE[idx]
}

/// FNV-1a hash (32-bit) for short strings.
fn fnv1a(s: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in s.bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_color_deterministic() {
        assert_eq!(auto_color("bug"), auto_color("bug"));
        assert_eq!(auto_color("Bug "), auto_color("bug"));
    }

    #[test]
    fn test_palette_coverage() {
        let mut seen = std::collections::HashSet::new();
        for i in 0..100 {
            seen.insert(auto_color(&format!("tag-{}", i)));
        }
        assert!(seen.len() >= 6, "Only hit {} palette entries", seen.len());
    }
}
