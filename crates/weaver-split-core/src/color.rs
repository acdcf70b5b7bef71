//! Color helpers for theme palettes.
//!
//! Colors are packed RGBA `u32` (`0xRRGGBBAA`).

/// Convert packed RGBA to a CSS `rgba()` string.
pub fn rgba_u32_to_css(color: u32) -> String {
    let a = (color & 0xFF) as f32 / 255.0;
    rgba_u32_to_css_alpha(color, a)
}

/// Convert packed RGBA to a CSS `rgba()` string, overriding the alpha.
pub fn rgba_u32_to_css_alpha(color: u32, alpha: f32) -> String {
    let r = (color >> 24) & 0xFF;
    let g = (color >> 16) & 0xFF;
    let b = (color >> 8) & 0xFF;
    format!("rgba({}, {}, {}, {})", r, g, b, alpha)
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into packed RGBA.
pub fn parse_hex_color(value: &str) -> Option<u32> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let expanded: String = hex.chars().flat_map(|c| [c, c]).collect();
            u32::from_str_radix(&expanded, 16).ok().map(|rgb| (rgb << 8) | 0xFF)
        }
        6 => u32::from_str_radix(hex, 16).ok().map(|rgb| (rgb << 8) | 0xFF),
        8 => u32::from_str_radix(hex, 16).ok(),
        _ => None,
    }
}
