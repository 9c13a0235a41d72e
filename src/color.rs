use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Configured colours
// ---------------------------------------------------------------------------

/// Parse `#rrggbb` or `#rgb` (the leading `#` is optional).
pub fn parse_hex(s: &str) -> Option<Color32> {
    let rgb: Srgb<u8> = s.trim().parse().ok()?;
    Some(Color32::from_rgb(rgb.red, rgb.green, rgb.blue))
}

/// Opacity of the `step`-th of `steps` traces sharing one colour: starts at 1
/// and fades by `1 / (steps + 1)` per step, so the last one stays visible.
pub fn fade(step: usize, steps: usize) -> f32 {
    1.0 - step as f32 / (steps as f32 + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_codes() {
        assert_eq!(parse_hex("#d62728"), Some(Color32::from_rgb(0xd6, 0x27, 0x28)));
        assert_eq!(parse_hex("1f77b4"), Some(Color32::from_rgb(0x1f, 0x77, 0xb4)));
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#gg0000"), None);
        assert_eq!(parse_hex("#fff"), Some(Color32::WHITE));
    }

    #[test]
    fn palette_has_requested_size() {
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        assert_ne!(colors[0], colors[2]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn fade_never_reaches_zero() {
        assert_eq!(fade(0, 5), 1.0);
        assert!(fade(4, 5) > 0.0);
        assert!(fade(1, 5) < fade(0, 5));
    }
}
