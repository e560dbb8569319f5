//! Colours shared by the scene painters.

use image::Rgba;

use crate::clustering::{Label, NOISE_LABEL};

pub const BACKGROUND: Rgba<u8> = Rgba([18, 16, 14, 255]);
pub const FOREGROUND: Rgba<u8> = Rgba([250, 246, 240, 255]);
pub const GRID: Rgba<u8> = Rgba([120, 116, 110, 255]);
pub const NOISE: Rgba<u8> = Rgba([128, 128, 128, 255]);

const CLUSTER_COLORS: [Rgba<u8>; 10] = [
    Rgba([230, 97, 80, 255]),
    Rgba([80, 160, 230, 255]),
    Rgba([110, 200, 120, 255]),
    Rgba([240, 190, 70, 255]),
    Rgba([170, 110, 220, 255]),
    Rgba([60, 200, 200, 255]),
    Rgba([235, 120, 180, 255]),
    Rgba([160, 160, 80, 255]),
    Rgba([240, 140, 60, 255]),
    Rgba([120, 140, 250, 255]),
];

/// Colour for a cluster or class index; wraps around the palette.
pub fn cluster_color(index: usize) -> Rgba<u8> {
    CLUSTER_COLORS[index % CLUSTER_COLORS.len()]
}

/// Colour for a clustering label, grey for noise.
pub fn label_color(label: Label) -> Rgba<u8> {
    if label == NOISE_LABEL || label < 0 {
        return NOISE;
    }
    cluster_color(label as usize)
}

pub fn with_alpha(color: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], alpha])
}

/// Source-over blend of `top` onto an opaque `base`.
pub fn blend(base: Rgba<u8>, top: Rgba<u8>) -> Rgba<u8> {
    let alpha = f32::from(top[3]) / 255.0;
    let mix = |b: u8, t: u8| -> u8 {
        (f32::from(b) * (1.0 - alpha) + f32::from(t) * alpha)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Rgba([
        mix(base[0], top[0]),
        mix(base[1], top[1]),
        mix(base[2], top[2]),
        base[3].max(top[3]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps() {
        assert_eq!(cluster_color(0), cluster_color(10));
        assert_ne!(cluster_color(0), cluster_color(1));
    }

    #[test]
    fn noise_is_grey() {
        assert_eq!(label_color(NOISE_LABEL), NOISE);
        assert_eq!(label_color(2), cluster_color(2));
    }

    #[test]
    fn blend_extremes() {
        let base = Rgba([0, 0, 0, 255]);
        assert_eq!(blend(base, Rgba([200, 100, 50, 255])), Rgba([200, 100, 50, 255]));
        assert_eq!(blend(base, Rgba([200, 100, 50, 0])), base);
    }
}
