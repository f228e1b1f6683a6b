//! Procedural demo textures, as straight-alpha RGBA8 rows top to bottom.

pub struct Image {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Image {
    fn from_fn(width: u32, height: u32, mut pixel: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&pixel(x, y));
            }
        }
        Self { width, height, rgba }
    }
}

/// White one-texel cell borders on black, `cell` texels per cell.
pub fn grid(size: u32, cell: u32) -> Image {
    let cell = cell.max(2);
    Image::from_fn(size, size, |x, y| {
        let (cx, cy) = (x % cell, y % cell);
        let border = cx == 0 || cy == 0 || cx == cell - 1 || cy == cell - 1;
        let v = if border { 0xFF } else { 0x00 };
        [v, v, v, 0xFF]
    })
}

/// Mottled grass with a darker 16-texel checker.
pub fn ground(size: u32) -> Image {
    Image::from_fn(size, size, |x, y| {
        let n = (hash(x, y) % 24) as u8;
        let checker = ((x / 16) + (y / 16)) % 2 == 0;
        let base: [u8; 3] = if checker { [74, 140, 58] } else { [62, 122, 48] };
        [base[0] + n / 2, base[1] + n, base[2] + n / 3, 0xFF]
    })
}

/// 16×24 figure centred on a 24×24 transparent canvas, feet on the bottom row.
pub fn character() -> Image {
    const ROWS: [&str; 24] = [
        "................",
        "......hhhh......",
        ".....hhhhhh.....",
        ".....hssssh.....",
        ".....sesses.....",
        ".....ssssss.....",
        "......ssss......",
        ".......ss.......",
        "....bbbbbbbb....",
        "...bbbbbbbbbb...",
        "..sbbbbbbbbbbs..",
        "..sbbbbbbbbbbs..",
        "..s.bbbbbbbb.s..",
        "....bbbbbbbb....",
        "....pppppppp....",
        "....pppppppp....",
        "....ppp..ppp....",
        "....ppp..ppp....",
        "....ppp..ppp....",
        "....ppp..ppp....",
        "....ppp..ppp....",
        "....ppp..ppp....",
        "...kkkk..kkkk...",
        "...kkkk..kkkk...",
    ];

    // Square canvas: the sprite sits centred with 4 empty columns each side.
    const PAD: u32 = 4;

    Image::from_fn(24, 24, |x, y| {
        let c = x
            .checked_sub(PAD)
            .and_then(|x| ROWS[y as usize].as_bytes().get(x as usize))
            .copied()
            .unwrap_or(b'.');
        match c {
            b'h' => [92, 58, 30, 0xFF],
            b's' => [238, 196, 160, 0xFF],
            b'e' => [20, 20, 40, 0xFF],
            b'b' => [200, 40, 48, 0xFF],
            b'p' => [40, 60, 140, 0xFF],
            b'k' => [30, 24, 20, 0xFF],
            _ => [0, 0, 0, 0],
        }
    })
}

fn hash(x: u32, y: u32) -> u32 {
    let mut h = x.wrapping_mul(0x9E37_79B1) ^ y.wrapping_mul(0x85EB_CA77);
    h ^= h >> 15;
    h = h.wrapping_mul(0xC2B2_AE3D);
    h ^ (h >> 13)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_have_rgba_per_texel() {
        for img in [grid(512, 64), ground(64), character()] {
            assert_eq!(img.rgba.len(), (img.width * img.height * 4) as usize);
        }
    }

    #[test]
    fn grid_cells_have_borders_and_empty_insides() {
        let img = grid(128, 64);
        let at = |x: u32, y: u32| img.rgba[((y * img.width + x) * 4) as usize];
        assert_eq!(at(0, 10), 0xFF);
        assert_eq!(at(63, 10), 0xFF);
        assert_eq!(at(64, 10), 0xFF);
        assert_eq!(at(10, 10), 0x00);
    }

    #[test]
    fn character_background_is_transparent() {
        let img = character();
        assert_eq!(img.rgba[3], 0);
        let feet = ((23 * img.width + 8) * 4 + 3) as usize;
        assert_eq!(img.rgba[feet], 0xFF);
    }

    #[test]
    fn character_is_square_with_empty_margins() {
        let img = character();
        assert_eq!(img.width, img.height);
        let alpha = |x: u32, y: u32| img.rgba[((y * img.width + x) * 4 + 3) as usize];
        for y in 0..img.height {
            for x in (0..4).chain(20..24) {
                assert_eq!(alpha(x, y), 0, "texel ({x}, {y})");
            }
        }
    }
}
