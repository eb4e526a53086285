//! ビットマップフォントと描画関数

use super::canvas::{Canvas, Pixel};

pub const GLYPH_WIDTH: usize = 5;
pub const GLYPH_HEIGHT: usize = 7;
/// 文字送り（文字幅5 + 間隔1）
pub const GLYPH_ADVANCE: usize = GLYPH_WIDTH + 1;

/// 5x7 ビットマップフォント（0-9）
const DIGITS: [[u8; 7]; 10] = [
    [
        0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110,
    ], // 0
    [
        0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110,
    ], // 1
    [
        0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111,
    ], // 2
    [
        0b01110, 0b10001, 0b00001, 0b00110, 0b00001, 0b10001, 0b01110,
    ], // 3
    [
        0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010,
    ], // 4
    [
        0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110,
    ], // 5
    [
        0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110,
    ], // 6
    [
        0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000,
    ], // 7
    [
        0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110,
    ], // 8
    [
        0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100,
    ], // 9
];

/// 目盛りラベルと軸名に使う記号
fn symbol(c: char) -> Option<[u8; 7]> {
    let glyph = match c {
        '.' => [0, 0, 0, 0, 0, 0b01100, 0b01100],
        '-' => [0, 0, 0, 0b11111, 0, 0, 0],
        '+' => [0, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0],
        'e' => [0, 0, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
        'X' => [
            0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001,
        ],
        'Y' => [
            0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100,
        ],
        'Z' => [
            0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111,
        ],
        _ => return None,
    };
    Some(glyph)
}

fn glyph(c: char) -> Option<[u8; 7]> {
    match c.to_digit(10) {
        Some(d) => Some(DIGITS[d as usize]),
        None => symbol(c),
    }
}

/// 1文字を描画（未定義の文字は空白扱い）
pub fn draw_char(canvas: &mut Canvas, x: i64, y: i64, c: char, color: Pixel) {
    if let Some(bits_rows) = glyph(c) {
        for (row, &bits) in bits_rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 1 {
                    canvas.set(x + col as i64, y + row as i64, color);
                }
            }
        }
    }
}

/// 文字列を描画
pub fn draw_text(canvas: &mut Canvas, x: i64, y: i64, text: &str, color: Pixel) {
    let mut cursor_x = x;
    for c in text.chars() {
        draw_char(canvas, cursor_x, y, c, color);
        cursor_x += GLYPH_ADVANCE as i64;
    }
}

/// 描画幅（ピクセル）
pub fn text_width(text: &str) -> usize {
    text.chars().count() * GLYPH_ADVANCE
}

/// 目盛りラベル用の数値表記（桁が大きい・小さい値は指数表記）
pub fn format_tick(v: f64) -> String {
    let a = v.abs();
    if a == 0.0 {
        "0".to_string()
    } else if !(1e-2..1e4).contains(&a) {
        format!("{:.1e}", v)
    } else if a >= 100.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_pixels(canvas: &Canvas) -> usize {
        (0..canvas.height())
            .flat_map(|y| (0..canvas.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y).map_or(false, |p| p[3] > 0.0))
            .count()
    }

    #[test]
    fn test_draw_digit() {
        let mut canvas = Canvas::new(8, 8);
        draw_char(&mut canvas, 0, 0, '1', [1.0; 4]);
        // '1' の縦棒
        for row in 0..6 {
            assert_eq!(canvas.pixel(2, row), Some([1.0; 4]));
        }
        assert_eq!(lit_pixels(&canvas), 10);
    }

    #[test]
    fn test_unknown_char_draws_nothing() {
        let mut canvas = Canvas::new(8, 8);
        draw_text(&mut canvas, 0, 0, "?!", [1.0; 4]);
        assert_eq!(lit_pixels(&canvas), 0);
    }

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("1.5e-3"), 36);
        assert_eq!(text_width(""), 0);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(0.5), "0.50");
        assert_eq!(format_tick(-12.5), "-12.50");
        assert_eq!(format_tick(998.2), "998");
        assert_eq!(format_tick(25000.0), "2.5e4");
        assert_eq!(format_tick(0.001), "1.0e-3");
    }

    #[test]
    fn test_all_tick_chars_have_glyphs() {
        for c in "0123456789.-+eXYZ".chars() {
            assert!(glyph(c).is_some(), "missing glyph for {c}");
        }
    }
}
