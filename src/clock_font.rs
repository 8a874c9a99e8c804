/*
 *  clock_font.rs
 *
 *  Tixel - time, in pixels
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */
//! Clock glyphs. Bitmaps are row-major, 8 rows per glyph, with the pixel
//! for column `c` in bit `7 - c` of the row byte. Glyphs shorter than 8
//! rows are stored bottom-aligned. Wide digits are used when seconds are
//! hidden; narrow ones when the seconds block needs the columns; small
//! 3x5 digits draw the seconds themselves.

use serde::{Deserialize, Serialize};

pub const GLYPH_HEIGHT: usize = 8;

/// Character code for the blank separator: same footprint as ':' with
/// every pixel off, used for the separator blink.
pub const BLANK_SEPARATOR: char = '\t';

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Block,
    Slim,
    Custom,
}

/// Which slot of the display a character lands in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GlyphRole {
    Wide,
    Narrow,
    Small,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GlyphStyle {
    pub family: FontFamily,
    pub role: GlyphRole,
    pub bold: bool,
    pub compact: bool,
}

/// One renderable glyph: bitmap plus the padding that surrounds it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Glyph {
    pub rows: [u8; GLYPH_HEIGHT],
    pub width: u8,
    pub left_pad: u8,
    pub right_pad: u8,
}

impl Glyph {
    pub const EMPTY: Glyph = Glyph {
        rows: [0; GLYPH_HEIGHT],
        width: 0,
        left_pad: 0,
        right_pad: 0,
    };

    pub fn footprint(&self) -> u8 {
        self.left_pad + self.width + self.right_pad
    }
}

// 6x8 digits, the "block" face.
const DIGITS_6X8: [[u8; 8]; 10] = [
    [0x78, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0xCC, 0x78],
    [0x30, 0x70, 0x30, 0x30, 0x30, 0x30, 0x30, 0xFC],
    [0x78, 0xCC, 0x0C, 0x18, 0x30, 0x60, 0xC0, 0xFC],
    [0x78, 0xCC, 0x0C, 0x38, 0x0C, 0x0C, 0xCC, 0x78],
    [0x18, 0x38, 0x78, 0xD8, 0xFC, 0x18, 0x18, 0x18],
    [0xFC, 0xC0, 0xC0, 0xF8, 0x0C, 0x0C, 0xCC, 0x78],
    [0x78, 0xCC, 0xC0, 0xF8, 0xCC, 0xCC, 0xCC, 0x78],
    [0xFC, 0x0C, 0x0C, 0x18, 0x30, 0x30, 0x30, 0x30],
    [0x78, 0xCC, 0xCC, 0x78, 0xCC, 0xCC, 0xCC, 0x78],
    [0x78, 0xCC, 0xCC, 0x7C, 0x0C, 0x0C, 0xCC, 0x78],
];

// 5x8 digits: narrow slot of the block face, and both slots of the slim
// face.
const DIGITS_5X8: [[u8; 8]; 10] = [
    [0x70, 0x88, 0x88, 0x88, 0x88, 0x88, 0x88, 0x70],
    [0x20, 0x60, 0x20, 0x20, 0x20, 0x20, 0x20, 0x70],
    [0x70, 0x88, 0x08, 0x10, 0x20, 0x40, 0x80, 0xF8],
    [0x70, 0x88, 0x08, 0x30, 0x08, 0x08, 0x88, 0x70],
    [0x10, 0x30, 0x50, 0x90, 0xF8, 0x10, 0x10, 0x10],
    [0xF8, 0x80, 0x80, 0xF0, 0x08, 0x08, 0x88, 0x70],
    [0x70, 0x88, 0x80, 0xF0, 0x88, 0x88, 0x88, 0x70],
    [0xF8, 0x08, 0x08, 0x10, 0x20, 0x20, 0x20, 0x20],
    [0x70, 0x88, 0x88, 0x70, 0x88, 0x88, 0x88, 0x70],
    [0x70, 0x88, 0x88, 0x78, 0x08, 0x08, 0x88, 0x70],
];

// 3x5 digits for the seconds block, bottom-aligned.
const DIGITS_3X5: [[u8; 8]; 10] = [
    [0, 0, 0, 0xE0, 0xA0, 0xA0, 0xA0, 0xE0],
    [0, 0, 0, 0x40, 0xC0, 0x40, 0x40, 0xE0],
    [0, 0, 0, 0xE0, 0x20, 0xE0, 0x80, 0xE0],
    [0, 0, 0, 0xE0, 0x20, 0xE0, 0x20, 0xE0],
    [0, 0, 0, 0xA0, 0xA0, 0xE0, 0x20, 0x20],
    [0, 0, 0, 0xE0, 0x80, 0xE0, 0x20, 0xE0],
    [0, 0, 0, 0xE0, 0x80, 0xE0, 0xA0, 0xE0],
    [0, 0, 0, 0xE0, 0x20, 0x20, 0x40, 0x40],
    [0, 0, 0, 0xE0, 0xA0, 0xE0, 0xA0, 0xE0],
    [0, 0, 0, 0xE0, 0xA0, 0xE0, 0x20, 0xE0],
];

const COLON_WIDE: [u8; 8] = [0, 0, 0xC0, 0xC0, 0, 0xC0, 0xC0, 0];
const COLON_NARROW: [u8; 8] = [0, 0, 0x80, 0x80, 0, 0x80, 0x80, 0];
const DASH_WIDE: [u8; 8] = [0, 0, 0, 0xF0, 0xF0, 0, 0, 0];
const DASH_NARROW: [u8; 8] = [0, 0, 0, 0xE0, 0xE0, 0, 0, 0];
const DOT: [u8; 8] = [0, 0, 0, 0, 0, 0, 0xC0, 0xC0];
const BLANK: [u8; 8] = [0; 8];

/// The runtime-editable font slot: digit bitmaps for the wide and narrow
/// roles. Swapped in whole, outside the render tick, so the compositor
/// only ever sees a complete table.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CustomFont {
    pub wide: [[u8; 8]; 10],
    pub narrow: [[u8; 8]; 10],
}

impl Default for CustomFont {
    fn default() -> Self {
        Self {
            wide: DIGITS_6X8,
            narrow: DIGITS_5X8,
        }
    }
}

/// All font data the compositor draws from.
#[derive(Clone, Default)]
pub struct FontBook {
    custom: CustomFont,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_custom(&mut self, font: CustomFont) {
        self.custom = font;
    }

    pub fn custom(&self) -> &CustomFont {
        &self.custom
    }

    /// Total over the supported character set; anything else yields the
    /// zero-width glyph, which the layout skips without drawing.
    pub fn lookup(&self, ch: char, style: GlyphStyle) -> Glyph {
        let glyph = match ch {
            '0'..='9' => {
                let d = (ch as u8 - b'0') as usize;
                let (rows, width) = self.digit(d, style);
                Glyph {
                    rows,
                    width,
                    left_pad: 0,
                    right_pad: if style.compact { 0 } else { 1 },
                }
            }
            ':' | BLANK_SEPARATOR => {
                let blank = ch == BLANK_SEPARATOR;
                match style.role {
                    GlyphRole::Wide => Glyph {
                        rows: if blank { BLANK } else { COLON_WIDE },
                        width: 2,
                        left_pad: 1,
                        right_pad: 1,
                    },
                    GlyphRole::Narrow | GlyphRole::Small => Glyph {
                        rows: if blank { BLANK } else { COLON_NARROW },
                        width: 1,
                        left_pad: 0,
                        right_pad: 0,
                    },
                }
            }
            '-' => match style.role {
                GlyphRole::Wide => Glyph {
                    rows: DASH_WIDE,
                    width: 4,
                    left_pad: 0,
                    right_pad: 1,
                },
                GlyphRole::Narrow | GlyphRole::Small => Glyph {
                    rows: DASH_NARROW,
                    width: 3,
                    left_pad: 0,
                    right_pad: 1,
                },
            },
            ' ' => {
                let (_, width) = self.digit(0, style);
                Glyph {
                    rows: BLANK,
                    width,
                    left_pad: 0,
                    right_pad: if style.compact { 0 } else { 1 },
                }
            }
            '.' => Glyph {
                rows: DOT,
                width: 2,
                left_pad: 0,
                right_pad: 1,
            },
            _ => return Glyph::EMPTY,
        };
        if style.bold && glyph.width > 0 {
            // thicken strokes one column rightward, confined to the
            // glyph's own columns
            let mask: u8 = if glyph.width >= 8 {
                0xFF
            } else {
                !(0xFF >> glyph.width)
            };
            Glyph {
                rows: glyph.rows.map(|r| (r | (r >> 1)) & mask),
                ..glyph
            }
        } else {
            glyph
        }
    }

    fn digit(&self, d: usize, style: GlyphStyle) -> ([u8; 8], u8) {
        match style.role {
            GlyphRole::Small => (DIGITS_3X5[d], 3),
            GlyphRole::Wide => match style.family {
                FontFamily::Block => (DIGITS_6X8[d], 6),
                FontFamily::Slim => (DIGITS_5X8[d], 5),
                FontFamily::Custom => (self.custom.wide[d], 6),
            },
            GlyphRole::Narrow => match style.family {
                FontFamily::Block | FontFamily::Slim => (DIGITS_5X8[d], 5),
                FontFamily::Custom => (self.custom.narrow[d], 5),
            },
        }
    }
}
