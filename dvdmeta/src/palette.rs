//! Subtitle palettes.
//!
//! DVD program chains store their 16 subtitle colors as `0x00YYCrCb`
//! words, while VobSub `*.idx` files store them as RGB hex triples.

use image::Rgb;
use nom::{
    bytes::complete::take_while_m_n,
    character::complete::{char, space0},
    combinator::{all_consuming, map, map_res},
    multi::separated_list1,
    sequence::tuple,
    IResult,
};

use crate::errors::IdxError;

/// The 16-color palette used by the subtitles.
pub type Palette = [Rgb<u8>; 16];

/// Convert a DVD palette entry (`0x00YYCrCb`) to RGB using the ITU-R
/// BT.601 coefficients.
pub fn ycbcr_to_rgb(entry: u32) -> Rgb<u8> {
    let y = f32::from((entry >> 16) as u8);
    let cr = f32::from((entry >> 8) as u8) - 128.0;
    let cb = f32::from(entry as u8) - 128.0;
    let clamp = |v: f32| v.round().max(0.0).min(255.0) as u8;
    Rgb([
        clamp(y + 1.402 * cr),
        clamp(y - 0.344_136 * cb - 0.714_136 * cr),
        clamp(y + 1.772 * cb),
    ])
}

/// Convert a whole DVD palette to RGB.
pub fn palette_from_ycbcr(entries: &[u32; 16]) -> Palette {
    let mut palette = [Rgb([0, 0, 0]); 16];
    for (color, &entry) in palette.iter_mut().zip(entries.iter()) {
        *color = ycbcr_to_rgb(entry);
    }
    palette
}

/// Format a palette the way `*.idx` files store it.
pub fn format_palette(palette: &Palette) -> String {
    palette
        .iter()
        .map(|Rgb([r, g, b])| format!("{:02x}{:02x}{:02x}", r, g, b))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a single hexadecimal byte.
fn hex_u8(input: &str) -> IResult<&str, u8> {
    map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()), |hex| {
        u8::from_str_radix(hex, 16)
    })(input)
}

/// Parse a 3-byte hexadecimal RGB color.
fn rgb(input: &str) -> IResult<&str, Rgb<u8>> {
    map(tuple((hex_u8, hex_u8, hex_u8)), |(r, g, b)| Rgb([r, g, b]))(input)
}

fn palette(input: &str) -> IResult<&str, Palette> {
    map_res(
        separated_list1(tuple((char(','), space0)), rgb),
        <[Rgb<u8>; 16]>::try_from,
    )(input)
}

/// Parse the value of a `palette:` setting.
pub fn parse_palette(value: &str) -> Result<Palette, IdxError> {
    all_consuming(palette)(value.trim())
        .map(|(_, palette)| palette)
        .map_err(|_| IdxError::InvalidPalette {
            value: value.to_owned(),
        })
}

#[test]
fn parse_rgb() {
    assert_eq!(rgb("1234ab"), Ok(("", Rgb([0x12, 0x34, 0xab]))));
    assert!(rgb("12x4ab").is_err());
}

#[cfg(test)]
const EXAMPLE: &str = "\
000000, f0f0f0, cccccc, 999999, 3333fa, 1111bb, fa3333, bb1111, \
33fa33, 11bb11, fafa33, bbbb11, fa33fa, bb11bb, 33fafa, 11bbbb";

#[test]
fn parse_and_format_palette() {
    let palette = parse_palette(EXAMPLE).unwrap();
    assert_eq!(palette[0], Rgb([0x00, 0x00, 0x00]));
    assert_eq!(palette[4], Rgb([0x33, 0x33, 0xfa]));
    assert_eq!(palette[15], Rgb([0x11, 0xbb, 0xbb]));
    assert_eq!(format_palette(&palette), EXAMPLE);

    // Some tools leave out the spaces.
    let compact = EXAMPLE.replace(", ", ",");
    assert_eq!(parse_palette(&compact).unwrap(), palette);
}

#[test]
fn palettes_need_16_colors() {
    assert!(matches!(
        parse_palette("000000, ffffff"),
        Err(IdxError::InvalidPalette { .. })
    ));
    let seventeen = format!("{}, 000000", EXAMPLE);
    assert!(parse_palette(&seventeen).is_err());
    assert!(parse_palette(&format!("{}x", EXAMPLE)).is_err());
}

#[test]
fn converts_ycbcr() {
    // Grays have no chroma.
    assert_eq!(ycbcr_to_rgb(0x0010_8080), Rgb([16, 16, 16]));
    assert_eq!(ycbcr_to_rgb(0x00eb_8080), Rgb([235, 235, 235]));
    // Red, as stored on typical discs.
    assert_eq!(ycbcr_to_rgb(0x0051_f05a), Rgb([238, 14, 14]));
    // Out-of-gamut values clamp.
    assert_eq!(ycbcr_to_rgb(0x00ff_ff00), Rgb([255, 208, 28]));

    let mut entries = [0x0010_8080; 16];
    entries[1] = 0x00eb_8080;
    let palette = palette_from_ycbcr(&entries);
    assert_eq!(palette[0], Rgb([16, 16, 16]));
    assert_eq!(palette[1], Rgb([235, 235, 235]));
}
