use std::fmt;
use std::str::FromStr;

use phf::phf_map;

use crate::errors::*;

//////////////////////////////////////////////////////////////////////
// tile fill colors

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r: r, g: g, b: b }
    }
}

pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);
pub const DEFAULT_KITE_COLOR: Rgb = Rgb::new(0x00, 0x00, 0xaa);
pub const DEFAULT_DART_COLOR: Rgb = Rgb::new(0xff, 0xaa, 0x00);

// define a lookup table matching color names to values
static NAMED_COLORS: phf::Map<&'static str, Rgb> = phf_map! {
    "black" => Rgb::new(0x00, 0x00, 0x00),
    "white" => Rgb::new(0xff, 0xff, 0xff),
    "gray" => Rgb::new(0x80, 0x80, 0x80),
    "red" => Rgb::new(0xff, 0x00, 0x00),
    "green" => Rgb::new(0x00, 0x80, 0x00),
    "blue" => Rgb::new(0x00, 0x00, 0xff),
    "cyan" => Rgb::new(0x00, 0xff, 0xff),
    "magenta" => Rgb::new(0xff, 0x00, 0xff),
    "yellow" => Rgb::new(0xff, 0xff, 0x00),
    "orange" => Rgb::new(0xff, 0xa5, 0x00),
};

impl FromStr for Rgb {

    type Err = Error;

    // "#rrggbb" or a name from NAMED_COLORS
    fn from_str(s: &str) -> Result<Self> {

        if let Some(&rgb) = NAMED_COLORS.get(s) {
            return Ok(rgb);
        }

        let hex = match s.strip_prefix('#') {
            Some(hex) if hex.len() == 6 && hex.is_ascii() => hex,
            _ => {
                let mut names: Vec<&str> = NAMED_COLORS.keys().copied().collect();
                names.sort();
                bail!(ErrorKind::InvalidArgument(format!(
                    "color \"{}\" is neither #rrggbb nor one of: {}", s, names.join(", "))));
            }
        };

        let channel = |i: usize| u8::from_str_radix(&hex[i..i+2], 16);

        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))

    }

}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn parses_hex_and_names() {
        assert_eq!("#ffaa00".parse::<Rgb>().unwrap(), DEFAULT_DART_COLOR);
        assert_eq!("#0000AA".parse::<Rgb>().unwrap(), DEFAULT_KITE_COLOR);
        assert_eq!("cyan".parse::<Rgb>().unwrap(), Rgb::new(0, 255, 255));
    }

    #[test]
    fn rejects_garbage() {
        assert!("ffaa00".parse::<Rgb>().is_err());
        assert!("#ffaa0".parse::<Rgb>().is_err());
        assert!("#ggaa00".parse::<Rgb>().is_err());
        assert!("chartreuse".parse::<Rgb>().is_err());
    }

    #[test]
    fn displays_as_hex() {
        assert_eq!(DEFAULT_DART_COLOR.to_string(), "#ffaa00");
        assert_eq!(BLACK.to_string(), "#000000");
    }

}
