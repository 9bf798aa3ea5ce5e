use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use log::LevelFilter;
use phf::phf_map;

use crate::color::*;
use crate::errors::*;
use crate::geometry::*;

//////////////////////////////////////////////////////////////////////
// pattern files: one keyword per line. a '#' at the start of a line or
// followed by whitespace starts a comment, so #rrggbb colors survive
//
//   depth 8
//   window 0.0338 0.2541 0.6896 0.7459
//   kite_color #0000aa
//   dart_color orange
//   paint 0.5 0.25 red       # normalized window coordinates
//   locate 0.3 0.5           # tiling coordinates
//   verbose debug

pub const MAX_DEPTH: usize = 16;

// define a lookup table matching verbosity strings to log levels
static VERBOSITY: phf::Map<&'static str, LevelFilter> = phf_map! {
    "off" => LevelFilter::Off,
    "error" => LevelFilter::Error,
    "warn" => LevelFilter::Warn,
    "info" => LevelFilter::Info,
    "debug" => LevelFilter::Debug,
    "trace" => LevelFilter::Trace,
};

// recolor the tile under normalized window coordinates (u, v)
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct PaintRequest {
    pub u: f64,
    pub v: f64,
    pub color: Rgb
}

// everything a pattern file can ask for
#[derive(Debug, PartialEq, Clone)]
pub struct PatternSpec {
    pub depth: usize,                  // subdivision depth
    pub window: Option<Window>,        // culling window, viewport if unset
    pub kite_color: Option<Rgb>,       // default kite fill
    pub dart_color: Option<Rgb>,       // default dart fill
    pub verbose: Option<LevelFilter>,  // log level for the command line tool
    pub paints: Vec<PaintRequest>,     // applied in order
    pub locates: Vec<Point2d>          // points to report tiles for
}

//////////////////////////////////////////////////////////////////////
// keyword arguments: each keyword takes a fixed list of typed values

fn take_arg<'a, T, I>(args: &mut I, name: &str) -> Result<T>
where I: Iterator<Item = &'a str>,
      T: FromStr,
      T::Err: fmt::Display
{
    let token = match args.next() {
        Some(token) => token,
        None => return Err(invalid(format!("expected a value for {}", name)))
    };

    token.parse::<T>()
        .map_err(|e| invalid(format!("bad {} \"{}\": {}", name, token, e)))
}

fn no_more_args<'a>(mut args: impl Iterator<Item = &'a str>) -> Result<()> {
    match args.next() {
        Some(extra) => Err(invalid(format!("unexpected trailing value \"{}\"", extra))),
        None => Ok(())
    }
}

// keyword_args!(rest, x: f64, y: f64) parses exactly two floats
macro_rules! keyword_args {
    ($args:expr, $($name:ident : $type:ty),+) => ({
        let mut it = $args.iter().copied();
        let values = ($({
            let $name: $type = take_arg(&mut it, stringify!($name))?;
            $name
        }),+);
        no_more_args(it)?;
        values
    })
}

// a field may be given at most once per pattern file
macro_rules! merge_once {
    ($dst:ident, $src:ident, $field:ident, $unset:expr) => (
        if $src.$field != $unset {
            if $dst.$field != $unset {
                bail!("{} given twice", stringify!($field));
            }
            $dst.$field = $src.$field;
        }
    )
}

//////////////////////////////////////////////////////////////////////

fn strip_comment(line: &str) -> &str {

    for (pos, _) in line.match_indices('#') {
        let next = line[pos + 1..].chars().next();
        if pos == 0 || next.map_or(true, |c| c.is_whitespace()) {
            return &line[0..pos];
        }
    }

    line

}

impl PatternSpec {

    pub fn new() -> PatternSpec {
        PatternSpec {
            depth: usize::MAX,
            window: None,
            kite_color: None,
            dart_color: None,
            verbose: None,
            paints: Vec::new(),
            locates: Vec::new()
        }
    }

    // culling window, falling back to the default viewport
    pub fn window_or_default(&self) -> Window {
        self.window.unwrap_or_else(Window::viewport)
    }

    pub fn kite_color_or_default(&self) -> Rgb {
        self.kite_color.unwrap_or(DEFAULT_KITE_COLOR)
    }

    pub fn dart_color_or_default(&self) -> Rgb {
        self.dart_color.unwrap_or(DEFAULT_DART_COLOR)
    }

    fn merge(&mut self, other: PatternSpec) -> Result<()> {

        merge_once!(self, other, depth, usize::MAX);
        merge_once!(self, other, window, None);
        merge_once!(self, other, kite_color, None);
        merge_once!(self, other, dart_color, None);
        merge_once!(self, other, verbose, None);

        self.paints.extend(other.paints);
        self.locates.extend(other.locates);

        Ok(())

    }

    // a pattern holding just what one keyword line sets
    fn from_keyword(keyword: &str, rest: &[&str]) -> Result<PatternSpec> {

        let mut line = PatternSpec::new();

        match keyword {

            "depth" => {

                let depth = keyword_args!(rest, depth: usize);

                if depth < 1 || depth > MAX_DEPTH {
                    bail!(ErrorKind::InvalidArgument(format!(
                        "depth must be between 1 and {}, got {}", MAX_DEPTH, depth)));
                }

                line.depth = depth;

            }

            "window" => {

                let (x0, y0, x1, y1) = keyword_args!(rest, x0: f64, y0: f64, x1: f64, y1: f64);

                line.window = Some(Window::new(Point2d::new(x0, y0),
                                               Point2d::new(x1, y1))?);

            }

            "kite_color" => {
                line.kite_color = Some(keyword_args!(rest, color: Rgb));
            }

            "dart_color" => {
                line.dart_color = Some(keyword_args!(rest, color: Rgb));
            }

            "paint" => {

                let (u, v, color) = keyword_args!(rest, u: f64, v: f64, color: Rgb);

                line.paints.push(PaintRequest { u: u, v: v, color: color });

            }

            "locate" => {

                let (x, y) = keyword_args!(rest, x: f64, y: f64);

                line.locates.push(Point2d::new(x, y));

            }

            "verbose" => {

                let level = keyword_args!(rest, level: String);

                match VERBOSITY.get(level.as_str()) {
                    Some(&filter) => line.verbose = Some(filter),
                    None => {
                        let mut names: Vec<&str> = VERBOSITY.keys().copied().collect();
                        names.sort();
                        bail!(invalid(format!("unknown verbosity \"{}\", expected one of {}",
                                              level, names.join(", "))));
                    }
                }

            }

            _ => bail!(invalid(format!("unknown keyword \"{}\"", keyword)))

        }

        Ok(line)

    }

    fn apply_line(&mut self, line: &str) -> Result<()> {

        let tokens: Vec<&str> = strip_comment(line.trim()).split_whitespace().collect();

        match tokens.split_first() {
            None => Ok(()),
            Some((keyword, rest)) => {
                let line = Self::from_keyword(keyword, rest)?;
                self.merge(line)
            }
        }

    }

    pub fn parse(filename: &str, istr: &mut impl BufRead) -> Result<PatternSpec> {

        let mut ps = PatternSpec::new();

        for (i, line) in istr.lines().enumerate() {

            let lineno = i + 1;

            let line = line.chain_err(|| format!("{}:{}: could not read line", filename, lineno))?;

            ps.apply_line(&line).chain_err(|| format!("{}:{}", filename, lineno))?;

        }

        if ps.depth == usize::MAX {
            bail!("{}: no depth given", filename);
        }

        Ok(ps)

    }

    pub fn from_file(filename: &Path) -> Result<PatternSpec> {

        let f = File::open(filename).chain_err(|| format!("opening {}", filename.display()))?;
        let mut reader = BufReader::new(f);

        Self::parse(&filename.to_string_lossy(), &mut reader)

    }

}

impl Default for PatternSpec {
    fn default() -> Self {
        Self::new()
    }
}

//////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {

    use super::*;

    fn parse_str(text: &str) -> Result<PatternSpec> {
        PatternSpec::parse("test.pattern", &mut text.as_bytes())
    }

    #[test]
    fn full_pattern() {

        let ps = parse_str("
            # a comment line
            depth 7
            window 0.1 0.2 0.6 0.8   # trailing comment
            kite_color gray
            dart_color #ffcc00
            paint 0.5 0.5 red
            paint 0.1 0.9 #00ff00
            locate 0.3 0.5
            verbose debug
        ").unwrap();

        assert_eq!(ps.depth, 7);
        assert_eq!(ps.window_or_default(),
                   Window::new(Point2d::new(0.1, 0.2), Point2d::new(0.6, 0.8)).unwrap());
        assert_eq!(ps.kite_color, Some(Rgb::new(0x80, 0x80, 0x80)));
        assert_eq!(ps.dart_color, Some(Rgb::new(0xff, 0xcc, 0x00)));
        assert_eq!(ps.paints.len(), 2);
        assert_eq!(ps.paints[1], PaintRequest { u: 0.1, v: 0.9, color: Rgb::new(0, 255, 0) });
        assert_eq!(ps.locates, vec![Point2d::new(0.3, 0.5)]);
        assert_eq!(ps.verbose, Some(LevelFilter::Debug));

    }

    #[test]
    fn comments_spare_hex_colors() {
        assert_eq!(strip_comment("# whole line"), "");
        assert_eq!(strip_comment("paint 0.5 0.5 #ff0000 # red"), "paint 0.5 0.5 #ff0000 ");
        assert_eq!(strip_comment("depth 3 #"), "depth 3 ");
        assert_eq!(strip_comment("kite_color #0000aa"), "kite_color #0000aa");
    }

    #[test]
    fn defaults_fill_in() {
        let ps = parse_str("depth 3\n").unwrap();
        assert_eq!(ps.window_or_default(), Window::viewport());
        assert_eq!(ps.kite_color_or_default(), DEFAULT_KITE_COLOR);
        assert_eq!(ps.dart_color_or_default(), DEFAULT_DART_COLOR);
        assert!(ps.paints.is_empty());
    }

    #[test]
    fn depth_is_required() {
        let err = parse_str("window 0 0 1 1\n").unwrap_err();
        assert!(err.to_string().contains("depth"));
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        assert!(parse_str("depth 3\ndepth 4\n").is_err());
        assert!(parse_str("depth 3\nkite_color red\nkite_color blue\n").is_err());
    }

    #[test]
    fn argument_errors_name_the_problem() {

        let mentions = |text: &str, needle: &str| {
            let err = parse_str(text).unwrap_err();
            err.iter().any(|e| e.to_string().contains(needle))
        };

        assert!(mentions("depth 3 4\n", "unexpected trailing value \"4\""));
        assert!(mentions("depth 3\nlocate 0.5\n", "expected a value for y"));
        assert!(mentions("depth 3\nwindow 0 0 one 1\n", "bad x1 \"one\""));
        assert!(mentions("depth 3\nverbose loud\n", "debug, error, info, off, trace, warn"));
        assert!(mentions("depth 3\ndepth 4\n", "depth given twice"));
        assert!(mentions("depth 3\nzoom 2\n", "unknown keyword \"zoom\""));

    }

    #[test]
    fn bad_lines_are_rejected() {
        assert!(parse_str("depth 0\n").is_err());
        assert!(parse_str("depth 99\n").is_err());
        assert!(parse_str("depth three\n").is_err());
        assert!(parse_str("depth 3 4\n").is_err());
        assert!(parse_str("depth 3\nwindow 1 1 0 0\n").is_err());
        assert!(parse_str("depth 3\npaint 0.5 0.5 notacolor\n").is_err());
        assert!(parse_str("depth 3\nverbose loud\n").is_err());
        assert!(parse_str("depth 3\nzoom 2\n").is_err());
    }

}
