// bunch of standard library stuff
use std::path::Path;

#[macro_use]
extern crate error_chain;

use log::{LevelFilter, Log, Metadata, Record};

use p2tiles::errors::*;
use p2tiles::pattern::PatternSpec;
use p2tiles::robinson::P2;
use p2tiles::tiles::{DartsAndKites, TileClass};

//////////////////////////////////////////////////////////////////////
// minimal logger writing library messages to stderr

struct StderrLogger;

impl Log for StderrLogger {

    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:}] {:}", record.level(), record.args());
        }
    }

    fn flush(&self) {}

}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(level: LevelFilter) -> Result<()> {

    log::set_logger(&LOGGER).map_err(|e| e.to_string())?;
    log::set_max_level(level);

    Ok(())

}

//////////////////////////////////////////////////////////////////////

fn run() -> Result<()> {

    let args: Vec<String> = std::env::args().collect();

    if args.len() != 2 {
        eprintln!("usage: {:?} PATTERNFILE", args[0]);
        std::process::exit(1);
    }

    let ps = PatternSpec::from_file(Path::new(&args[1]))?;

    init_logging(ps.verbose.unwrap_or(LevelFilter::Warn))?;

    let window = ps.window_or_default();

    let p2 = P2::new(ps.depth, Some(window))?;

    let mut dnk = DartsAndKites::with_colors(p2,
                                             ps.kite_color_or_default(),
                                             ps.dart_color_or_default());

    println!("got {:} triangles ({:} leaves) at depth {:}",
             dnk.p2().len(), dnk.p2().leaves().len(), dnk.p2().levels());

    println!("got {:} tiles ({:} kites, {:} darts) in window ({:}, {:}) - ({:}, {:})",
             dnk.tiles().len(),
             dnk.count(TileClass::Kite),
             dnk.count(TileClass::Dart),
             window.ul.x, window.ul.y, window.lr.x, window.lr.y);

    println!();

    for x in &ps.locates {

        match dnk.p2().locate(x) {
            None => println!("locate ({:}, {:}): no tile", x.x, x.y),
            Some(tidx) => {
                let tri = dnk.p2().node(tidx);
                let tile = dnk.tile_for_leaf(tidx).and_then(|id| dnk.tile(id));
                match tile {
                    None => println!("locate ({:}, {:}): triangle {:} has no tile", x.x, x.y, tri.id),
                    Some(tile) => println!("locate ({:}, {:}): tile {:} ({:}, {:}) via triangle {:}",
                                           x.x, x.y, tile.id, tile.class, tile.fill, tri.id)
                }
            }
        }

    }

    for paint in &ps.paints {

        match dnk.paint(paint.u, paint.v, paint.color) {
            None => println!("paint ({:}, {:}): missed", paint.u, paint.v),
            Some(id) => println!("paint ({:}, {:}): tile {:} is now {:}",
                                 paint.u, paint.v, id, paint.color)
        }

    }

    if !ps.locates.is_empty() || !ps.paints.is_empty() {
        println!();
    }

    for tile in dnk.tiles() {

        let points: Vec<String> = tile.vertices.iter()
            .map(|p| format!("{:.6},{:.6}", p.x, p.y))
            .collect();

        println!("tile {:} {:} {:} {:}", tile.id, tile.class, tile.fill, points.join(" "));

    }

    Ok(())

}

quick_main!(run);
