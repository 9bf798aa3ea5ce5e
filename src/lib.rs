//! Penrose P2 (kites and darts) tilings by Robinson triangle substitution.
//!
//! A half-kite is subdivided level by level, culling triangles that fall
//! outside a fixed window, and the surviving leaves are paired with their
//! mirror images into rhombus tiles that can be located and recolored.
//!
//! - [`geometry`]: points, orientation and containment tests, windows.
//! - [`robinson`]: the substitution tree, neighbor propagation, point location.
//! - [`tiles`]: kite and dart tiles assembled from mirror pairs.
//! - [`color`]: tile fill colors.
//! - [`pattern`]: pattern files driving the command-line tool.

#[macro_use]
extern crate error_chain;

pub mod errors;
pub mod geometry;
pub mod robinson;
pub mod tiles;
pub mod color;
pub mod pattern;

use crate::errors::*;
use crate::geometry::Window;
use crate::robinson::P2;
use crate::tiles::DartsAndKites;

/// Build a tiling `levels` substitutions deep, culled against `window`,
/// and assemble its tiles with the default colors.
pub fn build_tiling(levels: usize, window: Window) -> Result<DartsAndKites> {

    let p2 = P2::new(levels, Some(window))
        .chain_err(|| format!("while building a tiling {} levels deep", levels))?;

    Ok(DartsAndKites::new(p2))

}
