use std::collections::HashMap;
use std::fmt;

use log::info;
use phf::phf_map;

use crate::color::*;
use crate::errors::*;
use crate::geometry::*;
use crate::robinson::*;

//////////////////////////////////////////////////////////////////////
// rhombus tiles built from mirror pairs of Robinson triangles

pub type TileId = usize;

#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone, Copy, Hash)]
pub enum TileClass {
    Kite,
    Dart
}

// define a lookup table matching class names to enumeration
pub static TILE_CLASSES: phf::Map<&'static str, TileClass> = phf_map! {
    "kite" => TileClass::Kite,
    "dart" => TileClass::Dart,
};

impl TileClass {

    pub fn from_name(name: &str) -> Result<Self> {
        match TILE_CLASSES.get(name) {
            Some(&class) => Ok(class),
            None => Err(invalid(format!("unrecognized tile class '{}'", name)))
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TileClass::Kite => "kite",
            TileClass::Dart => "dart"
        }
    }

    // class of the rhombus a half-tile belongs to
    pub fn of(ttype: RobinsonType) -> Self {
        match ttype {
            RobinsonType::HalfKite => TileClass::Kite,
            RobinsonType::HalfDart => TileClass::Dart
        }
    }

}

impl fmt::Display for TileClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// join two halves along their shared edge:
//
//   kite: A > B >> C << D < A, axis C >>> A  (halves share CA)
//   dart: A < B << C >> D > A, axis A >>>> C (halves share BC of the first)
pub fn tile_vertices(class: TileClass,
                     half1: &[Point2d; 3],
                     half2: &[Point2d; 3]) -> [Point2d; 4] {
    match class {
        TileClass::Kite => [half1[0], half1[1], half1[2], half2[1]],
        TileClass::Dart => [half1[0], half1[1], half2[0], half1[2]]
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Tile {
    pub id:         TileId,
    pub class:      TileClass,
    pub vertices:   [Point2d; 4],
    pub references: (String, Option<String>), // source triangle, mirror if materialized
    pub fill:       Rgb
}

impl Tile {

    // the two triangles the rhombus splits into along its axis
    pub fn halves(&self) -> [[Point2d; 3]; 2] {
        let [a, b, c, d] = self.vertices;
        match self.class {
            TileClass::Kite => [[a, b, c], [a, d, c]],
            TileClass::Dart => [[a, b, d], [c, b, d]]
        }
    }

    pub fn contains(&self, x: &Point2d) -> bool {
        self.halves().iter().any(|[a, b, c]| point_in_triangle(a, b, c, x))
    }

}

//////////////////////////////////////////////////////////////////////
// the finished tiling: tree plus tile set

#[derive(Debug)]
pub struct DartsAndKites {
    p2:         P2,
    tiles:      Vec<Tile>,
    references: HashMap<NodeId, TileId>  // leaf -> tile holding it
}

impl DartsAndKites {

    pub fn new(p2: P2) -> Self {
        Self::with_colors(p2, DEFAULT_KITE_COLOR, DEFAULT_DART_COLOR)
    }

    // pair every leaf with its mirror, building each rhombus once
    pub fn with_colors(p2: P2, kite_color: Rgb, dart_color: Rgb) -> Self {

        let mut tiles = Vec::new();
        let mut references = HashMap::new();

        for tidx in p2.leaves() {

            let tri = p2.node(tidx);
            let mirror = tri.mirror();

            // avoid duplication: only process a tile when finding the ccw half
            if mirror.is_some() && !tri.is_ccw() {
                continue;
            }

            // a mirror outside the window is stood in for by (B, C, A)
            let (opposite, opposite_id) = match mirror {
                Some(midx) => {
                    let m = p2.node(midx);
                    (m.points(), Some(m.id.clone()))
                }
                None => ([tri.b, tri.c, tri.a], None)
            };

            let class = TileClass::of(tri.ttype);
            let id = tiles.len();

            debug_assert!(!references.contains_key(&tidx));
            references.insert(tidx, id);

            if let Some(midx) = mirror {
                debug_assert!(!references.contains_key(&midx));
                references.insert(midx, id);
            }

            tiles.push(Tile {
                id: id,
                class: class,
                vertices: tile_vertices(class, &tri.points(), &opposite),
                references: (tri.id.clone(), opposite_id),
                fill: match class {
                    TileClass::Kite => kite_color,
                    TileClass::Dart => dart_color
                }
            });

        }

        info!("assembled {} tiles ({} kites, {} darts) from {} leaves",
              tiles.len(),
              tiles.iter().filter(|t| t.class == TileClass::Kite).count(),
              tiles.iter().filter(|t| t.class == TileClass::Dart).count(),
              references.len());

        DartsAndKites {
            p2: p2,
            tiles: tiles,
            references: references
        }

    }

    pub fn p2(&self) -> &P2 {
        &self.p2
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id)
    }

    pub fn count(&self, class: TileClass) -> usize {
        self.tiles.iter().filter(|t| t.class == class).count()
    }

    // window the tiling was culled against, or the default viewport
    pub fn window(&self) -> Window {
        self.p2.window().copied().unwrap_or_else(Window::viewport)
    }

    pub fn tile_for_leaf(&self, tidx: NodeId) -> Option<TileId> {
        self.references.get(&tidx).copied()
    }

    pub fn tile_for_triangle(&self, triangle_id: &str) -> Option<TileId> {
        self.p2.get_by_id(triangle_id).and_then(|tidx| self.tile_for_leaf(tidx))
    }

    // tile under point x in tiling coordinates
    pub fn locate_point(&self, x: &Point2d) -> Option<TileId> {
        self.p2.locate(x).and_then(|tidx| self.tile_for_leaf(tidx))
    }

    pub fn tile_at(&self, x: &Point2d) -> Option<&Tile> {
        self.locate_point(x).and_then(|id| self.tile(id))
    }

    // false if there is no such tile
    pub fn set_tile_color(&mut self, id: TileId, color: Rgb) -> bool {
        match self.tiles.get_mut(id) {
            None => false,
            Some(tile) => {
                tile.fill = color;
                true
            }
        }
    }

    // paint the tile under normalized window coordinates (u, v)
    pub fn paint(&mut self, u: f64, v: f64, color: Rgb) -> Option<TileId> {

        let x = self.window().from_normalized(u, v);
        let id = self.locate_point(&x)?;

        self.set_tile_color(id, color);

        Some(id)

    }

    // color under normalized window coordinates, black if no tile
    pub fn color_at(&self, u: f64, v: f64) -> Rgb {
        let x = self.window().from_normalized(u, v);
        self.tile_at(&x).map_or(BLACK, |t| t.fill)
    }

}

//////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {

    use super::*;
    use std::collections::HashSet;
    use approx::assert_abs_diff_eq;

    fn unbounded(levels: usize) -> DartsAndKites {
        DartsAndKites::new(P2::new(levels, None).unwrap())
    }

    fn windowed(levels: usize) -> DartsAndKites {
        DartsAndKites::new(P2::new(levels, Some(Window::viewport())).unwrap())
    }

    #[test]
    fn tile_counts_without_window() {
        let counts: Vec<usize> = (1..=5).map(|l| unbounded(l).tiles().len()).collect();
        assert_eq!(counts, vec![2, 6, 14, 32, 79]);
    }

    #[test]
    fn every_leaf_in_exactly_one_tile() {

        for dnk in &[unbounded(5), windowed(6)] {

            let mut seen = HashSet::new();

            for tile in dnk.tiles() {
                assert!(seen.insert(tile.references.0.clone()));
                if let Some(mirror) = &tile.references.1 {
                    assert!(seen.insert(mirror.clone()));
                }
            }

            let leaves: HashSet<String> = dnk.p2().leaves().into_iter()
                .map(|tidx| dnk.p2().node(tidx).id.clone())
                .collect();

            assert_eq!(seen, leaves);

            for tidx in dnk.p2().leaves() {
                let id = dnk.tile_for_leaf(tidx).unwrap();
                let refs = &dnk.tile(id).unwrap().references;
                let name = &dnk.p2().node(tidx).id;
                assert!(&refs.0 == name || refs.1.as_ref() == Some(name));
            }

        }

    }

    #[test]
    fn tiles_are_built_from_the_ccw_half() {

        let dnk = windowed(6);

        for tile in dnk.tiles() {
            let tidx = dnk.p2().get_by_id(&tile.references.0).unwrap();
            let tri = dnk.p2().node(tidx);
            assert_eq!(tile.class, TileClass::of(tri.ttype));
            if tile.references.1.is_some() {
                assert!(tri.is_ccw());
            }
        }

    }

    #[test]
    fn paired_tiles_cover_both_halves() {

        let dnk = unbounded(5);

        for tile in dnk.tiles() {
            for name in tile.references.1.iter().chain(Some(&tile.references.0)) {
                let tidx = dnk.p2().get_by_id(name).unwrap();
                assert!(tile.contains(&dnk.p2().node(tidx).centroid()),
                        "tile {} misses half {}", tile.id, name);
            }
        }

    }

    #[test]
    fn mirror_is_the_reflected_half() {

        let dnk = unbounded(4);
        let p2 = dnk.p2();

        for tidx in p2.leaves() {
            let tri = p2.node(tidx);
            if let Some(midx) = tri.mirror() {
                let expected = tri.ttype.reflected(&tri.a, &tri.b, &tri.c);
                for (p, q) in expected.iter().zip(p2.node(midx).points().iter()) {
                    assert_abs_diff_eq!((p - q).norm(), 0.0, epsilon = 1e-9);
                }
            }
        }

    }

    #[test]
    fn lone_half_gets_synthetic_mirror() {

        let dnk = windowed(6);

        let lone: Vec<&Tile> = dnk.tiles().iter()
            .filter(|t| t.references.1.is_none())
            .collect();

        assert!(!lone.is_empty());

        for tile in lone {
            let tidx = dnk.p2().get_by_id(&tile.references.0).unwrap();
            let tri = dnk.p2().node(tidx);
            let expected = tile_vertices(tile.class, &tri.points(), &[tri.b, tri.c, tri.a]);
            assert_eq!(tile.vertices, expected);
        }

    }

    #[test]
    fn default_fills_by_class() {

        let dnk = unbounded(3);

        for tile in dnk.tiles() {
            match tile.class {
                TileClass::Kite => assert_eq!(tile.fill, DEFAULT_KITE_COLOR),
                TileClass::Dart => assert_eq!(tile.fill, DEFAULT_DART_COLOR)
            }
        }

        assert_eq!(dnk.count(TileClass::Kite) + dnk.count(TileClass::Dart), dnk.tiles().len());

    }

    #[test]
    fn centroid_lookup_finds_owning_tile() {

        let dnk = windowed(6);

        for tidx in dnk.p2().leaves() {
            let x = dnk.p2().node(tidx).centroid();
            assert_eq!(dnk.locate_point(&x), dnk.tile_for_leaf(tidx));
            assert!(dnk.locate_point(&x).is_some());
        }

        assert_eq!(dnk.locate_point(&Point2d::new(-3.0, -3.0)), None);
        assert_eq!(dnk.tile_for_triangle("0-9-9"), None);

    }

    #[test]
    fn color_mutation_is_idempotent() {

        let mut dnk = windowed(5);
        let red = Rgb::new(255, 0, 0);

        assert!(dnk.set_tile_color(3, red));
        let once = dnk.tiles().to_vec();

        assert!(dnk.set_tile_color(3, red));
        assert_eq!(dnk.tiles(), &once[..]);
        assert_eq!(dnk.tile(3).unwrap().fill, red);

        assert!(!dnk.set_tile_color(dnk.tiles().len(), red));

    }

    #[test]
    fn paint_by_normalized_coordinates() {

        let mut dnk = windowed(6);
        let green = Rgb::new(0, 128, 0);

        let id = dnk.paint(0.37, 0.41, green).unwrap();
        assert_eq!(dnk.tile(id).unwrap().fill, green);
        assert_eq!(dnk.color_at(0.37, 0.41), green);

        // far outside the tiling
        assert_eq!(dnk.paint(-20.0, -20.0, green), None);
        assert_eq!(dnk.color_at(-20.0, -20.0), BLACK);

    }

    #[test]
    fn class_names() {
        assert_eq!(TileClass::from_name("kite").unwrap(), TileClass::Kite);
        assert_eq!(TileClass::from_name("dart").unwrap(), TileClass::Dart);
        assert!(TileClass::from_name("rhombus").is_err());
        assert_eq!(TileClass::Dart.to_string(), "dart");
    }

}
