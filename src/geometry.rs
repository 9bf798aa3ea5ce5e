use crate::errors::*;

//////////////////////////////////////////////////////////////////////
// pull in some types from nalgebra

pub type Vec2d = nalgebra::Vector2<f64>;
pub type Point2d = nalgebra::geometry::Point2<f64>;

//////////////////////////////////////////////////////////////////////
// define some constants for Penrose tiles

pub const PSI: f64 = 1.618033988749895;
pub const PSI_INV: f64 = 0.6180339887498949;

// height of a half-kite with short edge 1 (apex to the long edges' midpoint)
pub const HALF_KITE_HEIGHT: f64 = 1.5388417685876268;
pub const HALF_DART_HEIGHT: f64 = 0.5877852522924731;

// foot of the perpendicular from the free vertex onto the mirror edge,
// as a fraction along the edge measured from C:
//
//   half-kite: B projected onto CA -> 1 - 1/(2 psi^2)
//   half-dart: A projected onto CB -> psi^2 / 2  (lies past B)
pub const HALF_KITE_REFLECTION_RATIO: f64 = 0.8090169943749475;
pub const HALF_DART_REFLECTION_RATIO: f64 = 1.3090169943749475;

// default viewport over the root half-kite (y grows downward)
pub const VIEWPORT_UL: [f64; 2] = [0.0338, 0.2541];
pub const VIEWPORT_LR: [f64; 2] = [0.6896, 0.7459];

//////////////////////////////////////////////////////////////////////
// z component of the 2D cross product u x v

pub fn cross(u: &Vec2d, v: &Vec2d) -> f64 {
    u.x * v.y - u.y * v.x
}

// signed area (times 2) of triangle abc; positive when b -> c turns left
pub fn orientation(a: &Point2d, b: &Point2d, c: &Point2d) -> f64 {
    cross(&(b - a), &(c - a))
}

// strict counter-clockwise predicate, collinear counts as not ccw
pub fn ccw(a: &Point2d, b: &Point2d, c: &Point2d) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

// does segment ab cross segment cd? shared endpoints are not special
pub fn segments_intersect(a: &Point2d, b: &Point2d,
                          c: &Point2d, d: &Point2d) -> bool {
    ccw(a, c, d) != ccw(b, c, d) && ccw(a, b, c) != ccw(a, b, d)
}

// strict containment: points on an edge are outside
pub fn point_in_triangle(a: &Point2d, b: &Point2d, c: &Point2d,
                         x: &Point2d) -> bool {

    let sides = [
        cross(&(b - a), &(x - a)),
        cross(&(c - b), &(x - b)),
        cross(&(a - c), &(x - c)),
    ];

    sides.iter().all(|&s| s < 0.0) || sides.iter().all(|&s| s > 0.0)

}

pub fn centroid(a: &Point2d, b: &Point2d, c: &Point2d) -> Point2d {
    Point2d::from((a.coords + b.coords + c.coords) / 3.0)
}

// mirror image of p through the point foot
pub fn reflect_through(p: &Point2d, foot: &Point2d) -> Point2d {
    foot + (foot - p)
}

//////////////////////////////////////////////////////////////////////
// axis-aligned window with upper-left ul and lower-right lr, in a
// y-down frame so ul has the smaller coordinates

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Window {
    pub ul: Point2d,
    pub lr: Point2d,
}

impl Window {

    pub fn new(ul: Point2d, lr: Point2d) -> Result<Self> {

        if !(ul.x < lr.x && ul.y < lr.y) {
            return Err(invalid(format!(
                "window corners ({}, {}) and ({}, {}) don't span an area",
                ul.x, ul.y, lr.x, lr.y)));
        }

        Ok(Window { ul: ul, lr: lr })

    }

    // the fixed viewport used by default
    pub fn viewport() -> Self {
        Window {
            ul: Point2d::new(VIEWPORT_UL[0], VIEWPORT_UL[1]),
            lr: Point2d::new(VIEWPORT_LR[0], VIEWPORT_LR[1]),
        }
    }

    pub fn ur(&self) -> Point2d {
        Point2d::new(self.lr.x, self.ul.y)
    }

    pub fn ll(&self) -> Point2d {
        Point2d::new(self.ul.x, self.lr.y)
    }

    pub fn dims(&self) -> Vec2d {
        self.lr - self.ul
    }

    // strictly inside
    pub fn contains_point(&self, p: &Point2d) -> bool {
        p.x > self.ul.x && p.y > self.ul.y && p.x < self.lr.x && p.y < self.lr.y
    }

    // map normalized (0..1, 0..1) viewport coordinates into the window
    pub fn from_normalized(&self, u: f64, v: f64) -> Point2d {
        self.ul + self.dims().component_mul(&Vec2d::new(u, v))
    }

}

//////////////////////////////////////////////////////////////////////
// relative position of a triangle and a window

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum TriRectPosition {
    Within,     // all three vertices strictly inside
    VertexIn,   // one or two vertices strictly inside
    Intersects, // no vertex inside but some edges cross
    Enveloped,  // window lies inside the triangle
    Disjoint    // no shared region
}

pub fn triangle_rectangle_position(a: &Point2d, b: &Point2d, c: &Point2d,
                                   window: &Window) -> TriRectPosition {

    let within = [a, b, c].iter().filter(|v| window.contains_point(**v)).count();

    if within == 3 {
        return TriRectPosition::Within;
    }

    if within > 0 {
        return TriRectPosition::VertexIn;
    }

    let ul = window.ul;
    let lr = window.lr;
    let ur = window.ur();
    let ll = window.ll();

    // vvv  no triangle vertices are within  vvv

    for &(t1, t2) in &[(a, b), (b, c), (c, a)] {
        for &(r1, r2) in &[(&ul, &ll), (&ll, &lr), (&lr, &ur), (&ur, &ul)] {
            if segments_intersect(t1, t2, r1, r2) {
                return TriRectPosition::Intersects;
            }
        }
    }

    // without crossings the window is either entirely inside or entirely out
    for r in &[ul, ll, lr, ur] {
        if !point_in_triangle(a, b, c, r) {
            return TriRectPosition::Disjoint;
        }
    }

    TriRectPosition::Enveloped

}

//////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {

    use super::*;
    use approx::assert_abs_diff_eq;

    fn pt(x: f64, y: f64) -> Point2d {
        Point2d::new(x, y)
    }

    fn unit_window() -> Window {
        Window::new(pt(-1.0, -1.0), pt(1.0, 1.0)).unwrap()
    }

    #[test]
    fn golden_ratio_constants_agree() {
        assert_abs_diff_eq!(PSI, (5f64.sqrt() + 1.0) / 2.0, epsilon = 1e-15);
        assert_abs_diff_eq!(PSI_INV, PSI - 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(HALF_KITE_HEIGHT, (PSI * PSI - 0.25).sqrt(), epsilon = 1e-15);
        assert_abs_diff_eq!(HALF_DART_HEIGHT, (1.0 - 0.25 * PSI * PSI).sqrt(), epsilon = 1e-15);
        assert_abs_diff_eq!(HALF_KITE_REFLECTION_RATIO, 1.0 - 0.5 / (PSI * PSI), epsilon = 1e-15);
        assert_abs_diff_eq!(HALF_DART_REFLECTION_RATIO, 0.5 * PSI * PSI, epsilon = 1e-15);
    }

    #[test]
    fn orientation_sign() {
        assert!(orientation(&pt(0.0, 0.0), &pt(1.0, 0.0), &pt(0.0, 1.0)) > 0.0);
        assert!(ccw(&pt(0.0, 0.0), &pt(1.0, 0.0), &pt(0.0, 1.0)));
        assert!(!ccw(&pt(0.0, 0.0), &pt(0.0, 1.0), &pt(1.0, 0.0)));
        // collinear is not ccw
        assert!(!ccw(&pt(0.0, 0.0), &pt(1.0, 1.0), &pt(2.0, 2.0)));
    }

    #[test]
    fn crossing_segments() {
        assert!(segments_intersect(&pt(-1.0, 0.0), &pt(1.0, 0.0),
                                   &pt(0.0, -1.0), &pt(0.0, 1.0)));
        assert!(!segments_intersect(&pt(-1.0, 0.0), &pt(1.0, 0.0),
                                    &pt(2.0, -1.0), &pt(2.0, 1.0)));
    }

    #[test]
    fn point_containment() {
        let (a, b, c) = (pt(0.0, 0.0), pt(0.0, 1.0), pt(1.0, 0.5));
        assert!(point_in_triangle(&a, &b, &c, &pt(0.2, 0.4)));
        assert!(!point_in_triangle(&a, &b, &c, &pt(0.9, 0.9)));
        // vertex order doesn't matter
        assert!(point_in_triangle(&c, &b, &a, &pt(0.2, 0.4)));
        // on an edge is outside
        assert!(!point_in_triangle(&a, &b, &c, &pt(0.0, 0.5)));
    }

    #[test]
    fn enveloping_triangle() {
        let pos = triangle_rectangle_position(&pt(-2.0, -10.0), &pt(-2.0, 2.0),
                                              &pt(10.0, 2.0), &unit_window());
        assert_eq!(pos, TriRectPosition::Enveloped);
    }

    #[test]
    fn classification_precedence() {

        let w = unit_window();

        let pos = |a: (f64, f64), b: (f64, f64), c: (f64, f64)| {
            triangle_rectangle_position(&pt(a.0, a.1), &pt(b.0, b.1), &pt(c.0, c.1), &w)
        };

        assert_eq!(pos((-0.5, -0.5), (0.5, -0.5), (0.0, 0.5)), TriRectPosition::Within);
        assert_eq!(pos((0.0, 0.0), (5.0, 0.0), (0.0, 5.0)), TriRectPosition::VertexIn);
        assert_eq!(pos((-5.0, 0.0), (5.0, 0.5), (0.0, -5.0)), TriRectPosition::Intersects);
        assert_eq!(pos((5.0, 5.0), (6.0, 5.0), (5.0, 6.0)), TriRectPosition::Disjoint);

    }

    #[test]
    fn window_validation_and_mapping() {

        assert!(Window::new(pt(1.0, 0.0), pt(0.0, 1.0)).is_err());
        assert!(Window::new(pt(0.0, 0.0), pt(1.0, 0.0)).is_err());

        let w = Window::viewport();
        let p = w.from_normalized(0.5, 0.5);
        assert_abs_diff_eq!(p.x, 0.5 * (VIEWPORT_UL[0] + VIEWPORT_LR[0]), epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 0.5 * (VIEWPORT_UL[1] + VIEWPORT_LR[1]), epsilon = 1e-12);
        assert_eq!(w.from_normalized(0.0, 0.0), w.ul);

    }

    #[test]
    fn reflection_and_centroid() {
        let r = reflect_through(&pt(1.0, 2.0), &pt(0.0, 0.0));
        assert_abs_diff_eq!(r.x, -1.0);
        assert_abs_diff_eq!(r.y, -2.0);
        let g = centroid(&pt(0.0, 0.0), &pt(3.0, 0.0), &pt(0.0, 3.0));
        assert_abs_diff_eq!(g.x, 1.0);
        assert_abs_diff_eq!(g.y, 1.0);
    }

}
