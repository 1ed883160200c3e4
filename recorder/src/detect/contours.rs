use image::GrayImage;

/// A pixel position on a contour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// The outer boundary of one foreground component, as a closed polygon through
/// the centres of its boundary pixels.
#[derive(Debug, Clone)]
pub struct Contour {
    pub points: Vec<Point>,
}

impl Contour {
    /// Enclosed polygon area (shoelace formula). Single pixels and one-pixel
    /// wide lines enclose nothing and report 0.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let twice: i64 = (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64
            })
            .sum();
        twice.abs() as f64 / 2.0
    }
}

// Moore neighbourhood, clockwise on screen (y grows downwards), starting west.
const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
];

/// Extract the external contours of a binary mask.
///
/// Foreground is any non-zero pixel, grouped with 8-connectivity. Only the
/// outermost boundary of each component is returned: components sitting inside
/// a hole of another component are skipped, as are the holes themselves.
/// Contours come out in raster order of each component's top-left pixel.
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    let grid = Grid::new(mask);
    let outside = grid.outside_background();
    let mut visited = vec![false; grid.len()];
    let mut contours = Vec::new();

    for y in 0..grid.height {
        for x in 0..grid.width {
            if !grid.is_on(x, y) || visited[grid.index(x, y)] {
                continue;
            }
            if grid.fill_component(x, y, &mut visited, &outside) {
                contours.push(Contour {
                    points: grid.trace(Point { x, y }),
                });
            }
        }
    }
    contours
}

struct Grid<'a> {
    mask: &'a GrayImage,
    width: i32,
    height: i32,
}

impl<'a> Grid<'a> {
    fn new(mask: &'a GrayImage) -> Self {
        Self {
            mask,
            width: mask.width() as i32,
            height: mask.height() as i32,
        }
    }

    fn len(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    fn index(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    fn is_on(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.mask.get_pixel(x as u32, y as u32).0[0] != 0
    }

    fn on_border(&self, x: i32, y: i32) -> bool {
        x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1
    }

    /// Background pixels 4-connected to the image border.
    fn outside_background(&self) -> Vec<bool> {
        let mut outside = vec![false; self.len()];
        let mut stack = Vec::new();

        for y in 0..self.height {
            for x in 0..self.width {
                if self.on_border(x, y) && !self.is_on(x, y) {
                    outside[self.index(x, y)] = true;
                    stack.push((x, y));
                }
            }
        }

        while let Some((x, y)) = stack.pop() {
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let (nx, ny) = (x + dx, y + dy);
                if self.in_bounds(nx, ny) && !self.is_on(nx, ny) {
                    let idx = self.index(nx, ny);
                    if !outside[idx] {
                        outside[idx] = true;
                        stack.push((nx, ny));
                    }
                }
            }
        }
        outside
    }

    /// Mark the 8-connected component containing `(x, y)` as visited.
    /// Returns whether the component touches the outside background.
    fn fill_component(&self, x: i32, y: i32, visited: &mut [bool], outside: &[bool]) -> bool {
        let mut external = false;
        let mut stack = vec![(x, y)];
        visited[self.index(x, y)] = true;

        while let Some((cx, cy)) = stack.pop() {
            if self.on_border(cx, cy) {
                external = true;
            }
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let (nx, ny) = (cx + dx, cy + dy);
                if self.in_bounds(nx, ny) && outside[self.index(nx, ny)] {
                    external = true;
                }
            }
            for (dx, dy) in NEIGHBOURS {
                let (nx, ny) = (cx + dx, cy + dy);
                if self.is_on(nx, ny) {
                    let idx = self.index(nx, ny);
                    if !visited[idx] {
                        visited[idx] = true;
                        stack.push((nx, ny));
                    }
                }
            }
        }
        external
    }

    /// Moore-neighbour boundary trace starting at the component's top-left
    /// pixel. Stops once the walk leaves `start` the same way it first did.
    fn trace(&self, start: Point) -> Vec<Point> {
        let mut points = vec![start];
        let mut current = start;
        // West of the top-left pixel is always background.
        let mut backtrack = 0usize;
        let mut first_step: Option<Point> = None;
        let max_steps = 4 * self.len() + 8;

        while points.len() <= max_steps {
            let next = (1..=8).map(|i| (backtrack + i) % 8).find_map(|dir| {
                let (dx, dy) = NEIGHBOURS[dir];
                let candidate = Point {
                    x: current.x + dx,
                    y: current.y + dy,
                };
                self.is_on(candidate.x, candidate.y)
                    .then_some((candidate, dir))
            });
            let Some((next, dir)) = next else {
                // isolated pixel
                break;
            };

            if current == start {
                match first_step {
                    None => first_step = Some(next),
                    Some(first) if first == next => break,
                    Some(_) => {}
                }
            }

            let (bx, by) = NEIGHBOURS[(dir + 7) % 8];
            let relative = (current.x + bx - next.x, current.y + by - next.y);
            backtrack = NEIGHBOURS
                .iter()
                .position(|&d| d == relative)
                .unwrap_or(0);

            current = next;
            points.push(current);
        }

        if points.len() > 1 && points.last() == Some(&start) {
            points.pop();
        }
        points
    }
}
