//! Parsing of svg path data and flattening of outlines into polygons.

use nom::branch::alt;
use nom::bytes::complete::take_while;
use nom::character::complete::one_of;
use nom::combinator::map;
use nom::multi::many0;
use nom::number::complete::double;
use nom::sequence::preceded;
use nom::IResult;

use crate::drawing::Matrix;

/// How many straight segments replace a curve when flattening.
pub const CURVE_STEPS: usize = 8;

/// An absolute path segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSeg {
    /// Starts a new subpath.
    MoveTo(f64, f64),

    /// Draws a straight line.
    LineTo(f64, f64),

    /// Draws a cubic bezier curve: two control points and the end point.
    CurveTo(f64, f64, f64, f64, f64, f64),

    /// Closes the current subpath.
    Close,
}

/// A lexical element of path data.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PathToken {
    Command(char),
    Number(f64),
}

fn separator(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_whitespace() || c == ',')(input)
}

fn command(input: &str) -> IResult<&str, PathToken> {
    map(one_of("MmLlHhVvCcSsQqTtAaZz"), PathToken::Command)(input)
}

fn number(input: &str) -> IResult<&str, PathToken> {
    map(double, PathToken::Number)(input)
}

fn tokens(input: &str) -> IResult<&str, Vec<PathToken>> {
    many0(preceded(separator, alt((command, number))))(input)
}

/// Walks through the tokens.
struct Cursor {
    tokens: Vec<PathToken>,
    index: usize,
}

impl Cursor {
    fn peek(&self) -> Option<PathToken> {
        self.tokens.get(self.index).copied()
    }

    fn skip(&mut self) {
        self.index += 1;
    }

    fn number(&mut self) -> Option<f64> {
        match self.peek()? {
            PathToken::Number(n) => {
                self.skip();
                Some(n)
            }
            PathToken::Command(_) => None,
        }
    }

    fn pair(&mut self) -> Option<(f64, f64)> {
        Some((self.number()?, self.number()?))
    }
}

/// Converts quadratic bezier control points into cubic ones.
fn quad_to_cubic(x0: f64, y0: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> (f64, f64, f64, f64) {
    (
        x0 + 2.0 * (x1 - x0) / 3.0,
        y0 + 2.0 * (y1 - y0) / 3.0,
        x2 + 2.0 * (x1 - x2) / 3.0,
        y2 + 2.0 * (y1 - y2) / 3.0,
    )
}

/// Parses svg path data into absolute segments.
///
/// Relative commands are made absolute, `H` and `V` become lines, quadratic curves become cubic
/// ones. Arcs are reduced to a line to their end point. Parsing stops at the first malformed
/// command, keeping what was read so far.
///
/// ```
/// # use mathpro::drawing::path::{parse_path_data, PathSeg};
/// let segs = parse_path_data("M10 10h5v5z");
/// assert_eq!(segs, vec![
///     PathSeg::MoveTo(10.0, 10.0),
///     PathSeg::LineTo(15.0, 10.0),
///     PathSeg::LineTo(15.0, 15.0),
///     PathSeg::Close,
/// ]);
/// ```
pub fn parse_path_data(d: &str) -> Vec<PathSeg> {
    let tokens = match tokens(d) {
        Ok((_, tokens)) => tokens,
        Err(_) => return vec![],
    };

    let mut cursor = Cursor { tokens, index: 0 };
    let mut segs = vec![];
    let mut last_command: Option<char> = None;
    let (mut cur_x, mut cur_y) = (0.0, 0.0);
    let (mut start_x, mut start_y) = (0.0, 0.0);
    let mut last_cubic_ctrl: Option<(f64, f64)> = None;
    let mut last_quad_ctrl: Option<(f64, f64)> = None;

    while let Some(token) = cursor.peek() {
        let command = match token {
            PathToken::Command(c) => {
                cursor.skip();
                c
            }

            // Numbers without a command repeat the previous one, a moveto repeats as a lineto.
            PathToken::Number(_) => match last_command {
                Some('M') => 'L',
                Some('m') => 'l',
                Some(c) if c != 'Z' && c != 'z' => c,
                _ => {
                    cursor.skip();
                    continue;
                }
            },
        };

        let relative = command.is_ascii_lowercase();
        let (dx, dy) = if relative { (cur_x, cur_y) } else { (0.0, 0.0) };

        match command.to_ascii_uppercase() {
            'M' => {
                let Some((x, y)) = cursor.pair() else { break };
                cur_x = x + dx;
                cur_y = y + dy;
                start_x = cur_x;
                start_y = cur_y;
                segs.push(PathSeg::MoveTo(cur_x, cur_y));
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }

            'L' => {
                let Some((x, y)) = cursor.pair() else { break };
                cur_x = x + dx;
                cur_y = y + dy;
                segs.push(PathSeg::LineTo(cur_x, cur_y));
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }

            'H' => {
                let Some(x) = cursor.number() else { break };
                cur_x = x + dx;
                segs.push(PathSeg::LineTo(cur_x, cur_y));
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }

            'V' => {
                let Some(y) = cursor.number() else { break };
                cur_y = y + dy;
                segs.push(PathSeg::LineTo(cur_x, cur_y));
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }

            'C' => {
                let (Some((x1, y1)), Some((x2, y2)), Some((x, y))) =
                    (cursor.pair(), cursor.pair(), cursor.pair())
                else {
                    break;
                };
                let (x1, y1, x2, y2) = (x1 + dx, y1 + dy, x2 + dx, y2 + dy);
                cur_x = x + dx;
                cur_y = y + dy;
                segs.push(PathSeg::CurveTo(x1, y1, x2, y2, cur_x, cur_y));
                last_cubic_ctrl = Some((x2, y2));
                last_quad_ctrl = None;
            }

            'S' => {
                let (Some((x2, y2)), Some((x, y))) = (cursor.pair(), cursor.pair()) else {
                    break;
                };
                let (x1, y1) = match last_cubic_ctrl {
                    Some((px, py)) => (2.0 * cur_x - px, 2.0 * cur_y - py),
                    None => (cur_x, cur_y),
                };
                let (x2, y2) = (x2 + dx, y2 + dy);
                cur_x = x + dx;
                cur_y = y + dy;
                segs.push(PathSeg::CurveTo(x1, y1, x2, y2, cur_x, cur_y));
                last_cubic_ctrl = Some((x2, y2));
                last_quad_ctrl = None;
            }

            'Q' => {
                let (Some((qx, qy)), Some((x, y))) = (cursor.pair(), cursor.pair()) else {
                    break;
                };
                let (qx, qy, x, y) = (qx + dx, qy + dy, x + dx, y + dy);
                let (c1x, c1y, c2x, c2y) = quad_to_cubic(cur_x, cur_y, qx, qy, x, y);
                segs.push(PathSeg::CurveTo(c1x, c1y, c2x, c2y, x, y));
                cur_x = x;
                cur_y = y;
                last_quad_ctrl = Some((qx, qy));
                last_cubic_ctrl = Some((c2x, c2y));
            }

            'T' => {
                let Some((x, y)) = cursor.pair() else { break };
                let (x, y) = (x + dx, y + dy);
                let (qx, qy) = match last_quad_ctrl {
                    Some((px, py)) => (2.0 * cur_x - px, 2.0 * cur_y - py),
                    None => (cur_x, cur_y),
                };
                let (c1x, c1y, c2x, c2y) = quad_to_cubic(cur_x, cur_y, qx, qy, x, y);
                segs.push(PathSeg::CurveTo(c1x, c1y, c2x, c2y, x, y));
                cur_x = x;
                cur_y = y;
                last_quad_ctrl = Some((qx, qy));
                last_cubic_ctrl = Some((c2x, c2y));
            }

            'A' => {
                // rx ry rotation large-arc sweep x y
                let (Some(_), Some(_), Some(_), Some(_), Some(_), Some((x, y))) = (
                    cursor.number(),
                    cursor.number(),
                    cursor.number(),
                    cursor.number(),
                    cursor.number(),
                    cursor.pair(),
                ) else {
                    break;
                };
                cur_x = x + dx;
                cur_y = y + dy;
                segs.push(PathSeg::LineTo(cur_x, cur_y));
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }

            'Z' => {
                segs.push(PathSeg::Close);
                cur_x = start_x;
                cur_y = start_y;
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }

            _ => break,
        }

        last_command = Some(command);
    }

    segs
}

/// A closed polygon, as a list of points.
pub type Polygon = Vec<(f64, f64)>;

/// Flattens segments into closed polygons, transformed by `matrix`.
///
/// Each subpath gives one polygon; polygons with less than three points are dropped since they
/// would not paint anything.
pub fn flatten(segs: &[PathSeg], matrix: &Matrix) -> Vec<Polygon> {
    let mut polygons = vec![];
    let mut current: Vec<(f64, f64)> = vec![];
    let mut pen = (0.0, 0.0);

    let mut finish = |current: &mut Vec<(f64, f64)>| {
        if current.len() >= 3 {
            polygons.push(current.iter().map(|&(x, y)| matrix.apply(x, y)).collect());
        }
        current.clear();
    };

    for seg in segs {
        match *seg {
            PathSeg::MoveTo(x, y) => {
                finish(&mut current);
                current.push((x, y));
                pen = (x, y);
            }

            PathSeg::LineTo(x, y) => {
                if current.is_empty() {
                    current.push(pen);
                }
                current.push((x, y));
                pen = (x, y);
            }

            PathSeg::CurveTo(x1, y1, x2, y2, x, y) => {
                if current.is_empty() {
                    current.push(pen);
                }
                let (x0, y0) = pen;
                for step in 1..=CURVE_STEPS {
                    let t = step as f64 / CURVE_STEPS as f64;
                    let u = 1.0 - t;
                    let px = u * u * u * x0 + 3.0 * u * u * t * x1 + 3.0 * u * t * t * x2 + t * t * t * x;
                    let py = u * u * u * y0 + 3.0 * u * u * t * y1 + 3.0 * u * t * t * y2 + t * t * t * y;
                    current.push((px, py));
                }
                pen = (x, y);
            }

            PathSeg::Close => {
                if let Some(&first) = current.first() {
                    pen = first;
                }
                finish(&mut current);
            }
        }
    }

    finish(&mut current);
    polygons
}

/// Twice the signed area of a polygon, positive when it turns counterclockwise.
fn winding(polygon: &[(f64, f64)]) -> f64 {
    polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .map(|(&(x0, y0), &(x1, y1))| x0 * y1 - x1 * y0)
        .sum()
}

/// Separates the contours of an outline from its counters, the holes of letters like `o`.
///
/// Counters turn the other way round from the largest contour.
pub fn split_counters(polygons: Vec<Polygon>) -> (Vec<Polygon>, Vec<Polygon>) {
    let outer = polygons
        .iter()
        .map(|p| winding(p))
        .fold(0.0, |a: f64, b| if b.abs() > a.abs() { b } else { a });

    polygons
        .into_iter()
        .partition(|p| winding(p) * outer >= 0.0)
}
