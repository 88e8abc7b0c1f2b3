//! Nearest-opponent targeting for the drag-to-swap gesture.
//!
//! The front end keeps a registry of each avatar's on-screen rectangle and
//! calls [`find_swap_target`] on every pointer-move tick of a drag, then
//! once more on release. The search is pure and allocation-free so it never
//! has to coordinate with the stores' write path.

use std::collections::HashMap;

use crate::PlayerId;

/// Hit radius for a swap, in layout units. Candidates at or beyond this
/// distance are not targets.
pub const SWAP_RADIUS: f32 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// On-screen bounds of one rendered avatar, reported by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Find the nearest opposite-team player within [`SWAP_RADIUS`] of `point`.
///
/// `own_team` holds the ids on the dragged player's current team; those are
/// never returned. Equidistant candidates resolve to the lexicographically
/// smaller id, so the result is stable and independent of map iteration
/// order.
pub fn find_swap_target<'a>(
    point: Point,
    registry: &'a HashMap<PlayerId, Rect>,
    own_team: &[PlayerId],
) -> Option<&'a str> {
    let mut best: Option<(f32, &str)> = None;

    for (id, rect) in registry {
        if own_team.iter().any(|own| own == id) {
            continue;
        }
        let distance = point.distance_to(rect.center());
        if distance >= SWAP_RADIUS {
            continue;
        }
        let closer = match best {
            None => true,
            Some((best_distance, best_id)) => {
                distance < best_distance || (distance == best_distance && id.as_str() < best_id)
            }
        };
        if closer {
            best = Some((distance, id.as_str()));
        }
    }

    best.map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_of(entries: &[(&str, f32, f32)]) -> HashMap<PlayerId, Rect> {
        // 40x40 avatars whose centers land on the given coordinates.
        entries
            .iter()
            .map(|(id, cx, cy)| (id.to_string(), Rect::new(cx - 20.0, cy - 20.0, 40.0, 40.0)))
            .collect()
    }

    fn own(ids: &[&str]) -> Vec<PlayerId> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_rect_center() {
        let rect = Rect::new(10.0, 20.0, 40.0, 60.0);
        assert_eq!(rect.center(), Point::new(30.0, 50.0));
    }

    #[test]
    fn test_finds_nearest_opponent() {
        let registry =
            registry_of(&[("p1", 0.0, 0.0), ("p2", 50.0, 0.0), ("p3", 30.0, 0.0), ("p4", 100.0, 0.0)]);
        let target = find_swap_target(Point::new(0.0, 0.0), &registry, &own(&["p1", "p2"]));
        assert_eq!(target, Some("p3"));
    }

    #[test]
    fn test_never_returns_own_team() {
        let registry = registry_of(&[("p1", 0.0, 0.0), ("p2", 1.0, 0.0), ("p3", 140.0, 0.0)]);
        let target = find_swap_target(Point::new(0.0, 0.0), &registry, &own(&["p1", "p2"]));
        assert_eq!(target, Some("p3"), "nearer own-team avatars must be skipped");
    }

    #[test]
    fn test_radius_is_exclusive() {
        let registry = registry_of(&[("p3", 150.0, 0.0), ("p4", 149.0, 0.0)]);
        let target = find_swap_target(Point::new(0.0, 0.0), &registry, &own(&["p1", "p2"]));
        assert_eq!(target, Some("p4"), "distance exactly at the radius does not qualify");

        let far = registry_of(&[("p3", 150.0, 0.0), ("p4", 200.0, 0.0)]);
        assert_eq!(find_swap_target(Point::new(0.0, 0.0), &far, &own(&["p1", "p2"])), None);
    }

    #[test]
    fn test_tie_breaks_toward_smaller_id() {
        let registry = registry_of(&[("p4", 60.0, 0.0), ("p3", -60.0, 0.0)]);
        let target = find_swap_target(Point::new(0.0, 0.0), &registry, &own(&["p1", "p2"]));
        assert_eq!(target, Some("p3"));
    }

    #[test]
    fn test_empty_registry_returns_none() {
        let registry = HashMap::new();
        assert_eq!(find_swap_target(Point::new(0.0, 0.0), &registry, &own(&["p1"])), None);
    }

    #[test]
    fn test_diagonal_distance() {
        // Center at (90, 120) is exactly 150 away; (80, 60) is 100 away.
        let registry = registry_of(&[("p3", 90.0, 120.0), ("p4", 80.0, 60.0)]);
        let target = find_swap_target(Point::new(0.0, 0.0), &registry, &own(&["p1", "p2"]));
        assert_eq!(target, Some("p4"));
    }
}
