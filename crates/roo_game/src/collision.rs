//! Axis-aligned bounding-box tests between one entity and a sprite list.
//!
//! Resolution is effect-free: callers receive the indices of the overlapping
//! entities and decide what to kill or score.
//!
//! Intervals are open. Two boxes that only share an edge do NOT overlap, so a
//! player resting exactly on a platform top stays put while a 1-unit probe
//! below it still reports support.

use crate::entity::EntityList;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Aabb {
    pub fn left(&self) -> f32 {
        self.center_x - self.half_w
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.half_w
    }

    pub fn bottom(&self) -> f32 {
        self.center_y - self.half_h
    }

    pub fn top(&self) -> f32 {
        self.center_y + self.half_h
    }

    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            center_x: self.center_x + dx,
            center_y: self.center_y + dy,
            ..*self
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.right() <= other.left()
            || self.left() >= other.right()
            || self.top() <= other.bottom()
            || self.bottom() >= other.top())
    }
}

/// Indices of the live entities in `list` whose boxes overlap `query`.
pub fn collide_with_list(query: &Aabb, list: &EntityList) -> Vec<usize> {
    list.iter()
        .enumerate()
        .filter(|(_, e)| e.is_alive() && query.overlaps(&e.aabb()))
        .map(|(i, _)| i)
        .collect()
}

pub fn collides_with_any(query: &Aabb, list: &EntityList) -> bool {
    list.iter()
        .any(|e| e.is_alive() && query.overlaps(&e.aabb()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, EntityKind};

    fn boxed(x: f32, y: f32, hw: f32, hh: f32) -> Aabb {
        Aabb {
            center_x: x,
            center_y: y,
            half_w: hw,
            half_h: hh,
        }
    }

    fn tile(kind: EntityKind, x: f32, y: f32) -> Entity {
        Entity::new(kind, x, y, 32.0, 32.0, "tile.png")
    }

    #[test]
    fn overlap_is_symmetric() {
        let samples = [
            boxed(0.0, 0.0, 10.0, 10.0),
            boxed(15.0, 0.0, 5.0, 5.0),
            boxed(20.0, 0.0, 10.0, 10.0),
            boxed(0.0, 19.9, 3.0, 10.0),
            boxed(-40.0, -40.0, 1.0, 1.0),
            boxed(5.0, 5.0, 100.0, 0.5),
        ];
        for a in &samples {
            for b in &samples {
                assert_eq!(a.overlaps(b), b.overlaps(a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let platform = boxed(0.0, 0.0, 32.0, 32.0);
        let resting = boxed(0.0, 32.0 + 40.0, 24.0, 40.0);
        assert!(!resting.overlaps(&platform));
        assert!(resting.translated(0.0, -1.0).overlaps(&platform));

        let beside = boxed(64.0, 0.0, 32.0, 32.0);
        assert!(!beside.overlaps(&platform));
    }

    #[test]
    fn contained_box_overlaps() {
        let outer = boxed(0.0, 0.0, 50.0, 50.0);
        let inner = boxed(10.0, -10.0, 2.0, 2.0);
        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn empty_list_yields_no_hits() {
        let list = EntityList::new(EntityKind::Coin);
        assert!(collide_with_list(&boxed(0.0, 0.0, 10.0, 10.0), &list).is_empty());
        assert!(!collides_with_any(&boxed(0.0, 0.0, 10.0, 10.0), &list));
    }

    #[test]
    fn returns_indices_of_overlapping_entities_only() {
        let mut list = EntityList::new(EntityKind::Coin);
        list.push(tile(EntityKind::Coin, 0.0, 0.0));
        list.push(tile(EntityKind::Coin, 500.0, 0.0));
        list.push(tile(EntityKind::Coin, 40.0, 0.0));

        let hits = collide_with_list(&boxed(20.0, 0.0, 10.0, 10.0), &list);
        assert_eq!(hits, vec![0, 2]);
    }

    #[test]
    fn dead_entities_are_never_candidates() {
        let mut list = EntityList::new(EntityKind::Ice);
        list.push(tile(EntityKind::Ice, 0.0, 0.0));
        list.kill(0);

        let query = boxed(0.0, 0.0, 10.0, 10.0);
        assert!(collide_with_list(&query, &list).is_empty());
        assert!(!collides_with_any(&query, &list));
    }
}
