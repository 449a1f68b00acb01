#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tilewm_core::geometry::{Axis, Point, Rect};
use tilewm_layout::LayoutTree;
use tilewm_layout::testing::LabelRegion;

#[derive(Debug, Arbitrary)]
enum Op {
    Split { region: u8, vertical: bool },
    Delete { region: u8 },
    Exchange { a: u8, b: u8 },
    Copy { source: u8, destination: u8 },
    Drag { divider: u8, dx: i16, dy: i16 },
    HitTest { x: u16, y: u16 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    divider: u8,
    ops: Vec<Op>,
}

/// Squash arbitrary floats into a finite extent, from slivers narrower than
/// a divider up to a full screen.
fn extent(input: &Input) -> Rect {
    let finite = |v: f32, max: f32| if v.is_finite() { v.abs() % max } else { 0.0 };
    Rect::new(
        finite(input.x, 500.0) - 250.0,
        finite(input.y, 500.0) - 250.0,
        finite(input.width, 2000.0),
        finite(input.height, 2000.0),
    )
}

fuzz_target!(|input: Input| {
    let area = extent(&input);
    let divider = f32::from(input.divider % 8);
    let ops = input.ops;
    let mut tree = LayoutTree::new(LabelRegion::new("root").boxed());

    for op in ops.into_iter().take(256) {
        let regions = tree.regions();
        let pick = |i: u8| regions[usize::from(i) % regions.len()];
        // Rejected operations must leave the tree intact, so results are
        // ignored and the invariants are checked after every step.
        match op {
            Op::Split { region, vertical } => {
                let axis = if vertical { Axis::Vertical } else { Axis::Horizontal };
                let _ = tree.split_region(pick(region), axis, LabelRegion::new("new").boxed());
            }
            Op::Delete { region } => {
                let _ = tree.delete(pick(region));
            }
            Op::Exchange { a, b } => {
                let _ = tree.exchange(pick(a), pick(b));
            }
            Op::Copy { source, destination } => {
                let _ = tree.copy_into(pick(source), pick(destination));
            }
            Op::Drag { divider, dx, dy } => {
                let dividers: Vec<_> = tree
                    .placements(tree.root(), EXTENT, 2.0)
                    .into_iter()
                    .filter(|p| p.target.divider().is_some())
                    .collect();
                if let Some(p) = dividers.get(usize::from(divider) % dividers.len().max(1))
                    && let Some(node) = p.target.divider()
                {
                    let delta = Point::new(f32::from(dx), f32::from(dy));
                    let position = tree
                        .drag_divider(node, delta, p.parent_extent)
                        .expect("divider node");
                    assert!((0.0..=1.0).contains(&position), "position out of range");
                }
            }
            Op::HitTest { x, y } => {
                let point = Point::new(
                    area.x + area.width * f32::from(x) / f32::from(u16::MAX),
                    area.y + area.height * f32::from(y) / f32::from(u16::MAX),
                );
                if let Some(target) = tree.hit_test(tree.root(), area, point, divider)
                    && let Some(region) = target.region()
                {
                    assert!(tree.contains_region(region));
                }
            }
        }
        assert!(tree.validate().is_ok(), "tree invariants broken");
        assert!(tree.leaf_count() >= 1);
    }

    for p in tree.placements(tree.root(), area, divider) {
        assert!(p.extent.width >= 0.0 && p.extent.height >= 0.0);
    }
});
