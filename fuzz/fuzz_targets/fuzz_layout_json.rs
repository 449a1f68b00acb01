#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use tilewm_core::geometry::Rect;
use tilewm_layout::testing::LabelRegion;
use tilewm_layout::{LayoutTree, RegionRegistry};

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(dims) = <[u16; 4]>::arbitrary(&mut u) else {
        return;
    };
    let Ok(json) = std::str::from_utf8(u.take_rest()) else {
        return;
    };
    // Fractional origins and extents down to sub-divider slivers.
    let area = Rect::new(
        f32::from(dims[0]) / 64.0 - 256.0,
        f32::from(dims[1]) / 64.0 - 256.0,
        f32::from(dims[2]) / 32.0,
        f32::from(dims[3]) / 32.0,
    );
    let mut registry = RegionRegistry::new();
    registry.register(
        LabelRegion::TAG,
        "Label",
        LabelRegion::create,
        LabelRegion::decode,
    );

    // Decoding may reject the input but must never panic or yield a
    // structurally broken tree.
    let Ok(tree) = LayoutTree::from_json(json, &registry) else {
        return;
    };
    assert!(tree.validate().is_ok(), "decoded tree failed validation");

    let placements = tree.placements(tree.root(), area, 2.0);
    assert!(placements.len() >= tree.leaf_count());
    for p in &placements {
        assert!(p.extent.width >= 0.0 && p.extent.height >= 0.0);
    }
    let _ = tree.hit_test(tree.root(), area, area.center(), 2.0);

    // Re-encoding and decoding preserves the shape.
    let encoded = tree.to_json().expect("encode");
    let again = LayoutTree::from_json(&encoded, &registry).expect("re-decode");
    assert_eq!(again.leaf_count(), tree.leaf_count());
    assert_eq!(again.node_count(), tree.node_count());
});
