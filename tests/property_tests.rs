//! Property-based tests for transforms, gating, compensation and persistence

use std::collections::BTreeMap;

use fcsframe::compensation::Compensator;
use fcsframe::frame::{Dimension, Frame};
use fcsframe::gating::{effective_mask, evaluate, Geometry, Subset};
use fcsframe::persist;
use fcsframe::transform::{Logicle, LogicleParams, Transform};
use proptest::prelude::*;

fn logicle() -> Logicle {
    Logicle::new(LogicleParams::default()).unwrap()
}

fn points(n: usize) -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-500.0f64..1500.0, -500.0f64..1500.0), 1..n)
}

fn frame_from(points: &[(f64, f64)]) -> Frame {
    let mut frame = Frame::new(BTreeMap::new(), points.len());
    frame
        .add_dimension(Dimension::new(1, "X", points.iter().map(|p| p.0).collect()))
        .unwrap();
    frame
        .add_dimension(Dimension::new(2, "Y", points.iter().map(|p| p.1).collect()))
        .unwrap();
    frame
}

/// Corners of a rectangle at least one unit wide and tall
fn corners() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (-400.0f64..1000.0, 1.0f64..800.0, -400.0f64..1000.0, 1.0f64..800.0)
        .prop_map(|(x, w, y, h)| (x, y, x + w, y + h))
}

proptest! {
    /// Logicle scale is strictly increasing
    #[test]
    fn test_logicle_monotonic(a in -5_000.0f64..262_144.0, gap in 1e-3f64..1e4) {
        let scale = logicle();
        let b = a + gap * (1.0 + a.abs()) * 1e-3;
        prop_assert!(scale.scale(a) < scale.scale(b), "{} vs {}", a, b);
    }

    /// Inverse undoes the scale across negative, linear and log regions
    #[test]
    fn test_logicle_round_trip(v in -5_000.0f64..262_144.0) {
        let scale = logicle();
        let back = scale.inverse(scale.scale(v));
        prop_assert!((back - v).abs() <= 1e-6 * (1.0 + v.abs()), "{} -> {}", v, back);
    }

    /// A rectangle selects exactly the points inside its inclusive bounds
    #[test]
    fn test_rectangle_membership(pts in points(200), (x0, y0, x1, y1) in corners()) {
        let frame = frame_from(&pts);
        let gate = Subset::new("R", "X", "Y", Geometry::rectangle(x0, y0, x1, y1).unwrap());
        let mask = evaluate(&gate, &frame).unwrap();
        prop_assert_eq!(mask.len(), pts.len());
        for (i, &(x, y)) in pts.iter().enumerate() {
            let inside = x >= x0 && x <= x1 && y >= y0 && y <= y1;
            prop_assert_eq!(mask[i], inside);
        }
    }

    /// A child's effective membership never exceeds its parent's
    #[test]
    fn test_child_within_parent(
        pts in points(200),
        (px0, py0, px1, py1) in corners(),
        (cx0, cy0, cx1, cy1) in corners(),
    ) {
        let mut frame = frame_from(&pts);
        let parent = Subset::new("P", "X", "Y", Geometry::rectangle(px0, py0, px1, py1).unwrap());
        let child = Subset::new("C", "X", "Y", Geometry::rectangle(cx0, cy0, cx1, cy1).unwrap())
            .with_parent(Some(parent.id()));
        let (pid, cid) = (parent.id(), child.id());
        frame.add_subset(parent).unwrap();
        frame.add_subset(child).unwrap();

        let pmask = effective_mask(&frame, pid).unwrap();
        let cmask = effective_mask(&frame, cid).unwrap();
        for i in cmask.iter_ones() {
            prop_assert!(pmask[i]);
        }
    }

    /// Compensating then decompensating restores the observed values
    #[test]
    fn test_compensation_inverse(
        fl1 in prop::collection::vec(-1_000.0f64..100_000.0, 1..50),
        s01 in 0.0f64..0.3,
        s10 in 0.0f64..0.3,
    ) {
        let fl2: Vec<f64> = fl1.iter().rev().map(|v| v * 0.5 + 10.0).collect();
        let mut keywords = BTreeMap::new();
        keywords.insert("$SPILLOVER".to_string(), format!("2,FL1-A,FL2-A,1,{s01},{s10},1"));
        let mut frame = Frame::new(keywords, fl1.len());
        frame.add_dimension(Dimension::new(1, "FL1-A", fl1.clone())).unwrap();
        frame.add_dimension(Dimension::new(2, "FL2-A", fl2.clone())).unwrap();

        let compensator = Compensator::for_frame(&frame).unwrap();
        let restored = compensator
            .decompensate(&compensator.compensate(&frame).unwrap())
            .unwrap();
        for (name, original) in [("FL1-A", &fl1), ("FL2-A", &fl2)] {
            for (a, b) in restored.dimension(name).unwrap().values().iter().zip(original) {
                prop_assert!((a - b).abs() <= 1e-9 * (1.0 + b.abs()), "{}: {} vs {}", name, a, b);
            }
        }
    }

    /// Saved frames load back bit for bit
    #[test]
    fn test_persist_round_trip(
        values in prop::collection::vec(any::<f64>(), 0..64),
        fil in "[a-zA-Z0-9 ._-]{0,24}",
        range in prop::option::of(1.0f64..1e6),
    ) {
        let mut keywords = BTreeMap::new();
        keywords.insert("$FIL".to_string(), fil);
        let mut frame = Frame::new(keywords, values.len());
        frame
            .add_dimension(
                Dimension::new(1, "FL1-A", values.clone())
                    .range(range)
                    .transform(Some(Transform::logicle(262_144.0, 0.5, 4.5, 0.0).unwrap())),
            )
            .unwrap();

        let restored = persist::load(&persist::save(&frame).unwrap()).unwrap();
        prop_assert_eq!(restored.id(), frame.id());
        prop_assert_eq!(restored.keywords(), frame.keywords());
        let dim = restored.dimension("FL1-A").unwrap();
        prop_assert_eq!(dim.range_hint(), range);
        let bits: Vec<u64> = dim.values().iter().map(|v| v.to_bits()).collect();
        let expected: Vec<u64> = values.iter().map(|v| v.to_bits()).collect();
        prop_assert_eq!(bits, expected);
    }
}
