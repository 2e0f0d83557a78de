use super::*;
use std::cell::Cell;

use crate::draw::node::DrawNode;
use crate::draw::primitives::{LabelNode, LayerNode, PathNode};
use crate::foundation::core::{Point, Rgb, Vec2};
use crate::typeset::metrics::EstimatedMetrics;
use kurbo::{Rect, Shape};

#[derive(Debug)]
struct Counting {
    hits: Rc<Cell<usize>>,
    at: Point,
}

impl DrawNode for Counting {
    fn bounds(&self, b: &mut BBox, _scan: &mut BoundsScan<'_>) {
        self.hits.set(self.hits.get() + 1);
        b.add_point(self.at);
    }

    fn transformed(&self, t: Affine) -> NodeRef {
        Rc::new(Counting {
            hits: Rc::clone(&self.hits),
            at: t * self.at,
        })
    }
}

#[derive(Debug)]
struct Tag(&'static str);

impl DrawNode for Tag {
    fn transformed(&self, _t: Affine) -> NodeRef {
        Rc::new(Tag(self.0))
    }
}

fn tag(name: &'static str) -> NodeRef {
    Rc::new(Tag(name))
}

fn names(pic: &Picture) -> Vec<String> {
    pic.nodes()
        .iter()
        .map(|n| {
            if n.is_layer() {
                "L".to_string()
            } else {
                let dbg = format!("{n:?}");
                dbg.trim_start_matches("Tag(\"")
                    .trim_end_matches("\")")
                    .to_string()
            }
        })
        .collect()
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
    Rect::new(x0, y0, x1, y1).to_path(0.1)
}

fn metrics() -> EstimatedMetrics {
    EstimatedMetrics::new(TexEngine::Latex)
}

#[test]
fn append_keeps_watermark_and_prepend_resets_it() {
    let mut pic = Picture::new();
    pic.append(PathNode::fill(rect(0.0, 0.0, 1.0, 1.0), Rgb::BLACK).into_node());
    let mut m = metrics();
    pic.bounds(&mut m);
    assert_eq!(pic.scanned(), 1);

    pic.append(PathNode::fill(rect(5.0, 5.0, 6.0, 6.0), Rgb::BLACK).into_node());
    assert_eq!(pic.scanned(), 1);

    pic.prepend(PathNode::fill(rect(-3.0, -3.0, -2.0, -2.0), Rgb::BLACK).into_node());
    assert_eq!(pic.scanned(), 0);
    assert_eq!(pic.bounds(&mut m), BBox::new(-3.0, -3.0, 6.0, 6.0));
    assert_eq!(pic.scanned(), 3);
}

#[test]
fn bounds_only_scan_new_nodes() {
    let hits = Rc::new(Cell::new(0));
    let mut pic = Picture::new();
    for x in [1.0, 2.0] {
        pic.append(Rc::new(Counting {
            hits: Rc::clone(&hits),
            at: Point::new(x, x),
        }));
    }
    let mut m = metrics();
    let first = pic.bounds(&mut m);
    assert_eq!(hits.get(), 2);
    let second = pic.bounds(&mut m);
    assert_eq!(first, second);
    assert_eq!(hits.get(), 2);

    pic.append(Rc::new(Counting {
        hits: Rc::clone(&hits),
        at: Point::new(9.0, 9.0),
    }));
    assert_eq!(pic.bounds(&mut m), BBox::new(1.0, 1.0, 9.0, 9.0));
    assert_eq!(hits.get(), 3);
}

#[test]
fn empty_picture_bounds_are_empty() {
    let mut pic = Picture::new();
    assert!(pic.bounds(&mut metrics()).empty);
}

#[test]
fn merge_shares_nodes_without_resetting() {
    let mut a = Picture::new();
    a.append(tag("a"));
    a.bounds(&mut metrics());
    let mut b = Picture::new();
    b.append(tag("b1"));
    b.append(tag("b2"));
    a.merge(&b);
    assert_eq!(names(&a), ["a", "b1", "b2"]);
    assert_eq!(a.scanned(), 1);
    assert!(Rc::ptr_eq(&a.nodes()[1], &b.nodes()[0]));

    let mut c = Picture::new();
    c.append(tag("c"));
    a.prepend_picture(&c);
    assert_eq!(names(&a), ["c", "a", "b1", "b2"]);
    assert_eq!(a.scanned(), 0);
}

#[test]
fn enclose_without_layers_brackets_everything() {
    let mut pic = Picture::new();
    pic.append(tag("x"));
    pic.append(tag("y"));
    pic.enclose(tag("B"), tag("E"));
    assert_eq!(names(&pic), ["B", "x", "y", "E"]);
    assert_eq!(pic.scanned(), 0);
}

#[test]
fn enclose_reopens_after_each_layer() {
    let mut pic = Picture::new();
    pic.append(tag("x"));
    pic.append(LayerNode::node());
    pic.append(tag("y"));
    pic.enclose(tag("B"), tag("E"));
    assert_eq!(names(&pic), ["B", "x", "E", "L", "B", "y", "E"]);
}

#[test]
fn enclose_treats_a_run_of_layers_as_one_boundary() {
    let mut pic = Picture::new();
    pic.append(tag("x"));
    pic.append(LayerNode::node());
    pic.append(LayerNode::node());
    pic.append(LayerNode::node());
    pic.append(tag("y"));
    pic.enclose(tag("B"), tag("E"));
    assert_eq!(names(&pic), ["B", "x", "E", "L", "L", "L", "B", "y", "E"]);
}

#[test]
fn enclose_ending_in_layers_adds_no_trailing_end() {
    let mut pic = Picture::new();
    pic.append(tag("x"));
    pic.append(LayerNode::node());
    pic.enclose(tag("B"), tag("E"));
    assert_eq!(names(&pic), ["B", "x", "E", "L"]);
}

#[test]
fn enclose_of_empty_picture_is_a_bare_pair() {
    let mut pic = Picture::new();
    pic.enclose(tag("B"), tag("E"));
    assert_eq!(names(&pic), ["B", "E"]);
}

#[test]
fn clip_restricts_bounds() {
    let mut pic = Picture::new();
    pic.append(PathNode::fill(rect(0.0, 0.0, 100.0, 100.0), Rgb::BLACK).into_node());
    pic.clip(rect(10.0, 10.0, 20.0, 30.0), false);
    assert_eq!(pic.len(), 3);
    assert_eq!(pic.bounds(&mut metrics()), BBox::new(10.0, 10.0, 20.0, 30.0));
}

#[test]
fn nested_clip_ends_drop_the_inner_save() {
    let mut pic = Picture::new();
    pic.append(PathNode::fill(rect(0.0, 0.0, 100.0, 100.0), Rgb::BLACK).into_node());
    pic.clip(rect(0.0, 0.0, 50.0, 50.0), false);
    pic.clip(rect(10.0, 10.0, 60.0, 60.0), false);
    pic.bounds(&mut metrics());

    let ends: Vec<_> = pic.nodes().iter().filter(|n| n.end_clip()).collect();
    assert_eq!(ends.len(), 2);
    // Order: B2 B1 path E1 E2. E1 precedes E2, so E1 no longer saves.
    let mut ps = crate::output::psfile::PsFile::new(Vec::new(), false);
    for node in pic.nodes() {
        node.draw(&mut ps).unwrap();
    }
    let out = String::from_utf8(ps.close().unwrap()).unwrap();
    assert_eq!(out.matches("gsave").count(), 1);
    assert_eq!(out.matches("grestore").count(), 1);
    assert_eq!(pic.bounds(&mut metrics()), BBox::new(10.0, 10.0, 50.0, 50.0));
}

#[test]
fn has_labels_is_false_without_an_engine() {
    let mut pic = Picture::new();
    pic.append(LabelNode::new("x", Point::ZERO).into_node());
    assert!(!pic.has_labels(TexEngine::None));
    assert!(pic.has_labels(TexEngine::Latex));
}

#[test]
fn has_labels_stays_true_once_found() {
    let mut pic = Picture::new();
    pic.append(tag("x"));
    assert!(!pic.has_labels(TexEngine::Latex));
    assert_eq!(pic.label_scan(), LabelScan::Absent);

    pic.append(LabelNode::new("x", Point::ZERO).into_node());
    assert!(pic.has_labels(TexEngine::Latex));
    pic.bounds(&mut metrics());
    pic.append(tag("y"));
    assert!(pic.has_labels(TexEngine::Latex));
    assert_eq!(pic.label_scan(), LabelScan::Present);
}

#[test]
fn bounds_initialize_metrics_only_when_labels_exist() {
    let mut pic = Picture::new();
    pic.append(tag("x"));
    let mut m = metrics();
    pic.bounds(&mut m);
    assert!(!m.initialized());

    pic.append(LabelNode::new("ab", Point::new(5.0, 5.0)).into_node());
    let b = pic.bounds(&mut m);
    assert!(m.initialized());
    assert_eq!(pic.label_bounds().len(), 1);
    assert_eq!(b, pic.label_bounds()[0]);
}

#[test]
fn full_rescan_clears_label_bounds() {
    let mut pic = Picture::new();
    pic.append(LabelNode::new("a", Point::ZERO).into_node());
    let mut m = metrics();
    pic.bounds(&mut m);
    pic.prepend(tag("x"));
    pic.bounds(&mut m);
    assert_eq!(pic.label_bounds().len(), 1);
}

#[test]
fn transformed_copies_nodes_and_composes_transform() {
    let mut pic = Picture::new();
    pic.append(PathNode::fill(rect(0.0, 0.0, 10.0, 10.0), Rgb::BLACK).into_node());
    let shifted = pic.transformed(Affine::translate(Vec2::new(5.0, 0.0)));
    let scaled = shifted.transformed(Affine::scale(2.0));

    assert_eq!(scaled.transform(), Affine::scale(2.0) * Affine::translate(Vec2::new(5.0, 0.0)));
    assert!(!Rc::ptr_eq(&pic.nodes()[0], &shifted.nodes()[0]));
    assert_eq!(pic.bounds(&mut metrics()), BBox::new(0.0, 0.0, 10.0, 10.0));
    let mut scaled = scaled;
    assert_eq!(scaled.bounds(&mut metrics()), BBox::new(10.0, 0.0, 30.0, 20.0));
}

#[test]
fn layer_segments_exclude_markers() {
    let mut pic = Picture::new();
    assert!(pic.layer_segments(true).is_empty());

    pic.append(tag("a"));
    pic.append(LayerNode::node());
    pic.append(tag("b"));
    pic.append(tag("c"));
    assert_eq!(pic.layer_segments(true), vec![0..1, 2..4]);
    assert_eq!(pic.layer_segments(false), vec![0..4]);

    pic.append(LayerNode::node());
    assert_eq!(pic.layer_segments(true), vec![0..1, 2..4]);

    pic.append(LayerNode::node());
    pic.append(tag("d"));
    assert_eq!(pic.layer_segments(true), vec![0..1, 2..4, 5..5, 6..7]);
}
