use super::*;
use crate::{
    model::{Border, Shadow},
    text::FixedAdvanceMeasurer,
};

fn black() -> ColorSpec {
    ColorSpec::rgb(0.0, 0.0, 0.0)
}

fn rect(w: f64, h: f64) -> VisualNode {
    VisualNode::Rectangle(RectNode::filled(w, h, black()))
}

fn text(content: &str) -> TextNode {
    TextNode {
        content: Some(content.to_string()),
        color: Some(ColorSpec::rgb(1.0, 1.0, 1.0)),
        font_family: Some("Geist, sans-serif".to_string()),
        font_weight: Some(400.0),
        font_size: Some(10.0),
        line_height: Some(13.0),
        ..TextNode::default()
    }
}

fn run(tree: &VisualNode) -> FigResult<RenderedTree> {
    let mut m = FixedAdvanceMeasurer::default();
    render(tree, &mut m)
}

fn nested(parent_at: (f64, f64)) -> VisualNode {
    let inner = FrameNode::sized(200.0, 200.0)
        .push(Child::new("leaf", Placement::at(10.0, 20.0), rect(5.0, 5.0)));
    VisualNode::Frame(FrameNode::sized(1000.0, 1000.0).push(Child::new(
        "inner",
        Placement::at(parent_at.0, parent_at.1),
        VisualNode::Frame(inner),
    )))
}

#[test]
fn offsets_are_parent_relative_and_origins_accumulate() {
    let out = run(&nested((100.0, 50.0))).unwrap();
    let leaf = &out.root.children[0].children[0];
    assert_eq!(leaf.id, "leaf");
    assert_eq!(leaf.offset, Vec2::new(10.0, 20.0));
    assert_eq!(leaf.origin, Point::new(110.0, 70.0));
}

#[test]
fn moving_parent_keeps_child_offsets() {
    let a = run(&nested((100.0, 50.0))).unwrap();
    let b = run(&nested((300.0, 0.0))).unwrap();
    let la = &a.root.children[0].children[0];
    let lb = &b.root.children[0].children[0];
    assert_eq!(la.offset, lb.offset);
    assert_eq!(lb.origin - la.origin, Vec2::new(200.0, -50.0));
}

#[test]
fn equal_z_paints_in_declaration_order() {
    let tree = VisualNode::Frame(
        FrameNode::sized(100.0, 100.0)
            .push(Child::new("a", Placement::at(0.0, 0.0).with_z(1), rect(50.0, 50.0)))
            .push(Child::new("b", Placement::at(25.0, 25.0).with_z(1), rect(50.0, 50.0))),
    );
    let out = run(&tree).unwrap();
    let ids: Vec<_> = out.root.children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
    assert!(out.root.children[1].paint_index > out.root.children[0].paint_index);
}

#[test]
fn explicit_z_reorders_siblings() {
    let tree = VisualNode::Frame(
        FrameNode::sized(100.0, 100.0)
            .push(Child::new("top", Placement::at(0.0, 0.0).with_z(5), rect(1.0, 1.0)))
            .push(Child::new("mid", Placement::at(0.0, 0.0), rect(1.0, 1.0)))
            .push(Child::new("low", Placement::at(0.0, 0.0).with_z(-1), rect(1.0, 1.0))),
    );
    let out = run(&tree).unwrap();
    let ids: Vec<_> = out.root.children.iter().map(|c| c.id.as_str()).collect();
    // "mid" defaults to its sibling index, 1.
    assert_eq!(ids, ["low", "mid", "top"]);
    assert_eq!(out.root.children[1].z_order, 1);
}

#[test]
fn paint_index_is_depth_first() {
    let out = run(&nested((0.0, 0.0))).unwrap();
    assert_eq!(out.root.paint_index, 0);
    assert_eq!(out.root.children[0].paint_index, 1);
    assert_eq!(out.root.children[0].children[0].paint_index, 2);
}

#[test]
fn clipping_truncates_visible_bounds_only() {
    let inner = FrameNode::sized(50.0, 50.0)
        .clipped()
        .push(Child::new("wide", Placement::at(40.0, 0.0), rect(30.0, 10.0)));
    let tree = VisualNode::Frame(FrameNode::sized(500.0, 500.0).push(Child::new(
        "box",
        Placement::at(100.0, 100.0),
        VisualNode::Frame(inner),
    )));
    let out = run(&tree).unwrap();
    let wide = &out.root.children[0].children[0];
    assert_eq!(wide.bounds(), Rect::new(140.0, 100.0, 170.0, 110.0));
    assert_eq!(wide.visible_bounds(), Some(Rect::new(140.0, 100.0, 150.0, 110.0)));
    assert!(out.root.children[0].clip.is_none());
}

#[test]
fn clipping_reaches_through_non_clipping_frames() {
    let grandchild = FrameNode::sized(100.0, 100.0)
        .push(Child::new("deep", Placement::at(0.0, 0.0), rect(100.0, 100.0)));
    let outer = FrameNode::sized(20.0, 20.0).clipped().push(Child::new(
        "plain",
        Placement::at(5.0, 5.0),
        VisualNode::Frame(grandchild),
    ));
    let tree = VisualNode::Frame(FrameNode::sized(500.0, 500.0).push(Child::new(
        "outer",
        Placement::at(0.0, 0.0),
        VisualNode::Frame(outer),
    )));
    let out = run(&tree).unwrap();
    let deep = &out.root.children[0].children[0].children[0];
    assert_eq!(deep.clip, Some(Rect::new(0.0, 0.0, 20.0, 20.0)));
    assert_eq!(deep.visible_bounds(), Some(Rect::new(5.0, 5.0, 20.0, 20.0)));
}

#[test]
fn nested_clips_intersect() {
    let inner = FrameNode::sized(100.0, 100.0)
        .clipped()
        .push(Child::new("r", Placement::at(0.0, 0.0), rect(100.0, 100.0)));
    let outer = FrameNode::sized(50.0, 50.0).clipped().push(Child::new(
        "inner",
        Placement::at(25.0, 25.0),
        VisualNode::Frame(inner),
    ));
    let tree = VisualNode::Frame(FrameNode::sized(500.0, 500.0).push(Child::new(
        "outer",
        Placement::at(0.0, 0.0),
        VisualNode::Frame(outer),
    )));
    let out = run(&tree).unwrap();
    let r = &out.root.children[0].children[0].children[0];
    assert_eq!(r.clip, Some(Rect::new(25.0, 25.0, 50.0, 50.0)));
}

#[test]
fn missing_background_is_malformed() {
    let tree = VisualNode::Frame(FrameNode::sized(100.0, 100.0).push(Child::new(
        "r",
        Placement::at(0.0, 0.0),
        VisualNode::Rectangle(RectNode {
            width: Some(1.0),
            height: Some(1.0),
            ..RectNode::default()
        }),
    )));
    let err = run(&tree).unwrap_err();
    assert!(matches!(err, FigError::MalformedTree(_)));
    assert!(err.to_string().contains("background_color"));
}

#[test]
fn missing_geometry_or_placement_is_malformed() {
    let no_width = VisualNode::Frame(FrameNode {
        height: Some(1.0),
        ..FrameNode::default()
    });
    assert!(matches!(run(&no_width), Err(FigError::MalformedTree(_))));

    let no_placement = VisualNode::Frame(FrameNode::sized(1.0, 1.0).push(Child {
        id: Some("x".to_string()),
        placement: None,
        node: rect(1.0, 1.0),
    }));
    assert!(matches!(run(&no_placement), Err(FigError::MalformedTree(_))));

    let negative = VisualNode::Frame(
        FrameNode::sized(1.0, 1.0).push(Child::new("x", Placement::at(0.0, 0.0), rect(-1.0, 1.0))),
    );
    assert!(matches!(run(&negative), Err(FigError::MalformedTree(_))));

    let nan_offset = VisualNode::Frame(FrameNode::sized(1.0, 1.0).push(Child::new(
        "x",
        Placement::at(f64::NAN, 0.0),
        rect(1.0, 1.0),
    )));
    assert!(matches!(run(&nan_offset), Err(FigError::MalformedTree(_))));
}

#[test]
fn unsupported_node_fails_whole_render() {
    let tree = VisualNode::Frame(
        FrameNode::sized(10.0, 10.0)
            .push(Child::new("ok", Placement::at(0.0, 0.0), rect(1.0, 1.0)))
            .push(Child::new(
                "vec",
                Placement::at(0.0, 0.0),
                VisualNode::Unsupported {
                    kind: "vector".to_string(),
                },
            )),
    );
    match run(&tree) {
        Err(FigError::UnsupportedNode { id, kind }) => {
            assert_eq!(id, "vec");
            assert_eq!(kind, "vector");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn root_must_be_frame() {
    assert!(matches!(run(&rect(1.0, 1.0)), Err(FigError::MalformedTree(_))));
    let unknown = VisualNode::Unsupported {
        kind: "star".to_string(),
    };
    assert!(matches!(run(&unknown), Err(FigError::UnsupportedNode { .. })));
}

#[test]
fn text_is_measured_when_unsized() {
    let tree = VisualNode::Frame(FrameNode::sized(100.0, 100.0).push(Child::new(
        "t",
        Placement::at(51.0, 54.0),
        VisualNode::Text(text("Button")),
    )));
    let out = run(&tree).unwrap();
    let t = &out.root.children[0];
    assert_eq!(t.size, Size::new(36.0, 13.0));
    match &t.style {
        NodeStyle::Text {
            color, font_family, ..
        } => {
            assert_eq!(color.css, "#FFFFFF");
            assert_eq!(font_family, "Geist, sans-serif");
        }
        other => panic!("unexpected style: {other:?}"),
    }
}

#[test]
fn explicit_text_size_skips_measurement() {
    struct Refuse;
    impl TextMeasurer for Refuse {
        fn measure(&mut self, _run: &TextRun<'_>) -> FigResult<Size> {
            Err(FigError::measure("should not be called"))
        }
    }

    let mut t = text("x");
    t.width = Some(7.0);
    t.height = Some(8.0);
    let tree = VisualNode::Frame(
        FrameNode::sized(10.0, 10.0).push(Child::new("t", Placement::at(0.0, 0.0), VisualNode::Text(t))),
    );
    let out = render(&tree, &mut Refuse).unwrap();
    assert_eq!(out.root.children[0].size, Size::new(7.0, 8.0));

    let tree = VisualNode::Frame(FrameNode::sized(10.0, 10.0).push(Child::new(
        "t",
        Placement::at(0.0, 0.0),
        VisualNode::Text(text("x")),
    )));
    assert!(matches!(render(&tree, &mut Refuse), Err(FigError::Measure(_))));
}

#[test]
fn text_missing_typography_is_malformed() {
    let mut t = text("x");
    t.font_size = None;
    let tree = VisualNode::Frame(
        FrameNode::sized(10.0, 10.0).push(Child::new("t", Placement::at(0.0, 0.0), VisualNode::Text(t))),
    );
    let err = run(&tree).unwrap_err();
    assert!(err.to_string().contains("font_size"));
}

#[test]
fn rectangle_style_resolves_colors() {
    let r = RectNode {
        border: Some(Border {
            color: ColorSpec::rgba(1.0, 0.0, 0.0, 0.5),
            width: 2.0,
        }),
        shadow: Some(Shadow {
            color: ColorSpec::rgba(0.0, 0.0, 0.0, 0.25),
            offset_x: 0.0,
            offset_y: 4.0,
            blur: 4.0,
            spread: 0.0,
        }),
        corner_radius: Some(12.0),
        ..RectNode::filled(217.0, 272.0, ColorSpec::rgb(
            0.031_372_549_019_607_84,
            0.243_137_254_901_960_78,
            0.870_588_235_294_117_6,
        ))
    };
    let tree = VisualNode::Frame(FrameNode::sized(10.0, 10.0).push(Child::new(
        "btn",
        Placement::at(0.0, 0.0),
        VisualNode::Rectangle(r),
    )));
    let out = run(&tree).unwrap();
    match &out.root.children[0].style {
        NodeStyle::Rectangle {
            background,
            border,
            shadow,
            corner_radius,
        } => {
            assert_eq!(background.css, "#083EDE");
            assert_eq!(background.token, None);
            assert_eq!(border.as_ref().unwrap().color.css, "rgba(255, 0, 0, 0.5)");
            assert_eq!(shadow.as_ref().unwrap().color.css, "rgba(0, 0, 0, 0.25)");
            assert_eq!(*corner_radius, Some(12.0));
        }
        other => panic!("unexpected style: {other:?}"),
    }
}

#[test]
fn tokens_attached_when_enabled() {
    let settings = RenderSettings {
        emit_tokens: true,
        ..RenderSettings::default()
    };
    let tree = VisualNode::Frame(
        FrameNode::sized(10.0, 10.0)
            .with_background(ColorSpec::rgb(1.0, 1.0, 1.0))
            .push(Child::new("r", Placement::at(0.0, 0.0), rect(1.0, 1.0))),
    );
    let mut m = FixedAdvanceMeasurer::default();
    let out = Composer::new(settings, &mut m).render(&tree).unwrap();
    match &out.root.style {
        NodeStyle::Frame { background, .. } => {
            assert_eq!(background.as_ref().unwrap().token.as_deref(), Some("white"));
        }
        other => panic!("unexpected style: {other:?}"),
    }
}

#[test]
fn canvas_setting_overrides_root_size() {
    let settings = RenderSettings {
        canvas: Some(Canvas {
            width: 64.0,
            height: 32.0,
        }),
        ..RenderSettings::default()
    };
    let tree = VisualNode::Frame(FrameNode::default());
    let mut m = FixedAdvanceMeasurer::default();
    let out = Composer::new(settings, &mut m).render(&tree).unwrap();
    assert_eq!(out.root.size, Size::new(64.0, 32.0));
    assert_eq!(out.canvas.width, 64.0);
}

#[test]
fn unnamed_children_get_path_ids() {
    let tree = VisualNode::Frame(FrameNode::sized(10.0, 10.0).push(Child {
        id: None,
        placement: Some(Placement::at(0.0, 0.0)),
        node: rect(1.0, 1.0),
    }));
    let out = run(&tree).unwrap();
    assert_eq!(out.root.children[0].id, "root/0");
}

#[test]
fn duplicate_ids_are_malformed() {
    let explicit = VisualNode::Frame(
        FrameNode::sized(10.0, 10.0)
            .push(Child::new("a", Placement::at(0.0, 0.0), rect(1.0, 1.0)))
            .push(Child::new(
                "box",
                Placement::at(0.0, 0.0),
                VisualNode::Frame(FrameNode::sized(5.0, 5.0).push(Child::new(
                    "a",
                    Placement::at(0.0, 0.0),
                    rect(1.0, 1.0),
                ))),
            )),
    );
    let err = run(&explicit).unwrap_err();
    assert!(matches!(err, FigError::MalformedTree(_)));
    assert!(err.to_string().contains("duplicate node id 'a'"));

    // A generated path id may not shadow an explicit one.
    let generated = VisualNode::Frame(
        FrameNode::sized(10.0, 10.0)
            .push(Child {
                id: None,
                placement: Some(Placement::at(0.0, 0.0)),
                node: rect(1.0, 1.0),
            })
            .push(Child::new("root/0", Placement::at(0.0, 0.0), rect(1.0, 1.0))),
    );
    assert!(matches!(run(&generated), Err(FigError::MalformedTree(_))));
}

#[test]
fn composer_can_render_twice() {
    let tree = nested((0.0, 0.0));
    let mut m = FixedAdvanceMeasurer::default();
    let mut composer = Composer::new(RenderSettings::default(), &mut m);
    composer.render(&tree).unwrap();
    assert_eq!(composer.render(&tree).unwrap().root.children[0].id, "inner");
}

#[test]
fn nesting_past_depth_limit_is_malformed() {
    let mut node = rect(1.0, 1.0);
    for i in 0..=MAX_DEPTH {
        node = VisualNode::Frame(FrameNode::sized(1.0, 1.0).push(Child::new(
            format!("f{i}"),
            Placement::at(0.0, 0.0),
            node,
        )));
    }
    let too_deep = VisualNode::Frame(FrameNode::sized(1.0, 1.0).push(Child::new(
        "top",
        Placement::at(0.0, 0.0),
        node,
    )));
    let err = run(&too_deep).unwrap_err();
    assert!(matches!(err, FigError::MalformedTree(_)));
    assert!(err.to_string().contains("nested deeper"));
}

#[test]
fn invalid_measured_size_is_a_measure_error() {
    struct Broken(Size);
    impl TextMeasurer for Broken {
        fn measure(&mut self, _run: &TextRun<'_>) -> FigResult<Size> {
            Ok(self.0)
        }
    }

    let tree = VisualNode::Frame(FrameNode::sized(10.0, 10.0).push(Child::new(
        "t",
        Placement::at(0.0, 0.0),
        VisualNode::Text(text("x")),
    )));
    for bad in [Size::new(f64::NAN, 1.0), Size::new(1.0, -2.0)] {
        let err = render(&tree, &mut Broken(bad)).unwrap_err();
        assert!(matches!(err, FigError::Measure(_)), "{err}");
    }

    // An explicit width still needs a valid measured height.
    let mut t = text("x");
    t.width = Some(4.0);
    let tree = VisualNode::Frame(
        FrameNode::sized(10.0, 10.0).push(Child::new("t", Placement::at(0.0, 0.0), VisualNode::Text(t))),
    );
    assert!(render(&tree, &mut Broken(Size::new(1.0, f64::INFINITY))).is_err());
}

#[test]
fn frame_corner_radius_is_validated_and_kept() {
    let tree = VisualNode::Frame(FrameNode::sized(100.0, 100.0).push(Child::new(
        "button",
        Placement::at(0.0, 0.0),
        VisualNode::Frame(FrameNode::sized(20.0, 20.0).with_background(black()).rounded(12.0)),
    )));
    let out = run(&tree).unwrap();
    match &out.root.children[0].style {
        NodeStyle::Frame { corner_radius, .. } => assert_eq!(*corner_radius, Some(12.0)),
        other => panic!("unexpected style: {other:?}"),
    }

    let bad = VisualNode::Frame(FrameNode::sized(1.0, 1.0).rounded(-1.0));
    assert!(matches!(run(&bad), Err(FigError::MalformedTree(_))));
}

#[test]
fn spacing_tokens_follow_emit_tokens() {
    let tree = VisualNode::Frame(FrameNode::sized(64.0, 40.0).push(Child::new(
        "chip",
        Placement::at(16.0, -8.0),
        rect(17.0, 6.0),
    )));
    assert!(run(&tree).unwrap().root.children[0].spacing.is_none());

    let settings = RenderSettings {
        emit_tokens: true,
        ..RenderSettings::default()
    };
    let mut m = FixedAdvanceMeasurer::default();
    let out = Composer::new(settings, &mut m).render(&tree).unwrap();
    assert_eq!(
        out.root.spacing,
        Some(SpacingTokens {
            x: Some("0".to_string()),
            y: Some("0".to_string()),
            width: Some("16".to_string()),
            height: Some("10".to_string()),
        })
    );
    assert_eq!(
        out.root.children[0].spacing,
        Some(SpacingTokens {
            x: Some("4".to_string()),
            y: Some("-2".to_string()),
            width: None,
            height: Some("1.5".to_string()),
        })
    );
}
