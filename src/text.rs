use std::borrow::Cow;

use crate::foundation::{
    core::Size,
    error::{FigError, FigResult},
};

/// Resolved typography for one text node, as handed to a [`TextMeasurer`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextRun<'a> {
    pub content: &'a str,
    pub font_family: &'a str,
    pub font_weight: f64,
    pub font_size: f64,
    pub line_height: f64,
    pub letter_spacing: f64,
}

/// Text shaping collaborator; the composer only places the box it returns.
pub trait TextMeasurer {
    fn measure(&mut self, run: &TextRun<'_>) -> FigResult<Size>;
}

/// Measures with Parley against the system font collection.
///
/// Lines are never wrapped: the design snapshot already fixed the line breaks.
pub struct ParleyMeasurer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
}

impl Default for ParleyMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyMeasurer {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }
}

impl TextMeasurer for ParleyMeasurer {
    fn measure(&mut self, run: &TextRun<'_>) -> FigResult<Size> {
        let size_px = run.font_size as f32;
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(FigError::measure("font size must be finite and > 0"));
        }

        let mut builder =
            self.layout_ctx
                .ranged_builder(&mut self.font_ctx, run.content, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Borrowed(run.font_family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(run.font_weight as f32),
        ));
        builder.push_default(parley::style::StyleProperty::LineHeight(
            parley::style::LineHeight::Absolute(run.line_height as f32),
        ));
        if run.letter_spacing != 0.0 {
            builder.push_default(parley::style::StyleProperty::LetterSpacing(
                run.letter_spacing as f32,
            ));
        }

        let mut layout: parley::Layout<()> = builder.build(run.content);
        layout.break_all_lines(None);

        let mut w = 0.0f64;
        let mut h = 0.0f64;
        for line in layout.lines() {
            let m = line.metrics();
            w = w.max(f64::from(m.advance));
            h += f64::from(m.ascent + m.descent + m.leading);
        }
        Ok(Size::new(w, h))
    }
}

/// Deterministic measurer: every glyph advances by `font_size * advance_ratio`
/// plus letter spacing, every line is `line_height` tall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvanceMeasurer {
    pub advance_ratio: f64,
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self { advance_ratio: 0.6 }
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure(&mut self, run: &TextRun<'_>) -> FigResult<Size> {
        if !run.font_size.is_finite() || run.font_size <= 0.0 {
            return Err(FigError::measure("font size must be finite and > 0"));
        }
        let per_glyph = run.font_size * self.advance_ratio + run.letter_spacing;
        let mut lines = 0usize;
        let mut w = 0.0f64;
        for line in run.content.split('\n') {
            lines += 1;
            w = w.max(line.chars().count() as f64 * per_glyph);
        }
        Ok(Size::new(w.max(0.0), lines as f64 * run.line_height))
    }
}
