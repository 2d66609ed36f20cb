//! Canvas double that records draw calls in order

use super::canvas::Canvas;
use crate::geometry::{Rect, Segment, Vector};
use crate::style::Rgba;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Draw(u32),
    BeginClip { glyphs: Vec<u32>, offset: Vector },
    Blur(f32),
    Fill { rect: Rect, color: Rgba },
    Stroke { segment: Segment, color: Rgba, width: f32 },
    EndClip,
}

#[derive(Debug)]
pub struct RecordingCanvas {
    pub foreground: Rgba,
    pub ops: Vec<Op>,
}

impl RecordingCanvas {
    pub fn new(foreground: Rgba) -> Self {
        Self {
            foreground,
            ops: Vec::new(),
        }
    }

    /// Fills in recording order
    pub fn fills(&self) -> Vec<(Rect, Rgba)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Fill { rect, color } => Some((*rect, *color)),
                _ => None,
            })
            .collect()
    }

    /// Clip offsets in recording order
    pub fn clip_offsets(&self) -> Vec<Vector> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::BeginClip { offset, .. } => Some(*offset),
                _ => None,
            })
            .collect()
    }

    pub fn blurs(&self) -> Vec<f32> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Blur(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    pub fn strokes(&self) -> Vec<(Vec<u32>, Segment, Rgba, f32)> {
        let mut clip = Vec::new();
        let mut out = Vec::new();
        for op in &self.ops {
            match op {
                Op::BeginClip { glyphs, .. } => clip = glyphs.clone(),
                Op::Stroke {
                    segment,
                    color,
                    width,
                } => out.push((clip.clone(), *segment, *color, *width)),
                _ => {}
            }
        }
        out
    }
}

impl Canvas for RecordingCanvas {
    type Glyph = u32;

    fn foreground(&self) -> Rgba {
        self.foreground
    }

    fn draw(&mut self, glyph: &u32) {
        self.ops.push(Op::Draw(*glyph));
    }

    fn clip_to_silhouette<F>(&mut self, glyphs: &[&u32], offset: Vector, paint: F)
    where
        F: FnOnce(&mut Self),
    {
        self.ops.push(Op::BeginClip {
            glyphs: glyphs.iter().map(|g| **g).collect(),
            offset,
        });
        paint(self);
        self.ops.push(Op::EndClip);
    }

    fn clip_bounds(&self) -> Option<Rect> {
        None
    }

    fn add_blur_filter(&mut self, radius: f32) {
        self.ops.push(Op::Blur(radius));
    }

    fn fill(&mut self, rect: Rect, color: Rgba) {
        self.ops.push(Op::Fill { rect, color });
    }

    fn stroke(&mut self, segment: Segment, color: Rgba, width: f32) {
        self.ops.push(Op::Stroke {
            segment,
            color,
            width,
        });
    }
}
