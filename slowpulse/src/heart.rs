//! The heart glyph.
//!
//! Two states: filled black when the pulse is on, a 1px outline when off.

use crate::theme::SlowColors;
use egui::{Painter, Pos2, Shape, Stroke};
use std::f32::consts::TAU;

const OUTLINE_POINTS: usize = 96;

/// Point on the classic parametric heart, scaled so the shape spans roughly
/// `size` across and centered on `center`. `t` runs over `[0, TAU)`.
fn heart_point(center: Pos2, size: f32, t: f32) -> Pos2 {
    let x = 16.0 * t.sin().powi(3);
    let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
    let scale = size / 34.0;
    // curve's y axis points up; screen y points down
    Pos2::new(center.x + x * scale, center.y - y * scale)
}

pub fn outline(center: Pos2, size: f32) -> Vec<Pos2> {
    (0..OUTLINE_POINTS)
        .map(|i| heart_point(center, size, i as f32 / OUTLINE_POINTS as f32 * TAU))
        .collect()
}

/// Paint the heart. The curve is concave at the top, so the fill is a fan of
/// triangles from a point inside the body.
pub fn paint(painter: &Painter, center: Pos2, size: f32, on: bool) {
    let points = outline(center, size);
    if on {
        let hub = Pos2::new(center.x, center.y + size * 0.05);
        let mut mesh = egui::Mesh::default();
        mesh.colored_vertex(hub, SlowColors::BLACK);
        for p in &points {
            mesh.colored_vertex(*p, SlowColors::BLACK);
        }
        let n = points.len() as u32;
        for i in 0..n {
            mesh.add_triangle(0, 1 + i, 1 + (i + 1) % n);
        }
        painter.add(Shape::mesh(mesh));
    }
    painter.add(Shape::closed_line(points, Stroke::new(1.0, SlowColors::BLACK)));
}
