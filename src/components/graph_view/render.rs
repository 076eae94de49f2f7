use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scene::{GraphScene, SceneNode, ease_out_cubic};
use super::style::{BACKGROUND, LABEL_COLOR};

pub fn render(scene: &GraphScene, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, scene.width, scene.height);
	ctx.save();
	let _ = ctx.translate(scene.transform.x, scene.transform.y);
	let _ = ctx.scale(scene.transform.k, scene.transform.k);
	draw_edges(scene, ctx);
	draw_nodes(scene, ctx);
	ctx.restore();
	draw_hover_label(scene, ctx);
}

fn draw_edges(scene: &GraphScene, ctx: &CanvasRenderingContext2d) {
	let k = scene.transform.k;
	let (line_width, arrow_size) = (1.5 / k.max(0.5), 8.0 / k.max(0.5));
	let t = ease_out_cubic(scene.hover.highlight_t);
	let dimming = scene.has_active_highlight();

	for edge in &scene.edges {
		let (from, to) = (&scene.nodes[edge.source], &scene.nodes[edge.target]);
		let (dx, dy) = (to.x - from.x, to.y - from.y);
		let dist = dx.hypot(dy);
		if dist < 0.001 {
			continue;
		}

		let lit = scene.is_highlighted(edge.source) && scene.is_highlighted(edge.target);
		let alpha = match (dimming, lit) {
			(false, _) => 0.8,
			(true, true) => 0.8 + 0.2 * t,
			(true, false) => 0.8 - 0.6 * t,
		};

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(&edge.color);
		ctx.set_fill_style_str(&edge.color);
		ctx.set_line_width(if lit { line_width * (1.0 + 0.5 * t) } else { line_width });

		let (ux, uy) = (dx / dist, dy / dist);
		let (tip_x, tip_y) = (to.x - ux * to.radius(), to.y - uy * to.radius());
		ctx.begin_path();
		ctx.move_to(from.x + ux * from.radius(), from.y + uy * from.radius());
		ctx.line_to(tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		ctx.stroke();

		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();

		if let Some(label) = &edge.label {
			ctx.set_font(&format!("{}px sans-serif", 9.0 / k.max(0.5)));
			let _ = ctx.fill_text(label, (from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(scene: &GraphScene, ctx: &CanvasRenderingContext2d) {
	let (dimming, t, k) = (
		scene.has_active_highlight(),
		ease_out_cubic(scene.hover.highlight_t),
		scene.transform.k,
	);

	// dimmed nodes first so highlighted ones paint on top
	for (idx, node) in scene.nodes.iter().enumerate() {
		if dimming && scene.is_highlighted(idx) {
			continue;
		}
		let alpha = if dimming { 1.0 - 0.7 * t } else { 1.0 };
		draw_node(ctx, node, node.radius(), alpha, k);
	}

	if !dimming {
		return;
	}

	for (idx, node) in scene.nodes.iter().enumerate() {
		if !scene.is_highlighted(idx) {
			continue;
		}
		let radius = if scene.is_hovered(idx) {
			node.radius() * (1.0 + 0.2 * t)
		} else {
			node.radius()
		};
		if scene.is_hovered(idx) && t > 0.01 {
			draw_glow(ctx, node, radius, t);
		}
		draw_node(ctx, node, radius, 1.0, k);
	}
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &SceneNode, radius: f64, alpha: f64, k: f64) {
	let style = &node.style;
	ctx.set_global_alpha(alpha);

	ctx.begin_path();
	let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&style.fill);
	ctx.fill();
	ctx.set_stroke_style_str(style.border);
	ctx.set_line_width(style.border_width);
	ctx.stroke();

	let font_px = if style.emphasized { 12.0 } else { 10.0 } / k.max(0.5);
	let weight = if style.emphasized { "bold " } else { "" };
	ctx.set_font(&format!("{weight}{font_px}px sans-serif"));
	ctx.set_text_align("center");
	ctx.set_fill_style_str(LABEL_COLOR);
	let _ = ctx.fill_text(&style.label, node.x, node.y + radius + font_px + 2.0);
	ctx.set_text_align("start");
	ctx.set_global_alpha(1.0);
}

fn draw_glow(ctx: &CanvasRenderingContext2d, node: &SceneNode, radius: f64, t: f64) {
	let glow_radius = radius * (1.4 + 0.8 * t);
	let Ok(gradient) = ctx.create_radial_gradient(node.x, node.y, radius * 0.3, node.x, node.y, glow_radius)
	else {
		return;
	};
	let alpha = 0.35 * t;
	let _ = gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {alpha})"));
	let _ = gradient.add_color_stop(0.6, &format!("rgba(200, 220, 255, {})", alpha * 0.3));
	let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
	ctx.begin_path();
	let _ = ctx.arc(node.x, node.y, glow_radius, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}

/// Untruncated label of the hovered node, drawn in screen space above the canvas
/// content.
fn draw_hover_label(scene: &GraphScene, ctx: &CanvasRenderingContext2d) {
	let (Some(idx), Some(label)) = (scene.hover.node, scene.hovered_label()) else {
		return;
	};
	let node = &scene.nodes[idx];
	let (sx, sy) = (
		node.x * scene.transform.k + scene.transform.x,
		(node.y - node.radius()) * scene.transform.k + scene.transform.y - 10.0,
	);

	ctx.set_font("12px sans-serif");
	let width = ctx.measure_text(label).map_or(0.0, |m| m.width());
	ctx.set_global_alpha(0.9);
	ctx.set_fill_style_str("#161b22");
	ctx.fill_rect(sx - width / 2.0 - 6.0, sy - 15.0, width + 12.0, 20.0);
	ctx.set_global_alpha(1.0);
	ctx.set_fill_style_str(LABEL_COLOR);
	ctx.set_text_align("center");
	let _ = ctx.fill_text(label, sx, sy);
	ctx.set_text_align("start");
}
