use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::layout::LayoutKind;
use super::render;
use super::scene::GraphScene;
use super::slot::RendererSlot;
use super::types::GraphData;

/// Longest step fed to the tween, so a backgrounded tab resumes without a jump.
const MAX_FRAME_DT: f64 = 0.1;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;
type Slot = StoredValue<RendererSlot<Renderer>, LocalStorage>;

/// A scene bound to a canvas, with its animation loop and resize listener running
/// until dropped.
struct Renderer {
	scene: Rc<RefCell<GraphScene>>,
	window: Window,
	frame: FrameCallback,
	frame_id: Rc<Cell<Option<i32>>>,
	on_resize: Closure<dyn FnMut()>,
}

fn surface_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or((800.0, 600.0))
}

impl Renderer {
	fn mount(canvas: HtmlCanvasElement, data: &GraphData, layout: LayoutKind) -> Option<Self> {
		let window = web_sys::window()?;
		let ctx: CanvasRenderingContext2d = canvas.get_context("2d").ok()??.dyn_into().ok()?;
		let (w, h) = surface_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let scene = GraphScene::build(data, layout, w, h);
		debug!(
			"rendering {} nodes, {} edges with {layout} layout, animated: {} ({} duplicate nodes, {} dangling edges dropped)",
			scene.nodes.len(),
			scene.edges.len(),
			scene.params().animate,
			scene.dropped_nodes,
			scene.dropped_edges,
		);
		let scene = Rc::new(RefCell::new(scene));

		let on_resize = {
			let (scene, canvas) = (scene.clone(), canvas.clone());
			Closure::<dyn FnMut()>::new(move || {
				let (w, h) = surface_size(&canvas);
				canvas.set_width(w as u32);
				canvas.set_height(h as u32);
				scene.borrow_mut().resize(w, h);
			})
		};
		let _ = window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());

		let frame: FrameCallback = Rc::new(RefCell::new(None));
		let frame_id = Rc::new(Cell::new(None));
		*frame.borrow_mut() = Some(Closure::new({
			let (scene, frame, frame_id, window) =
				(scene.clone(), frame.clone(), frame_id.clone(), window.clone());
			let mut last = js_sys::Date::now();
			move || {
				let now = js_sys::Date::now();
				let dt = ((now - last) / 1000.0).clamp(0.0, MAX_FRAME_DT);
				last = now;
				{
					let mut s = scene.borrow_mut();
					s.tick(dt);
					render::render(&s, &ctx);
				}
				if let Some(cb) = frame.borrow().as_ref() {
					frame_id.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
				}
			}
		}));
		if let Some(cb) = frame.borrow().as_ref() {
			frame_id.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}

		Some(Self {
			scene,
			window,
			frame,
			frame_id,
			on_resize,
		})
	}
}

impl Drop for Renderer {
	fn drop(&mut self) {
		if let Some(id) = self.frame_id.take() {
			let _ = self.window.cancel_animation_frame(id);
		}
		let _ = self
			.window
			.remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref());
		// the frame callback holds its own handle; dropping it here breaks the cycle
		self.frame.borrow_mut().take();
	}
}

fn with_scene<T>(slot: Slot, f: impl FnOnce(&mut GraphScene) -> T) -> Option<T> {
	slot.try_update_value(|s| s.with_mut(|r| f(&mut r.scene.borrow_mut())))
		.flatten()
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Interactive graph canvas. Every change of `data` or `layout` tears the current
/// scene down and builds a fresh one.
#[component]
pub fn GraphView(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] layout: Signal<LayoutKind>,
	#[prop(optional, into)] on_node_click: Option<Callback<String>>,
	#[prop(optional, into)] on_node_dbl_click: Option<Callback<String>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let slot: Slot = StoredValue::new_local(RendererSlot::default());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (data, layout) = (data.get(), layout.get());
		let live = slot
			.try_update_value(|s| {
				s.replace_with(|| Renderer::mount(canvas, &data, layout));
				s.is_live()
			})
			.unwrap_or(false);
		if !live {
			warn!("graph canvas has no 2d context; nothing is drawn");
		}
	});

	on_cleanup(move || {
		slot.try_update_value(|s| s.clear());
	});

	let on_mousedown = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(canvas_ref, &ev) {
			with_scene(slot, |s| s.pointer_down(x, y));
		}
	};

	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = local_point(canvas_ref, &ev) {
			with_scene(slot, |s| s.pointer_move(x, y));
		}
	};

	let on_mouseup = move |_: MouseEvent| {
		with_scene(slot, GraphScene::pointer_up);
	};

	let on_mouseleave = move |_: MouseEvent| {
		with_scene(slot, GraphScene::pointer_leave);
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some((x, y)) = local_point(canvas_ref, &ev) {
			with_scene(slot, |s| s.zoom_at(x, y, ev.delta_y() < 0.0));
		}
	};

	// the scene borrow ends before a callback runs; callbacks may swap the data
	let on_click = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let target = with_scene(slot, |s| s.click_target(x, y)).flatten();
		if let (Some(id), Some(cb)) = (target, on_node_click) {
			cb.run(id);
		}
	};

	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let target = with_scene(slot, |s| s.node_id_at(x, y).map(str::to_string)).flatten();
		if let (Some(id), Some(cb)) = (target, on_node_dbl_click) {
			cb.run(id);
		}
	};

	view! {
		<div class="graph-view">
			<canvas
				node_ref=canvas_ref
				class="graph-view-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				on:click=on_click
				on:dblclick=on_dblclick
				style="display: block; cursor: grab;"
			/>
		</div>
	}
}
