/// Holds at most one live renderer for a surface.
///
/// Replacing tears the previous renderer down before the next one is built, so two
/// renderers never share a surface, not even briefly.
pub struct RendererSlot<R> {
	current: Option<R>,
}

impl<R> Default for RendererSlot<R> {
	fn default() -> Self {
		Self { current: None }
	}
}

impl<R> RendererSlot<R> {
	/// Drops the current renderer, then installs whatever `build` returns.
	pub fn replace_with(&mut self, build: impl FnOnce() -> Option<R>) {
		self.current = None;
		self.current = build();
	}

	pub fn clear(&mut self) {
		self.current = None;
	}

	pub fn is_live(&self) -> bool {
		self.current.is_some()
	}

	pub fn with_mut<T>(&mut self, f: impl FnOnce(&mut R) -> T) -> Option<T> {
		self.current.as_mut().map(f)
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;

	type Log = Rc<RefCell<Vec<String>>>;

	struct FakeRenderer {
		name: &'static str,
		log: Log,
	}

	impl Drop for FakeRenderer {
		fn drop(&mut self) {
			self.log.borrow_mut().push(format!("destroy {}", self.name));
		}
	}

	fn build(name: &'static str, log: &Log) -> impl FnOnce() -> Option<FakeRenderer> {
		let log = log.clone();
		move || {
			log.borrow_mut().push(format!("create {name}"));
			Some(FakeRenderer { name, log })
		}
	}

	#[test]
	fn previous_renderer_is_destroyed_before_the_next_is_created() {
		let log = Log::default();
		let mut slot = RendererSlot::default();
		slot.replace_with(build("a", &log));
		slot.replace_with(build("b", &log));
		slot.replace_with(build("c", &log));
		assert_eq!(
			*log.borrow(),
			["create a", "destroy a", "create b", "destroy b", "create c"]
		);
		assert!(slot.is_live());
	}

	#[test]
	fn clearing_on_unmount_destroys_the_renderer() {
		let log = Log::default();
		let mut slot = RendererSlot::default();
		slot.replace_with(build("a", &log));
		slot.clear();
		assert_eq!(*log.borrow(), ["create a", "destroy a"]);
		assert!(!slot.is_live());
		assert_eq!(slot.with_mut(|r| r.name), None);
	}

	#[test]
	fn failed_build_leaves_the_slot_empty() {
		let log = Log::default();
		let mut slot = RendererSlot::default();
		slot.replace_with(build("a", &log));
		slot.replace_with(|| None);
		assert_eq!(*log.borrow(), ["create a", "destroy a"]);
		assert!(!slot.is_live());
	}
}
