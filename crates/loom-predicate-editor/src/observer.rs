// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Change observers for the controller.

use std::fmt;

/// Handle returned by [`Observers::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

type Callback = Box<dyn FnMut() + Send>;

/// Callbacks invoked synchronously, in registration order, after the root
/// predicate changes. They carry no payload; observers re-read the controller.
#[derive(Default)]
pub struct Observers {
	next_id: u64,
	callbacks: Vec<(ObserverId, Callback)>,
}

impl Observers {
	pub fn register<F>(&mut self, callback: F) -> ObserverId
	where
		F: FnMut() + Send + 'static,
	{
		let id = ObserverId(self.next_id);
		self.next_id += 1;
		self.callbacks.push((id, Box::new(callback)));
		id
	}

	/// Returns whether an observer was removed.
	pub fn remove(&mut self, id: ObserverId) -> bool {
		let before = self.callbacks.len();
		self.callbacks.retain(|(existing, _)| *existing != id);
		self.callbacks.len() != before
	}

	pub fn notify(&mut self) {
		for (_, callback) in &mut self.callbacks {
			callback();
		}
	}

	pub fn len(&self) -> usize {
		self.callbacks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.callbacks.is_empty()
	}
}

impl fmt::Debug for Observers {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Observers")
			.field("count", &self.callbacks.len())
			.finish()
	}
}
