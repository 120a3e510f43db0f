//! FIFO queue of pending insert jobs.
//!
//! Backed by a growable ring buffer: enqueue is O(1) amortized and an entire
//! queue can be spliced onto another's tail in O(1) via [`drain_into`];
//! that splice is how a related factory's jobs merge into the owning
//! factory's queue during association resolution. Clearing retains entries
//! flagged fixed, so jobs from `fix`ed associations survive the transient
//! clear between builds and the clear-on-error discard.
//!
//! [`drain_into`]: InsertJobQueue::drain_into

use std::collections::VecDeque;

use crate::insert::InsertJob;

/// An ordered queue of pending insert jobs.
#[derive(Debug, Clone, Default)]
pub struct InsertJobQueue {
	jobs: VecDeque<InsertJob>,
}

impl InsertJobQueue {
	/// Creates an empty queue.
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of pending jobs.
	pub fn len(&self) -> usize {
		self.jobs.len()
	}

	/// Whether the queue holds no jobs.
	pub fn is_empty(&self) -> bool {
		self.jobs.is_empty()
	}

	/// Appends a job at the tail.
	pub fn enqueue(&mut self, job: InsertJob) {
		self.jobs.push_back(job);
	}

	/// Pops the job at the head.
	pub fn dequeue(&mut self) -> Option<InsertJob> {
		self.jobs.pop_front()
	}

	/// Moves every job onto the tail of `target`, leaving this queue empty.
	pub fn drain_into(&mut self, target: &mut InsertJobQueue) {
		target.jobs.append(&mut self.jobs);
	}

	/// Drops all jobs except those flagged fixed, preserving their order.
	pub fn clear(&mut self) {
		self.jobs.retain(InsertJob::is_fixed);
	}

	/// Flags every pending job as fixed.
	pub(crate) fn mark_fixed(&mut self) {
		for job in &mut self.jobs {
			job.set_fixed(true);
		}
	}

	/// Iterates pending jobs head to tail.
	pub fn iter(&self) -> impl Iterator<Item = &InsertJob> {
		self.jobs.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use indexmap::IndexMap;
	use rstest::rstest;

	fn job(table: &str) -> InsertJob {
		InsertJob::new(table, IndexMap::new())
	}

	#[rstest]
	fn dequeues_in_enqueue_order() {
		let mut queue = InsertJobQueue::new();
		queue.enqueue(job("locations"));
		queue.enqueue(job("users"));
		queue.enqueue(job("homes"));

		assert_eq!(queue.dequeue().unwrap().table(), "locations");
		assert_eq!(queue.dequeue().unwrap().table(), "users");
		assert_eq!(queue.dequeue().unwrap().table(), "homes");
		assert!(queue.dequeue().is_none());
	}

	#[rstest]
	fn drain_into_splices_onto_the_tail() {
		let mut parent = InsertJobQueue::new();
		parent.enqueue(job("users"));
		let mut child = InsertJobQueue::new();
		child.enqueue(job("homes"));
		child.enqueue(job("locations"));

		child.drain_into(&mut parent);

		assert!(child.is_empty());
		let tables: Vec<&str> = parent.iter().map(InsertJob::table).collect();
		assert_eq!(tables, vec!["users", "homes", "locations"]);
	}

	#[rstest]
	fn clear_retains_fixed_jobs_in_order() {
		let mut queue = InsertJobQueue::new();
		queue.enqueue(job("a"));
		queue.enqueue(job("b").with_fixed(true));
		queue.enqueue(job("c"));
		queue.enqueue(job("d").with_fixed(true));

		queue.clear();

		let tables: Vec<&str> = queue.iter().map(InsertJob::table).collect();
		assert_eq!(tables, vec!["b", "d"]);
	}

	#[rstest]
	fn mark_fixed_flags_every_job() {
		let mut queue = InsertJobQueue::new();
		queue.enqueue(job("a"));
		queue.enqueue(job("b"));
		queue.mark_fixed();
		queue.clear();
		assert_eq!(queue.len(), 2);
	}
}
