//! One-shot deferred tasks
//!
//! Tasks fire between frames, never inside one. The engine polls
//! [`Scheduler::take_due`] at the top of each step and clears everything on
//! session reset, so nothing scheduled for an old session can reach a new one.

/// Work that runs after a delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Close the word card
    EndReview,
}

#[derive(Debug, Clone)]
struct Scheduled {
    /// Insertion order, breaks ties between equal due times
    seq: u64,
    due: f64,
    task: Task,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<Scheduled>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` at or after timestamp `due` (ms)
    pub fn schedule_at(&mut self, due: f64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled { seq, due, task });
    }

    /// Drop every pending task
    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Cancelling {} pending tasks", self.pending.len());
        }
        self.pending.clear();
    }

    /// Remove and return tasks due at `now`, earliest first
    pub fn take_due(&mut self, now: f64) -> Vec<Task> {
        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|s| {
            if s.due <= now {
                due.push(s.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|s| s.task).collect()
    }

    pub fn is_scheduled(&self, task: Task) -> bool {
        self.pending.iter().any(|s| s.task == task)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_when_due() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_at(2000.0, Task::EndReview);
        assert!(scheduler.take_due(1999.0).is_empty());
        assert_eq!(scheduler.take_due(2000.0), vec![Task::EndReview]);
        assert!(scheduler.take_due(5000.0).is_empty());
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_only_due_tasks_fire() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_at(300.0, Task::EndReview);
        scheduler.schedule_at(100.0, Task::EndReview);
        assert_eq!(scheduler.take_due(200.0), vec![Task::EndReview]);
        assert!(scheduler.is_scheduled(Task::EndReview));
        assert_eq!(scheduler.len(), 1);
    }

    #[test]
    fn test_cancel_all() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule_at(100.0, Task::EndReview);
        scheduler.schedule_at(200.0, Task::EndReview);
        assert_eq!(scheduler.len(), 2);
        scheduler.cancel_all();
        assert!(scheduler.take_due(1000.0).is_empty());
    }
}
