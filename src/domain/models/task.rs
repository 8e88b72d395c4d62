#[cfg(test)]
#[path = "task_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub completed: bool,
}

impl Task {
    /// Returns a copy of the task with `completed` flipped and the title
    /// unchanged. The server's update endpoint expects a full representation,
    /// so toggling always submits both fields.
    pub fn toggled(&self) -> Task {
        return Task {
            id: self.id,
            title: self.title.to_string(),
            completed: !self.completed,
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub completed: bool,
}

impl TaskDraft {
    /// Builds a draft from raw user input. Surrounding whitespace is trimmed,
    /// and input that is empty after trimming yields no draft at all, meaning
    /// no request should be made for it.
    pub fn from_input(input: &str) -> Option<TaskDraft> {
        let title = input.trim();
        if title.is_empty() {
            return None;
        }

        return Some(TaskDraft {
            title: title.to_string(),
            completed: false,
        });
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub fn accepts(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => return true,
            TaskFilter::Active => return !task.completed,
            TaskFilter::Completed => return task.completed,
        }
    }

    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        return tasks
            .iter()
            .filter(|task| return self.accepts(task))
            .cloned()
            .collect();
    }

    pub fn next(&self) -> TaskFilter {
        match self {
            TaskFilter::All => return TaskFilter::Active,
            TaskFilter::Active => return TaskFilter::Completed,
            TaskFilter::Completed => return TaskFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskFilter::All => return "All",
            TaskFilter::Active => return "Active",
            TaskFilter::Completed => return "Completed",
        }
    }

    pub fn empty_hint(&self) -> &'static str {
        match self {
            TaskFilter::All => return "No tasks yet. Add one above!",
            TaskFilter::Active => return "All done! Nothing active.",
            TaskFilter::Completed => return "No completed tasks yet.",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub active: usize,
    pub completed: usize,
    pub total: usize,
}

impl TaskCounts {
    pub fn tally(tasks: &[Task]) -> TaskCounts {
        let mut counts = TaskCounts::default();
        for task in tasks {
            if task.completed {
                counts.completed += 1;
            } else {
                counts.active += 1;
            }
            counts.total += 1;
        }

        return counts;
    }

    /// Completed fraction for the progress bar. An empty list reports 0
    /// rather than dividing by zero.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }

        return self.completed as f64 / self.total as f64;
    }
}
