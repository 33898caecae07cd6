//! Training course: a fixed set of target poses the operator has to reach.
//!
//! Every tick the current command is compared against each unfinished task.
//! Tasks may be completed in any order; each completes once and shows its
//! checkmark.

use crate::control::ControlCommand;
use crate::error::{Error, Result};
use crate::ui::{UiSurface, UiTarget};
use serde::{Deserialize, Serialize};

/// Target command values for one task
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CourseTask {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub light: i32,
}

impl CourseTask {
    pub const fn new(x: i32, y: i32, z: i32, light: i32) -> Self {
        Self { x, y, z, light }
    }

    pub fn matches(&self, cmd: &ControlCommand, tol: &Tolerance) -> bool {
        within(cmd.x, self.x, tol.x)
            && within(cmd.y, self.y, tol.y)
            && within(cmd.z, self.z, tol.z)
            && within(cmd.light, self.light, tol.light)
    }
}

/// Widened so extreme configured values cannot overflow
fn within(value: i32, target: i32, tolerance: i32) -> bool {
    (i64::from(value) - i64::from(target)).abs() <= i64::from(tolerance)
}

/// Allowed absolute deviation per field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub light: i32,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            x: 10,
            y: 10,
            z: 20,
            light: 3,
        }
    }
}

/// `[course]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub tolerance: Tolerance,

    #[serde(default = "default_tasks")]
    pub tasks: Vec<CourseTask>,
}

fn default_tasks() -> Vec<CourseTask> {
    vec![
        CourseTask::new(-45, -6, 19, 0),
        CourseTask::new(45, -6, 27, 10),
        CourseTask::new(0, -3, 19, 0),
        CourseTask::new(0, 12, 27, 10),
        CourseTask::new(0, 0, 19, 0),
    ]
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            tolerance: Tolerance::default(),
            tasks: default_tasks(),
        }
    }
}

impl CourseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tasks.len() > u8::MAX as usize {
            return Err(Error::Config(format!(
                "course has {} tasks, at most {} supported",
                self.tasks.len(),
                u8::MAX
            )));
        }
        let t = &self.tolerance;
        if t.x < 0 || t.y < 0 || t.z < 0 || t.light < 0 {
            return Err(Error::Config("course tolerances must be non-negative".to_string()));
        }
        Ok(())
    }
}

pub struct CourseTracker {
    tasks: Vec<CourseTask>,
    tolerance: Tolerance,
    completed: Vec<bool>,
}

impl CourseTracker {
    pub fn new(config: &CourseConfig) -> Self {
        Self {
            tasks: config.tasks.clone(),
            tolerance: config.tolerance,
            completed: vec![false; config.tasks.len()],
        }
    }

    /// Hide every checkmark and forget progress
    pub fn reset<U: UiSurface>(&mut self, ui: &mut U) {
        self.completed.iter_mut().for_each(|c| *c = false);
        for n in 1..=self.tasks.len() {
            ui.hide_bound(UiTarget::Checkmark(n as u8));
        }
    }

    /// Mark newly reached tasks; returns their 1-based numbers
    pub fn check<U: UiSurface>(&mut self, cmd: &ControlCommand, ui: &mut U) -> Vec<u8> {
        let mut newly = Vec::new();
        for (i, task) in self.tasks.iter().enumerate() {
            if self.completed[i] || !task.matches(cmd, &self.tolerance) {
                continue;
            }
            self.completed[i] = true;
            let n = (i + 1) as u8;
            log::info!("Course task {} completed ({})", n, cmd);
            ui.show_bound(UiTarget::Checkmark(n));
            newly.push(n);
        }
        if !newly.is_empty() && self.is_finished() {
            log::info!("Course finished");
        }
        newly
    }

    pub fn completed_count(&self) -> usize {
        self.completed.iter().filter(|c| **c).count()
    }

    pub fn is_finished(&self) -> bool {
        self.completed.iter().all(|c| *c)
    }
}
