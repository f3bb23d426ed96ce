use crate::model::StatusReport;
use crate::clock::EpochMs;

/// Display sequence for the robot status bar.
pub const STATUS_STEPS: [&str; 6] = [
    "Waiting",
    "Moving to Start",
    "Pickup",
    "Moving to Dropoff",
    "Dropoff",
    "Done",
];

/// Number of completed steps for a status value: 1..=6 for the known values,
/// 0 for anything else.
pub fn step_for_status(status: &str) -> usize {
    STATUS_STEPS
        .iter()
        .position(|s| *s == status)
        .map(|i| i + 1)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub status: String,
    pub timestamp: Option<EpochMs>,
    pub completed_steps: usize,
}

impl From<StatusReport> for StatusView {
    fn from(r: StatusReport) -> Self {
        let completed_steps = step_for_status(&r.status);
        Self {
            status: r.status,
            timestamp: r.timestamp,
            completed_steps,
        }
    }
}

impl StatusView {
    /// One-line text bar, e.g. `[x] Waiting  [x] Moving to Start  [ ] Pickup ...`.
    pub fn render_bar(&self) -> String {
        STATUS_STEPS
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let mark = if i < self.completed_steps { 'x' } else { ' ' };
                format!("[{mark}] {step}")
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values_are_monotonic() {
        let steps: Vec<usize> = STATUS_STEPS.iter().map(|s| step_for_status(s)).collect();
        assert_eq!(steps, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn unknown_values_map_to_zero() {
        for s in ["", "None", "waiting", "Delivery done", "Starting"] {
            assert_eq!(step_for_status(s), 0, "{s:?}");
        }
    }

    #[test]
    fn bar_marks_completed_steps() {
        let view = StatusView::from(StatusReport {
            status: "Pickup".into(),
            timestamp: None,
        });
        assert_eq!(view.completed_steps, 3);
        let bar = view.render_bar();
        assert!(bar.starts_with("[x] Waiting  [x] Moving to Start  [x] Pickup  [ ] Moving"));
    }
}
