//! Plain-text rendering for terminal output.

use std::fmt::Write as _;

use robodash_core::api::NewTask;
use robodash_core::notify::pending_collection;
use robodash_core::tasks::{available_actions, TaskBoard};
use robodash_core::{BaseStation, ClassificationResult, ClassificationSource, Slot, Task};

pub fn render_stations(stations: &[BaseStation]) -> String {
    let mut s = String::new();
    for st in stations {
        let slots: Vec<String> = st
            .slots
            .iter()
            .map(|slot| format!("{}{}", slot.slot, if slot.available { "" } else { "x" }))
            .collect();
        let _ = writeln!(s, "  {:<16} slots {}", st.station, slots.join(" "));
    }
    if stations.is_empty() {
        s.push_str("  (no stations)\n");
    }
    s
}

pub fn render_top_units(units: &[Slot]) -> String {
    let cells: Vec<String> = units
        .iter()
        .map(|u| format!("[{}:{}]", u.slot, if u.available { "free" } else { "used" }))
        .collect();
    format!("  top unit {}\n", cells.join(" "))
}

pub fn render_classification(result: &ClassificationResult) -> String {
    let origin = match result.source {
        ClassificationSource::Service => "classification service",
        ClassificationSource::Fallback => "keyword rules (service unavailable)",
        ClassificationSource::Manual => "manual",
    };
    format!(
        "  category {} / priority {} ({origin})\n",
        result.category, result.priority
    )
}

pub fn render_draft(task: &NewTask) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "  task      {}", task.task_id);
    let _ = writeln!(s, "  from      {}", task.sender.as_deref().unwrap_or("-"));
    let _ = writeln!(s, "  to        {}", task.receiver);
    let _ = writeln!(s, "  route     {} -> {} (slot {})", task.start, task.end, task.slot);
    let _ = writeln!(s, "  item      {}", task.description);
    let _ = writeln!(s, "  priority  {}", task.priority);
    s
}

const HEADER: [&str; 8] = [
    "taskID", "receiver", "status", "progress", "start", "end", "slot", "priority",
];

/// Fixed-width table of tasks, one per line.
pub fn render_task_table(tasks: &[Task]) -> String {
    let rows: Vec<[String; 8]> = tasks
        .iter()
        .map(|t| {
            [
                t.task_id.to_string(),
                t.receiver.clone(),
                t.status.to_string(),
                t.progress.to_string(),
                t.start_station.clone(),
                t.end_station.clone(),
                t.slot.to_string(),
                t.priority.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADER.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let line = |cells: &[&str]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut s = line(&HEADER);
    s.push('\n');
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        s.push_str(&line(&cells));
        s.push('\n');
    }
    s
}

pub fn render_board(board: &TaskBoard) -> String {
    let mut s = String::new();
    for (title, tasks) in [("Sent", &board.sent), ("Received", &board.received)] {
        let _ = writeln!(s, "{title} ({})", tasks.len());
        for t in tasks.iter() {
            let actions: Vec<&str> = available_actions(t).iter().map(|a| a.name()).collect();
            let _ = writeln!(
                s,
                "  {}  {} -> {}  {}/{}  {}{}",
                t.task_id,
                t.start_station,
                t.end_station,
                t.status,
                t.progress,
                t.description,
                if actions.is_empty() {
                    String::new()
                } else {
                    format!("  [{}]", actions.join(", "))
                }
            );
        }
    }
    let waiting = pending_collection(&board.received, &Default::default()).len();
    if waiting > 0 {
        let _ = writeln!(s, "{waiting} item(s) ready for pickup");
    }
    s
}

pub fn render_pickup_notice(tasks: &[Task]) -> String {
    let mut s = String::new();
    for t in tasks {
        let _ = writeln!(
            s,
            "Ready for pickup: task {} from {} at {} (slot {})",
            t.task_id, t.sender, t.end_station, t.slot
        );
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use robodash_core::{Progress, TaskId, TaskStatus};

    fn task(id: &str, status: TaskStatus, progress: Progress) -> Task {
        Task {
            task_id: TaskId::from_str(id),
            sender: "bob".into(),
            receiver: "alice".into(),
            start_station: "StationA".into(),
            end_station: "StationB".into(),
            slot: 2,
            description: "pills".into(),
            priority: 1,
            progress,
            status,
            timestamp: None,
            timeslot: None,
        }
    }

    #[test]
    fn table_aligns_columns() {
        let out = render_task_table(&[task("1", TaskStatus::Ongoing, Progress::Loading)]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            "taskID  receiver  status   progress  start     end       slot  priority"
        );
        assert_eq!(
            lines[1],
            "1       alice     Ongoing  Loading   StationA  StationB  2     1"
        );
    }

    #[test]
    fn board_lists_enabled_actions() {
        let board = TaskBoard {
            sent: vec![task("1", TaskStatus::Ongoing, Progress::Loading)],
            received: vec![task("2", TaskStatus::PendingCollection, Progress::UnloadingDone)],
        };
        let out = render_board(&board);
        assert!(out.contains("1  StationA -> StationB  Ongoing/Loading  pills  [LoadingDone]"));
        assert!(out.contains("[UserPickup]"));
        assert!(out.ends_with("1 item(s) ready for pickup\n"));
    }

    #[test]
    fn stations_mark_unavailable_slots() {
        let st = BaseStation {
            station: "StationB".into(),
            slots: vec![
                Slot {
                    slot: 1,
                    available: false,
                },
                Slot {
                    slot: 2,
                    available: true,
                },
            ],
        };
        assert_eq!(render_stations(&[st]), "  StationB         slots 1x 2\n");
    }
}
