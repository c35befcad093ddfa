//! Terminal tables for board output.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use taskboard::{Board, Clock, DueState, KeyValueStore, Task};

/// Create a table that wraps to the terminal width
pub fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Due date with its badge, empty when undated
pub fn due_text(state: DueState, task: &Task) -> String {
    let Some(date) = task.due_date() else {
        return String::new();
    };
    match state {
        DueState::Overdue => format!("{date} (overdue)"),
        DueState::DueSoon => format!("{date} (due soon)"),
        DueState::NoDueDate | DueState::Upcoming => date.to_string(),
    }
}

/// One row per visible task, grouped by column
pub fn board_table<S: KeyValueStore, C: Clock>(board: &Board<S, C>) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Status", "#", "ID", "Title", "Priority", "Due", "Tags"]);

    for column in board.view().columns {
        for task in column.tasks {
            table.add_row(vec![
                column.label.to_string(),
                task.order().to_string(),
                task.id().to_string(),
                task.title().to_string(),
                task.priority().to_string(),
                due_text(board.due_state(task), task),
                task.tags().join(", "),
            ]);
        }
    }
    table
}

/// Visible task count per column
pub fn counts_table<S: KeyValueStore, C: Clock>(board: &Board<S, C>) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Status", "Label", "Count"]);
    for column in board.view().columns {
        table.add_row(vec![
            column.status.to_string(),
            column.label.to_string(),
            column.count().to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use taskboard::{BoardConfig, FixedClock, MemoryStore, NewTask};

    fn board() -> Board<MemoryStore, FixedClock> {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap());
        Board::open_with_clock(BoardConfig::classic(), MemoryStore::new(), clock)
    }

    #[test]
    fn test_due_text_badges() {
        let mut board = board();
        let date = |day| NaiveDate::from_ymd_opt(2026, 10, day).unwrap();
        let soon = board
            .create(NewTask::new("soon").with_due_date(date(15)))
            .unwrap();
        let late = board
            .create(NewTask::new("late").with_due_date(date(1)))
            .unwrap();
        let undated = board.create(NewTask::new("undated")).unwrap();

        assert_eq!(due_text(board.due_state(&soon), &soon), "2026-10-15 (due soon)");
        assert_eq!(due_text(board.due_state(&late), &late), "2026-10-01 (overdue)");
        assert_eq!(due_text(board.due_state(&undated), &undated), "");
    }

    #[test]
    fn test_board_table_lists_every_visible_task() {
        let mut board = board();
        board.create(NewTask::new("first")).unwrap();
        board.create(NewTask::new("second").with_status("done")).unwrap();

        let rendered = board_table(&board).to_string();
        assert!(rendered.contains("first"));
        assert!(rendered.contains("Done"));
        assert_eq!(board_table(&board).row_iter().count(), 2);
    }
}
