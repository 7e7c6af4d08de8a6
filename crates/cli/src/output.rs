use taskapp_core::task::Task;

const HEADERS: [&str; 5] = ["ID", "TITLE", "DUE", "PRIORITY", "STATUS"];

fn row(task: &Task) -> [String; 5] {
    [
        task.id.clone().unwrap_or_else(|| "-".to_string()),
        task.title.clone(),
        if task.due_date.is_empty() {
            "-".to_string()
        } else {
            task.due_date.clone()
        },
        task.priority.to_string(),
        task.status.to_string(),
    ]
}

/// Plain aligned table, one task per line
pub fn render_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    let rows: Vec<[String; 5]> = tasks.iter().map(row).collect();
    let mut widths = HEADERS.map(str::len);
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[&str]| {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ");
        line.trim_end().to_string()
    };

    let mut lines = vec![format_line(&HEADERS)];
    for cells in &rows {
        let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
        lines.push(format_line(&cells));
    }
    lines.join("\n")
}

pub fn print_tasks(tasks: &[Task], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(tasks)?);
    } else {
        println!("{}", render_table(tasks));
    }
    Ok(())
}

pub fn print_task(task: &Task, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(task)?);
    } else {
        println!("{}", render_table(std::slice::from_ref(task)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_table() {
        assert_eq!(render_table(&[]), "No tasks found.");
    }

    #[test]
    fn test_table_alignment() {
        let tasks = vec![
            Task::new("Buy milk")
                .with_id("1")
                .with_due_date("2025-03-10")
                .with_priority("high"),
            Task::new("Write a longer report").with_id("22"),
        ];

        let table = render_table(&tasks);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "ID  TITLE                  DUE         PRIORITY  STATUS"
        );
        assert_eq!(
            lines[1],
            "1   Buy milk               2025-03-10  high      pending"
        );
        assert_eq!(
            lines[2],
            "22  Write a longer report  -           medium    pending"
        );
    }
}
