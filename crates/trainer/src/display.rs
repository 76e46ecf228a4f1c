use std::fmt::Write as _;
use std::io::{self, Write};

use crossterm::cursor::MoveToColumn;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use intervals_core::{IntervalName, Note, RoundSnapshot, RoundState, Scores, Verdict};

fn pitches(notes: &[Note]) -> String {
    let list: Vec<String> = notes.iter().map(|n| n.to_string()).collect();
    format!("[{}]", list.join(","))
}

/// One status line: played notes, notes still expected, verdict and totals.
pub fn status_line(snapshot: &RoundSnapshot) -> String {
    if snapshot.state == RoundState::Idle {
        return "Press space to start".to_string();
    }

    let verdict = match snapshot.verdict {
        Verdict::Pending => "",
        Verdict::Right => "right",
        Verdict::Wrong => "wrong",
    };

    format!(
        "{} {} {:<5}  total {} right / {} wrong",
        pitches(&snapshot.played),
        pitches(&snapshot.remaining),
        verdict,
        snapshot.scores.total_right(),
        snapshot.scores.total_wrong()
    )
}

/// Redraw the status line in place.
pub fn render_status(snapshot: &RoundSnapshot) -> io::Result<()> {
    let mut stdout = io::stdout();
    crossterm::execute!(
        stdout,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(status_line(snapshot))
    )?;
    stdout.flush()
}

/// Per-interval table for `--stats`.
pub fn stats_table(scores: &Scores) -> String {
    let mut table = String::new();
    let _ = writeln!(
        table,
        "{:<4} {:<15} {:>6} {:>6} {:>9}",
        "", "interval", "right", "wrong", "accuracy"
    );
    for name in IntervalName::ALL {
        let size = name.semitones();
        let accuracy = scores
            .accuracy(size)
            .map(|a| format!("{:.0}%", a * 100.0))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            table,
            "{:<4} {:<15} {:>6} {:>6} {:>9}",
            name.short_name(),
            name.to_string(),
            scores.right(size),
            scores.wrong(size),
            accuracy
        );
    }
    let _ = writeln!(
        table,
        "{:<4} {:<15} {:>6} {:>6}",
        "",
        "total",
        scores.total_right(),
        scores.total_wrong()
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_status() {
        assert_eq!(status_line(&RoundSnapshot::default()), "Press space to start");
    }

    #[test]
    fn test_status_line_shows_progress() {
        let snapshot = RoundSnapshot {
            state: RoundState::AwaitingInput,
            played: vec![Note(60), Note(67)],
            remaining: vec![Note(67)],
            interval_size: Some(7),
            verdict: Verdict::Wrong,
            scores: Scores::default(),
        };
        let line = status_line(&snapshot);
        assert!(line.starts_with("[60,67] [67] wrong"));
        assert!(line.ends_with("total 0 right / 0 wrong"));
    }

    #[test]
    fn test_stats_table_lists_every_interval() {
        let scores = Scores::default().with_outcome(7, false).unwrap();
        let table = stats_table(&scores);
        assert_eq!(table.lines().count(), 14);
        let fifth = table.lines().find(|l| l.starts_with("P5")).unwrap();
        assert!(fifth.contains("perfect fifth"));
        assert!(fifth.contains("100%"));
        assert!(table.lines().any(|l| l.starts_with("m2") && l.contains('-')));
    }

    #[test]
    fn test_stats_table_with_huge_counts() {
        let scores = Scores::from_json(
            r#"{"right":[0,4294967295,0,0,0,0,0,0,0,0,0,0,0],"wrong":[0,1,0,0,0,0,0,0,0,0,0,0,0]}"#,
        )
        .unwrap();
        let table = stats_table(&scores);
        let second = table.lines().find(|l| l.starts_with("m2")).unwrap();
        assert!(second.contains("4294967295"));
        assert!(second.contains("100%"));
    }
}
