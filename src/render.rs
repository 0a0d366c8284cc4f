//! Plain-text rendering of habits and weekly history.

use chrono::{Datelike, Duration, NaiveDate};

use habitkeep_core::models::{Frequency, Habit};

const DONE: char = '●';
const PARTIAL: char = '◐';
const EMPTY: char = '○';

const BAR_WIDTH: usize = 10;

/// Get the status symbol for a completion ratio.
fn status_symbol(fraction: f32) -> char {
    if fraction >= 1.0 {
        DONE
    } else if fraction > 0.0 {
        PARTIAL
    } else {
        EMPTY
    }
}

fn frequency_label(frequency: Frequency) -> &'static str {
    match frequency {
        Frequency::Daily => "daily",
        Frequency::Every2Days => "every 2 days",
        Frequency::Weekly => "weekly",
    }
}

/// Fixed-width bar such as `[######----]`.
pub fn progress_bar(fraction: f32) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f32).round()) as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

fn short_id(habit: &Habit) -> String {
    habit.id.to_string().chars().take(8).collect()
}

/// One line per habit.
///
/// Example output:
/// ```text
/// ◐ 3f2a9c1e  Water            3/8  [####------]  daily
/// ● 77b0d4aa  Stretch          1/1  [##########]  every 2 days
/// ```
pub fn render_habits(habits: &[Habit]) -> String {
    if habits.is_empty() {
        return "No habits yet. Add one with `habit add`.\n".to_string();
    }

    let name_width = habits
        .iter()
        .map(|h| h.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut output = String::new();
    for habit in habits {
        let fraction = habit.progress as f32 / habit.target as f32;
        output.push_str(&format!(
            "{} {}  {:<name_width$}  {:>3}/{:<3} {}  {}\n",
            status_symbol(fraction),
            short_id(habit),
            habit.name,
            habit.progress,
            habit.target,
            progress_bar(fraction),
            frequency_label(habit.frequency),
        ));
    }
    output
}

/// Full detail view of one habit.
pub fn render_habit(habit: &Habit) -> String {
    let mut output = format!(
        "{}\n  id:         {}\n  progress:   {}/{} {}\n  frequency:  {}\n  icon:       {}\n",
        habit.name,
        habit.id,
        habit.progress,
        habit.target,
        progress_bar(habit.progress as f32 / habit.target as f32),
        frequency_label(habit.frequency),
        habit.icon.as_str(),
    );
    if let Some(date) = habit.last_reset_date {
        output.push_str(&format!("  period:     since {date}\n"));
    }
    if !habit.note.is_empty() {
        output.push_str(&format!("  note:       {}\n", habit.note));
    }
    output.push_str(&format!("  history:    {} days recorded\n", habit.history.len()));
    output
}

/// One line per day of the week starting at `week_start`.
///
/// Example output:
/// ```text
/// Week of 2026-10-19
///   Mon 10-19  [##########] 100%
///   Tue 10-20  [#####-----]  50%
/// ```
pub fn render_week(week_start: NaiveDate, fractions: &[f32; 7]) -> String {
    let mut output = format!("Week of {week_start}\n");
    for (offset, fraction) in fractions.iter().enumerate() {
        let day = week_start + Duration::days(offset as i64);
        output.push_str(&format!(
            "  {} {:02}-{:02}  {} {:>3}%\n",
            day.weekday(),
            day.month(),
            day.day(),
            progress_bar(*fraction),
            (fraction * 100.0).round() as u32,
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_is_fixed_width() {
        assert_eq!(progress_bar(0.0), "[----------]");
        assert_eq!(progress_bar(0.5), "[#####-----]");
        assert_eq!(progress_bar(1.0), "[##########]");
        assert_eq!(progress_bar(3.0), "[##########]");
    }

    #[test]
    fn status_symbol_reflects_completion() {
        assert_eq!(status_symbol(0.0), EMPTY);
        assert_eq!(status_symbol(0.25), PARTIAL);
        assert_eq!(status_symbol(1.0), DONE);
    }

    #[test]
    fn render_week_lists_seven_days() {
        let start = NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date");
        let output = render_week(start, &[1.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.0]);

        assert_eq!(output.lines().count(), 8);
        assert!(output.contains("Mon 10-19  [##########] 100%"));
        assert!(output.contains("Tue 10-20  [#####-----]  50%"));
        assert!(output.contains("Sun 10-25"));
    }
}
