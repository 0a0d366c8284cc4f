use chrono::{Duration, NaiveDate};
use habitkeep_core::models::*;
use speculate2::speculate;

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 1).expect("valid date") + Duration::days(offset)
}

fn habit_with(frequency: Frequency, target: u32, progress: u32, last_reset: NaiveDate) -> Habit {
    let mut habit = Habit::new(
        CreateHabitInput {
            name: "Read".to_string(),
            target,
            frequency,
            icon: IconTag::Card,
            note: String::new(),
        },
        last_reset,
    )
    .expect("Failed to create habit");
    habit.progress = progress;
    habit
}

speculate! {
    describe "first run" {
        it "initializes an unset reset date to today without touching progress" {
            let mut habit = habit_with(Frequency::Daily, 3, 0, day(0));
            habit.last_reset_date = None;

            let outcome = habit.roll_over(day(5));

            assert!(outcome.initialized);
            assert!(!outcome.reset);
            assert_eq!(habit.last_reset_date, Some(day(5)));
            assert_eq!(habit.progress, 0);
        }
    }

    describe "same day" {
        it "does nothing" {
            let mut habit = habit_with(Frequency::Daily, 3, 2, day(0));

            let outcome = habit.roll_over(day(0));

            assert!(outcome.is_noop());
            assert_eq!(habit.progress, 2);
        }

        it "ignores a clock that moved backwards" {
            let mut habit = habit_with(Frequency::Daily, 3, 2, day(4));

            let outcome = habit.roll_over(day(2));

            assert!(outcome.is_noop());
            assert_eq!(habit.last_reset_date, Some(day(4)));
        }
    }

    describe "daily" {
        it "resets on the next day and archives the previous day" {
            let mut habit = habit_with(Frequency::Daily, 3, 2, day(0));

            let outcome = habit.roll_over(day(1));

            assert!(outcome.reset);
            assert_eq!(habit.progress, 0);
            assert_eq!(habit.last_reset_date, Some(day(1)));
            assert_eq!(habit.history, vec![DailyProgress { date: day(0), progress: 2, target: 3 }]);
        }

        it "reconciles a multi-day gap in one step" {
            let mut habit = habit_with(Frequency::Daily, 3, 1, day(0));

            habit.roll_over(day(9));

            assert_eq!(habit.progress, 0);
            assert_eq!(habit.last_reset_date, Some(day(9)));
            assert_eq!(habit.history.len(), 1);
            assert_eq!(habit.history[0].date, day(0));
        }

        it "does not archive zero progress" {
            let mut habit = habit_with(Frequency::Daily, 3, 0, day(0));

            let outcome = habit.roll_over(day(1));

            assert!(outcome.reset);
            assert!(outcome.archived.is_none());
            assert!(habit.history.is_empty());
        }

        it "does not duplicate a day already recorded by increments" {
            let mut habit = habit_with(Frequency::Daily, 3, 0, day(0));
            habit.increment(day(0));
            habit.increment(day(0));

            let outcome = habit.roll_over(day(1));

            assert!(outcome.archived.is_none());
            assert_eq!(habit.history, vec![DailyProgress { date: day(0), progress: 2, target: 3 }]);
        }
    }

    describe "every two days" {
        it "keeps the period open on the first day after a reset" {
            let mut habit = habit_with(Frequency::Every2Days, 3, 2, day(0));

            let outcome = habit.roll_over(day(1));

            assert!(!outcome.reset);
            assert_eq!(habit.progress, 2);
            assert_eq!(habit.last_reset_date, Some(day(0)));
        }

        it "resets once two days have elapsed" {
            let mut habit = habit_with(Frequency::Every2Days, 3, 2, day(0));

            habit.roll_over(day(1));
            let outcome = habit.roll_over(day(2));

            assert!(outcome.reset);
            assert_eq!(habit.progress, 0);
            assert_eq!(habit.last_reset_date, Some(day(2)));
            assert_eq!(habit.history.len(), 1);
        }

        it "archives under the latest day progress was made" {
            let mut habit = habit_with(Frequency::Every2Days, 3, 0, day(0));
            habit.increment(day(0));
            habit.roll_over(day(1));
            habit.increment(day(1));

            habit.roll_over(day(2));

            assert_eq!(
                habit.history,
                vec![
                    DailyProgress { date: day(0), progress: 1, target: 3 },
                    DailyProgress { date: day(1), progress: 2, target: 3 },
                ]
            );
        }
    }

    describe "weekly" {
        it "keeps progress for six days" {
            let mut habit = habit_with(Frequency::Weekly, 5, 3, day(0));

            habit.roll_over(day(6));

            assert_eq!(habit.progress, 3);
            assert_eq!(habit.last_reset_date, Some(day(0)));
        }

        it "resets on the seventh day" {
            let mut habit = habit_with(Frequency::Weekly, 5, 3, day(0));

            let outcome = habit.roll_over(day(7));

            assert!(outcome.reset);
            assert_eq!(habit.progress, 0);
        }
    }

    describe "target edits" {
        it "clamps progress to a lowered target" {
            let mut habit = habit_with(Frequency::Daily, 5, 4, day(0));
            habit.apply_update(UpdateHabitInput {
                target: Some(2),
                ..UpdateHabitInput::default()
            }).expect("valid update");

            let outcome = habit.roll_over(day(0));

            assert!(outcome.clamped);
            assert_eq!(habit.progress, 2);
        }

        it "leaves recorded history untouched" {
            let mut habit = habit_with(Frequency::Daily, 5, 0, day(0));
            for _ in 0..4 {
                habit.increment(day(0));
            }
            habit.apply_update(UpdateHabitInput {
                target: Some(2),
                ..UpdateHabitInput::default()
            }).expect("valid update");

            habit.roll_over(day(0));

            assert_eq!(habit.history, vec![DailyProgress { date: day(0), progress: 4, target: 5 }]);
        }

        it "keeps a past day's target when edited on a later day" {
            let mut habit = habit_with(Frequency::Every2Days, 3, 0, day(0));
            habit.increment(day(0));
            habit.increment(day(0));
            habit.apply_update(UpdateHabitInput {
                target: Some(6),
                ..UpdateHabitInput::default()
            }).expect("valid update");

            let outcome = habit.roll_over(day(1));

            assert!(outcome.archived.is_none());
            assert_eq!(habit.history, vec![DailyProgress { date: day(0), progress: 2, target: 3 }]);
        }

        it "keeps a snapshot taken before a downward clamp on the next rollover" {
            let mut habit = habit_with(Frequency::Daily, 5, 0, day(0));
            for _ in 0..4 {
                habit.increment(day(0));
            }
            habit.apply_update(UpdateHabitInput {
                target: Some(2),
                ..UpdateHabitInput::default()
            }).expect("valid update");
            habit.roll_over(day(0));

            habit.roll_over(day(1));

            assert_eq!(habit.history, vec![DailyProgress { date: day(0), progress: 4, target: 5 }]);
        }
    }

    describe "increment" {
        it "stops at the target" {
            let mut habit = habit_with(Frequency::Daily, 2, 0, day(0));

            assert!(habit.increment(day(0)).incremented);
            assert!(habit.increment(day(0)).incremented);
            let third = habit.increment(day(0));

            assert!(!third.incremented);
            assert_eq!(third.progress, 2);
            assert_eq!(habit.progress, 2);
        }

        it "keeps progress within bounds across many increments" {
            let mut habit = habit_with(Frequency::Weekly, 4, 0, day(0));

            for n in 0..10 {
                habit.increment(day(n % 3));
                assert!(habit.progress <= habit.target);
            }
        }
    }

    describe "validation" {
        it "rejects an empty name" {
            let result = Habit::new(CreateHabitInput {
                name: "   ".to_string(),
                target: 1,
                frequency: Frequency::Daily,
                icon: IconTag::Pills,
                note: String::new(),
            }, day(0));

            assert!(matches!(result, Err(habitkeep_core::HabitError::InvalidArgument(_))));
        }

        it "rejects a zero target" {
            let result = Habit::new(CreateHabitInput {
                name: "Run".to_string(),
                target: 0,
                frequency: Frequency::Daily,
                icon: IconTag::Pills,
                note: String::new(),
            }, day(0));

            assert!(matches!(result, Err(habitkeep_core::HabitError::InvalidArgument(_))));
        }

        it "leaves the habit unchanged when an update is rejected" {
            let mut habit = habit_with(Frequency::Daily, 3, 1, day(0));
            let before = habit.clone();

            let result = habit.apply_update(UpdateHabitInput {
                name: Some("Swim".to_string()),
                target: Some(0),
                ..UpdateHabitInput::default()
            });

            assert!(result.is_err());
            assert_eq!(habit, before);
        }
    }
}
