//! Sprint views and burndown chart series.

use crate::model::project::ProjectId;
use crate::model::sprint::{Sprint, SprintId, SprintStatus};
use crate::model::task::Task;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SprintRead {
    pub id: SprintId,
    pub project_id: ProjectId,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SprintStatus,
}

impl SprintRead {
    pub fn from_sprint(sprint: &Sprint) -> Self {
        Self {
            id: sprint.id,
            project_id: sprint.project_id,
            name: sprint.name.clone(),
            start_date: sprint.start_date,
            end_date: sprint.end_date,
            status: sprint.status,
        }
    }
}

/// One day of the burndown series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    /// Tasks with `date_finished` on or before `date`.
    pub completed: usize,
    /// `total_tasks - completed`.
    pub remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SprintReadChart {
    #[serde(flatten)]
    pub sprint: SprintRead,
    pub total_tasks: usize,
    pub series: Vec<ChartPoint>,
}

impl SprintReadChart {
    /// `tasks` must be the tasks currently assigned to `sprint`.
    pub fn from_sprint(sprint: &Sprint, tasks: &[Task]) -> Self {
        Self {
            sprint: SprintRead::from_sprint(sprint),
            total_tasks: tasks.len(),
            series: burndown_series(sprint, tasks),
        }
    }
}

/// One point per sprint day, start and end inclusive.
pub fn burndown_series(sprint: &Sprint, tasks: &[Task]) -> Vec<ChartPoint> {
    let total = tasks.len();
    sprint
        .days()
        .map(|date| {
            let completed = tasks.iter().filter(|task| task.is_finished_by(date)).count();
            ChartPoint {
                date,
                completed,
                remaining: total - completed,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{burndown_series, SprintReadChart};
    use crate::model::sprint::{Sprint, SprintDraft};
    use crate::model::task::{Task, TaskDraft};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn task(project_id: Uuid, finished: Option<NaiveDate>) -> Task {
        let mut task = Task::new(
            project_id,
            TaskDraft {
                name: "Task".to_string(),
                description: "Task body".to_string(),
                priority_id: 1,
            },
            day(1),
        );
        if let Some(date) = finished {
            task.finish(date.and_hms_opt(12, 0, 0).unwrap());
        }
        task
    }

    #[test]
    fn series_counts_cumulative_completion() {
        let project_id = Uuid::new_v4();
        let sprint = Sprint::new(
            project_id,
            SprintDraft {
                name: "S1".to_string(),
                start_date: day(1),
                end_date: day(4),
            },
        );
        let tasks = vec![
            task(project_id, Some(day(2))),
            task(project_id, Some(day(4))),
            task(project_id, None),
        ];

        let series = burndown_series(&sprint, &tasks);
        let completed: Vec<_> = series.iter().map(|point| point.completed).collect();
        let remaining: Vec<_> = series.iter().map(|point| point.remaining).collect();
        assert_eq!(completed, vec![0, 1, 1, 2]);
        assert_eq!(remaining, vec![3, 2, 2, 1]);
    }

    #[test]
    fn task_finished_before_sprint_counts_from_day_one() {
        let project_id = Uuid::new_v4();
        let sprint = Sprint::new(
            project_id,
            SprintDraft {
                name: "S2".to_string(),
                start_date: day(10),
                end_date: day(11),
            },
        );
        let chart = SprintReadChart::from_sprint(&sprint, &[task(project_id, Some(day(3)))]);
        assert_eq!(chart.total_tasks, 1);
        assert!(chart.series.iter().all(|point| point.completed == 1));
    }

    #[test]
    fn empty_sprint_has_zero_series() {
        let sprint = Sprint::new(
            Uuid::new_v4(),
            SprintDraft {
                name: "S3".to_string(),
                start_date: day(1),
                end_date: day(1),
            },
        );
        let chart = SprintReadChart::from_sprint(&sprint, &[]);
        assert_eq!(chart.series.len(), 1);
        assert_eq!(chart.series[0].completed, 0);
        assert_eq!(chart.series[0].remaining, 0);
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["name"], "S3");
        assert_eq!(json["status"], "open");
    }
}
