//! Subcommand handlers. Each call runs one core operation and prints JSON.

use crate::{MemberAction, ProjectAction, SprintAction, TaskAction, UserAction};
use anyhow::{anyhow, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use taskboard_core::db::Connection;
use taskboard_core::{
    MemberRead, MembershipService, PriorityRead, ProjectDraft, ProjectMemberRead, ProjectPatch,
    ProjectRead, ProjectService, SprintDraft, SprintPatch, SprintRead, SprintService, TaskDraft,
    TaskPatch, TaskRead, TaskService, UserId, UserService,
};

/// Open connection plus the `--as` username, resolved lazily.
pub struct Session<'conn> {
    conn: &'conn Connection,
    acting_as: Option<String>,
}

impl<'conn> Session<'conn> {
    pub fn new(conn: &'conn Connection, acting_as: Option<String>) -> Self {
        Self { conn, acting_as }
    }

    fn requester(&self) -> Result<UserId> {
        let username = self
            .acting_as
            .as_deref()
            .ok_or_else(|| anyhow!("this command needs --as <USERNAME>"))?;
        Ok(UserService::try_new(self.conn)?.find_user(username)?.id)
    }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn user(session: &Session<'_>, action: UserAction) -> Result<()> {
    let service = UserService::try_new(session.conn)?;
    let user = match action {
        UserAction::Register { username, email } => service.register_user(username, email)?,
        UserAction::Show { username } => service.find_user(&username)?,
    };
    print(&user)
}

pub fn project(session: &Session<'_>, action: ProjectAction) -> Result<()> {
    let service = ProjectService::try_new(session.conn)?;
    let requester = session.requester()?;
    match action {
        ProjectAction::Create { name, description } => {
            let project = service.create_project(ProjectDraft { name, description }, requester)?;
            print(&ProjectRead::from_project(&project))
        }
        ProjectAction::List => {
            let projects: Vec<ProjectRead> = service
                .list_owned_projects(requester)?
                .iter()
                .map(ProjectRead::from_project)
                .collect();
            print(&projects)
        }
        ProjectAction::Show { project } => {
            let access = service.get_project(project, requester)?;
            let capabilities: Vec<&str> = access
                .capabilities()
                .into_iter()
                .map(|capability| capability.as_str())
                .collect();
            print(&json!({
                "project": ProjectRead::from_project(&access.project),
                "is_owner": access.is_owner(),
                "capabilities": capabilities,
            }))
        }
        ProjectAction::Update {
            project,
            name,
            description,
        } => {
            let patch = ProjectPatch { name, description };
            let project = service.update_project(project, &patch, requester)?;
            print(&ProjectRead::from_project(&project))
        }
        ProjectAction::Delete { project } => {
            service.delete_project(project, requester)?;
            print(&json!({ "deleted": project }))
        }
    }
}

pub fn member(session: &Session<'_>, action: MemberAction) -> Result<()> {
    let service = MembershipService::try_new(session.conn)?;
    let requester = session.requester()?;
    match action {
        MemberAction::Add { project, username } => {
            let added = service.add_member(project, &username, requester)?;
            print(&MemberRead::from_member(&added.member, &added.user))
        }
        MemberAction::Remove { project, username } => {
            service.remove_member(project, &username, requester)?;
            print(&json!({ "removed": username, "project_id": project }))
        }
        MemberAction::List { project } => {
            let members: Vec<MemberRead> = service
                .list_members(project, requester)?
                .iter()
                .map(|entry| MemberRead::from_member(&entry.member, &entry.user))
                .collect();
            print(&members)
        }
        MemberAction::Decide { project, accept } => {
            let decision = service.decide_invite(project, accept, requester)?;
            print(&json!({
                "project_id": project,
                "decision": format!("{decision:?}").to_lowercase(),
            }))
        }
        MemberAction::Leave { project } => {
            service.leave_project(project, requester)?;
            print(&json!({ "left": project }))
        }
        MemberAction::Projects => {
            let joined = service.list_my_projects(requester)?;
            print(&memberships(&joined))
        }
        MemberAction::Invites => {
            let pending = service.list_pending_invites(requester)?;
            print(&memberships(&pending))
        }
    }
}

fn memberships(entries: &[taskboard_core::MembershipWithProject]) -> Vec<ProjectMemberRead> {
    entries
        .iter()
        .map(|entry| ProjectMemberRead::from_membership(&entry.member, &entry.project))
        .collect()
}

pub fn sprint(session: &Session<'_>, action: SprintAction) -> Result<()> {
    let service = SprintService::try_new(session.conn)?;
    let requester = session.requester()?;
    match action {
        SprintAction::Create {
            project,
            name,
            dates,
        } => {
            let draft = SprintDraft {
                name,
                start_date: dates.start,
                end_date: dates.end,
            };
            let sprint = service.create_sprint(project, draft, requester)?;
            print(&SprintRead::from_sprint(&sprint))
        }
        SprintAction::Show { sprint } => {
            let sprint = service.read_sprint(sprint, requester)?;
            print(&SprintRead::from_sprint(&sprint))
        }
        SprintAction::List { project } => {
            let sprints: Vec<SprintRead> = service
                .list_sprints(project, requester)?
                .iter()
                .map(SprintRead::from_sprint)
                .collect();
            print(&sprints)
        }
        SprintAction::Update {
            sprint,
            name,
            start,
            end,
            status,
        } => {
            let patch = SprintPatch {
                name,
                start_date: start,
                end_date: end,
                status,
            };
            let sprint = service.update_sprint(sprint, &patch, requester)?;
            print(&SprintRead::from_sprint(&sprint))
        }
        SprintAction::Delete { sprint } => {
            let unassigned = service.delete_sprint(sprint, requester)?;
            print(&json!({ "deleted": sprint, "unassigned_tasks": unassigned }))
        }
        SprintAction::Assign { task, sprint } => {
            let assigned = service.assign_task_to_sprint(task, sprint, requester)?;
            print(&TaskRead::from(&assigned))
        }
        SprintAction::Unassign { task } => {
            let task = service.unassign_task(task, requester)?;
            print(&TaskRead::from(&task))
        }
        SprintAction::Chart { sprint } => print(&service.sprint_chart(sprint, requester)?),
    }
}

pub fn task(session: &Session<'_>, action: TaskAction) -> Result<()> {
    let service = TaskService::try_new(session.conn)?;
    let requester = session.requester()?;
    let entry = match action {
        TaskAction::Create {
            project,
            name,
            description,
            priority,
        } => {
            let draft = TaskDraft {
                name,
                description,
                priority_id: priority,
            };
            service.create_task(project, draft, requester)?
        }
        TaskAction::List { project } => {
            let tasks: Vec<TaskRead> = service
                .list_tasks(project, requester)?
                .iter()
                .map(TaskRead::from)
                .collect();
            return print(&tasks);
        }
        TaskAction::Show { task } => service.get_task(task, requester)?,
        TaskAction::Update {
            task,
            name,
            description,
            priority,
        } => {
            let patch = TaskPatch {
                name,
                description,
                priority_id: priority,
            };
            service.update_task(task, &patch, requester)?
        }
        TaskAction::Finish { task, at } => {
            let finished_at = at.unwrap_or_else(|| Utc::now().naive_utc());
            service.finish_task(task, finished_at, requester)?
        }
        TaskAction::Reopen { task } => service.reopen_task(task, requester)?,
        TaskAction::Delete { task } => {
            service.delete_task(task, requester)?;
            return print(&json!({ "deleted": task }));
        }
    };
    print(&TaskRead::from(&entry))
}

pub fn priorities(session: &Session<'_>) -> Result<()> {
    let priorities: Vec<PriorityRead> = TaskService::try_new(session.conn)?
        .list_priorities()?
        .iter()
        .map(PriorityRead::from_priority)
        .collect();
    print(&priorities)
}
