use rusqlite::Connection;
use taskboard_core::db::open_db_in_memory;
use taskboard_core::repo::member_repo::{MemberRepository, SqliteMemberRepository};
use taskboard_core::{
    ErrorKind, InviteDecision, Member, MemberStatus, MembershipService, Project, ProjectDraft,
    ProjectService, RepoError, ServiceError, User, UserService,
};
use uuid::Uuid;

fn user(conn: &Connection, username: &str) -> User {
    UserService::try_new(conn)
        .unwrap()
        .register_user(username, None)
        .unwrap()
}

fn project(conn: &Connection, owner: &User, name: &str) -> Project {
    ProjectService::try_new(conn)
        .unwrap()
        .create_project(
            ProjectDraft {
                name: name.to_string(),
                description: Some("Project under test".to_string()),
            },
            owner.id,
        )
        .unwrap()
}

fn joined_project_ids(service: &MembershipService<'_>, user: &User) -> Vec<Uuid> {
    service
        .list_my_projects(user.id)
        .unwrap()
        .into_iter()
        .map(|entry| entry.project.id)
        .collect()
}

#[test]
fn invite_accept_leave_lifecycle() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let board = project(&conn, &alice, "Board");
    let service = MembershipService::try_new(&conn).unwrap();

    let added = service.add_member(board.id, "bob", alice.id).unwrap();
    assert_eq!(added.user.id, bob.id);
    assert_eq!(added.member.status, MemberStatus::Pending);
    assert!(joined_project_ids(&service, &bob).is_empty());

    let pending = service.list_pending_invites(bob.id).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].project.id, board.id);

    let decision = service.decide_invite(board.id, true, bob.id).unwrap();
    assert_eq!(decision, InviteDecision::Accepted);
    assert_eq!(joined_project_ids(&service, &bob), vec![board.id]);
    assert!(service.list_pending_invites(bob.id).unwrap().is_empty());

    service.leave_project(board.id, bob.id).unwrap();
    assert!(joined_project_ids(&service, &bob).is_empty());
    assert!(service.list_members(board.id, alice.id).unwrap().is_empty());
}

#[test]
fn adding_same_user_twice_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    user(&conn, "bob");
    let board = project(&conn, &alice, "Board");
    let service = MembershipService::try_new(&conn).unwrap();

    service.add_member(board.id, "bob", alice.id).unwrap();
    let err = service.add_member(board.id, "bob", alice.id).unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyMember { .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(service.list_members(board.id, alice.id).unwrap().len(), 1);
}

#[test]
fn owner_cannot_be_invited_to_own_project() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let board = project(&conn, &alice, "Board");
    let service = MembershipService::try_new(&conn).unwrap();

    let err = service.add_member(board.id, "alice", alice.id).unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyMember { .. }));
}

#[test]
fn add_member_requires_owner_and_known_user() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    user(&conn, "carol");
    let board = project(&conn, &alice, "Board");
    let service = MembershipService::try_new(&conn).unwrap();

    let err = service.add_member(board.id, "carol", bob.id).unwrap_err();
    assert!(matches!(err, ServiceError::NotOwner(id) if id == board.id));
    assert_eq!(err.kind(), ErrorKind::Forbidden);

    let err = service.add_member(board.id, "nobody", alice.id).unwrap_err();
    assert!(matches!(err, ServiceError::UserNotFound(ref name) if name == "nobody"));

    let err = service
        .add_member(Uuid::new_v4(), "bob", alice.id)
        .unwrap_err();
    assert!(matches!(err, ServiceError::ProjectNotFound(_)));
}

#[test]
fn accepted_member_still_cannot_invite() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    user(&conn, "carol");
    let board = project(&conn, &alice, "Board");
    let service = MembershipService::try_new(&conn).unwrap();

    service.add_member(board.id, "bob", alice.id).unwrap();
    service.decide_invite(board.id, true, bob.id).unwrap();

    let err = service.add_member(board.id, "carol", bob.id).unwrap_err();
    assert!(matches!(err, ServiceError::NotOwner(_)));
}

#[test]
fn declining_removes_invite_and_allows_reinvite() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let board = project(&conn, &alice, "Board");
    let service = MembershipService::try_new(&conn).unwrap();

    service.add_member(board.id, "bob", alice.id).unwrap();
    let decision = service.decide_invite(board.id, false, bob.id).unwrap();
    assert_eq!(decision, InviteDecision::Declined);
    assert!(joined_project_ids(&service, &bob).is_empty());
    assert!(service.list_members(board.id, alice.id).unwrap().is_empty());

    service.add_member(board.id, "bob", alice.id).unwrap();
    assert_eq!(service.list_pending_invites(bob.id).unwrap().len(), 1);
}

#[test]
fn decision_without_pending_invite_fails() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let board = project(&conn, &alice, "Board");
    let service = MembershipService::try_new(&conn).unwrap();

    let err = service.decide_invite(board.id, true, bob.id).unwrap_err();
    assert!(matches!(err, ServiceError::NoPendingInvite(_)));

    service.add_member(board.id, "bob", alice.id).unwrap();
    service.decide_invite(board.id, true, bob.id).unwrap();
    let err = service.decide_invite(board.id, false, bob.id).unwrap_err();
    assert!(matches!(err, ServiceError::NoPendingInvite(_)));
    assert_eq!(joined_project_ids(&service, &bob), vec![board.id]);
}

#[test]
fn owner_cannot_leave() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let board = project(&conn, &alice, "Board");
    let service = MembershipService::try_new(&conn).unwrap();

    let err = service.leave_project(board.id, alice.id).unwrap_err();
    assert!(matches!(err, ServiceError::OwnerCannotLeave(_)));
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn leave_requires_accepted_membership() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let board = project(&conn, &alice, "Board");
    let service = MembershipService::try_new(&conn).unwrap();

    let err = service.leave_project(board.id, bob.id).unwrap_err();
    assert!(matches!(err, ServiceError::NotAMember(_)));

    service.add_member(board.id, "bob", alice.id).unwrap();
    let err = service.leave_project(board.id, bob.id).unwrap_err();
    assert!(matches!(err, ServiceError::NotAMember(_)));

    let err = service.leave_project(Uuid::new_v4(), bob.id).unwrap_err();
    assert!(matches!(err, ServiceError::ProjectNotFound(_)));
}

#[test]
fn removing_member_twice_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let board = project(&conn, &alice, "Board");
    let service = MembershipService::try_new(&conn).unwrap();

    service.add_member(board.id, "bob", alice.id).unwrap();
    service.decide_invite(board.id, true, bob.id).unwrap();

    service.remove_member(board.id, "bob", alice.id).unwrap();
    assert!(joined_project_ids(&service, &bob).is_empty());

    let err = service.remove_member(board.id, "bob", alice.id).unwrap_err();
    assert!(matches!(err, ServiceError::MemberNotFound { ref username, .. } if username == "bob"));
}

#[test]
fn owner_can_withdraw_pending_invite() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let board = project(&conn, &alice, "Board");
    let service = MembershipService::try_new(&conn).unwrap();

    service.add_member(board.id, "bob", alice.id).unwrap();
    service.remove_member(board.id, "bob", alice.id).unwrap();

    assert!(service.list_pending_invites(bob.id).unwrap().is_empty());
    let err = service.decide_invite(board.id, true, bob.id).unwrap_err();
    assert!(matches!(err, ServiceError::NoPendingInvite(_)));
}

#[test]
fn remove_member_requires_owner() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let board = project(&conn, &alice, "Board");
    let service = MembershipService::try_new(&conn).unwrap();

    service.add_member(board.id, "bob", alice.id).unwrap();
    service.decide_invite(board.id, true, bob.id).unwrap();

    let err = service.remove_member(board.id, "bob", bob.id).unwrap_err();
    assert!(matches!(err, ServiceError::NotOwner(_)));
    assert_eq!(joined_project_ids(&service, &bob), vec![board.id]);
}

#[test]
fn member_list_is_visible_to_owner_and_accepted_members_only() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let carol = user(&conn, "carol");
    let dave = user(&conn, "dave");
    let board = project(&conn, &alice, "Board");
    let service = MembershipService::try_new(&conn).unwrap();

    service.add_member(board.id, "carol", alice.id).unwrap();
    service.add_member(board.id, "bob", alice.id).unwrap();
    service.decide_invite(board.id, true, bob.id).unwrap();

    let listed = service.list_members(board.id, alice.id).unwrap();
    let rows: Vec<(&str, MemberStatus)> = listed
        .iter()
        .map(|entry| (entry.user.username.as_str(), entry.member.status))
        .collect();
    assert_eq!(
        rows,
        vec![("bob", MemberStatus::Accepted), ("carol", MemberStatus::Pending)]
    );

    assert_eq!(service.list_members(board.id, bob.id).unwrap().len(), 2);

    let err = service.list_members(board.id, carol.id).unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    let err = service.list_members(board.id, dave.id).unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[test]
fn joined_projects_exclude_owned_projects() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let alice_board = project(&conn, &alice, "Alice board");
    let bob_board = project(&conn, &bob, "Bob board");
    let service = MembershipService::try_new(&conn).unwrap();

    service.add_member(alice_board.id, "bob", alice.id).unwrap();
    service.decide_invite(alice_board.id, true, bob.id).unwrap();

    assert_eq!(joined_project_ids(&service, &bob), vec![alice_board.id]);
    assert!(joined_project_ids(&service, &alice).is_empty());
    assert_ne!(alice_board.id, bob_board.id);
}

#[test]
fn deleting_project_drops_memberships() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let board = project(&conn, &alice, "Board");
    let service = MembershipService::try_new(&conn).unwrap();

    service.add_member(board.id, "bob", alice.id).unwrap();
    service.decide_invite(board.id, true, bob.id).unwrap();

    ProjectService::try_new(&conn)
        .unwrap()
        .delete_project(board.id, alice.id)
        .unwrap();

    assert!(joined_project_ids(&service, &bob).is_empty());
    let err = service.list_members(board.id, alice.id).unwrap_err();
    assert!(matches!(err, ServiceError::ProjectNotFound(_)));
}

#[test]
fn unique_constraint_rejects_second_row_for_same_pair() {
    let conn = open_db_in_memory().unwrap();
    let alice = user(&conn, "alice");
    let bob = user(&conn, "bob");
    let board = project(&conn, &alice, "Board");
    let repo = SqliteMemberRepository::new(&conn);

    repo.create_member(&Member::invite(board.id, bob.id)).unwrap();
    let err = repo
        .create_member(&Member::invite(board.id, bob.id))
        .unwrap_err();
    assert!(matches!(err, RepoError::Duplicate { entity: "member", .. }));

    let service = MembershipService::try_new(&conn).unwrap();
    assert_eq!(service.list_members(board.id, alice.id).unwrap().len(), 1);
    let err = service.add_member(board.id, "bob", alice.id).unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyMember { .. }));
}
