//! End-to-end flows across identity, policy and the domain services.

use portal_core::{
    Moderation, Portal, PortalConfig, PortalError, Role, Screen, UserDraft, UserFilter,
};
use portal_shared::{DepartmentId, ThreadId, UserId};

fn portal() -> Portal {
    Portal::open_in_memory().unwrap()
}

fn alumni_draft(email: &str, department: &str) -> UserDraft {
    UserDraft {
        name: "Asha Rao".into(),
        email: email.into(),
        secret: "s3cret".into(),
        role: Role::Alumni,
        department_id: Some(DepartmentId::from(department)),
        social_links: None,
        is_approved: false,
    }
}

#[test]
fn seeded_admin_signs_in_and_reaches_admin_screens() {
    let portal = portal();
    let admin = portal.authenticate("admin@jntugv.edu", "admin").unwrap();

    assert_eq!(admin.role(), Role::Admin);
    assert_eq!(admin.user_id(), &UserId::from("u1"));
    assert!(portal.can_enter(&admin, Screen::Users).unwrap());
    assert!(portal.can_enter(&admin, Screen::Departments).unwrap());
    assert!(!portal.can_enter(&admin, Screen::Chat).unwrap());
}

#[test]
fn registration_waits_for_coordinator_approval() {
    let portal = portal();
    let draft = alumni_draft("asha@x.edu", "d1");
    let registered = portal.register(draft).unwrap();

    assert_eq!(
        portal.authenticate("asha@x.edu", "s3cret"),
        Err(PortalError::PendingApproval)
    );

    let coord = portal.authenticate("coord.cse@jntugv.edu", "admin").unwrap();
    let pending = portal
        .list_users(
            &coord,
            &UserFilter {
                pending_only: true,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, registered.id);

    portal.approve_user(&coord, &registered.id).unwrap();

    let session = portal.authenticate("asha@x.edu", "s3cret").unwrap();
    assert_eq!(session.role(), Role::Alumni);
    assert_eq!(session.department_id(), Some(&DepartmentId::from("d1")));
}

#[test]
fn hod_scope_follows_the_department_captured_at_submission() {
    let portal = portal();
    let alumni = portal.authenticate("alumni@gmail.com", "admin").unwrap();
    let submitted = portal
        .submit_testimonial(&alumni, "Placement cell was superb.")
        .unwrap();

    // Move the author to ECE after the fact.
    let admin = portal.authenticate("admin@jntugv.edu", "admin").unwrap();
    let mut snapshot = portal.export_snapshot(&admin).unwrap();
    for user in snapshot.users.iter_mut().filter(|u| &u.id == alumni.user_id()) {
        user.department_id = Some(DepartmentId::from("d2"));
    }
    portal.import_snapshot(&admin, &snapshot).unwrap();

    let hod = portal.authenticate("hod.cse@jntugv.edu", "admin").unwrap();
    let visible = portal.list_testimonials(&hod).unwrap();
    assert!(visible.iter().any(|t| t.id == submitted.id));
    assert!(visible
        .iter()
        .all(|t| t.department_id == Some(DepartmentId::from("d1"))));
}

#[test]
fn hod_and_alumni_share_one_conversation() {
    let portal = portal();
    let alumni = portal.authenticate("alumni@gmail.com", "admin").unwrap();
    let hod = portal.authenticate("hod.cse@jntugv.edu", "admin").unwrap();

    portal
        .send_message(&alumni, hod.user_id(), "Can I visit the lab?")
        .unwrap();
    portal.send_message(&hod, alumni.user_id(), "Of course.").unwrap();
    portal.send_message(&alumni, hod.user_id(), "Thanks!").unwrap();

    let a = portal.list_conversation(&alumni, hod.user_id()).unwrap();
    let b = portal.list_conversation(&hod, alumni.user_id()).unwrap();
    assert_eq!(a, b);

    let texts: Vec<&str> = a.iter().map(|m| m.message.as_str()).collect();
    assert_eq!(texts, vec!["Can I visit the lab?", "Of course.", "Thanks!"]);
    assert!(a.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
}

#[test]
fn rejected_testimonial_never_comes_back() {
    let portal = portal();
    let alumni = portal.authenticate("alumni@gmail.com", "admin").unwrap();
    let t = portal.submit_testimonial(&alumni, "Too short").unwrap();

    let admin = portal.authenticate("admin@jntugv.edu", "admin").unwrap();
    assert_eq!(
        portal.moderate_testimonial(&admin, &t.id, false).unwrap(),
        Moderation::Rejected(t.id.clone())
    );

    let principal = portal.authenticate("principal@jntugv.edu", "admin").unwrap();
    for session in [&admin, &principal] {
        assert!(portal
            .list_testimonials(session)
            .unwrap()
            .iter()
            .all(|x| x.id != t.id));
    }
    assert!(portal
        .public_testimonials(usize::MAX)
        .unwrap()
        .iter()
        .all(|x| x.id != t.id));
}

#[test]
fn forum_lists_newest_thread_first() {
    let portal = portal();
    let coord = portal.authenticate("coord.cse@jntugv.edu", "admin").unwrap();
    let t1 = portal.create_thread(&coord, "Reunion venue").unwrap();
    let t2 = portal.create_thread(&coord, "Mentorship drive").unwrap();

    let threads = portal.list_threads(&coord).unwrap();
    assert_eq!(threads[0].id, t2.id);
    assert_eq!(threads[1].id, t1.id);
    assert_eq!(threads[2].id, ThreadId::from("th1"));
}

#[test]
fn approving_twice_changes_nothing() {
    let portal = portal();
    let user = portal.register(alumni_draft("twice@x.edu", "d1")).unwrap();
    let admin = portal.authenticate("admin@jntugv.edu", "admin").unwrap();

    let once = portal.approve_user(&admin, &user.id).unwrap();
    let before = portal.export_snapshot(&admin).unwrap().users;
    let twice = portal.approve_user(&admin, &user.id).unwrap();
    let after = portal.export_snapshot(&admin).unwrap().users;

    assert_eq!(once, twice);
    assert_eq!(before, after);
}

#[test]
fn state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = PortalConfig {
        db_path: Some(dir.path().join("portal.db")),
        ..Default::default()
    };

    {
        let portal = Portal::open(config.clone()).unwrap();
        let alumni = portal.authenticate("alumni@gmail.com", "admin").unwrap();
        portal.create_thread(&alumni, "Batch of 2015").unwrap();
    }

    let portal = Portal::open(config).unwrap();
    let session = portal.restore_session().unwrap().unwrap();
    assert_eq!(session.user_id(), &UserId::from("u5"));
    let threads = portal.list_threads(&session).unwrap();
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0].title, "Batch of 2015");
}
