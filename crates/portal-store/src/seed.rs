//! Bootstrap data written the first time a collection is read.

use chrono::Utc;

use portal_shared::constants::{AVATAR_BASE_URL, SEED_SECRET};
use portal_shared::{
    DepartmentId, MessageId, Role, SocialLinks, TestimonialId, ThreadId, UserId,
};

use crate::models::{ChatMessage, Department, Testimonial, Thread, ThreadMessage, User};

pub fn departments() -> Vec<Department> {
    let now = Utc::now();
    [
        ("d1", "Computer Science (CSE)"),
        ("d2", "Electronics (ECE)"),
        ("d3", "Mechanical (MECH)"),
    ]
    .into_iter()
    .map(|(id, name)| Department {
        id: DepartmentId::from(id),
        name: name.to_string(),
        created_at: now,
    })
    .collect()
}

pub fn users() -> Vec<User> {
    let now = Utc::now();
    let accounts: [(&str, &str, &str, Role, Option<&str>); 5] = [
        ("u1", "Super Admin", "admin@jntugv.edu", Role::Admin, None),
        ("u2", "Dr. Principal", "principal@jntugv.edu", Role::Principal, None),
        ("u3", "Prof. HOD CSE", "hod.cse@jntugv.edu", Role::Hod, Some("d1")),
        ("u4", "Coord CSE", "coord.cse@jntugv.edu", Role::Coordinator, Some("d1")),
        ("u5", "John Alumni", "alumni@gmail.com", Role::Alumni, Some("d1")),
    ];

    accounts
        .into_iter()
        .enumerate()
        .map(|(i, (id, name, email, role, department))| User {
            id: UserId::from(id),
            name: name.to_string(),
            email: email.to_string(),
            secret: SEED_SECRET.to_string(),
            role,
            department_id: department.map(DepartmentId::from),
            is_approved: true,
            avatar: Some(format!("{AVATAR_BASE_URL}?random={}", i + 1)),
            social_links: (role == Role::Alumni).then(|| SocialLinks {
                linkedin: Some("john-doe".to_string()),
                ..SocialLinks::default()
            }),
            created_at: now,
        })
        .collect()
}

pub fn testimonials() -> Vec<Testimonial> {
    vec![Testimonial {
        id: TestimonialId::from("t1"),
        alumni_id: UserId::from("u5"),
        alumni_name: "John Alumni".to_string(),
        department_id: Some(DepartmentId::from("d1")),
        text: "JNTUGV gave me the best foundation for my career at Google.".to_string(),
        is_approved: true,
        created_at: Utc::now(),
    }]
}

pub fn threads() -> Vec<Thread> {
    let now = Utc::now();
    vec![Thread {
        id: ThreadId::from("th1"),
        title: "Upcoming Alumni Meet 2024".to_string(),
        created_by_id: UserId::from("u4"),
        created_by_name: "Coord CSE".to_string(),
        messages: vec![ThreadMessage {
            id: MessageId::from("m1"),
            text: "Hi everyone, we are planning a meetup in December.".to_string(),
            sender_id: UserId::from("u4"),
            sender_name: "Coord CSE".to_string(),
            timestamp: now,
        }],
        created_at: now,
    }]
}

pub fn chat_messages() -> Vec<ChatMessage> {
    Vec::new()
}
