//! Shared setup for roll-db integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use roll_config::AttendanceConfig;
use roll_core::clock::ManualClock;
use roll_core::entities::{ClassSession, Section, User};
use roll_core::enums::Role;
use roll_core::guard::Actor;
use roll_db::RollDb;
use roll_db::service::RollService;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 12, 9, 0, 0).unwrap()
}

pub async fn service_at(path: &str, clock: Arc<ManualClock>, ttl_minutes: u32) -> RollService {
    let db = RollDb::open_local(path).await.unwrap();
    let attendance = AttendanceConfig {
        code_ttl_minutes: ttl_minutes,
        ..Default::default()
    };
    RollService::from_db(db, clock, attendance)
}

pub async fn memory_service(ttl_minutes: u32) -> (RollService, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    (service_at(":memory:", clock.clone(), ttl_minutes).await, clock)
}

pub struct Class {
    pub section: Section,
    pub lecturer: Actor,
    pub students: Vec<User>,
}

impl Class {
    pub fn student(&self, idx: usize) -> Actor {
        Actor::from(&self.students[idx])
    }
}

/// One lecturer-owned section with `n` enrolled students.
pub async fn seed_class(svc: &RollService, n: usize) -> Class {
    let lecturer = svc
        .create_user("prof", "prof@example.edu", Role::Lecturer)
        .await
        .unwrap();
    let course = svc.create_course("MATH200", "Linear Algebra").await.unwrap();
    let section = svc
        .create_section(&course.id, "B", &lecturer.id, None)
        .await
        .unwrap();
    let mut students = Vec::new();
    for i in 0..n {
        let s = svc
            .create_user(&format!("s{i}"), &format!("s{i}@example.edu"), Role::Student)
            .await
            .unwrap();
        svc.enroll(&section.id, &s.id).await.unwrap();
        students.push(s);
    }
    Class {
        section,
        lecturer: Actor::from(&lecturer),
        students,
    }
}

pub async fn schedule_at(svc: &RollService, class: &Class, offset_hours: i64) -> ClassSession {
    let start = t0() + TimeDelta::hours(offset_hours);
    svc.create_session(&class.lecturer, &class.section.id, start, start + TimeDelta::hours(1))
        .await
        .unwrap()
}
