//! Shared test utilities for roll-db unit tests.

pub(crate) mod helpers {
    use std::sync::Arc;

    use chrono::{DateTime, TimeDelta, TimeZone, Utc};
    use roll_config::AttendanceConfig;
    use roll_core::clock::ManualClock;
    use roll_core::entities::{ClassSession, Section, User};
    use roll_core::enums::Role;
    use roll_core::guard::Actor;

    use crate::RollDb;
    use crate::service::RollService;

    /// Monday 09:00 UTC, the start of every fixture schedule.
    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 12, 9, 0, 0).unwrap()
    }

    /// In-memory service with default settings, clock pinned at [`t0`].
    pub async fn test_service() -> RollService {
        let db = RollDb::open_local(":memory:").await.unwrap();
        RollService::from_db(db, Arc::new(ManualClock::new(t0())), AttendanceConfig::default())
    }

    /// In-memory service with a controllable clock and TTL.
    pub async fn clocked_service(ttl_minutes: u32) -> (RollService, Arc<ManualClock>) {
        let db = RollDb::open_local(":memory:").await.unwrap();
        let clock = Arc::new(ManualClock::new(t0()));
        let attendance = AttendanceConfig {
            code_ttl_minutes: ttl_minutes,
            ..Default::default()
        };
        (RollService::from_db(db, clock.clone(), attendance), clock)
    }

    /// A section with a lecturer, an assistant, and enrolled students.
    pub struct Fixture {
        pub section: Section,
        pub lecturer: User,
        pub assistant: User,
        pub students: Vec<User>,
        pub outsider: User,
        pub admin: User,
    }

    impl Fixture {
        pub fn lecturer(&self) -> Actor {
            Actor::from(&self.lecturer)
        }

        pub fn assistant(&self) -> Actor {
            Actor::from(&self.assistant)
        }

        pub fn student(&self, idx: usize) -> Actor {
            Actor::from(&self.students[idx])
        }

        pub fn outsider(&self) -> Actor {
            Actor::from(&self.outsider)
        }

        pub fn admin(&self) -> Actor {
            Actor::from(&self.admin)
        }
    }

    /// Seed one course and section with `enrolled` students plus one
    /// unenrolled student.
    pub async fn seed(svc: &RollService, enrolled: usize) -> Fixture {
        let lecturer = svc
            .create_user("lect", "lect@example.edu", Role::Lecturer)
            .await
            .unwrap();
        let assistant = svc
            .create_user("ta", "ta@example.edu", Role::Ta)
            .await
            .unwrap();
        let admin = svc
            .create_user("admin", "admin@example.edu", Role::Admin)
            .await
            .unwrap();
        let course = svc.create_course("CS101", "Intro").await.unwrap();
        let section = svc
            .create_section(&course.id, "A", &lecturer.id, Some(&assistant.id))
            .await
            .unwrap();

        let mut students = Vec::new();
        for i in 0..enrolled {
            let s = svc
                .create_user(
                    &format!("student{i}"),
                    &format!("student{i}@example.edu"),
                    Role::Student,
                )
                .await
                .unwrap();
            svc.enroll(&section.id, &s.id).await.unwrap();
            students.push(s);
        }
        let outsider = svc
            .create_user("outsider", "outsider@example.edu", Role::Student)
            .await
            .unwrap();

        Fixture {
            section,
            lecturer,
            assistant,
            students,
            outsider,
            admin,
        }
    }

    /// Schedule a one-hour session starting at `t0 + offset_hours`.
    pub async fn schedule(svc: &RollService, fx: &Fixture, offset_hours: i64) -> ClassSession {
        let start = t0() + TimeDelta::hours(offset_hours);
        svc.create_session(&fx.lecturer(), &fx.section.id, start, start + TimeDelta::hours(1))
            .await
            .unwrap()
    }
}
