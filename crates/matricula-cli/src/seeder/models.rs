//! Seed records and seeding configuration.

use chrono::{DateTime, Utc};
use matricula_models::{CourseGroupId, StudentId};

/// Marks course groups created by the seeder so they can be cleared later.
pub const SEED_COURSE_GROUP_DESCRIPTION: &str = "Turma gerada pelo seeder";

/// Seed data for creating a student.
pub struct StudentSeed {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub ra: String,
    pub cpf: String,
}

/// Seed data for creating a course group.
pub struct CourseGroupSeed {
    pub id: CourseGroupId,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_students: i32,
}

/// Complete configuration for database seeding.
#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub num_students: usize,
    pub num_course_groups: usize,
    /// Enroll every seeded student in one seeded course group
    pub enroll_students: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            num_students: 100,
            num_course_groups: 5,
            enroll_students: true,
        }
    }
}

impl SeedConfig {
    pub fn new(num_students: usize, num_course_groups: usize) -> Self {
        Self {
            num_students,
            num_course_groups,
            ..Default::default()
        }
    }

    pub fn with_enrollments(mut self, enroll_students: bool) -> Self {
        self.enroll_students = enroll_students;
        self
    }
}
