use std::sync::Arc;

use sqlx::PgPool;

use crate::modules::auth::service::AuthService;
use crate::modules::course_groups::repository::{CourseGroupRepository, PgCourseGroupRepository};
use crate::modules::course_groups::service::CourseGroupService;
use crate::modules::enrollments::repository::{EnrollmentRepository, PgEnrollmentRepository};
use crate::modules::enrollments::service::EnrollmentService;
use crate::modules::students::repository::{PgStudentRepository, StudentRepository};
use crate::modules::students::service::StudentService;
use crate::modules::users::repository::{PgUserRepository, UserRepository};
use crate::modules::users::service::UserService;
use matricula_config::{CorsConfig, JwtConfig, ServerConfig};

/// The storage backends the services are built on.
#[derive(Clone)]
pub struct Repositories {
    pub students: Arc<dyn StudentRepository>,
    pub course_groups: Arc<dyn CourseGroupRepository>,
    pub enrollments: Arc<dyn EnrollmentRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn postgres(db: PgPool) -> Self {
        Self {
            students: Arc::new(PgStudentRepository::new(db.clone())),
            course_groups: Arc::new(PgCourseGroupRepository::new(db.clone())),
            enrollments: Arc::new(PgEnrollmentRepository::new(db.clone())),
            users: Arc::new(PgUserRepository::new(db)),
        }
    }

    #[cfg(any(test, feature = "test-utils"))]
    pub fn in_memory(store: crate::testing::MemoryStore) -> Self {
        Self {
            students: Arc::new(store.clone()),
            course_groups: Arc::new(store.clone()),
            enrollments: Arc::new(store.clone()),
            users: Arc::new(store),
        }
    }
}

/// Shared by every handler. Services are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub students: StudentService,
    pub course_groups: CourseGroupService,
    pub enrollments: EnrollmentService,
    pub users: UserService,
    pub auth: AuthService,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub server_config: ServerConfig,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        jwt_config: JwtConfig,
        cors_config: CorsConfig,
        server_config: ServerConfig,
    ) -> Self {
        Self {
            students: StudentService::new(
                repos.students.clone(),
                repos.course_groups.clone(),
                repos.enrollments.clone(),
            ),
            course_groups: CourseGroupService::new(
                repos.course_groups.clone(),
                repos.enrollments.clone(),
            ),
            enrollments: EnrollmentService::new(
                repos.enrollments,
                repos.students,
                repos.course_groups,
            ),
            users: UserService::new(repos.users.clone()),
            auth: AuthService::new(repos.users, jwt_config.clone()),
            jwt_config,
            cors_config,
            server_config,
        }
    }

    /// State backed by PostgreSQL with configuration read from the environment.
    pub fn from_env(db: PgPool) -> Self {
        Self::new(
            Repositories::postgres(db),
            JwtConfig::from_env(),
            CorsConfig::from_env(),
            ServerConfig::from_env(),
        )
    }
}
