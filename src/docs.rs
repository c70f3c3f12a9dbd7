use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::auth::model::{ChangePasswordDto, LoginRequest, LoginResponse};
use crate::modules::course_groups::model::{
    CourseGroup, CourseGroupDto, CourseGroupSummary, PaginatedCourseGroupsResponse,
};
use crate::modules::enrollments::model::{
    Enrollment, EnrollmentDetail, EnrollmentRequest, EnrollmentStatus, EnrollmentWithCourseGroup,
    EnrollmentWithStudent, PaginatedEnrollmentsResponse,
};
use crate::modules::students::model::{
    CreateStudentDto, CreatedStudentResponse, PaginatedStudentsResponse, Student,
    StudentListItem, StudentSummary, StudentWithEnrollments, UpdateStudentDto,
    UpdatedStudentResponse,
};
use crate::modules::users::model::{
    CreateUserDto, PaginatedUsersResponse, UpdateProfileDto, UpdateUserDto, User, UserRole,
};
use matricula_core::errors::ErrorResponse;
use matricula_core::{FieldError, PaginationMeta, PaginationParams};

/// Every success body is wrapped in `{object, status, message, data}`; the
/// schemas below describe `data`.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::login_user,
        crate::modules::auth::controller::change_password,
        crate::modules::users::controller::get_profile,
        crate::modules::users::controller::update_profile,
        crate::modules::users::controller::get_users,
        crate::modules::users::controller::create_user,
        crate::modules::users::controller::get_user,
        crate::modules::users::controller::update_user,
        crate::modules::users::controller::delete_user,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::get_student_enrollments,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::course_groups::controller::get_course_groups,
        crate::modules::course_groups::controller::get_course_group,
        crate::modules::course_groups::controller::get_course_group_enrollments,
        crate::modules::course_groups::controller::create_course_group,
        crate::modules::course_groups::controller::update_course_group,
        crate::modules::course_groups::controller::delete_course_group,
        crate::modules::enrollments::controller::enroll_student,
        crate::modules::enrollments::controller::cancel_enrollment,
        crate::modules::enrollments::controller::get_enrollments,
        crate::modules::enrollments::controller::get_enrollment,
        crate::modules::enrollments::controller::delete_enrollment,
    ),
    components(
        schemas(
            User,
            UserRole,
            CreateUserDto,
            UpdateUserDto,
            UpdateProfileDto,
            LoginRequest,
            LoginResponse,
            ChangePasswordDto,
            Student,
            StudentSummary,
            StudentListItem,
            StudentWithEnrollments,
            CreateStudentDto,
            UpdateStudentDto,
            CreatedStudentResponse,
            UpdatedStudentResponse,
            PaginatedStudentsResponse,
            CourseGroup,
            CourseGroupSummary,
            CourseGroupDto,
            PaginatedCourseGroupsResponse,
            Enrollment,
            EnrollmentStatus,
            EnrollmentDetail,
            EnrollmentWithCourseGroup,
            EnrollmentWithStudent,
            EnrollmentRequest,
            PaginatedEnrollmentsResponse,
            ErrorResponse,
            FieldError,
            PaginationMeta,
            PaginationParams,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and password change"),
        (name = "Users", description = "Profile and user management"),
        (name = "Students", description = "Student management"),
        (name = "Course Groups", description = "Course group (turma) management"),
        (name = "Enrollments", description = "Enrolling students in course groups")
    ),
    info(
        title = "Matrícula API",
        version = "1.0.0",
        description = "Academic enrollment API: students, course groups and enrollments, with JWT authentication and admin/student roles.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
