use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::modules::course_groups::model::CourseGroupId;
use crate::modules::course_groups::repository::CourseGroupRepository;
use crate::modules::enrollments::model::{
    Enrollment, EnrollmentStatus, EnrollmentWithCourseGroup, NewEnrollment,
};
use crate::modules::enrollments::repository::EnrollmentRepository;
use crate::modules::students::model::{
    CreateStudentDto, CreatedStudentResponse, NewStudent, PaginatedStudentsResponse, Student,
    StudentChanges, StudentFilterParams, StudentId, StudentListItem, StudentWithEnrollments,
    UpdateStudentDto, UpdatedStudentResponse, validate_student,
};
use crate::modules::students::repository::StudentRepository;
use matricula_core::{AppError, FieldError, PaginationMeta};
use matricula_models::validation::normalize_cpf;

#[cfg(feature = "observability")]
use matricula_observability::metrics;

const EMAIL_TAKEN_MESSAGE: &str = "Este email já está cadastrado";

#[derive(Clone)]
pub struct StudentService {
    students: Arc<dyn StudentRepository>,
    course_groups: Arc<dyn CourseGroupRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
}

/// Drops repeated ids, keeping the first occurrence.
fn unique_ids(ids: Vec<CourseGroupId>) -> Vec<CourseGroupId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

impl StudentService {
    pub fn new(
        students: Arc<dyn StudentRepository>,
        course_groups: Arc<dyn CourseGroupRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self {
            students,
            course_groups,
            enrollments,
        }
    }

    #[instrument(skip(self), fields(db.table = "students"))]
    pub async fn get_students(
        &self,
        filters: StudentFilterParams,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        let (students, total) = self.students.find_all(&filters).await?;

        let ids: Vec<StudentId> = students.iter().map(|s| s.id).collect();
        let mut by_student: HashMap<StudentId, Vec<EnrollmentWithCourseGroup>> = HashMap::new();
        for detail in self.enrollments.find_by_students(&ids).await? {
            by_student
                .entry(detail.enrollment.student_id)
                .or_default()
                .push(detail.into());
        }

        let students = students
            .into_iter()
            .map(|student| {
                let enrollments = by_student.remove(&student.id).unwrap_or_default();
                let active_course_count = enrollments
                    .iter()
                    .filter(|e| e.enrollment.status == EnrollmentStatus::Active)
                    .count() as i64;
                StudentListItem {
                    student,
                    enrollments,
                    active_course_count,
                }
            })
            .collect();

        Ok(PaginatedStudentsResponse {
            students,
            meta: PaginationMeta::new(total, &filters.pagination),
        })
    }

    #[instrument(skip(self), fields(student.id = %id))]
    pub async fn get_student(&self, id: StudentId) -> Result<Student, AppError> {
        self.students
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::resource_not_found("Estudante"))
    }

    #[instrument(skip(self), fields(student.id = %id))]
    pub async fn get_student_with_enrollments(
        &self,
        id: StudentId,
    ) -> Result<StudentWithEnrollments, AppError> {
        let student = self.get_student(id).await?;
        let enrollments = self
            .enrollments
            .find_by_students(&[id])
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(StudentWithEnrollments {
            student,
            enrollments,
        })
    }

    async fn ensure_course_groups_exist(&self, ids: &[CourseGroupId]) -> Result<(), AppError> {
        for id in ids {
            if self.course_groups.find_by_id(*id).await?.is_none() {
                return Err(AppError::field(
                    "courseGroupIds",
                    &format!("Turma {id} não encontrada"),
                ));
            }
        }
        Ok(())
    }

    /// Collects every unique column already taken, in cpf, ra, email order.
    async fn find_conflicts(&self, student: &NewStudent) -> Result<Vec<FieldError>, AppError> {
        let mut conflicts = Vec::new();
        if self.students.find_by_cpf(&student.cpf).await?.is_some() {
            conflicts.push(FieldError::new("cpf", "Este CPF já está cadastrado"));
        }
        if self.students.find_by_ra(&student.ra).await?.is_some() {
            conflicts.push(FieldError::new("ra", "Este RA já está cadastrado"));
        }
        if self.students.find_by_email(&student.email).await?.is_some() {
            conflicts.push(FieldError::new("email", EMAIL_TAKEN_MESSAGE));
        }
        Ok(conflicts)
    }

    #[instrument(skip(self, dto), fields(db.operation = "INSERT", db.table = "students"))]
    pub async fn create_student(
        &self,
        dto: CreateStudentDto,
    ) -> Result<CreatedStudentResponse, AppError> {
        let errors = validate_student(&dto.fields(), false);
        if !errors.is_empty() {
            return Err(AppError::validation(errors));
        }

        // Every field is present once validation passed.
        let new_student = NewStudent {
            name: dto.name.unwrap_or_default(),
            email: dto.email.unwrap_or_default(),
            ra: dto.ra.unwrap_or_default(),
            cpf: normalize_cpf(dto.cpf.as_deref().unwrap_or_default()),
        };

        let conflicts = self.find_conflicts(&new_student).await?;
        if !conflicts.is_empty() {
            warn!(student.ra = %new_student.ra, "Attempted to create student with existing unique fields");
            return Err(AppError::validation(conflicts));
        }

        let course_group_ids = unique_ids(dto.course_group_ids.unwrap_or_default());
        self.ensure_course_groups_exist(&course_group_ids).await?;

        let student = self.students.create(new_student).await?;

        #[cfg(feature = "observability")]
        metrics::track_student_created();

        info!(student.id = %student.id, student.ra = %student.ra, "Student created successfully");

        if course_group_ids.is_empty() {
            return Ok(CreatedStudentResponse {
                student,
                enrollments: None,
            });
        }

        let enrollments = self.enroll_in(student.id, &course_group_ids).await?;
        Ok(CreatedStudentResponse {
            student,
            enrollments: Some(enrollments),
        })
    }

    /// Creates an active enrollment for each group the student is not yet in.
    async fn enroll_in(
        &self,
        student_id: StudentId,
        course_group_ids: &[CourseGroupId],
    ) -> Result<Vec<Enrollment>, AppError> {
        let mut created = Vec::new();
        for course_group_id in course_group_ids {
            if self
                .enrollments
                .find_by_pair(student_id, *course_group_id)
                .await?
                .is_some()
            {
                debug!(student.id = %student_id, course_group.id = %course_group_id, "Enrollment already exists, skipping");
                continue;
            }

            let enrollment = self
                .enrollments
                .create(NewEnrollment {
                    student_id,
                    course_group_id: *course_group_id,
                })
                .await?;

            #[cfg(feature = "observability")]
            metrics::track_enrollment_created();

            created.push(enrollment);
        }
        Ok(created)
    }

    #[instrument(skip(self, dto), fields(student.id = %id, db.operation = "UPDATE", db.table = "students"))]
    pub async fn update_student(
        &self,
        id: StudentId,
        dto: UpdateStudentDto,
    ) -> Result<UpdatedStudentResponse, AppError> {
        let immutable = dto.immutable_field_errors();
        if !immutable.is_empty() {
            return Err(AppError::validation(immutable));
        }

        let errors = validate_student(&dto.fields(), true);
        if !errors.is_empty() {
            return Err(AppError::validation(errors));
        }

        let current = self.get_student(id).await?;

        if let Some(email) = dto.email.as_deref() {
            if email != current.email && self.students.find_by_email(email).await?.is_some() {
                return Err(AppError::field("email", EMAIL_TAKEN_MESSAGE));
            }
        }

        let course_group_ids = dto.course_group_ids.map(unique_ids);
        if let Some(ids) = &course_group_ids {
            self.ensure_course_groups_exist(ids).await?;
        }

        let changes = StudentChanges {
            name: dto.name,
            email: dto.email,
        };
        let student = if changes.is_empty() {
            current
        } else {
            self.students
                .update(id, changes)
                .await?
                .ok_or_else(|| AppError::resource_not_found("Estudante"))?
        };

        let new_enrollments = match course_group_ids {
            Some(ids) => Some(self.enroll_in(id, &ids).await?),
            None => None,
        };

        info!(student.id = %student.id, "Student updated successfully");

        Ok(UpdatedStudentResponse {
            student,
            new_enrollments,
        })
    }

    #[instrument(skip(self), fields(student.id = %id, db.operation = "DELETE", db.table = "students"))]
    pub async fn delete_student(&self, id: StudentId) -> Result<(), AppError> {
        if !self.students.delete(id).await? {
            return Err(AppError::resource_not_found("Estudante"));
        }

        info!(student.id = %id, "Student deleted successfully");
        Ok(())
    }
}
