//! Course group ("turma") models, DTOs and validation.

use chrono::{DateTime, Utc};
use matricula_core::serde::deserialize_present;
use matricula_core::{AppError, FieldError, PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ids::CourseGroupId;
use crate::validation::{
    char_len_between, is_missing, parse_date, parse_non_negative_int, present,
};

pub const DATE_RANGE_MESSAGE: &str = "A data de início deve ser anterior à data de término";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CourseGroup {
    pub id: CourseGroupId,
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// `0` or `null` means unlimited
    pub max_students: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The course group fields embedded in enrollment listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CourseGroupSummary {
    pub id: CourseGroupId,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl From<&CourseGroup> for CourseGroupSummary {
    fn from(group: &CourseGroup) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            start_date: group.start_date,
            end_date: group.end_date,
        }
    }
}

/// Payload for both create and update.
///
/// Dates stay as strings until validated so a malformed value is reported
/// as a field error rather than a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct CourseGroupDto {
    #[serde(default)]
    pub name: Option<String>,
    /// `null` clears the description on update
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    #[schema(example = "2025-02-01")]
    pub start_date: Option<String>,
    #[serde(default)]
    #[schema(example = "2025-06-30")]
    pub end_date: Option<String>,
    /// Non-negative whole number; `null` clears the limit
    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<i32>)]
    pub max_students: Option<Value>,
}

pub fn validate_course_group(data: &CourseGroupDto, is_update: bool) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if is_missing(data.name.as_deref(), is_update) {
        errors.push(FieldError::new("name", "O nome da turma é obrigatório"));
    }
    if is_missing(data.start_date.as_deref(), is_update) {
        errors.push(FieldError::new("start_date", "A data de início é obrigatória"));
    }
    if is_missing(data.end_date.as_deref(), is_update) {
        errors.push(FieldError::new("end_date", "A data de término é obrigatória"));
    }

    if let Some(name) = present(data.name.as_deref()) {
        if !char_len_between(name, 3, 100) {
            errors.push(FieldError::new(
                "name",
                "O nome da turma deve ter entre 3 e 100 caracteres",
            ));
        }
    }

    if let Some(value) = data.max_students.as_ref().filter(|v| !v.is_null()) {
        if parse_non_negative_int(value).is_none() {
            errors.push(FieldError::new(
                "max_students",
                "O número máximo de estudantes deve ser um número não negativo",
            ));
        }
    }

    if let Some(start) = present(data.start_date.as_deref()) {
        if parse_date(start).is_none() {
            errors.push(FieldError::new("start_date", "A data de início é inválida"));
        }
    }
    if let Some(end) = present(data.end_date.as_deref()) {
        if parse_date(end).is_none() {
            errors.push(FieldError::new("end_date", "A data de término é inválida"));
        }
    }

    errors
}

/// Values written on insert.
#[derive(Debug, Clone)]
pub struct NewCourseGroup {
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub max_students: Option<i32>,
}

impl NewCourseGroup {
    /// Converts a payload that already passed [`validate_course_group`].
    pub fn from_dto(dto: CourseGroupDto) -> Result<Self, AppError> {
        let changes = CourseGroupChanges::from_dto(dto)?;
        let (Some(name), Some(start_date), Some(end_date)) =
            (changes.name, changes.start_date, changes.end_date)
        else {
            return Err(AppError::validation(validate_course_group(
                &CourseGroupDto::default(),
                false,
            )));
        };

        Ok(Self {
            name,
            description: changes.description.flatten(),
            start_date,
            end_date,
            max_students: changes.max_students.flatten(),
        })
    }
}

/// Allow-listed columns a course group update may touch.
///
/// The outer `Option` is "leave unchanged"; for nullable columns the inner
/// `None` writes `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseGroupChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub max_students: Option<Option<i32>>,
}

impl CourseGroupChanges {
    /// Converts a payload that already passed [`validate_course_group`].
    /// Empty strings are treated as absent.
    pub fn from_dto(dto: CourseGroupDto) -> Result<Self, AppError> {
        let start_date = parse_dto_date(
            dto.start_date.as_deref(),
            "start_date",
            "A data de início é inválida",
        )?;
        let end_date = parse_dto_date(
            dto.end_date.as_deref(),
            "end_date",
            "A data de término é inválida",
        )?;

        let max_students = match dto.max_students {
            None => None,
            Some(Value::Null) => Some(None),
            Some(value) => Some(Some(parse_non_negative_int(&value).ok_or_else(|| {
                AppError::field(
                    "max_students",
                    "O número máximo de estudantes deve ser um número não negativo",
                )
            })?)),
        };

        Ok(Self {
            name: dto.name.filter(|n| !n.is_empty()),
            description: dto.description,
            start_date,
            end_date,
            max_students,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_dto_date(
    value: Option<&str>,
    field: &str,
    message: &str,
) -> Result<Option<DateTime<Utc>>, AppError> {
    match present(value) {
        None => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .ok_or_else(|| AppError::field(field, message)),
    }
}

/// Query filters for the course group listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseGroupFilterParams {
    /// Case-insensitive substring
    pub name: Option<String>,
    /// Groups starting on or after this date
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    /// Groups ending on or before this date
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// [`CourseGroupFilterParams`] with the dates parsed.
#[derive(Debug, Clone, Default)]
pub struct CourseGroupFilters {
    pub name: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub pagination: PaginationParams,
}

impl TryFrom<CourseGroupFilterParams> for CourseGroupFilters {
    type Error = AppError;

    fn try_from(params: CourseGroupFilterParams) -> Result<Self, Self::Error> {
        Ok(Self {
            name: params.name.filter(|n| !n.is_empty()),
            start_date: parse_dto_date(
                params.start_date.as_deref(),
                "startDate",
                "A data de início é inválida",
            )?,
            end_date: parse_dto_date(
                params.end_date.as_deref(),
                "endDate",
                "A data de término é inválida",
            )?,
            pagination: params.pagination,
        })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedCourseGroupsResponse {
    #[serde(rename = "courseGroups")]
    pub course_groups: Vec<CourseGroup>,
    #[serde(flatten)]
    pub meta: PaginationMeta,
}
