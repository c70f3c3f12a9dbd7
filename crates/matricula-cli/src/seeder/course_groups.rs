//! Course group and enrollment seeding.

use chrono::{Duration, Utc};
use fake::Fake;
use fake::faker::lorem::en::Word;
use matricula_models::{CourseGroupId, EnrollmentId, StudentId};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::{CourseGroupSeed, SEED_COURSE_GROUP_DESCRIPTION};

/// Generates course groups in parallel, starting within the next two
/// months and lasting three to six months.
pub fn generate_course_groups(count: usize) -> Vec<CourseGroupSeed> {
    let now = Utc::now();

    (0..count)
        .into_par_iter()
        .map(|idx| {
            let word: String = Word().fake();
            let start_date = now + Duration::days((0..60).fake::<i64>());
            let end_date = start_date + Duration::days((90..180).fake::<i64>());

            CourseGroupSeed {
                id: CourseGroupId::new(),
                name: format!("Turma {} {}", capitalize(&word), idx + 1),
                start_date,
                end_date,
                max_students: (20..50).fake(),
            }
        })
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Seeds course groups into the database
pub async fn seed_course_groups(db: &PgPool, count: usize) -> anyhow::Result<Vec<CourseGroupId>> {
    let start_time = Instant::now();
    println!("📚 Seeding {} course groups...", count);

    let groups = generate_course_groups(count);
    let mut tx = db.begin().await?;

    // 6 params per course group
    const BATCH_SIZE: usize = 1000;
    let mut all_ids = Vec::with_capacity(groups.len());

    for chunk in groups.chunks(BATCH_SIZE) {
        all_ids.extend(insert_course_groups_chunk(&mut tx, chunk).await?);
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} course groups in {:?}",
        all_ids.len(),
        start_time.elapsed()
    );

    Ok(all_ids)
}

async fn insert_course_groups_chunk(
    tx: &mut Transaction<'_, Postgres>,
    groups: &[CourseGroupSeed],
) -> anyhow::Result<Vec<CourseGroupId>> {
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from(
        "INSERT INTO course_groups (id, name, description, start_date, end_date, max_students) VALUES ",
    );

    for i in 0..groups.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 6;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, ${})",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4,
            param_idx + 5,
            param_idx + 6
        ));
    }

    query.push_str(" RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for group in groups {
        q = q
            .bind(group.id)
            .bind(&group.name)
            .bind(SEED_COURSE_GROUP_DESCRIPTION)
            .bind(group.start_date)
            .bind(group.end_date)
            .bind(group.max_students);
    }

    let ids: Vec<CourseGroupId> = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}

/// Enrolls each student in one randomly picked course group.
pub async fn seed_enrollments(
    db: &PgPool,
    student_ids: &[StudentId],
    course_group_ids: &[CourseGroupId],
) -> anyhow::Result<u64> {
    if student_ids.is_empty() || course_group_ids.is_empty() {
        return Ok(0);
    }

    let start_time = Instant::now();
    println!("📝 Enrolling {} students...", student_ids.len());

    let pairs: Vec<(StudentId, CourseGroupId)> = student_ids
        .par_iter()
        .map(|&student_id| {
            let idx: usize = (0..course_group_ids.len()).fake();
            (student_id, course_group_ids[idx])
        })
        .collect();

    let mut tx = db.begin().await?;
    let mut inserted = 0;

    // 3 params per enrollment
    const BATCH_SIZE: usize = 2000;

    for chunk in pairs.chunks(BATCH_SIZE) {
        let mut query =
            String::from("INSERT INTO enrollments (id, student_id, course_group_id) VALUES ");

        for i in 0..chunk.len() {
            if i > 0 {
                query.push_str(", ");
            }
            let param_idx = i * 3;
            query.push_str(&format!(
                "(${}, ${}, ${})",
                param_idx + 1,
                param_idx + 2,
                param_idx + 3
            ));
        }

        query.push_str(" ON CONFLICT (student_id, course_group_id) DO NOTHING");

        let mut q = sqlx::query(&query);
        for (student_id, course_group_id) in chunk {
            q = q.bind(EnrollmentId::new()).bind(student_id).bind(course_group_id);
        }

        inserted += q.execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} enrollments in {:?}",
        inserted,
        start_time.elapsed()
    );

    Ok(inserted)
}

/// Clears seeded course groups. Their enrollments go with them.
pub async fn clear_course_groups(db: &PgPool) -> anyhow::Result<u64> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded course groups...");

    let result = sqlx::query("DELETE FROM course_groups WHERE description = $1")
        .bind(SEED_COURSE_GROUP_DESCRIPTION)
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} course groups in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}
