//! Student seeding.
//!
//! Students are generated in parallel with Rayon and inserted with
//! multi-value INSERT statements.

use fake::Fake;
use fake::faker::name::en::*;
use matricula_models::StudentId;
use matricula_models::validation::is_valid_cpf;
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::StudentSeed;

/// Seeded students share this email domain with a `+student` tag.
pub const SEED_EMAIL_PATTERN: &str = "%+student%@example.com";

fn fake_cpf() -> String {
    loop {
        let cpf = format!("{:011}", (0..100_000_000_000u64).fake::<u64>());
        if is_valid_cpf(&cpf) {
            return cpf;
        }
    }
}

/// Generates student data in parallel using Rayon
pub fn generate_students(count: usize) -> Vec<StudentSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            let suffix: u32 = (0..1_000_000).fake();

            StudentSeed {
                id: StudentId::new(),
                email: format!(
                    "{}.{}+student{}{}@example.com",
                    first_name.to_lowercase(),
                    last_name.to_lowercase(),
                    suffix,
                    idx
                ),
                name: format!("{first_name} {last_name}"),
                ra: format!("RA{:010}", (0..10_000_000_000u64).fake::<u64>()),
                cpf: fake_cpf(),
            }
        })
        .collect()
}

/// Seeds students into the database
pub async fn seed_students(db: &PgPool, count: usize) -> anyhow::Result<Vec<StudentId>> {
    let start_time = Instant::now();
    println!("🎓 Seeding {} students...", count);

    let students = generate_students(count);
    let ids = insert_students_batch(db, &students).await?;

    println!(
        "   ✓ Inserted {} students in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

/// Inserts students in batches. Rows clashing on a unique column are skipped.
pub async fn insert_students_batch(
    db: &PgPool,
    students: &[StudentSeed],
) -> anyhow::Result<Vec<StudentId>> {
    let mut tx = db.begin().await?;

    // 5 params per student
    const BATCH_SIZE: usize = 1000;
    let mut all_ids = Vec::with_capacity(students.len());

    for chunk in students.chunks(BATCH_SIZE) {
        all_ids.extend(insert_students_chunk(&mut tx, chunk).await?);
    }

    tx.commit().await?;
    Ok(all_ids)
}

async fn insert_students_chunk(
    tx: &mut Transaction<'_, Postgres>,
    students: &[StudentSeed],
) -> anyhow::Result<Vec<StudentId>> {
    if students.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = String::from("INSERT INTO students (id, name, email, ra, cpf) VALUES ");

    for i in 0..students.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let param_idx = i * 5;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${})",
            param_idx + 1,
            param_idx + 2,
            param_idx + 3,
            param_idx + 4,
            param_idx + 5
        ));
    }

    query.push_str(" ON CONFLICT DO NOTHING RETURNING id");

    let mut q = sqlx::query_scalar(&query);
    for student in students {
        q = q
            .bind(student.id)
            .bind(&student.name)
            .bind(&student.email)
            .bind(&student.ra)
            .bind(&student.cpf);
    }

    let ids: Vec<StudentId> = q.fetch_all(&mut **tx).await?;
    Ok(ids)
}

/// Clears seeded students. Their enrollments go with them.
pub async fn clear_students(db: &PgPool) -> anyhow::Result<u64> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded students...");

    let result = sqlx::query("DELETE FROM students WHERE email LIKE $1")
        .bind(SEED_EMAIL_PATTERN)
        .execute(db)
        .await?
        .rows_affected();

    println!(
        "   ✓ Deleted {} students in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matricula_models::validation::is_valid_email;
    use std::collections::HashSet;

    #[test]
    fn test_generated_students_pass_validation() {
        let students = generate_students(50);
        assert_eq!(students.len(), 50);

        for student in &students {
            assert!(is_valid_cpf(&student.cpf), "bad cpf {}", student.cpf);
            assert!(is_valid_email(&student.email), "bad email {}", student.email);
            assert!(student.ra.len() <= 20);
            assert!(student.email.ends_with("@example.com"));
        }
    }

    #[test]
    fn test_generated_emails_are_unique() {
        let students = generate_students(200);
        let emails: HashSet<_> = students.iter().map(|s| s.email.as_str()).collect();
        assert_eq!(emails.len(), students.len());
    }
}
