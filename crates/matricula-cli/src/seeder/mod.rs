//! Database seeding for development and manual testing.
//!
//! - Demo accounts `admin@example.com` / `student@example.com`
//! - Fake students and course groups, generated in parallel with Rayon
//! - One enrollment per seeded student
//!
//! Everything created here can be removed with [`clear_all`] without
//! touching real data.

pub mod course_groups;
pub mod models;
pub mod students;
pub mod users;

pub use models::SeedConfig;

use sqlx::PgPool;
use std::time::Instant;

/// Seeds demo accounts, students, course groups and enrollments.
pub async fn seed_all(db: &PgPool, config: SeedConfig) -> anyhow::Result<()> {
    let start_time = Instant::now();

    println!("🌱 Starting database seeding...");
    println!("   - Students: {}", config.num_students);
    println!("   - Course groups: {}", config.num_course_groups);

    users::seed_demo_users(db).await?;
    let course_group_ids = course_groups::seed_course_groups(db, config.num_course_groups).await?;
    let student_ids = students::seed_students(db, config.num_students).await?;

    if config.enroll_students {
        course_groups::seed_enrollments(db, &student_ids, &course_group_ids).await?;
    }

    println!("\n✅ Seeding complete in {:?}", start_time.elapsed());
    println!(
        "\n📝 Demo accounts use the password: {}",
        users::DEMO_PASSWORD
    );

    Ok(())
}

/// Removes everything [`seed_all`] creates.
pub async fn clear_all(db: &PgPool) -> anyhow::Result<()> {
    let start_time = Instant::now();
    println!("🧹 Clearing seeded data...");

    students::clear_students(db).await?;
    course_groups::clear_course_groups(db).await?;
    users::clear_demo_users(db).await?;

    println!("\n✅ Cleared seeded data in {:?}", start_time.elapsed());

    Ok(())
}
