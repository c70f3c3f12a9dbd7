use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use matricula_cli::admin;
use matricula_cli::seeder::{self, SeedConfig};
use matricula_db::{PgPool, init_db_pool, run_migrations};
use matricula_models::validation::validate_password;

#[derive(Parser)]
#[command(name = "matricula-cli")]
#[command(about = "Matrícula CLI - Administrative tools for the Matrícula API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Create a new administrator account
    CreateAdmin {
        /// Full name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed demo accounts, fake students, course groups and enrollments
    Seed {
        /// Number of students to create
        #[arg(short = 's', long, default_value = "100")]
        students: usize,

        /// Number of course groups to create
        #[arg(short = 'c', long, default_value = "5")]
        course_groups: usize,

        /// Do not enroll the seeded students
        #[arg(long)]
        no_enrollments: bool,
    },
    /// Clear all seeded data (keeps accounts and records created through the API)
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("\n❌ {e:#}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let pool = init_db_pool().await?;

    match command {
        Commands::Migrate => handle_migrate(&pool).await,
        Commands::CreateAdmin {
            name,
            email,
            password,
        } => handle_create_admin(&pool, name, email, password).await,
        Commands::Seed {
            students,
            course_groups,
            no_enrollments,
        } => {
            let config = SeedConfig::new(students, course_groups).with_enrollments(!no_enrollments);
            seeder::seed_all(&pool, config)
                .await
                .context("Error seeding database")
        }
        Commands::ClearSeed => seeder::clear_all(&pool)
            .await
            .context("Error clearing seeded data"),
    }
}

async fn handle_migrate(pool: &PgPool) -> anyhow::Result<()> {
    run_migrations(pool).await?;
    println!("✅ Migrations applied");
    Ok(())
}

async fn handle_create_admin(
    pool: &PgPool,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let name = match name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Name")
            .interact_text()
            .context("Failed to read name")?,
    };

    let email = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email address")
            .interact_text()
            .context("Failed to read email")?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .validate_with(|input: &String| -> Result<(), String> {
                let errors = validate_password(input);
                if errors.is_empty() {
                    Ok(())
                } else {
                    Err(admin::describe_errors(&errors))
                }
            })
            .interact()
            .context("Failed to read password")?,
    };

    admin::create_admin(pool, &name, &email, &password)
        .await
        .context("Error creating admin")?;

    println!("\n✅ Admin created successfully!");
    println!("   Email: {}", email);
    println!("   Name: {}", name);

    Ok(())
}
