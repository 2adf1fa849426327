use clap::{Parser, Subcommand};
use session_auth::{
    config::AppConfig,
    db,
    repositories::user_repository::{parse_change, SqliteUserRepository, UserRepository},
    services::{AuthService, UserService},
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "session-auth-cli")]
#[command(about = "CLI tool for managing session-auth users", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Register a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// List all users
    List {
        /// Maximum number of users to display
        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,
    },

    /// Issue a password reset token for a user
    ResetToken {
        /// Email address of the user
        #[arg(short, long)]
        email: String,
    },

    /// Set raw user attributes, e.g. `--set session_id=` to clear a session
    Update {
        /// Email address of the user
        #[arg(short, long)]
        email: String,

        /// Attribute assignment in the form field=value (empty value clears it)
        #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
        assignments: Vec<String>,
    },
}

fn get_password(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

fn split_assignment(assignment: &str) -> Option<(&str, Option<String>)> {
    let (field, value) = assignment.split_once('=')?;
    let value = (!value.is_empty()).then(|| value.to_string());
    Some((field.trim(), value))
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("❌ {}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    // Connect to database; never reset from the CLI
    let pool = db::create_pool(&config.database_url).await?;
    db::prepare_schema(&pool, false).await?;

    // Initialize services
    let user_repository: Arc<dyn UserRepository> =
        Arc::new(SqliteUserRepository::new(pool.clone()));
    let auth_service = AuthService::new(user_repository.clone());
    let user_service = UserService::new(user_repository);

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create { email, password } => {
                let password = match password {
                    Some(pw) => pw,
                    None => {
                        let password = get_password("Password")?;
                        if password != get_password("Confirm password")? {
                            fail("Passwords do not match");
                        }
                        password
                    }
                };

                match auth_service.register_user(&email, &password).await {
                    Ok(user) => {
                        println!("✅ User created successfully!");
                        println!("  ID: {}", user.id);
                        println!("  Email: {}", user.email);
                    }
                    Err(err) => fail(format!("Failed to create user: {}", err)),
                }
            }

            UserCommands::List { limit, offset } => {
                match user_service.list_users(Some(limit), Some(offset)).await {
                    Ok(users) if users.is_empty() => println!("No users found."),
                    Ok(users) => {
                        println!("{:<5} {:<40} {:<10}", "ID", "Email", "Session");
                        println!("{}", "-".repeat(57));
                        for user in users {
                            println!(
                                "{:<5} {:<40} {:<10}",
                                user.id,
                                user.email,
                                if user.session_id.is_some() { "Active" } else { "-" },
                            );
                        }
                    }
                    Err(err) => fail(format!("Failed to list users: {}", err)),
                }
            }

            UserCommands::ResetToken { email } => {
                match auth_service.get_reset_password_token(&email).await {
                    Ok(token) => println!("{}", token),
                    Err(err) => fail(format!("Failed to issue reset token: {}", err)),
                }
            }

            UserCommands::Update { email, assignments } => {
                let mut changes = Vec::with_capacity(assignments.len());
                for assignment in &assignments {
                    let Some((field, value)) = split_assignment(assignment) else {
                        fail(format!("Expected FIELD=VALUE, got '{}'", assignment));
                    };
                    match parse_change(field, value) {
                        Ok(change) => changes.push(change),
                        Err(err) => fail(err),
                    }
                }

                let user = match user_service.find_user_by_email(&email).await {
                    Ok(Some(user)) => user,
                    Ok(None) => fail(format!("User '{}' not found", email)),
                    Err(err) => fail(format!("Failed to find user: {}", err)),
                };

                match user_service.update_user(user.id, changes).await {
                    Ok(()) => println!("✅ User '{}' updated", email),
                    Err(err) => fail(format!("Failed to update user: {}", err)),
                }
            }
        },
    }

    pool.close().await;

    Ok(())
}
