use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::application::{parse_status, parse_type, LaunchService};
use crate::domain::{Amount, Launch, LaunchFilter, LaunchId, NewUser, Owner, UserId};

/// Launches - personal income and expense tracking
#[derive(Parser)]
#[command(name = "launches")]
#[command(about = "Track income and expense launches and compute balances")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "LAUNCHES_DB", default_value = "launches.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// User management commands
    #[command(subcommand)]
    User(UserCommands),

    /// Launch management commands
    #[command(subcommand)]
    Launch(LaunchCommands),

    /// Show income minus expenses for a user
    Balance {
        /// User ID
        user: UserId,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user
    Create {
        /// Display name
        name: String,

        /// Email address (must be unique)
        email: String,
    },

    /// Show a user
    Show {
        /// User ID
        id: UserId,
    },
}

/// Fields of a launch as typed on the command line.
#[derive(Args)]
pub struct LaunchFields {
    /// Owner user ID
    #[arg(short, long)]
    pub user: UserId,

    /// Description of the launch
    #[arg(short, long)]
    pub description: String,

    /// Month (1-12)
    #[arg(short, long)]
    pub month: u32,

    /// Year (four digits)
    #[arg(short, long)]
    pub year: i32,

    /// Amount (e.g., "50.00" or "50")
    #[arg(short, long, allow_hyphen_values = true)]
    pub amount: String,

    /// Type: income, expense
    #[arg(short = 't', long = "type")]
    pub launch_type: String,

    /// Status: pending, settled, cancelled (new launches default to pending, updates keep the current one)
    #[arg(short, long)]
    pub status: Option<String>,
}

#[derive(Subcommand)]
pub enum LaunchCommands {
    /// Record a new launch
    Add(LaunchFields),

    /// Replace the fields of an existing launch
    Update {
        /// Launch ID
        id: LaunchId,

        #[command(flatten)]
        fields: LaunchFields,
    },

    /// Change the status of a launch
    Status {
        /// Launch ID
        id: LaunchId,

        /// New status: pending, settled, cancelled
        status: String,
    },

    /// Delete a launch
    Delete {
        /// Launch ID
        id: LaunchId,
    },

    /// Show a single launch
    Show {
        /// Launch ID
        id: LaunchId,
    },

    /// List a user's launches
    List {
        /// Owner user ID
        #[arg(short, long)]
        user: UserId,

        /// Only launches whose description contains this text (case-insensitive)
        #[arg(short, long)]
        description: Option<String>,

        /// Filter by month
        #[arg(short, long)]
        month: Option<u32>,

        /// Filter by year
        #[arg(short, long)]
        year: Option<i32>,

        /// Filter by type: income, expense
        #[arg(short = 't', long = "type")]
        launch_type: Option<String>,

        /// Filter by status: pending, settled, cancelled
        #[arg(short, long)]
        status: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Install the fmt subscriber. `RUST_LOG` overrides the level picked from `verbose`.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let default_filter = format!("launches={level}");

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LaunchService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::User(user_cmd) => {
                let service = LaunchService::connect(&self.database).await?;
                run_user_command(&service, user_cmd).await?;
            }

            Commands::Launch(launch_cmd) => {
                let service = LaunchService::connect(&self.database).await?;
                run_launch_command(&service, launch_cmd).await?;
            }

            Commands::Balance { user } => {
                let service = LaunchService::connect(&self.database).await?;
                let owner = service.get_user(user).await?;
                let balance = service.balance(owner.id).await?;
                println!("Balance for {}: {}", owner.name, balance);
            }
        }

        Ok(())
    }
}

async fn run_user_command(service: &LaunchService, cmd: UserCommands) -> Result<()> {
    match cmd {
        UserCommands::Create { name, email } => {
            let user = service.register_user(NewUser::new(name, email)).await?;
            info!(user_id = user.id, "Registered user");
            println!("Created user: {} <{}> ({})", user.name, user.email, user.id);
        }

        UserCommands::Show { id } => {
            let user = service.get_user(id).await?;
            println!("User: {}", user.name);
            println!("  ID:      {}", user.id);
            println!("  Email:   {}", user.email);
            println!(
                "  Created: {}",
                user.created_at.format("%Y-%m-%d %H:%M:%S")
            );
            println!("  Balance: {}", service.balance(user.id).await?);
        }
    }
    Ok(())
}

/// Resolve the owner and build an unsaved launch from command-line fields.
async fn build_launch(service: &LaunchService, fields: LaunchFields) -> Result<Launch> {
    let owner = service.get_user(fields.user).await?;
    let amount = fields
        .amount
        .parse::<Amount>()
        .with_context(|| format!("Invalid amount '{}'. Use '50.00' or '50'", fields.amount))?;

    let mut launch = Launch {
        description: Some(fields.description),
        month: Some(fields.month),
        year: Some(fields.year),
        owner: Some(Owner::resolved(owner)),
        amount: Some(amount),
        launch_type: Some(parse_type(&fields.launch_type)?),
        ..Launch::default()
    };
    if let Some(status) = fields.status {
        launch.status = parse_status(&status)?;
    }
    Ok(launch)
}

async fn run_launch_command(service: &LaunchService, cmd: LaunchCommands) -> Result<()> {
    match cmd {
        LaunchCommands::Add(fields) => {
            let launch = build_launch(service, fields).await?;
            let created = service.create(&launch).await?;
            info!(launch_id = ?created.id, "Created launch");
            println!("Recorded launch: {}", summary(&created));
        }

        LaunchCommands::Update { id, fields } => {
            let existing = service.get_launch(id).await?;
            let keep_status = fields.status.is_none();
            let mut launch = build_launch(service, fields).await?;
            launch.id = existing.id;
            launch.registered_on = existing.registered_on;
            if keep_status {
                launch.status = existing.status;
            }
            if launch.status != existing.status {
                info!(id, from = %existing.status, to = %launch.status, "Status changed by update");
            }

            let updated = service.update(&launch).await?;
            info!(id, "Updated launch");
            println!("Updated launch: {}", summary(&updated));
        }

        LaunchCommands::Status { id, status } => {
            let status = parse_status(&status)?;
            let mut launch = service.get_launch(id).await?;
            let updated = service.change_status(&mut launch, status).await?;
            info!(id, %status, "Changed launch status");
            println!("Launch {} is now {}", id, updated.status);
        }

        LaunchCommands::Delete { id } => {
            let launch = service.get_launch(id).await?;
            service.delete(&launch).await?;
            info!(id, "Deleted launch");
            println!("Deleted launch: {}", id);
        }

        LaunchCommands::Show { id } => {
            let launch = service.get_launch(id).await?;
            print_launch(&launch);
        }

        LaunchCommands::List {
            user,
            description,
            month,
            year,
            launch_type,
            status,
            json,
        } => {
            let owner = service.get_user(user).await.with_context(|| {
                format!("Cannot search launches: no user with id {}", user)
            })?;

            let mut filter = LaunchFilter::new().owner(owner.id);
            filter.description = description;
            filter.month = month;
            filter.year = year;
            filter.launch_type = launch_type.as_deref().map(parse_type).transpose()?;
            filter.status = status.as_deref().map(parse_status).transpose()?;

            let launches = service.search(&filter).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&launches)?);
            } else {
                print_launch_table(&launches);
            }
        }
    }
    Ok(())
}

fn display_opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn summary(launch: &Launch) -> String {
    format!(
        "{} {} {} ({}/{}) [{}] ({})",
        display_opt(launch.launch_type),
        display_opt(launch.amount),
        launch.description.as_deref().unwrap_or(""),
        display_opt(launch.month),
        display_opt(launch.year),
        launch.status,
        display_opt(launch.id)
    )
}

fn print_launch(launch: &Launch) {
    println!("Launch: {}", launch.description.as_deref().unwrap_or(""));
    println!("  ID:          {}", display_opt(launch.id));
    println!("  Type:        {}", display_opt(launch.launch_type));
    println!("  Amount:      {}", display_opt(launch.amount));
    println!(
        "  Period:      {}/{}",
        display_opt(launch.month),
        display_opt(launch.year)
    );
    println!("  Status:      {}", launch.status);
    match launch.owner.as_ref() {
        Some(Owner {
            user: Some(user), ..
        }) => println!("  Owner:       {} ({})", user.name, user.id),
        Some(owner) => println!("  Owner:       {}", display_opt(owner.id)),
        None => println!("  Owner:       -"),
    }
    println!("  Registered:  {}", display_opt(launch.registered_on));
}

fn print_launch_table(launches: &[Launch]) {
    if launches.is_empty() {
        println!("No launches found.");
        return;
    }

    println!(
        "{:<6} {:<30} {:>7} {:<8} {:>12} {:<10}",
        "ID", "DESCRIPTION", "PERIOD", "TYPE", "AMOUNT", "STATUS"
    );
    println!("{}", "-".repeat(78));
    for launch in launches {
        let description = launch.description.as_deref().unwrap_or("");
        let description = if description.chars().count() > 30 {
            format!("{}...", description.chars().take(27).collect::<String>())
        } else {
            description.to_string()
        };
        println!(
            "{:<6} {:<30} {:>7} {:<8} {:>12} {:<10}",
            display_opt(launch.id),
            description,
            format!("{}/{}", display_opt(launch.month), display_opt(launch.year)),
            display_opt(launch.launch_type),
            display_opt(launch.amount),
            launch.status
        );
    }
}
