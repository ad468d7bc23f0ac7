use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;
use quiz_client::catalog::{self, CatalogFilter, SortOrder};
use quiz_client::models::{Credentials, Difficulty, QuizId, RegisterRequest};
use quiz_client::profile::ProfileStats;
use quiz_client::terminal;
use quiz_client::{ApiClient, ClientError, Config};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and keep the session for later commands
    Login {
        #[arg(short, long)]
        email: String,
        /// Read from standard input when omitted
        #[arg(short, long, env = "QUIZ_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(short, long, env = "QUIZ_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List quizzes
    Quizzes {
        /// Case-insensitive text matched against title, description and category
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        difficulty: Option<Difficulty>,
        /// difficulty, title, shortest or newest
        #[arg(long, default_value_t = SortOrder::default())]
        sort: SortOrder,
    },
    /// List categories with their quiz counts
    Categories,
    /// Show statistics over your past attempts
    Profile,
    /// Open the interactive client
    Play {
        /// Start directly on this quiz
        #[arg(short, long)]
        quiz: Option<QuizId>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> Result<(), ClientError> {
    let client = cli.config.connect()?;

    match cli.command {
        Command::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let user = client.login(&Credentials { email, password }).await?;
            println!("Signed in as {} ({} pts)", user.display_name(), user.score);
        }
        Command::Register {
            email,
            first_name,
            last_name,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let request = RegisterRequest {
                first_name,
                last_name,
                email,
                password,
            };
            let message = client.register(&request).await?;
            println!(
                "{}",
                message.unwrap_or_else(|| "Account created, run `quiz login` to sign in".to_string())
            );
        }
        Command::Logout => {
            client.store().clear()?;
            println!("Signed out");
        }
        Command::Whoami => {
            let user = client.store().get_user().ok_or(ClientError::NotLoggedIn)?;
            let admin = if user.is_admin() { " [admin]" } else { "" };
            println!("{} <{}>{}", user.display_name(), user.email, admin);
            println!("points: {}", user.score);
            if !user.roles.is_empty() {
                println!("roles:  {}", user.roles.join(", "));
            }
        }
        Command::Quizzes {
            search,
            category,
            difficulty,
            sort,
        } => {
            let quizzes = match &category {
                Some(category) => client.quizzes_by_category(category).await?,
                None => client.all_quizzes().await?,
            };
            let filter = CatalogFilter {
                search,
                category,
                difficulty,
                sort,
            };
            print_quizzes(&filter, &quizzes);
        }
        Command::Categories => {
            let quizzes = client.all_quizzes().await?;
            for summary in catalog::categories(&quizzes) {
                println!("{:<24} {:>3} quizzes", summary.name, summary.quizzes);
            }
        }
        Command::Profile => {
            let user = client.store().get_user().ok_or(ClientError::NotLoggedIn)?;
            let results = client.my_results().await?;
            let stats = ProfileStats::from_results(&results, Some(&user), &cli.config.scoring());
            print_profile(&user.display_name(), &stats);
        }
        Command::Play { quiz } => {
            if !client.store().is_signed_in() {
                return Err(ClientError::NotLoggedIn);
            }
            play(client, &cli.config, quiz).await?;
        }
    }

    Ok(())
}

async fn play(client: ApiClient, config: &Config, quiz: Option<QuizId>) -> Result<(), ClientError> {
    let store = client.store().clone();
    quiz_client::client::run(client, store, config.scoring(), quiz).await
}

fn password_or_prompt(password: Option<String>) -> Result<String, ClientError> {
    if let Some(password) = password {
        return Ok(password);
    }

    print!("Password: ");
    io::stdout().flush()?;
    let password = if io::stdin().is_terminal() {
        let entered = terminal::read_hidden_line()?;
        println!();
        entered.ok_or_else(|| ClientError::InvalidArgument("password entry cancelled".to_string()))?
    } else {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_string()
    };

    if password.is_empty() {
        return Err(ClientError::InvalidArgument("password must not be empty".to_string()));
    }
    Ok(password)
}

fn print_quizzes(filter: &CatalogFilter, quizzes: &[quiz_client::Quiz]) {
    let visible = filter.apply(quizzes);
    if visible.is_empty() {
        println!("No quizzes match");
        return;
    }

    println!(
        "{:>4}  {:<32} {:<8} {:<16} {:>6} {:>4}",
        "id", "title", "level", "category", "time", "pass"
    );
    for quiz in visible {
        println!(
            "{:>4}  {:<32} {:<8} {:<16} {:>3}min {:>3}%",
            quiz.id, quiz.title, quiz.difficulty, quiz.category, quiz.time_limit, quiz.passing_score
        );
    }
}

fn print_profile(name: &str, stats: &ProfileStats) {
    println!("{}", name);
    println!("  points:          {}", stats.points);
    if stats.points_from_results > 0 {
        println!("  from attempts:   {}", stats.points_from_results);
    }
    println!("  quizzes taken:   {}", stats.attempts);
    println!("  passed:          {} ({}%)", stats.passed, stats.completion_rate);
    println!("  average score:   {}%", stats.average_score);
    println!("  best score:      {}%", stats.best_score);
    println!("  time spent:      {} min", stats.total_minutes);
}
