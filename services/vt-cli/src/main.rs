//! Vitrine native host.
//!
//! Runs the same products/users pipelines and wizard as the browser build,
//! with an on-disk store under `VITRINE_DATA_DIR`.

mod config;
mod ops;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use vt_core::{ProductDraft, ProductFilter, UserDraft};
use vt_source_http::HttpFetcher;
use vt_types::{Product, SubmissionDraft, User};

use crate::config::Settings;
use crate::ops::App;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Vitrine catalog and directory manager")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Product catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// User directory
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Personal-data form wizard
    Wizard {
        #[command(subcommand)]
        action: WizardAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Initialize the catalog and report which source won
    Load,
    /// List products, promotions first
    List,
    /// Add a product at the front of the list
    Add(ProductArgs),
    /// Remove the product at INDEX
    Remove {
        index: usize,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List products matching a search term and price range
    Filter {
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        max: Option<f64>,
    },
}

#[derive(Args)]
struct ProductArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    price: String,
    #[arg(long)]
    brand: String,
    #[arg(long)]
    category: String,
    #[arg(long, default_value = "")]
    thumbnail: String,
}

#[derive(Subcommand)]
enum UserAction {
    /// Initialize the directory and report which source won
    Load,
    List,
    /// Add a user at the front of the list
    Add(UserArgs),
    /// Remove the user at INDEX
    Remove {
        index: usize,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
struct UserArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    age: String,
    #[arg(long, default_value = "")]
    image: String,
}

#[derive(Subcommand)]
enum WizardAction {
    /// Validate the form and keep it for review
    Submit {
        #[arg(long)]
        nome: String,
        #[arg(long)]
        sobrenome: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        idade: String,
    },
    /// Show the pending submission
    Review,
    /// Show the values the form would be pre-filled with
    Prefill,
    /// Save the pending submission and write data.json
    Confirm {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    info!(data_dir = %settings.data_dir.display(), "starting vitrine");

    let fetcher = HttpFetcher::new(Some(settings.assets_dir.clone()));
    let app = App::open(settings, fetcher)?;
    run(&app, cli.command).await
}

async fn run(app: &App<HttpFetcher>, command: Commands) -> Result<()> {
    match command {
        Commands::Products { action } => products(app, action).await,
        Commands::Users { action } => users(app, action).await,
        Commands::Wizard { action } => wizard(app, action),
    }
}

async fn products(app: &App<HttpFetcher>, action: ProductAction) -> Result<()> {
    match action {
        ProductAction::Load => {
            let (repo, origin) = app.products().await;
            println!("loaded {} products from {origin:?}", repo.len());
        }
        ProductAction::List => {
            let (repo, _) = app.products().await;
            print_lines(repo.list().iter().enumerate().map(|(i, p)| ops::render_product(i, p)));
        }
        ProductAction::Add(args) => {
            let draft = ProductDraft {
                title: args.title,
                description: args.description,
                price: args.price,
                brand: args.brand,
                category: args.category,
                thumbnail: args.thumbnail,
            };
            match app.add_product(&draft).await {
                Ok(product) => println!("added {}", ops::render_product(0, &product)),
                Err(errors) => report_invalid(&errors),
            }
        }
        ProductAction::Remove { index, yes } => {
            let confirm = ops::confirm_prompt::<Product>("product", yes);
            match app.remove_product(index, confirm).await {
                Some(product) => println!("removed \"{}\"", product.title),
                None => println!("nothing removed"),
            }
        }
        ProductAction::Filter { search, min, max } => {
            let (repo, _) = app.products().await;
            let filter = ProductFilter {
                search,
                price_min: min,
                price_max: max,
            };
            let lines = ops::render_filtered(repo.list(), &filter);
            if lines.is_empty() {
                println!("no products found");
            }
            print_lines(lines);
        }
    }
    Ok(())
}

async fn users(app: &App<HttpFetcher>, action: UserAction) -> Result<()> {
    match action {
        UserAction::Load => {
            let (repo, origin) = app.users().await;
            println!("loaded {} users from {origin:?}", repo.len());
        }
        UserAction::List => {
            let (repo, _) = app.users().await;
            print_lines(repo.list().iter().enumerate().map(|(i, u)| ops::render_user(i, u)));
        }
        UserAction::Add(args) => {
            let draft = UserDraft {
                first_name: args.first_name,
                last_name: args.last_name,
                email: args.email,
                age: args.age,
                image: args.image,
            };
            match app.add_user(&draft).await {
                Ok(user) => println!("added {}", ops::render_user(0, &user)),
                Err(errors) => report_invalid(&errors),
            }
        }
        UserAction::Remove { index, yes } => {
            let confirm = ops::confirm_prompt::<User>("user", yes);
            match app.remove_user(index, confirm).await {
                Some(user) => println!("removed \"{}\"", user.full_name()),
                None => println!("nothing removed"),
            }
        }
    }
    Ok(())
}

fn wizard(app: &App<HttpFetcher>, action: WizardAction) -> Result<()> {
    let mut wizard = app.wizard()?;
    match action {
        WizardAction::Submit {
            nome,
            sobrenome,
            email,
            idade,
        } => {
            let draft = SubmissionDraft {
                nome,
                sobrenome,
                email,
                idade,
            };
            match wizard.submit(&draft) {
                Ok(()) => print_lines(ops::render_draft(&draft)),
                Err(errors) => report_invalid(&errors),
            }
        }
        WizardAction::Review => match wizard.review() {
            Some(draft) => print_lines(ops::render_draft(&draft)),
            None => println!("nothing pending"),
        },
        WizardAction::Prefill => match wizard.edit() {
            Some(draft) => print_lines(ops::render_draft(&draft)),
            None => println!("nothing to pre-fill"),
        },
        WizardAction::Confirm { out } => {
            let path = ops::confirm_submission(&mut wizard, &out)?;
            println!("saved {}", path.display());
        }
    }
    Ok(())
}

fn report_invalid(errors: &vt_core::ValidationErrors) -> ! {
    for error in errors.errors() {
        eprintln!("{}: {error}", error.field());
    }
    std::process::exit(2);
}

fn print_lines(lines: impl IntoIterator<Item = String>) {
    for line in lines {
        println!("{line}");
    }
}
