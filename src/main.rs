use clap::{Parser, Subcommand};
use log::debug;
use recipe_discovery::text::{format_time, strip_html, truncate_text};
use recipe_discovery::{
    AppConfig, AppError, MockMode, MockProvider, MockTranslator, Recipe, RecipeApp, RecipeId,
    RecipeProvider, SearchFilters, SearchPhase, SortOrder,
};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Discover recipes, keep favorites and read them in your language")]
struct Cli {
    /// Use the built-in sample catalogue and a fake translator instead of the network
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search recipes; without any filter, shows random recipes
    Search {
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(long, default_value = "")]
        diet: String,
        #[arg(long, default_value = "")]
        cuisine: String,
        /// popularity, time, healthiness or price
        #[arg(long)]
        sort: Option<SortOrder>,
    },
    /// Show random recipes
    Random {
        #[arg(short, long)]
        count: Option<u32>,
    },
    /// Show one recipe with its similar recipes
    Show {
        id: RecipeId,
        /// Language to show the recipe in, defaults to the selected one
        #[arg(short, long)]
        lang: Option<String>,
    },
    /// Translate a piece of text
    Translate {
        text: String,
        #[arg(short, long)]
        lang: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    /// Add a recipe to favorites, or remove it if it is already there
    Favorite { id: RecipeId },
    /// List favorite recipes
    Favorites,
    /// List the available languages
    Languages,
    /// Change the display language
    SetLanguage { code: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let app = build_app(cli.offline)?;

    match cli.command {
        Command::Search {
            query,
            diet,
            cuisine,
            sort,
        } => {
            let sort = sort.unwrap_or(app.config().search.default_sort);
            let filters = SearchFilters::new(query, diet, cuisine, sort);
            let coordinator = app.search_coordinator(filters);
            debug!("Searching with {}", coordinator.provider_name());

            coordinator.retry();
            let snapshot = coordinator.settled().await;
            match snapshot.phase {
                SearchPhase::Ready(recipes) => print_recipe_list(&recipes),
                SearchPhase::Failed(err) => {
                    eprintln!("{}", err);
                    return Ok(ExitCode::FAILURE);
                }
                SearchPhase::Loading => {}
            }
        }
        Command::Random { count } => {
            let count = count.unwrap_or(app.config().search.random_count);
            let recipes = app.provider().get_random(count).await?;
            print_recipe_list(&recipes);
        }
        Command::Show { id, lang } => {
            let lang = lang.unwrap_or_else(|| app.locale().current_language());
            let details = app.recipe_details(id).await?;
            print_recipe(&app, &details.recipe, &lang).await;

            if !details.similar.is_empty() {
                println!("\nSimilar recipes:");
                print_recipe_list(&details.similar);
            }
        }
        Command::Translate { text, lang } => {
            println!("{}", app.overlay().translate_once(&text, &lang).await);
        }
        Command::Login { email, password } => match app.session().login(&email, &password)? {
            Some(user) => println!("Logged in as {} ({})", user.name, user.email),
            None => {
                eprintln!("Email and password are required");
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Logout => {
            app.session().logout()?;
            println!("Logged out");
        }
        Command::Favorite { id } => {
            if app.session().toggle_favorite(id)? {
                println!("Added {} to favorites", id);
            } else {
                println!("Removed {} from favorites", id);
            }
        }
        Command::Favorites => {
            if !app.session().is_authenticated() {
                eprintln!("Log in to see your favorites");
                return Ok(ExitCode::FAILURE);
            }
            let recipes = app.favorite_recipes().await?;
            if recipes.is_empty() {
                println!("No favorites yet");
            } else {
                print_recipe_list(&recipes);
            }
        }
        Command::Languages => {
            let current = app.locale().current_language();
            for language in app.locale().available_languages() {
                let marker = if language.code == current { "*" } else { " " };
                println!(
                    "{} {} {} ({})",
                    marker, language.flag, language.name, language.code
                );
            }
        }
        Command::SetLanguage { code } => {
            app.locale().set_language(&code)?;
            println!("Language set to {}", code);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn build_app(offline: bool) -> Result<RecipeApp, AppError> {
    let config = AppConfig::load()?;
    let mut builder = RecipeApp::builder().config(config);
    if offline {
        builder = builder
            .provider(Arc::new(MockProvider::with_sample_catalogue()))
            .translator(Arc::new(MockTranslator::new(MockMode::Suffix)));
    }
    builder.build()
}

fn print_recipe_list(recipes: &[Recipe]) {
    if recipes.is_empty() {
        println!("No recipes found");
        return;
    }
    for recipe in recipes {
        println!(
            "{:>8}  {}  ({}, serves {})",
            recipe.id,
            recipe.title,
            format_time(recipe.ready_in_minutes),
            recipe.servings
        );
    }
}

async fn print_recipe(app: &RecipeApp, recipe: &Recipe, lang: &str) {
    let overlay = app.overlay();
    println!("{}", overlay.translate_once(&recipe.title, lang).await);
    println!(
        "{} | serves {}",
        format_time(recipe.ready_in_minutes),
        recipe.servings
    );

    let summary = strip_html(&recipe.summary);
    if !summary.is_empty() {
        println!("\n{}", overlay.translate_once(&truncate_text(&summary, 300), lang).await);
    }

    if !recipe.extended_ingredients.is_empty() {
        println!("\nIngredients:");
        for ingredient in &recipe.extended_ingredients {
            println!("  - {}", overlay.translate_once(&ingredient.original, lang).await);
        }
    }

    for set in &recipe.analyzed_instructions {
        if set.name.is_empty() {
            println!("\nInstructions:");
        } else {
            println!("\nInstructions ({}):", set.name);
        }
        for step in &set.steps {
            println!("  {}. {}", step.number, overlay.translate_once(&step.step, lang).await);
        }
    }
}
