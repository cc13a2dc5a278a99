//! Command handlers for the evol-kiosk CLI.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use evol_kiosk::api_types::{RecommendationResult, SurveyRequest};
use evol_kiosk::backend::{Backend, HttpBackend};
use evol_kiosk::chat::{ChatSession, parse_intent};
use evol_kiosk::flow::FlowController;
use evol_kiosk::kiosk::{self, Kiosk};
use evol_kiosk::passport::{encode_qr, passport_url};
use evol_kiosk::routes::{Route, RouteView, rehydrate};
use evol_kiosk::survey::{Budget, Choice, Metal, Occasion, Style};
use evol_kiosk::wishlist::{FileStorage, Wishlist};
use evol_kiosk::{Config, Error, render};
use tracing::info;

use crate::output::*;

/// Commands supported by the evol-kiosk CLI.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Run the interactive kiosk in this terminal
    Run,
    /// Submit survey answers and print the recommendations
    Survey {
        /// Style (label or 1-4)
        #[arg(long, value_parser = parse_choice::<Style>)]
        style: Style,

        /// Occasion (label or 1-4)
        #[arg(long, value_parser = parse_choice::<Occasion>)]
        occasion: Occasion,

        /// Budget band (label, range name such as "premium", or 1-4)
        #[arg(long, value_parser = parse_budget)]
        budget: Budget,

        /// Metal (label or 1-4)
        #[arg(long, value_parser = parse_choice::<Metal>)]
        metal: Metal,

        /// Optional vibe preference passed through to the backend
        #[arg(long)]
        vibe: Option<String>,
    },
    /// Show a saved style passport
    Passport {
        /// Session ID
        id: String,
    },
    /// List the product catalog
    Catalog,
    /// Check that the backend is reachable
    Health,
    /// Classify free text into occasion, style and budget
    Parse {
        /// Free-text query
        text: String,
    },
    /// Ask the stylist a question
    Ask {
        /// Question text
        text: String,

        /// Also fetch recommendations for the parsed intent
        #[arg(long)]
        recommend: bool,
    },
    /// Print the passport QR code for a session
    Qr {
        /// Session ID
        id: String,

        /// Also write the QR as a PBM image
        #[arg(long)]
        pbm: Option<PathBuf>,
    },
    /// Rehydrate a shareable route such as /passport/abc123
    Open {
        /// Route path or full URL
        route: String,
    },
    /// Manage the local wishlist
    #[command(subcommand)]
    Wishlist(WishlistCommand),
    /// Print version information
    Version,
}

#[derive(clap::Subcommand)]
pub enum WishlistCommand {
    /// List saved product IDs
    List,
    /// Save a product
    Add {
        /// Product ID
        id: String,
    },
    /// Remove a saved product
    Remove {
        /// Product ID
        id: String,
    },
    /// Save the product if absent, otherwise remove it
    Toggle {
        /// Product ID
        id: String,
    },
}

/// Accept an option label (case-insensitive) or its 1-based position.
fn parse_choice<C: Choice + FromStr>(value: &str) -> Result<C, String> {
    if let Ok(choice) = C::from_str(value) {
        return Ok(choice);
    }
    value
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(C::from_position)
        .ok_or_else(|| {
            let options: Vec<String> = C::options().iter().map(ToString::to_string).collect();
            format!("expected one of: {}", options.join(", "))
        })
}

fn parse_budget(value: &str) -> Result<Budget, String> {
    let wanted = value.trim().to_lowercase();
    Budget::options()
        .into_iter()
        .find(|b| {
            let range = b.range_label().to_lowercase();
            range == wanted || range.split_whitespace().next() == Some(wanted.as_str())
        })
        .map_or_else(|| parse_choice::<Budget>(value), Ok)
}

/// Execute a CLI command.
pub async fn execute(command: &Commands, config: &Config, json: bool) -> Result<ExitCode, Error> {
    match command {
        Commands::Run => handle_run(config).await,
        Commands::Survey {
            style,
            occasion,
            budget,
            metal,
            vibe,
        } => {
            let request = SurveyRequest {
                occasion: occasion.to_string(),
                style: style.to_string(),
                budget: budget.to_string(),
                vibe_preference: vibe.clone(),
                metal: Some(metal.to_string()),
            };
            handle_survey(config, &request, json).await
        }
        Commands::Passport { id } => handle_passport(config, id, json).await,
        Commands::Catalog => handle_catalog(config, json).await,
        Commands::Health => handle_health(config, json).await,
        Commands::Parse { text } => handle_parse(text, json),
        Commands::Ask { text, recommend } => handle_ask(config, text, *recommend, json).await,
        Commands::Qr { id, pbm } => handle_qr(config, id, pbm.as_deref(), json),
        Commands::Open { route } => handle_open(config, route, json).await,
        Commands::Wishlist(command) => handle_wishlist(config, command, json),
        Commands::Version => handle_version(json),
    }
}

fn backend(config: &Config) -> Result<HttpBackend, Error> {
    HttpBackend::from_config(config)
}

fn load_wishlist(config: &Config) -> Result<Wishlist<FileStorage>, Error> {
    Wishlist::load(FileStorage::new(&config.storage_dir))
}

async fn handle_run(config: &Config) -> Result<ExitCode, Error> {
    config.ensure_directories()?;
    let backend = Arc::new(backend(config)?);
    kiosk::probe_backend(backend.as_ref()).await;

    let kiosk = Kiosk::new(
        config.clone(),
        backend,
        load_wishlist(config)?,
        FlowController::new(),
        Box::new(io::stdout()),
    );
    kiosk.run().await?;
    Ok(ExitCode::SUCCESS)
}

fn print_recommendations(result: &RecommendationResult, config: &Config) {
    println!("Vibe: {} ({:?})", result.vibe, result.engine);
    println!("{}", result.explanation);
    println!();
    for (i, rec) in result.recommendations.iter().enumerate() {
        println!(
            "{}. {}  {}  ({})",
            i + 1,
            rec.product.name,
            rec.product.price_inr(),
            rec.product.price_usd()
        );
        println!("   {}", rec.reason);
    }
    println!();
    println!(
        "Passport: {}",
        passport_url(&config.origin, &result.session_id)
    );
}

async fn handle_survey(
    config: &Config,
    request: &SurveyRequest,
    json: bool,
) -> Result<ExitCode, Error> {
    let result = backend(config)?.submit_survey(request).await?;
    info!(session_id = %result.session_id, "survey submitted");
    if json {
        print_json(&SurveyResponse {
            passport_url: passport_url(&config.origin, &result.session_id),
            result,
        });
    } else {
        print_recommendations(&result, config);
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_passport(config: &Config, id: &str, json: bool) -> Result<ExitCode, Error> {
    let passport = backend(config)?.passport(id).await?;
    if json {
        print_json(&passport);
    } else {
        let wishlist = load_wishlist(config)?;
        println!("{}", render::passport(&passport, wishlist.ids()));
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_catalog(config: &Config, json: bool) -> Result<ExitCode, Error> {
    let products = backend(config)?.products().await?;
    if json {
        print_json(&products);
    } else {
        let wishlist = load_wishlist(config)?;
        println!("{}", render::catalog(&products, wishlist.ids()));
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_health(config: &Config, json: bool) -> Result<ExitCode, Error> {
    backend(config)?.health().await?;
    if json {
        print_json(&HealthResponse {
            status: "ok".to_string(),
            backend_url: config.backend_url.clone(),
        });
    } else {
        println!("Backend at {} is healthy", config.backend_url);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_parse(text: &str, json: bool) -> Result<ExitCode, Error> {
    let intent = parse_intent(text);
    if json {
        print_json(&intent);
    } else {
        println!("Occasion: {}", intent.occasion);
        println!("Style: {}", intent.style);
        println!("Budget: {}", intent.budget);
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_ask(
    config: &Config,
    text: &str,
    recommend: bool,
    json: bool,
) -> Result<ExitCode, Error> {
    let backend = backend(config)?;
    let mut chat = ChatSession::new(None, &mut rand::thread_rng());
    let reply = chat.send(text, &backend).await?.content.clone();
    let intent = chat
        .last_intent()
        .unwrap_or_else(|| parse_intent(text));

    let recommendations = match chat.recommendation_request().filter(|_| recommend) {
        Some(request) => Some(backend.submit_survey(&request).await?),
        None => None,
    };

    if json {
        print_json(&AskResponse {
            intent,
            reply,
            recommendations: recommendations.map(|result| SurveyResponse {
                passport_url: passport_url(&config.origin, &result.session_id),
                result,
            }),
        });
    } else {
        println!("{reply}");
        if let Some(result) = &recommendations {
            println!();
            print_recommendations(result, config);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_qr(config: &Config, id: &str, pbm: Option<&Path>, json: bool) -> Result<ExitCode, Error> {
    let url = passport_url(&config.origin, id);
    let bitmap = encode_qr(&url, config.qr_width_px)?;
    if let Some(path) = pbm {
        std::fs::write(path, bitmap.to_pbm())?;
    }
    if json {
        print_json(&QrResponse {
            url,
            modules: bitmap.size(),
            pixel_width: bitmap.pixel_width(),
            pbm_path: pbm.map(|p| p.display().to_string()),
        });
    } else {
        print!("{}", bitmap.render_terminal());
        println!("{url}");
    }
    Ok(ExitCode::SUCCESS)
}

async fn handle_open(config: &Config, route: &str, json: bool) -> Result<ExitCode, Error> {
    let route = Route::parse(route)?;
    let view = rehydrate(&route, &backend(config)?).await?;
    if json {
        print_json(&view);
        return Ok(ExitCode::SUCCESS);
    }

    let wishlist = load_wishlist(config)?;
    match &view {
        RouteView::Welcome => println!("Welcome to Evol Jewels. Run `evol-kiosk run` to begin."),
        RouteView::Survey => println!("Style survey. Run `evol-kiosk run` to take it."),
        RouteView::Stylist => println!("AI stylist. Ask with `evol-kiosk ask <question>`."),
        RouteView::Recommendation(passport) | RouteView::Passport(passport) => {
            println!("{}", render::passport(passport, wishlist.ids()));
            println!("{}", passport_url(&config.origin, &passport.session_id));
        }
        RouteView::Catalog(products) => println!("{}", render::catalog(products, wishlist.ids())),
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_wishlist(config: &Config, command: &WishlistCommand, json: bool) -> Result<ExitCode, Error> {
    let mut wishlist = load_wishlist(config)?;
    let (status, id) = match command {
        WishlistCommand::List => (None, None),
        WishlistCommand::Add { id } => {
            let status = if wishlist.add(id)? { "added" } else { "unchanged" };
            (Some(status), Some(id))
        }
        WishlistCommand::Remove { id } => {
            let status = if wishlist.remove(id)? { "removed" } else { "unchanged" };
            (Some(status), Some(id))
        }
        WishlistCommand::Toggle { id } => {
            let status = if wishlist.toggle(id)? { "added" } else { "removed" };
            (Some(status), Some(id))
        }
    };

    if json {
        print_json(&WishlistResponse {
            status: status.map(str::to_string),
            id: id.cloned(),
            ids: wishlist.ids().to_vec(),
        });
    } else {
        if let (Some(status), Some(id)) = (status, id) {
            println!("{id}: {status}");
        }
        for id in wishlist.ids() {
            println!("♥ {id}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_version(json: bool) -> Result<ExitCode, Error> {
    if json {
        print_json(&serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "name": env!("CARGO_PKG_NAME")
        }));
    } else {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    }
    Ok(ExitCode::SUCCESS)
}
