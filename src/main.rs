use anyhow::{bail, Context, Result};
use chrono::{Days, Local};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use travelbuddy::cli::{self, command::HELP, Command};
use travelbuddy::config::Config;
use travelbuddy::export::{self, ExportDocument, Exporter};
use travelbuddy::generate::{self, TripRequest};
use travelbuddy::provider::{self, DynProvider};
use travelbuddy::session::Session;
use travelbuddy::{assist, log, replan, ux, view};

struct App {
    cfg: Config,
    provider: DynProvider,
    timeout: Duration,
    exporter: Box<dyn Exporter>,
    request: TripRequest,
    session: Session,
}

fn trip_from_args(args: &cli::Args, cfg: &Config) -> TripRequest {
    let start = args.start.unwrap_or_else(|| Local::now().date_naive());
    let end = args
        .end
        .or_else(|| start.checked_add_days(Days::new(5)))
        .unwrap_or(start);
    TripRequest {
        origin: args.origin.clone(),
        destination: args.destination.clone(),
        start_date: start,
        end_date: end,
        travelers: args.travelers,
        budget: args.budget,
        interests: args.interests.iter().cloned().collect(),
        language: cfg.language.clone(),
    }
}

impl App {
    /// On failure the previous plan (if any) stays in place.
    async fn generate(&mut self) -> Result<()> {
        let pb = ux::spinner(&format!("Planning your trip to {}...", self.request.destination));
        let res = generate::generate_plan(self.provider.as_ref(), &self.request, self.timeout).await;
        pb.finish_and_clear();
        let plan = res?;
        let store = self.session.adopt_plan(self.request.clone(), plan);
        ux::show_plan(&store, &self.request);
        Ok(())
    }

    fn export_path(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit.unwrap_or_else(|| {
            Path::new(&self.cfg.root).join(export::file_name(&self.request.destination, self.exporter.as_ref()))
        })
    }

    fn export(&self, path: &Path) -> Result<()> {
        let (store, trip) = self.session.require_plan()?;
        let doc = ExportDocument::from_plan(&store, &trip.destination);
        let bytes = self.exporter.export(&doc)?;
        export::write_atomic(path, &bytes)?;
        ux::exported(path, bytes.len());
        Ok(())
    }

    /// Returns false when the shell should exit.
    async fn dispatch(&mut self, cmd: Command) -> Result<bool> {
        match cmd {
            Command::Show => {
                let (store, trip) = self.session.require_plan()?;
                ux::show_plan(&store, trip);
            }
            Command::Day(day) => {
                let (store, _) = self.session.require_plan()?;
                let Some(v) = view::day_view(&store, day) else {
                    bail!("the plan has no Day {day}");
                };
                ux::show_day(&v, self.session.note(day));
            }
            Command::Replan { day, reason } => {
                let (store, trip) = self.session.require_plan()?;
                let (destination, language) = (trip.destination.clone(), trip.language.clone());
                let pb = ux::spinner(&format!("Replanning Day {day} ({reason})..."));
                let res = replan::replan(&store, self.provider.as_ref(), day, reason, &destination, &language, self.timeout).await;
                pb.finish_and_clear();
                res?;
                if let Some(v) = view::day_view(&store, day) {
                    ux::show_day(&v, self.session.note(day));
                }
            }
            Command::Map(file) => {
                let (store, trip) = self.session.require_plan()?;
                let map = view::map_dataset(&store, &trip.destination);
                match file {
                    Some(path) => {
                        let body = serde_json::to_vec_pretty(&map.to_geojson())?;
                        export::write_atomic(&path, &body)?;
                        ux::exported(&path, body.len());
                    }
                    None => ux::show_map(&map),
                }
            }
            Command::Stay => {
                let (store, trip) = self.session.require_plan()?;
                ux::show_lodging(&view::lodging(&store, &trip.destination), &store.sections().accommodation);
            }
            Command::Pack => {
                let pb = ux::spinner("Writing your packing list...");
                let res = assist::session_packing_list(&mut self.session, self.provider.as_ref(), self.timeout).await;
                pb.finish_and_clear();
                ux::show_text("Packing list", &res?);
            }
            Command::Guide => {
                let pb = ux::spinner("Asking a local...");
                let res = assist::session_local_guide(&mut self.session, self.provider.as_ref(), self.timeout).await;
                pb.finish_and_clear();
                ux::show_text("Know before you go", &res?);
            }
            Command::Ask(question) => {
                let pb = ux::spinner("Thinking...");
                let res = assist::ask(&mut self.session, self.provider.as_ref(), &question, self.timeout).await;
                pb.finish_and_clear();
                ux::show_chat_reply(&self.session);
                res?;
            }
            Command::ExpenseAdd { amount, item } => {
                self.session.ledger_mut().add(&item, amount)?;
                ux::show_expenses(self.session.ledger());
            }
            Command::ExpenseList | Command::ExpenseTotal => ux::show_expenses(self.session.ledger()),
            Command::ExpenseSplit => {
                let travelers = self.request.travelers;
                match self.session.ledger().split(travelers) {
                    Some(share) => println!("{share:.2} per person ({travelers} travellers)"),
                    None => bail!("no travellers to split between"),
                }
            }
            Command::ExpenseClear => {
                if ux::confirm("Clear all expenses?") {
                    self.session.ledger_mut().clear();
                }
            }
            Command::Note { day, text } => self.session.set_note(day, &text)?,
            Command::Export(file) => {
                let path = self.export_path(file);
                self.export(&path)?;
            }
            Command::Regen => self.generate().await?,
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    log::init_tracing(args.verbose);

    let mut cfg = Config::load(args.config.as_deref()).context("loading configuration")?;
    cfg.apply_args(&args);

    let session = Session::new();
    let mut prov = provider::make_provider(&cfg)?;
    if cfg.save_transcripts {
        let dir = log::session_dir(Path::new(&cfg.root), session.id());
        info!(dir = %dir.display(), "saving transcripts");
        let recording: DynProvider = Arc::new(log::RecordingProvider::new(prov, dir));
        prov = recording;
    }

    let request = trip_from_args(&args, &cfg);
    let mut app = App {
        timeout: Duration::from_secs(cfg.timeout_secs),
        exporter: export::make_exporter(cfg.export_format, cfg.page_lines, cfg.page_width),
        provider: prov,
        request,
        session,
        cfg,
    };

    if args.once {
        app.generate().await?;
        if let Some(path) = args.export.clone() {
            app.export(&path)?;
        }
        return Ok(());
    }

    if let Err(e) = app.generate().await {
        ux::error(format!("{e:#}"));
        println!("Type 'regen' to try again.");
    } else if let Some(path) = args.export.clone() {
        if let Err(e) = app.export(&path) {
            ux::error(format!("{e:#}"));
        }
    }

    println!("{HELP}");
    while let Some(line) = ux::read_line("travelbuddy>") {
        if line.is_empty() {
            continue;
        }
        let cmd = match line.parse::<Command>() {
            Ok(c) => c,
            Err(e) => {
                ux::error(e);
                continue;
            }
        };
        match app.dispatch(cmd).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => ux::error(format!("{e:#}")),
        }
    }
    Ok(())
}
