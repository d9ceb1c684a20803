//! desk-runner: headless front end for the influence desk.
//!
//! Usage:
//!   desk-runner --db desk.sqlite3 migrate
//!   desk-runner --config desk.json --today 2025-06-01 sweep
//!   desk-runner --db desk.sqlite3 dashboard
//!   desk-runner --db desk.sqlite3 export-prepayments --out prepayments.csv
//!   desk-runner --db desk.sqlite3 --ipc-mode

use anyhow::{Context, Result};
use chrono::NaiveDate;
use influence_core::{
    clock::{DeskClock, FixedClock, SystemClock},
    config::DeskConfig,
    dashboard::DashboardFilter,
    desk::Desk,
    model::{
        CampaignFilter, CampaignUpdate, CommentFilter, NewBlogger, NewCampaign, NewComment,
        NewCounterparty, NewPlacement, NewPricePreset, NewUser, PlacementFilter, PlacementUpdate,
        PricePresetUpdate, UserUpdate,
    },
    store::DeskStore,
    types::EntityId,
};
use serde::Serialize;
use std::env;
use std::fs::File;
use std::io::{self, BufRead, Write};

const COMMANDS: [&str; 4] = ["migrate", "sweep", "dashboard", "export-prepayments"];

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Sweep,
    RunTasks,
    Dashboard {
        #[serde(default)]
        filter: DashboardFilter,
    },
    CreateBlogger {
        blogger: NewBlogger,
    },
    ListBloggers,
    CreateCounterparty {
        counterparty: NewCounterparty,
    },
    ListCounterparties,
    SetBloggerCounterparties {
        blogger_id: EntityId,
        counterparty_ids: Vec<EntityId>,
    },
    CreateUser {
        user: NewUser,
    },
    ListUsers,
    UpdateUser {
        id: EntityId,
        update: UserUpdate,
    },
    CreatePricePreset {
        preset: NewPricePreset,
    },
    UpdatePricePreset {
        id: EntityId,
        update: PricePresetUpdate,
    },
    DeletePricePreset {
        id: EntityId,
    },
    ListPricePresets {
        #[serde(default)]
        blogger_id: Option<EntityId>,
    },
    CreateComment {
        comment: NewComment,
    },
    ListComments {
        #[serde(default)]
        filter: CommentFilter,
    },
    CreateCampaign {
        campaign: NewCampaign,
    },
    UpdateCampaign {
        id: EntityId,
        update: CampaignUpdate,
    },
    ListCampaigns {
        #[serde(default)]
        filter: CampaignFilter,
    },
    CampaignDetail {
        id: EntityId,
    },
    CreatePlacement {
        placement: NewPlacement,
    },
    UpdatePlacement {
        id: EntityId,
        update: PlacementUpdate,
    },
    DeletePlacement {
        id: EntityId,
    },
    ListPlacements {
        #[serde(default)]
        filter: PlacementFilter,
    },
    PlacementHistory {
        id: EntityId,
    },
    ExportPrepayments {
        path: String,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    let mut config = match flag_value(&args, "--config") {
        Some(path) => DeskConfig::load(path)?,
        None => DeskConfig::default(),
    };
    if let Some(db) = flag_value(&args, "--db") {
        config.database_path = db.to_string();
    }

    let clock: Box<dyn DeskClock> = match flag_value(&args, "--today") {
        Some(d) => {
            let date = NaiveDate::parse_from_str(d, "%Y-%m-%d")
                .with_context(|| format!("--today expects YYYY-MM-DD, got {d}"))?;
            Box::new(FixedClock::new(date))
        }
        None => Box::new(SystemClock),
    };

    let mut desk = Desk::open(config, clock)?;
    log::info!(
        "Desk ready: db={} today={} sweep_before_reads={} top_bloggers_limit={}",
        desk.repo().path().unwrap_or(":memory:"),
        desk.today(),
        desk.config().sweep_before_reads,
        desk.config().top_bloggers_limit
    );

    if ipc_mode {
        return run_ipc_loop(&mut desk);
    }

    let command = args
        .iter()
        .skip(1)
        .find(|a| COMMANDS.contains(&a.as_str()))
        .map(String::as_str)
        .unwrap_or("dashboard");

    match command {
        "migrate" => println!("Schema is up to date."),
        "sweep" => {
            desk.run_tasks()?;
            let changed = desk.last_sweep_report().map_or(0, |r| r.changed());
            println!("Overdue sweep for {}: {changed} placement(s) promoted", desk.today());
        }
        "export-prepayments" => {
            let out = flag_value(&args, "--out").unwrap_or("prepayments.csv");
            let file = File::create(out).with_context(|| format!("Cannot create {out}"))?;
            let n = desk.export_prepayments(file)?;
            println!("Wrote {n} row(s) to {out}");
        }
        _ => {
            let dashboard = desk.dashboard(&DashboardFilter::default())?;
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
    }
    Ok(())
}

fn run_ipc_loop(desk: &mut Desk<DeskStore>) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                reply_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        match handle_command(desk, cmd) {
            Ok(value) => writeln!(stdout, "{value}")?,
            Err(e) => {
                log::warn!("Request failed: {e:#}");
                reply_error(&mut stdout, &format!("{e:#}"))?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn reply_error(out: &mut impl Write, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(out, "{err_json}")?;
    out.flush()?;
    Ok(())
}

fn to_json<T: Serialize>(value: T) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

fn handle_command(desk: &mut Desk<DeskStore>, cmd: IpcCommand) -> Result<serde_json::Value> {
    match cmd {
        IpcCommand::Sweep => to_json(desk.sweep_overdue()?),
        IpcCommand::RunTasks => to_json(desk.run_tasks()?),
        IpcCommand::Dashboard { filter } => to_json(desk.dashboard(&filter)?),
        IpcCommand::CreateBlogger { blogger } => to_json(desk.create_blogger(blogger)?),
        IpcCommand::ListBloggers => to_json(desk.list_bloggers()?),
        IpcCommand::CreateCounterparty { counterparty } => {
            to_json(desk.create_counterparty(counterparty)?)
        }
        IpcCommand::ListCounterparties => to_json(desk.list_counterparties()?),
        IpcCommand::SetBloggerCounterparties {
            blogger_id,
            counterparty_ids,
        } => to_json(desk.set_blogger_counterparties(blogger_id, &counterparty_ids)?),
        IpcCommand::CreateUser { user } => to_json(desk.create_user(user)?),
        IpcCommand::ListUsers => to_json(desk.list_users()?),
        IpcCommand::UpdateUser { id, update } => to_json(desk.update_user(id, update)?),
        IpcCommand::CreatePricePreset { preset } => to_json(desk.create_price_preset(preset)?),
        IpcCommand::UpdatePricePreset { id, update } => {
            to_json(desk.update_price_preset(id, update)?)
        }
        IpcCommand::DeletePricePreset { id } => {
            desk.delete_price_preset(id)?;
            Ok(serde_json::json!({ "deleted": id }))
        }
        IpcCommand::ListPricePresets { blogger_id } => {
            to_json(desk.list_price_presets(blogger_id)?)
        }
        IpcCommand::CreateComment { comment } => to_json(desk.create_comment(comment)?),
        IpcCommand::ListComments { filter } => to_json(desk.list_comments(&filter)?),
        IpcCommand::CreateCampaign { campaign } => to_json(desk.create_campaign(campaign)?),
        IpcCommand::UpdateCampaign { id, update } => to_json(desk.update_campaign(id, update)?),
        IpcCommand::ListCampaigns { filter } => to_json(desk.list_campaigns(&filter)?),
        IpcCommand::CampaignDetail { id } => to_json(desk.campaign_detail(id)?),
        IpcCommand::CreatePlacement { placement } => to_json(desk.create_placement(placement)?),
        IpcCommand::UpdatePlacement { id, update } => {
            to_json(desk.update_placement(id, update)?)
        }
        IpcCommand::DeletePlacement { id } => {
            desk.delete_placement(id)?;
            Ok(serde_json::json!({ "deleted": id }))
        }
        IpcCommand::ListPlacements { filter } => to_json(desk.list_placements(&filter)?),
        IpcCommand::PlacementHistory { id } => to_json(desk.placement_history(id)?),
        IpcCommand::ExportPrepayments { path } => {
            let file = File::create(&path).with_context(|| format!("Cannot create {path}"))?;
            let rows = desk.export_prepayments(file)?;
            Ok(serde_json::json!({ "path": path, "rows": rows }))
        }
        IpcCommand::Quit => Ok(serde_json::Value::Null),
    }
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
