mod deliver;
mod views;

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use robodash_client::feed::{board_poller, status_poller};
use robodash_client::{ClientConfig, DashboardClient, PollState, Poller};
use robodash_core::api::RetrieveMessage;
use robodash_core::notify::Inbox;
use robodash_core::progress::StatusView;
use robodash_core::simulator::SimSource;
use robodash_core::tasks::{sort_tasks, SortKey, SortOrder, TaskAction};
use robodash_core::TaskId;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::deliver::{run_wizard, LiveServices};

#[derive(Parser, Debug)]
#[command(name = "robodash", version, about = "Delivery-robot dashboard in the terminal")]
struct Cli {
    /// Client configuration file.
    #[arg(long, global = true, env = "ROBODASH_CONFIG")]
    config: Option<PathBuf>,

    /// Act as this user instead of the configured identity.
    #[arg(long, global = true, env = "ROBODASH_USER")]
    user: Option<String>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Write a config file with the default endpoints
    InitConfig {
        #[arg(long)]
        force: bool,
    },

    /// Create a delivery task step by step
    Deliver,

    /// Show base-station slot availability
    Stations,

    /// Classify an item description
    Classify {
        #[arg(required = true)]
        description: Vec<String>,
    },

    /// Show the robot status bar
    Status {
        #[arg(long)]
        watch: bool,
    },

    /// Show sent and received tasks with their available actions
    Tasks {
        #[arg(long)]
        watch: bool,
    },

    /// Items waiting for pickup
    Inbox {
        /// Task ids to dismiss
        #[arg(long)]
        dismiss: Vec<String>,
        #[arg(long, conflicts_with = "dismiss")]
        all: bool,
        #[arg(long)]
        watch: bool,
    },

    /// Advance a task (UserDropoff, LoadingDone, UnloadingDone, UserPickup)
    Action { task_id: String, action: TaskAction },

    /// Send a command as Frontend, MiRFleet or ESP32
    Simulate {
        source: SimSource,
        /// Omit to list the commands of the source
        command: Option<String>,
        /// key=value, repeatable
        #[arg(long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },

    /// Task log, sorted by one column
    Log {
        #[arg(long, default_value = "timestamp")]
        sort: SortKey,
        #[arg(long)]
        asc: bool,
    },
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{s}`"))?;
    Ok((k.trim().to_string(), v.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);

    if let Cmd::InitConfig { force } = cli.cmd {
        if config_path.exists() && !force {
            bail!("{} already exists (use --force to overwrite)", config_path.display());
        }
        ClientConfig::default().save_to(&config_path)?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let config = ClientConfig::load_or_default(&config_path)?;
    let client = DashboardClient::new(&config);
    let flag = cli.user.as_deref();

    match cli.cmd {
        Cmd::InitConfig { .. } => {}
        Cmd::Deliver => {
            let sender = match current_user(flag, &config, &client).await {
                Ok(u) => Some(u),
                Err(e) => {
                    warn!("sending without a sender: {e:#}");
                    None
                }
            };
            let svc = LiveServices::new(client);
            let stdin = std::io::stdin();
            let id = run_wizard(&svc, sender, stdin.lock(), std::io::stdout()).await?;
            svc.settle().await;
            if let Some(id) = id {
                info!(task = %id, "delivery submitted");
            }
        }
        Cmd::Stations => {
            let (stations, top) = tokio::join!(client.fetch_availability(), client.fetch_top_units());
            print!("{}", views::render_stations(&stations?));
            match top {
                Ok(units) if !units.is_empty() => print!("{}", views::render_top_units(&units)),
                Ok(_) => {}
                Err(e) => warn!("top unit unavailable: {e}"),
            }
        }
        Cmd::Classify { description } => {
            let result = client.classify(&description.join(" ")).await;
            print!("{}", views::render_classification(&result));
        }
        Cmd::Status { watch } => {
            if watch {
                follow(status_poller(&client, &config.polling), |state| match &state.value {
                    Some(view) => print_status(view),
                    None => println!("status unavailable: {}", state.error.as_deref().unwrap_or("-")),
                })
                .await;
            } else {
                print_status(&client.fetch_status_view().await?);
            }
        }
        Cmd::Tasks { watch } => {
            let user = current_user(flag, &config, &client).await?;
            if watch {
                follow(board_poller(&client, &config.polling, &user), |state| match &state.value {
                    Some(board) => print!("{}", views::render_board(board)),
                    None => println!("Failed to fetch tasks: {}", state.error.as_deref().unwrap_or("-")),
                })
                .await;
            } else {
                print!("{}", views::render_board(&client.fetch_board(&user).await?));
            }
        }
        Cmd::Inbox { dismiss, all, watch } => {
            let user = current_user(flag, &config, &client).await?;
            inbox(&client, &config, &user, dismiss, all, watch).await?;
        }
        Cmd::Action { task_id, action } => {
            let user = current_user(flag, &config, &client).await?;
            let board = client.fetch_board(&user).await?;
            let Some(task) = board.find(&TaskId::from_str(task_id.as_str())) else {
                bail!("task {task_id} is not in the queues of {user}");
            };
            // The board's id keeps the wire type the backend gave it.
            let id = task.task_id.clone();
            if !action.is_enabled_for(task) {
                bail!("{action} is not available for task {id} ({}/{})", task.status, task.progress);
            }
            client.send_command(&action.command(id.clone())).await?;
            println!("{}: task {id}", action.describe());
        }
        Cmd::Simulate {
            source,
            command,
            fields,
        } => {
            let Some(name) = command else {
                for c in source.commands() {
                    let keys: Vec<&str> = c.fields.iter().map(|f| f.key).collect();
                    println!("{:<16} {}", c.name, keys.join(" "));
                }
                return Ok(());
            };
            let sim = source.command(&name)?;
            let values: HashMap<String, String> = fields.into_iter().collect();
            let wire = sim.build(&values)?;
            client.send_command(&wire).await?;
            if let Err(e) = client.post_status(sim.status).await {
                warn!("robot status not updated: {e}");
            }
            println!("{source} sent {}; robot status is now {}", sim.name, sim.status);
        }
        Cmd::Log { sort, asc } => {
            let mut tasks = client.fetch_task_log().await?;
            let order = if asc { SortOrder::Asc } else { SortOrder::Desc };
            sort_tasks(&mut tasks, sort, order);
            print!("{}", views::render_task_table(&tasks));
        }
    }

    Ok(())
}

/// `--user`, then the configured username, then the configured email looked
/// up in the directory.
async fn current_user(flag: Option<&str>, config: &ClientConfig, client: &DashboardClient) -> Result<String> {
    let named = flag
        .or(config.identity.username.as_deref())
        .map(str::trim)
        .filter(|u| !u.is_empty());
    if let Some(user) = named {
        return Ok(user.to_string());
    }
    let Some(email) = config.identity.email.as_deref() else {
        bail!("no user: pass --user or set identity.username in the config");
    };
    match client.resolve_user(email).await? {
        Some(user) => Ok(user.username),
        None => bail!("{email} is not in the user directory"),
    }
}

fn print_status(view: &StatusView) {
    println!("Robot: {}", view.status);
    println!("{}", view.render_bar());
}

/// Print every poll result until ctrl-c.
async fn follow<T, F>(poller: Poller<T>, mut show: F)
where
    T: Clone,
    F: FnMut(&PollState<T>),
{
    let mut rx = poller.subscribe();
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                show(&state);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
}

async fn inbox(
    client: &DashboardClient,
    config: &ClientConfig,
    user: &str,
    dismiss: Vec<String>,
    all: bool,
    watch: bool,
) -> Result<()> {
    let acked = match client.fetch_acks(user).await {
        Ok(ids) => ids,
        Err(e) => {
            warn!("acknowledgements unavailable, showing everything: {e}");
            BTreeSet::new()
        }
    };
    let mut inbox = Inbox::new(acked);
    let received = client.fetch_queue(user, RetrieveMessage::ReceiveQueue).await?;
    inbox.refresh(&received);

    let dismissed: Vec<TaskId> = if all {
        inbox.dismiss_all()
    } else {
        let wanted: Vec<TaskId> = dismiss
            .iter()
            .filter_map(|raw| {
                let raw = TaskId::from_str(raw.as_str());
                inbox.pending().iter().find(|t| t.task_id == raw).map(|t| t.task_id.clone())
            })
            .collect();
        wanted.into_iter().filter(|id| inbox.dismiss(id)).collect()
    };
    if !dismissed.is_empty() {
        client.acknowledge(user, dismissed.clone()).await?;
        println!("Dismissed {} notification(s).", dismissed.len());
    }

    if inbox.should_show() {
        print!("{}", views::render_pickup_notice(inbox.pending()));
    } else {
        println!("No items waiting for pickup.");
    }
    if !watch {
        return Ok(());
    }

    let poller = board_poller(client, &config.polling, user);
    let mut rx = poller.subscribe();
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                let Some(board) = state.value else {
                    continue;
                };
                if let Ok(ids) = client.fetch_acks(user).await {
                    inbox.absorb_acknowledged(ids);
                }
                print!("{}", views::render_pickup_notice(&inbox.refresh(&board.received)));
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_pairs_split_on_first_equals() {
        assert_eq!(parse_field("end=B=2"), Ok(("end".to_string(), "B=2".to_string())));
        assert!(parse_field("end").is_err());
    }

    #[test]
    fn simulate_arguments_parse() {
        let cli = Cli::try_parse_from([
            "robodash",
            "simulate",
            "esp32",
            "LoadingDone",
            "--field",
            "end=StationB",
            "--field",
            "unloadCompartment=2",
        ])
        .unwrap();
        let Cmd::Simulate {
            source,
            command,
            fields,
        } = cli.cmd
        else {
            panic!("wrong subcommand");
        };
        assert_eq!(source, SimSource::Esp32);
        assert_eq!(command.as_deref(), Some("LoadingDone"));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn action_names_are_checked() {
        let cli = Cli::try_parse_from(["robodash", "--user", "alice", "action", "7", "userpickup"]).unwrap();
        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert!(matches!(
            cli.cmd,
            Cmd::Action {
                action: TaskAction::UserPickup,
                ..
            }
        ));
        assert!(Cli::try_parse_from(["robodash", "action", "7", "Teleport"]).is_err());
    }

    #[test]
    fn log_sort_key_defaults_to_timestamp() {
        let cli = Cli::try_parse_from(["robodash", "log"]).unwrap();
        assert!(matches!(
            cli.cmd,
            Cmd::Log {
                sort: SortKey::Timestamp,
                asc: false
            }
        ));
    }
}
