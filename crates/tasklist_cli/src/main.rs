use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::debug;
use std::io::{self, BufRead};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tasklist_cli::cli::{Cli, Command, collect_overrides};
use tasklist_core::config::{self, Config, ConfigOverrides, Palette};
use tasklist_core::error::AppError;
use tasklist_core::model::{Priority, Task, TaskId, parse_task_id};
use tasklist_core::storage::{JsonFileStore, KeyValueStore, records};
use tasklist_core::store::TaskStore;
use tasklist_core::view::{self, SortOrder, SortState, SortType};

const LOG_ENV_VAR: &str = "TASKLIST_LOG";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: TaskId,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: Priority,
    #[tabled(rename = "Deadline")]
    deadline: String,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            priority: task.priority,
            deadline: task.deadline.to_string(),
        }
    }
}

fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "title": task.title,
        "priority": task.priority,
        "deadline": task.deadline,
        "completed": task.completed,
    })
}

fn sort_json(state: SortState, saved: bool) -> serde_json::Value {
    serde_json::json!({
        "sort_type": state.sort_type,
        "sort_order": state.sort_order,
        "saved": saved,
    })
}

fn sort_label(state: SortState) -> String {
    format!("by {} {}", state.sort_type, state.sort_order.arrow())
}

fn print_section(heading: &str, tasks: &[Task], palette: &Palette, muted: bool) {
    println!("{}", palette.accentize(heading));
    if tasks.is_empty() {
        println!("  (none)");
        return;
    }

    let mut table = Table::new(tasks.iter().map(TaskRow::from));
    table.with(Style::psql());
    let rendered = table.to_string();
    if muted {
        println!("{}", palette.mutedize(&rendered));
    } else {
        println!("{rendered}");
    }
}

fn print_lists(state: SortState, active: &[Task], completed: &[Task], palette: &Palette) {
    print_section(
        &format!("Tasks: ({})", sort_label(state)),
        active,
        palette,
        false,
    );
    println!();
    print_section("Completed Tasks:", completed, palette, true);
}

fn print_lists_json(state: SortState, active: &[Task], completed: &[Task]) {
    let payload = serde_json::json!({
        "sort_type": state.sort_type,
        "sort_order": state.sort_order,
        "active": active.iter().map(task_json).collect::<Vec<_>>(),
        "completed": completed.iter().map(task_json).collect::<Vec<_>>(),
    });
    println!("{payload}");
}

fn report_persist_error<S: KeyValueStore>(store: &mut TaskStore<S>) {
    if let Some(err) = store.take_persist_error() {
        eprintln!("WARNING: {}", err);
    }
}

/// Saved selection (or config default), with command-line overrides on top.
fn current_sort_state(
    storage: &JsonFileStore,
    config: &Config,
    overrides: &ConfigOverrides,
) -> SortState {
    let mut state =
        records::load_sort_state(storage).unwrap_or_else(|| config.default_sort_state());
    if let Some(sort_type) = overrides.sort {
        state.sort_type = sort_type;
    }
    if let Some(sort_order) = overrides.order {
        state.sort_order = sort_order;
    }
    state
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::validation(message)
}

fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    )
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(std::mem::take(&mut current));
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::validation("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(cli: Cli, base_config: &Config) -> Result<(), AppError> {
    let overrides = collect_overrides(&cli.config_override)?;
    let config = config::merge_overrides(base_config, &overrides);
    let palette = config.palette();
    let storage = JsonFileStore::open_default()?;
    debug!(
        "event=command module=cli store={}",
        storage.path().display()
    );

    match cli.command {
        Command::Add {
            title,
            priority,
            deadline,
        } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::validation("title is required")),
            };
            let priority = match priority.as_deref() {
                Some(raw) => raw.parse::<Priority>()?,
                None => Priority::default(),
            };

            let mut store = TaskStore::open(storage)?;
            let task = store.add(&title, priority, deadline.as_deref().unwrap_or(""))?;
            report_persist_error(&mut store);

            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Added task: {} ({})", task.title, task.id);
            }
        }
        Command::Done { id } => {
            let id = parse_task_id(&id)?;
            let mut store = TaskStore::open(storage)?;
            let completed = store.complete(id);
            report_persist_error(&mut store);

            match (completed, cli.json) {
                (Some(task), true) => println!("{}", task_json(&task)),
                (Some(task), false) => println!("Completed task: {} ({})", task.title, task.id),
                (None, true) => println!("null"),
                (None, false) => println!("No pending task with id {id}"),
            }
        }
        Command::Delete { id } => {
            let id = parse_task_id(&id)?;
            let mut store = TaskStore::open(storage)?;
            let removed = store.delete(id);
            report_persist_error(&mut store);

            match (removed, cli.json) {
                (Some(task), true) => println!("{}", task_json(&task)),
                (Some(task), false) => println!("Deleted task: {} ({})", task.title, task.id),
                (None, true) => println!("null"),
                (None, false) => println!("No task with id {id}"),
            }
        }
        Command::List { sort, order } => {
            let mut state = current_sort_state(&storage, &config, &overrides);
            if let Some(sort) = sort.as_deref() {
                state.sort_type = sort.parse::<SortType>()?;
            }
            if let Some(order) = order.as_deref() {
                state.sort_order = order.parse::<SortOrder>()?;
            }

            let store = TaskStore::open(storage)?;
            let active = view::active_tasks(store.tasks(), state.sort_type, state.sort_order);
            let completed = view::completed_tasks(store.tasks(), state.sort_type, state.sort_order);

            if cli.json {
                print_lists_json(state, &active, &completed);
            } else {
                print_lists(state, &active, &completed, &palette);
            }
        }
        Command::Sort { by } => {
            let requested: SortType = by.parse()?;
            let mut state = current_sort_state(&storage, &config, &overrides);
            state.toggle(requested);

            let mut storage = storage;
            let saved = match records::save_sort_state(&mut storage, state) {
                Ok(()) => true,
                Err(err) => {
                    eprintln!("WARNING: sort selection not saved: {}", err);
                    false
                }
            };

            if cli.json {
                println!("{}", sort_json(state, saved));
            } else if saved {
                println!("Sorting {}", sort_label(state));
            }
        }
    }

    Ok(())
}

fn run_interactive(config: &Config) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::persistence(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("tasklist".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) if is_informational(&err) => {
                println!("{err}");
                continue;
            }
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli, config) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(LOG_ENV_VAR, "warn"))
        .init();

    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error.as_ref() {
        eprintln!("WARNING: {}", err);
    }
    let config = loaded.config;

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        if let Err(err) = run_interactive(&config) {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if is_informational(&err) => err.exit(),
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli, &config) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
