//! Command-line front end for the todo list.
//!
//! A thin presentation layer: it turns arguments into intents, sends them to
//! the store and prints the resulting view. Items are addressed by their
//! 1-based position in the full list.
//!
//! ```text
//! todo [list [all|active|completed]]
//! todo add <text...>
//! todo toggle <n>
//! todo edit <n> <text...>
//! todo rm <n>
//! ```

use checklist_runtime::Store;
use std::process::ExitCode;
use std::sync::Arc;
use todo::config::Config;
use todo::storage::{BlobStorage, FileStore};
use todo::{Filter, TodoAction, TodoEnvironment, TodoId, TodoReducer, TodoState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

const USAGE: &str = "usage: todo [list [all|active|completed]] | add <text> | toggle <n> | edit <n> <text> | rm <n>";

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let storage = BlobStorage::new(FileStore::new(&config.storage.path), &config.storage.key);
    tracing::debug!(path = %storage.store().path().display(), "Using file store");

    let env = TodoEnvironment::with_storage(Arc::new(storage));
    let store = Store::new(TodoState::new(), TodoReducer::new(), env);
    store.send(TodoAction::Load).await?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (command, rest) = match args.split_first() {
        Some((command, rest)) => (command.as_str(), rest),
        None => ("list", &[][..]),
    };

    let intents = match command {
        "list" => match rest.first().map(|f| f.parse::<Filter>()).transpose() {
            Ok(filter) => vec![TodoAction::ChangeFilter {
                filter: filter.unwrap_or_default(),
            }],
            Err(error) => return Ok(usage_error(&error.to_string())),
        },
        "add" => vec![
            TodoAction::ChangeInput {
                text: rest.join(" "),
            },
            TodoAction::SubmitInput,
        ],
        "toggle" | "rm" | "edit" => {
            let Some(id) = item_at(&store, rest.first()).await else {
                return Ok(usage_error("expected the number of an existing item"));
            };
            match command {
                "toggle" => vec![TodoAction::Toggle { id }],
                "rm" => vec![TodoAction::Delete { id }],
                _ => vec![
                    TodoAction::StartEdit { id },
                    TodoAction::ChangeEditText {
                        text: rest[1..].join(" "),
                    },
                    TodoAction::CommitEdit,
                ],
            }
        },
        other => return Ok(usage_error(&format!("unknown command '{other}'"))),
    };

    for intent in intents {
        store.send(intent).await?;
    }

    store.state(print_view).await;
    store.shutdown().await;
    Ok(ExitCode::SUCCESS)
}

/// Resolves a 1-based position argument to the id of that item
async fn item_at(store: &TodoStore, arg: Option<&String>) -> Option<TodoId> {
    let index = arg?.parse::<usize>().ok()?.checked_sub(1)?;
    store
        .state(|s| s.todos.items().get(index).map(|item| item.id.clone()))
        .await
}

fn usage_error(message: &str) -> ExitCode {
    eprintln!("error: {message}\n{USAGE}");
    ExitCode::from(2)
}

fn print_view(state: &TodoState) {
    let view = state.view();
    for item in &view.items {
        let position = state
            .todos
            .items()
            .iter()
            .position(|t| t.id == item.id)
            .map_or(0, |p| p + 1);
        let mark = if item.completed { "x" } else { " " };
        println!("{position:>3}. [{mark}] {}", item.text);
    }
    if view.items.is_empty() {
        println!("     (nothing to show)");
    }
    println!(
        "\n{} item{} left, {} completed ({} shown)",
        view.active_count,
        if view.active_count == 1 { "" } else { "s" },
        view.completed_count,
        view.filter
    );
}
