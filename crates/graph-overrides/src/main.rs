use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use graph_overrides::config::{self, ControlDocument};
use graph_overrides::controller::{OverrideController, Request};
use graph_overrides::form::Field;
use graph_overrides::menu::{PopupItem, build_category_menu, build_full_tree, flatten};
use graph_overrides::{Error, Result};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the option menu of a control definition
    Menu {
        /// Path to a control definition TOML
        control: PathBuf,
        /// Show only the menu used to change this option
        #[arg(long)]
        edit: Option<String>,
        /// Print the popup items as JSON
        #[arg(long)]
        json: bool,
    },
    /// Initialize a control, apply operations in order, and print the resulting fields
    Apply {
        /// Path to a control definition TOML
        control: PathBuf,
        /// Operation: add:KEY[=VALUE], update:KEY=VALUE or remove:KEY
        #[arg(long = "op")]
        ops: Vec<String>,
    },
    /// Print the fully-resolved TOML (after imports/extends)
    Resolve {
        /// Path to a control definition TOML
        control: PathBuf,
    },
    /// Edit a control interactively in the terminal
    Tui {
        /// Path to a control definition TOML
        control: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    if !matches!(args.cmd, Command::Tui { .. }) {
        init_logging(&args.log_level);
    }
    match args.cmd {
        Command::Menu {
            control,
            edit,
            json,
        } => cmd_menu(&control, edit.as_deref(), json),
        Command::Apply { control, ops } => cmd_apply(&control, &ops),
        Command::Resolve { control } => cmd_resolve(&control),
        Command::Tui { control } => {
            let fields = graph_overrides::ui::run_tui(&control)?;
            print_fields(&fields);
            Ok(())
        }
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_control(path: &Path) -> Result<ControlDocument> {
    let doc = config::load(path)?;
    ControlDocument::from_doc(&doc)
}

fn cmd_menu(path: &Path, edit: Option<&str>, json: bool) -> Result<()> {
    let ControlDocument { config, markup } = load_control(path)?;
    let mut controller = OverrideController::new();
    let id = controller.mount(markup);

    let sections: Vec<_> = match edit {
        Some(option) if !config.menu.offers(option) => {
            return Err(Error::msg(format!("option '{option}' is not in the menu")));
        }
        Some(option) => build_category_menu(&config.menu, option).into_iter().collect(),
        None => build_full_tree(&config.menu),
    };
    let items = flatten(id, &sections);

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }
    let mut out = String::new();
    write_outline(&items, 0, &mut out);
    print!("{out}");
    Ok(())
}

fn write_outline(items: &[PopupItem], depth: usize, out: &mut String) {
    for item in items {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&item.label);
        if let Some(data) = &item.data {
            out.push_str(&format!("  -> {}({})", data.callback, data.args.join(", ")));
        }
        out.push('\n');
        write_outline(&item.items, depth + 1, out);
    }
}

fn parse_op(op: &str) -> Result<Request> {
    let (method, rest) = op
        .split_once(':')
        .ok_or_else(|| Error::msg(format!("invalid operation '{op}' (expected METHOD:KEY[=VALUE])")))?;
    let args = match rest.split_once('=') {
        Some((key, value)) => vec![key.to_string(), value.to_string()],
        None => vec![rest.to_string()],
    };
    Request::parse_call(method, &args).ok_or_else(|| {
        Error::msg(format!(
            "unknown operation '{method}' in '{op}' (expected add, update or remove)"
        ))
    })
}

fn cmd_apply(path: &Path, ops: &[String]) -> Result<()> {
    let ControlDocument { config, markup } = load_control(path)?;
    let requests = ops.iter().map(|op| parse_op(op)).collect::<Result<Vec<_>>>()?;

    let mut controller = OverrideController::new();
    let id = controller.mount(markup);
    controller.dispatch(id, Request::Init(config));
    for request in requests {
        controller.dispatch(id, request);
    }

    let store = controller
        .store(id)
        .ok_or_else(|| Error::msg("control failed to initialize"))?;
    print_fields(store.retained_fields());
    print_fields(&store.fields());
    Ok(())
}

fn cmd_resolve(path: &Path) -> Result<()> {
    let doc = config::load(path)?;
    print!("{}", toml::to_string_pretty(&doc.value)?);
    Ok(())
}

fn print_fields(fields: &[Field]) {
    for field in fields {
        println!("{}={}", field.name, field.serialized_value());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_op_splits_key_and_value() {
        match parse_op("add:width=4").unwrap() {
            Request::Add { option, value } => {
                assert_eq!(option, "width");
                assert_eq!(value.as_deref(), Some("4"));
            }
            other => panic!("unexpected request {other:?}"),
        }
        assert!(matches!(parse_op("remove:width").unwrap(), Request::Remove { .. }));
    }

    #[test]
    fn parse_op_rejects_misspelled_method() {
        let err = parse_op("ad:width=4").unwrap_err();
        assert!(err.to_string().contains("unknown operation 'ad'"));
        assert!(parse_op("width=4").is_err());
    }
}
