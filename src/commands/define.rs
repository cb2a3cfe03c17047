use crate::*;

pub fn handle_define_commands(cli: &Cli, store: &DefineStore) -> anyhow::Result<bool> {
    let Commands::Define { command } = &cli.command else {
        return Ok(false);
    };

    match command {
        DefineCommands::Set { name, value } => {
            let outcome = store.set(name, value)?;
            print_one(cli.json, &outcome, |o| match o {
                StoreOutcome::Disabled => "defines disabled".to_string(),
                _ => format!("defined '{}' as '{}'", name, value),
            })?;
        }
        DefineCommands::List => {
            if store.is_disabled() && !cli.json {
                println!("defines disabled");
                return Ok(true);
            }
            let entries = store.list()?;
            if entries.is_empty() && !cli.json {
                println!("no defines set");
            } else {
                print_out(cli.json, &entries, |e| format!("'{}' = '{}'", e.name, e.value))?;
            }
        }
        DefineCommands::Delete { name } => {
            let outcome = store.delete(name)?;
            print_one(cli.json, &outcome, |o| match o {
                StoreOutcome::Disabled => "defines disabled".to_string(),
                StoreOutcome::NotDefined => format!("'{}' is not currently defined", name),
                _ => format!("'{}' is no longer defined", name),
            })?;
        }
    }

    Ok(true)
}
