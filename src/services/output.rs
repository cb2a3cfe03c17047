use crate::domain::errors::MushError;
use crate::domain::models::JsonOut;
use serde::Serialize;

fn emit_json<T: Serialize>(body: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(body)?);
    Ok(())
}

/// One line per row, or a single `{"ok":true,"data":[...]}` document.
pub fn print_out<T: Serialize>(
    json: bool,
    data: &[T],
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        return emit_json(&JsonOut { ok: true, data });
    }
    for d in data {
        println!("{}", row(d));
    }
    Ok(())
}

pub fn print_one<T: Serialize>(
    json: bool,
    data: T,
    row: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        return emit_json(&JsonOut { ok: true, data });
    }
    println!("{}", row(&data));
    Ok(())
}

/// Reports a failed command and returns the process exit status for it.
pub fn report_error(json: bool, err: &anyhow::Error) -> u8 {
    let (code, status) = match err.downcast_ref::<MushError>() {
        Some(e) => (e.code(), e.exit_code()),
        None => ("ERROR", 1),
    };
    let printed = json
        && emit_json(&serde_json::json!({
            "ok": false,
            "error": {"code": code, "message": format!("{:#}", err)}
        }))
        .is_ok();
    if !printed {
        eprintln!("mushform: {:#}", err);
    }
    status
}
