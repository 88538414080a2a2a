//! `footgraph fields`: the statistics columns and their groups.

use crate::cli::output::{self, Styled};
use crate::model::DataField;
use anyhow::Result;

/// Run the fields command.
pub fn run() -> Result<()> {
    if output::is_json() {
        let fields: Vec<_> = DataField::ALL
            .iter()
            .map(|f| {
                serde_json::json!({
                    "key": f.key(),
                    "label": f.display_name(),
                    "kind": f.kind().as_str(),
                    "group": f.group(),
                })
            })
            .collect();
        output::print_json(&serde_json::Value::Array(fields));
        return Ok(());
    }

    let s = Styled::new();
    let mut current = None;
    for field in DataField::ALL {
        if current != Some(field.group()) {
            if current.is_some() {
                println!();
            }
            current = Some(field.group());
            println!("{}", s.bold(field.group().title()));
        }
        println!(
            "  {:<28} {:<28} {}",
            field.key(),
            field.display_name(),
            s.dim(field.kind().as_str())
        );
    }
    Ok(())
}
