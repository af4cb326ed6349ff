//! `shelfwatch discover` — draft a config from a legacy folder layout.
//!
//! The tool this replaces found its sources by sniffing spreadsheet names
//! ("export_*" for sales, "Source_AMB" and friends for stock). That
//! protocol survives only here: point `discover` at a directory and it
//! prints an explicit TOML config you can edit and commit.

use std::path::PathBuf;

use shelfwatch_engine::config::assign_roles;

use crate::CliError;

pub fn cmd_discover(dir: PathBuf) -> Result<(), CliError> {
    let entries = std::fs::read_dir(&dir)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", dir.display())))?;

    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CliError::io(format!("cannot read entry: {e}")))?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    let assignment = assign_roles(&names);

    let sales = match assignment.sales {
        Some(sales) => sales,
        None => {
            return Err(CliError::args(format!(
                "no sales export found in {}",
                dir.display()
            ))
            .with_hint("expected a file whose name contains \"export_\""));
        }
    };

    if assignment.stock.is_empty() {
        return Err(CliError::args(format!(
            "no stock sources found in {}",
            dir.display()
        ))
        .with_hint("expected files named like \"Source_AMB ...\""));
    }

    // Drafted config on stdout, commentary on stderr
    println!("name = \"{}\"", dir.display());
    println!();
    println!("[sources]");
    println!("sales = \"{sales}\"");
    println!("stock = [");
    for (store, file) in &assignment.stock {
        println!("    {{ store = \"{store}\", file = \"{file}\" }},");
    }
    println!("]");
    println!();
    println!("[lookups]");
    println!("stores = \"store_kamus.csv\"");
    println!("skus = \"sku_kamus.csv\"");

    if !assignment.unassigned.is_empty() {
        eprintln!("unassigned: {}", assignment.unassigned.join(", "));
    }
    eprintln!("note: fill in the [lookups] paths before running");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn discover_errors_without_sales_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("Source_AMB.csv")).unwrap();
        f.write_all(b"SKU\n").unwrap();

        let err = cmd_discover(dir.path().to_path_buf()).unwrap_err();
        assert!(err.message.contains("no sales export"));
    }

    #[test]
    fn discover_accepts_legacy_layout() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["export_2025_q1.csv", "Source_AMB.csv", "Source_BSB.csv"] {
            let mut f = std::fs::File::create(dir.path().join(name)).unwrap();
            f.write_all(b"SKU\n").unwrap();
        }
        cmd_discover(dir.path().to_path_buf()).unwrap();
    }
}
