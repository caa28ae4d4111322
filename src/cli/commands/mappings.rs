//! Mapping table listing.

use console::style;

use crate::mapping::MappingTable;

/// Print the model-to-TM table grouped by subset.
pub async fn cmd_mappings() -> anyhow::Result<()> {
    let table = MappingTable::bundled()?;

    for subset in table.subsets() {
        println!(
            "\n{} ({})",
            style(subset.category.as_str()).bold(),
            subset.entries.len()
        );
        println!("{}", "-".repeat(60));
        for (model, tms) in &subset.entries {
            println!("  {:<12} {}", style(model).cyan(), tms.join(", "));
        }
    }

    println!("\n{} {} mappings", style("→").cyan(), table.len());
    Ok(())
}
