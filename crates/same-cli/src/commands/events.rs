//! Event code and originator reference listing.

use clap::Args;
use same_registry::{EventCategory, EventCodeTable, Organization};

#[derive(Args)]
pub struct EventsArgs {
    /// Show details for a specific three-character event code
    #[arg(value_name = "CODE")]
    code: Option<String>,
}

pub fn run(args: EventsArgs) -> anyhow::Result<()> {
    let table = EventCodeTable::new();

    if let Some(code) = &args.code {
        let code = code.to_uppercase();
        let descriptor = table.lookup(&code).ok_or_else(|| anyhow::anyhow!("unknown event code: {code}"))?;
        println!("{}", descriptor.code);
        println!("{}", "=".repeat(descriptor.code.len()));
        println!();
        println!("Name:     {}", descriptor.name);
        println!("Category: {}", category_name(descriptor.category));
        return Ok(());
    }

    println!("Originators");
    println!("===========\n");
    for org in [Organization::Eas, Organization::Civ, Organization::Wxr, Organization::Pep] {
        println!("  {:4} {}", org.code(), org.name());
    }

    println!();
    println!("Event Codes");
    println!("===========\n");
    for descriptor in table.all() {
        println!("  {:4} {:10} {}", descriptor.code, category_name(descriptor.category), descriptor.name);
    }
    println!();
    println!("Use 'same events <CODE>' for details on a single event code.");

    Ok(())
}

fn category_name(category: EventCategory) -> &'static str {
    match category {
        EventCategory::Warning => "Warning",
        EventCategory::Watch => "Watch",
        EventCategory::Emergency => "Emergency",
        EventCategory::Test => "Test",
        EventCategory::Statement => "Statement",
    }
}
