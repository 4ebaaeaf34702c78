use crate::commands::DemoReport;
use prettytable::format::{LinePosition, LineSeparator, TableFormat};
use prettytable::{row, Table};

fn markdown_format() -> TableFormat {
    prettytable::format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

fn markdown_style(table: &mut Table) {
    table.set_format(markdown_format());
}

/// Renders the settlement of a demo run as a markdown table, one row per participant.
pub fn payout_table(report: &DemoReport) -> String {
    let mut table = Table::new();
    markdown_style(&mut table);
    table.set_titles(row!["Role", "Address", "Deposited", "Received"]);
    for account in &report.accounts {
        table.add_row(row![account.role, account.address, account.deposited, account.received]);
    }
    table.to_string()
}

pub fn format_report(report: &DemoReport) -> String {
    let mut out = format!("Channel {} closed {:?}.\n", report.channel, report.mode);
    out.push_str(&format!("Committee: f = {}, t = {}\n", report.fault_tolerance, report.threshold));
    out.push_str(&format!("Initial split: Alice {}, Bob {}\n", report.initial.alice, report.initial.bob));
    out.push_str(&format!(
        "Final split:   Alice {}, Bob {}\n\n",
        report.final_balance.alice, report.final_balance.bob
    ));
    out.push_str(&payout_table(report));
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::commands::run_demo;
    use crate::config::{CloseMode, DemoCommand};
    use libbrick::amount::Amount;

    #[test]
    fn table_has_a_row_per_participant() {
        let cmd = DemoCommand {
            watchtowers: 4,
            fee: Amount::from_wei(20),
            collateral: Amount::from_wei(5),
            alice_deposit: Amount::from_wei(15),
            bob_deposit: Amount::from_wei(22),
            alice_final: Amount::from_wei(5),
            mode: CloseMode::Optimistic,
        };
        let report = run_demo(&cmd).unwrap();
        let table = payout_table(&report);
        assert!(table.contains("Watchtower 3"));
        assert!(table.contains("Alice"));
        assert_eq!(table.lines().filter(|l| l.contains(" wei")).count(), 6);
        assert!(format_report(&report).contains("t = 3"));
    }
}
