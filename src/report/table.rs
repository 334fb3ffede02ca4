//! Console tables.

use prettytable::{row, Table};

use super::{PortfolioReport, SessionReport};

/// Risk and return of every labelled portfolio.
pub fn summary_table(report: &SessionReport) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Portfolio", "Return", "Risk"]);
    let rows = report
        .frontier_portfolios
        .iter()
        .map(PortfolioReport::scatter_point)
        .chain(report.scatter_points());
    for p in rows {
        let ret = format!("{:.4}", p.expected_return);
        let risk = format!("{:.4}", p.risk);
        table.add_row(row![p.label, ret, risk]);
    }
    table
}

/// Weight table for a set of portfolios: one row per asset held by any of
/// them, one column per portfolio, blank where a portfolio holds nothing.
pub fn weights_table(assets: &[String], portfolios: &[&PortfolioReport]) -> Table {
    let mut table = Table::new();

    let mut titles = row!["Asset"];
    for p in portfolios {
        titles.add_cell(prettytable::Cell::new(&p.label));
    }
    table.set_titles(titles);

    for asset in assets {
        let weights: Vec<Option<f64>> = portfolios
            .iter()
            .map(|p| {
                p.holdings
                    .iter()
                    .find(|h| &h.asset == asset)
                    .map(|h| h.weight_pct)
            })
            .collect();
        if weights.iter().all(Option::is_none) {
            continue;
        }

        let mut r = row![asset];
        for w in weights {
            let text = w.map(|w| format!("{:.2}%", w)).unwrap_or_default();
            r.add_cell(prettytable::Cell::new(&text));
        }
        table.add_row(r);
    }
    table
}

/// Print the summary and the weights of the matched portfolios.
pub fn print_report(report: &SessionReport) {
    summary_table(report).printstd();

    let mut shown: Vec<&PortfolioReport> = vec![&report.equal_weight];
    shown.extend(report.matches.iter());
    if shown.len() > 1 {
        println!();
        weights_table(&report.assets, &shown).printstd();
    }

    for warning in report.warnings() {
        println!("warning: {}", warning);
    }
}
