use crate::{
    composite::{metrics::Composite, series::CompositeSeries},
    report::AnalysisReport,
    statistic::correlation::{CorrelationResult, CorrelationTable},
};
use prettytable::{Cell, Row, Table};

impl CorrelationTable {
    /// Prints the [`CorrelationTable::table`] to stdout.
    pub fn print(&self) {
        self.table().printstd();
    }

    /// Fund | Beta, R-Squared per lookback window.
    ///
    /// Windows a fund lacks the history for are shown as "N/A".
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*prettytable::format::consts::FORMAT_BOX_CHARS);

        let periods = self.period_labels();

        // Title row spanning all columns
        let mut title_cell = Cell::new("Market Composite Index Correlations").style_spec("bcB");
        title_cell.set_hspan(1 + periods.len() * 2);
        table.add_row(Row::new(vec![title_cell]));

        // Header row (eg/ Fund | 50 Beta | 50 R-Squared | 200 Beta | 200 R-Squared)
        let mut header_row = Row::new(vec![Cell::new("Fund").style_spec("bcB")]);
        for period in &periods {
            header_row.add_cell(Cell::new(&format!("{period} Beta")).style_spec("bcB"));
            header_row.add_cell(Cell::new(&format!("{period} R-Squared")).style_spec("bcB"));
        }
        table.add_row(header_row);

        for (fund, results) in &self.0 {
            let mut row = Row::new(vec![Cell::new(fund.as_ref()).style_spec("b")]);
            for period in &periods {
                match find_period(results, period) {
                    Some(result) => {
                        let beta = format!("{:.3}", result.beta);
                        let r_squared = format!("{:.3}", result.r_squared);
                        row.add_cell(Cell::new(&beta).style_spec("r"));
                        row.add_cell(Cell::new(&r_squared).style_spec("r"));
                    }
                    None => {
                        row.add_cell(Cell::new("N/A").style_spec("r"));
                        row.add_cell(Cell::new("N/A").style_spec("r"));
                    }
                }
            }
            table.add_row(row);
        }

        table
    }
}

fn find_period<'a>(
    results: &'a [CorrelationResult],
    period: &str,
) -> Option<&'a CorrelationResult> {
    results.iter().find(|result| result.period_label == period)
}

impl AnalysisReport {
    /// Prints the latest value of every composite index followed by the MCI correlation table.
    pub fn print_summary(&self) {
        println!();
        self.composite_table().printstd();
        if let Some(mci) = self.metrics.mci.defined() {
            mci.correlations.print();
        }
    }

    /// Composite | Latest Date | Latest Value | Contributors.
    pub fn composite_table(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*prettytable::format::consts::FORMAT_BOX_CHARS);

        let mut title_cell = Cell::new("Composite Indices").style_spec("bcB");
        title_cell.set_hspan(4);
        table.add_row(Row::new(vec![title_cell]));

        table.add_row(Row::new(vec![
            Cell::new("Composite").style_spec("bcB"),
            Cell::new("Latest Date").style_spec("bcB"),
            Cell::new("Latest Value").style_spec("bcB"),
            Cell::new("Contributors").style_spec("bcB"),
        ]));

        let metrics = &self.metrics;
        add_composite_row(&mut table, "MCI", composite_series(&metrics.mci, |mci| &mci.index));
        add_composite_row(&mut table, "BCI", composite_series(&metrics.bci, |bci| &bci.combined));
        add_composite_row(
            &mut table,
            "CCI",
            composite_series(&metrics.correlation, |cci| &cci.net_correlation),
        );
        add_composite_row(&mut table, "TCI", composite_series(&metrics.tci, |tci| &tci.combined));

        table
    }
}

fn composite_series<T, F>(composite: &Composite<T>, series: F) -> Option<&CompositeSeries>
where
    F: Fn(&T) -> &CompositeSeries,
{
    composite.defined().map(series)
}

fn add_composite_row(table: &mut Table, name: &str, series: Option<&CompositeSeries>) {
    let mut row = Row::new(vec![Cell::new(name).style_spec("b")]);

    match series.and_then(CompositeSeries::latest) {
        Some(point) => {
            row.add_cell(Cell::new(&point.date.to_string()));
            row.add_cell(Cell::new(&format!("{:.3}", point.value)).style_spec("r"));
            row.add_cell(Cell::new(&point.contributors.len().to_string()).style_spec("r"));
        }
        None => {
            let mut cell = Cell::new("undefined").style_spec("cFr");
            cell.set_hspan(3);
            row.add_cell(cell);
        }
    }

    table.add_row(row);
}
