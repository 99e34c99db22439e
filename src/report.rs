use colored::{ColoredString, Colorize};
use hex_color::HexColor;
use std::io;

use crate::projection::ProjectionRecord;

const NOT_SERVED: &str = "-";
const HEADERS: [&str; 4] = ["Stop", "Timetable", "Extra Traffic (min)", "Predicted Arrival"];

// delays at or above this many minutes are shown in red
const SEVERE_DELAY_MINUTES: f64 = 5.0;

// ReportSummary aggregates the served stops of a projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub served_stops: usize,
    pub total_extra_delay: f64,
    pub max_extra_delay: f64,
    // published time at the first served stop
    pub first_scheduled: String,
    // predicted arrival at the last served stop
    pub final_predicted: String,
}

impl ReportSummary {
    pub fn from_records(records: &[ProjectionRecord]) -> Option<Self> {
        let served = records.iter().filter(|r| r.is_served()).collect::<Vec<_>>();
        let first = served.first()?;
        let last = served.last()?;
        let delays = served.iter().filter_map(|r| r.extra_delay());
        Some(ReportSummary {
            served_stops: served.len(),
            total_extra_delay: delays.clone().sum(),
            max_extra_delay: delays.fold(0.0, f64::max),
            first_scheduled: first.scheduled().to_string(),
            final_predicted: last.predicted_arrival().unwrap_or_default(),
        })
    }
}

pub struct Report<'a> {
    pub title: String,
    pub color: Option<HexColor>,
    // local time the estimates were taken, shown under the title
    pub generated_at: Option<String>,
    pub records: &'a [ProjectionRecord],
}

impl Report<'_> {
    fn cells(record: &ProjectionRecord) -> [String; 4] {
        match (record.extra_delay(), record.predicted_arrival()) {
            (Some(delay), Some(predicted)) => [
                record.stop.name.clone(),
                record.scheduled().to_string(),
                format!("{:.1}", delay),
                predicted,
            ],
            _ => [
                record.stop.name.clone(),
                NOT_SERVED.to_string(),
                NOT_SERVED.to_string(),
                NOT_SERVED.to_string(),
            ],
        }
    }

    fn title(&self) -> ColoredString {
        self.color
            .map(|color| self.title.truecolor(color.r, color.g, color.b))
            .unwrap_or_else(|| ColoredString::from(self.title.as_str()))
            .bold()
    }

    pub fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.title())?;
        if let Some(generated_at) = &self.generated_at {
            writeln!(out, "{}", format!("Estimated at {}", generated_at).truecolor(128, 128, 128))?;
        }
        writeln!(out)?;

        let rows = self.records.iter().map(Self::cells).collect::<Vec<_>>();
        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let separator = widths.iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+");
        let header = HEADERS.iter()
            .zip(widths.iter())
            .map(|(h, w)| format!(" {:<w$} ", h, w = *w).bold().to_string())
            .collect::<Vec<_>>()
            .join("|");
        writeln!(out, "+{}+", separator)?;
        writeln!(out, "|{}|", header)?;
        writeln!(out, "+{}+", separator)?;

        for (record, row) in self.records.iter().zip(rows.iter()) {
            let line = row.iter()
                .zip(widths.iter())
                .enumerate()
                .map(|(column, (cell, w))| {
                    let padded = format!(" {:<w$} ", cell, w = *w);
                    match (column, record.extra_delay()) {
                        (_, None) => padded.dimmed().to_string(),
                        (2, Some(delay)) if delay >= SEVERE_DELAY_MINUTES => padded.red().to_string(),
                        (2, Some(delay)) if delay > 0.0 => padded.yellow().to_string(),
                        _ => padded,
                    }
                })
                .collect::<Vec<_>>()
                .join("|");
            writeln!(out, "|{}|", line)?;
        }
        writeln!(out, "+{}+", separator)?;

        if let Some(summary) = ReportSummary::from_records(self.records) {
            writeln!(out)?;
            writeln!(out, "{}", "Summary:".bold())?;
            writeln!(out, "Total extra traffic delay: {:.1} minutes", summary.total_extra_delay)?;
            writeln!(out, "Maximum delay at single stop: {:.1} minutes", summary.max_extra_delay)?;
            writeln!(out, "Journey: {} → {}", summary.first_scheduled, summary.final_predicted)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{project, Departure};
    use crate::timetable::Route;
    use approx::assert_relative_eq;

    fn records() -> Vec<ProjectionRecord> {
        let route = Route::from_parallel(
            &["Oxford Gloucester Green", "White City", "Marble Arch", "Victoria"],
            &["07:00", "x", "09:29", "09:39"],
        )
        .unwrap();
        // 149 minutes to Marble Arch (timetable 149), 18 onward (timetable 10)
        let lookup = |_: &str, destination: &str, _: Departure| match destination {
            "Marble Arch" => Some(149.0),
            "Victoria" => Some(18.0),
            _ => None,
        };
        project(&route, &lookup).unwrap()
    }

    #[test]
    fn summary_covers_served_stops_only() {
        let summary = ReportSummary::from_records(&records()).unwrap();
        assert_eq!(summary.served_stops, 3);
        assert_relative_eq!(summary.total_extra_delay, 8.0);
        assert_relative_eq!(summary.max_extra_delay, 8.0);
        assert_eq!(summary.first_scheduled, "07:00");
        assert_eq!(summary.final_predicted, "09:47");
    }

    #[test]
    fn summary_is_absent_without_served_stops() {
        assert_eq!(ReportSummary::from_records(&[]), None);
    }

    #[test]
    fn renders_table_and_summary() {
        colored::control::set_override(false);
        let records = records();
        let report = Report {
            title: String::from("X90 Oxford to London"),
            color: None,
            generated_at: Some(String::from("2026-10-16 07:00 BST")),
            records: &records,
        };
        let mut out = Vec::new();
        report.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("X90 Oxford to London\n"));
        assert!(text.contains("Estimated at 2026-10-16 07:00 BST"));
        assert!(text.contains("| Stop "));
        assert!(text.contains("Extra Traffic (min)"));

        let white_city = text.lines().find(|l| l.contains("White City")).unwrap();
        assert_eq!(white_city.matches(" - ").count(), 3);
        let victoria = text.lines().find(|l| l.contains("Victoria")).unwrap();
        assert!(victoria.contains("09:39"));
        assert!(victoria.contains("8.0"));
        assert!(victoria.contains("09:47"));

        assert!(text.contains("Total extra traffic delay: 8.0 minutes"));
        assert!(text.contains("Maximum delay at single stop: 8.0 minutes"));
        assert!(text.contains("Journey: 07:00 → 09:47"));
    }
}
