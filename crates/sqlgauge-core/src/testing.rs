use anyhow::Result;

use sqlgauge_types::RunReport;

/// Assert the mean answer-match score across all combinations meets a
/// threshold. Use in `#[tokio::test]` functions that drive a `Harness`.
pub fn assert_min_avg_answer_match(report: &RunReport, min_percent: f64) -> Result<()> {
    let avg = mean(report.summaries.iter().map(|s| s.avg_answer_match));
    if avg < min_percent {
        anyhow::bail!(
            "answer match {avg:.1}% is below threshold {min_percent:.1}%\n{}",
            report.summary_table()
        );
    }
    Ok(())
}

/// Assert the mean SQL-match score across all combinations meets a threshold.
pub fn assert_min_avg_sql_match(report: &RunReport, min_percent: f64) -> Result<()> {
    let avg = mean(report.summaries.iter().map(|s| s.avg_sql_match));
    if avg < min_percent {
        anyhow::bail!(
            "SQL match {avg:.1}% is below threshold {min_percent:.1}%\n{}",
            report.summary_table()
        );
    }
    Ok(())
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
