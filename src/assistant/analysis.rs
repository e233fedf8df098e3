use super::intent::AnalysisFocus;
use crate::billing::VariationSummaryItem;

/// Variation days grouped by how they compare with the standing order.
///
/// A day can appear under both `more` and `less` when one slot went up and
/// the other went down. Skipped days appear only under `skipped`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumptionReport {
    pub more: Vec<String>,
    pub less: Vec<String>,
    pub skipped: Vec<String>,
}

impl ConsumptionReport {
    pub fn classify(summary: &[VariationSummaryItem]) -> Self {
        let mut report = Self::default();

        for item in summary {
            if item.total == 0.0 {
                report.skipped.push(format!("On **{}**", item.date));
                continue;
            }

            let morning = item.morning_diff();
            let evening = item.evening_diff();

            let mut extra = Vec::new();
            if morning > 0.0 {
                extra.push(format!("{:.2}L extra in the morning", morning));
            }
            if evening > 0.0 {
                extra.push(format!("{:.2}L extra in the evening", evening));
            }
            if !extra.is_empty() {
                report
                    .more
                    .push(format!("On **{}**: took {}.", item.date, extra.join(", ")));
            }

            let mut short = Vec::new();
            if morning < 0.0 {
                short.push(format!("{:.2}L less in the morning", morning.abs()));
            }
            if evening < 0.0 {
                short.push(format!("{:.2}L less in the evening", evening.abs()));
            }
            if !short.is_empty() {
                report
                    .less
                    .push(format!("On **{}**: took {}.", item.date, short.join(", ")));
            }
        }

        report
    }

    /// Renders the sections selected by `focus`, separated by blank lines.
    pub fn render(&self, focus: AnalysisFocus) -> String {
        if focus.is_empty() {
            return "Please be more specific (ask about 'more', 'less', or 'skipped' days)."
                .to_string();
        }

        let mut sections = Vec::new();
        if focus.more {
            sections.push(section(
                "Here are the days they took **more** milk:",
                &self.more,
                "They did not take extra milk this month.",
            ));
        }
        if focus.less {
            sections.push(section(
                "Here are the days they took **less** milk:",
                &self.less,
                "They did not take less than the default this month.",
            ));
        }
        if focus.skipped {
            sections.push(section(
                "Here are the days they **skipped** delivery:",
                &self.skipped,
                "They did not skip any deliveries this month.",
            ));
        }
        sections.join("\n\n")
    }
}

fn section(heading: &str, lines: &[String], when_empty: &str) -> String {
    if lines.is_empty() {
        when_empty.to_string()
    } else {
        format!("{}\n- {}", heading, lines.join("\n- "))
    }
}
