//! Plain-text rendering for the command-line client.

use crate::billing::{MonthlyBill, MonthlySheet, VariationSummaryItem};
use crate::services::CustomerView;
use std::fmt::Write;

/// One line describing how a variation day differs from the defaults.
pub fn describe_variation(item: &VariationSummaryItem) -> String {
    if item.total == 0.0 {
        return format!("{}: Skipped delivery", item.date);
    }

    let mut details = Vec::new();
    for (diff, slot) in [(item.morning_diff(), "morning"), (item.evening_diff(), "evening")] {
        if diff > 0.0 {
            details.push(format!("took {:.2}L extra in {}", diff, slot));
        } else if diff < 0.0 {
            details.push(format!("took {:.2}L less in {}", diff.abs(), slot));
        }
    }
    if details.is_empty() {
        details.push("matched the default quantities".to_string());
    }

    format!(
        "{}: {}. (Total: {:.2}L)",
        item.date,
        details.join(", "),
        item.total
    )
}

pub fn render_variations(summary: &[VariationSummaryItem]) -> String {
    if summary.is_empty() {
        return "No variations found for the selected month.".to_string();
    }
    summary
        .iter()
        .map(describe_variation)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Day-by-day table with a trailing totals row and the amount due.
pub fn render_sheet(sheet: &MonthlySheet, month: u32, year: i32) -> String {
    if sheet.sheet_data.is_empty() {
        return "No data for the selected month.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>12} {:>12} {:>16}",
        "Date", "Morning (L)", "Evening (L)", "Daily Total (L)"
    );
    for row in &sheet.sheet_data {
        let _ = writeln!(
            out,
            "{:<12} {:>12.2} {:>12.2} {:>16.2}",
            row.date.to_string(),
            row.morning,
            row.evening,
            row.daily_total
        );
    }
    let totals = &sheet.totals;
    let _ = writeln!(
        out,
        "{:<12} {:>12.2} {:>12.2} {:>16.2}",
        "---", totals.total_morning, totals.total_evening, totals.grand_total_liters
    );
    let _ = write!(
        out,
        "Total Bill for {}/{}: ₹ {:.2}",
        month, year, totals.amount_due
    );
    out
}

pub fn render_bill(bill: &MonthlyBill) -> String {
    format!(
        "{} for {}/{}: {:.2} L, amount due ₹ {:.2}",
        bill.customer_name, bill.month, bill.year, bill.total_liters, bill.amount_due
    )
}

pub fn render_customer(customer: &CustomerView) -> String {
    format!(
        "Details for: {}\n  Id: {}\n  Address: {}\n  Phone: {}\n  Default Morning Milk: {:.2} L\n  Default Evening Milk: {:.2} L\n  Price per liter: ₹ {:.2}",
        customer.name,
        customer.id,
        customer.address,
        customer.phone_number,
        customer.default_milk_morning,
        customer.default_milk_evening,
        customer.price_per_liter
    )
}

pub fn render_customer_list(customers: &[CustomerView]) -> String {
    if customers.is_empty() {
        return "No customers found. Use 'customers add' to get started.".to_string();
    }
    customers
        .iter()
        .map(|c| {
            format!(
                "{}  {:<20} {:.2} L / {:.2} L",
                c.id, c.name, c.default_milk_morning, c.default_milk_evening
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
