//! Receipt

use std::{fmt::Write, io};

use rusty_money::{Money, MoneyError, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    plans::{Charge, Plan, PlanKind},
    pricing::{format_amount, total_amount},
    solvers::Allocation,
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Wrapper for money errors.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Final report for an allocation run.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    /// `(order id, plan)` pairs in order input order
    plans: Vec<(String, Plan<'a>)>,

    /// Cumulative spend per payment method, in catalog order
    spend_summary: Vec<Charge<'a>>,

    /// Sum of all plan discounts
    total_discount: Money<'a, Currency>,

    /// Sum of all charges
    total_paid: Money<'a, Currency>,

    /// Currency used for all monetary values
    currency: &'a Currency,
}

impl<'a> Receipt<'a> {
    /// Build a receipt from a finished allocation.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if the totals cannot be computed.
    pub fn from_allocation(allocation: &Allocation<'a>) -> Result<Self, ReceiptError> {
        let currency = allocation.currency();
        let total_paid = total_amount(
            allocation.spend_summary().iter().map(|charge| &charge.amount),
            currency,
        )?;

        Ok(Receipt {
            plans: allocation.plans().to_vec(),
            spend_summary: allocation.spend_summary().to_vec(),
            total_discount: allocation.total_discount()?,
            total_paid,
            currency,
        })
    }

    /// `(order id, plan)` pairs in order input order.
    pub fn plans(&self) -> &[(String, Plan<'a>)] {
        &self.plans
    }

    /// Payment methods that were charged anything, in catalog order.
    pub fn charged_methods(&self) -> impl Iterator<Item = &Charge<'a>> {
        self.spend_summary
            .iter()
            .filter(|charge| !charge.amount.is_zero())
    }

    /// Sum of all plan discounts.
    pub fn total_discount(&self) -> Money<'a, Currency> {
        self.total_discount
    }

    /// Sum of everything charged across all methods.
    pub fn total_paid(&self) -> Money<'a, Currency> {
        self.total_paid
    }

    /// Currency used for all monetary values.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Writes one `<method id> <amount>` line per charged payment method.
    ///
    /// # Errors
    ///
    /// Returns an error if the summary cannot be written.
    pub fn write_summary(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        for charge in self.charged_methods() {
            writeln!(out, "{} {}", charge.method_id, format_amount(&charge.amount))
                .map_err(|_err| ReceiptError::IO)?;
        }

        Ok(())
    }

    /// Writes a table of every order's plan followed by the totals and the summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Order", "Plan", "Method", "Charged", "Discount"]);

        let mut order_boundary_rows = Vec::with_capacity(self.plans.len());
        let mut color_ops = Vec::new();
        let mut current_row = 1; // header is row 0

        for (order_idx, (order_id, plan)) in self.plans.iter().enumerate() {
            order_boundary_rows.push(current_row);

            for (charge_idx, charge) in plan.charges().iter().enumerate() {
                let first = charge_idx == 0;

                builder.push_record([
                    if first {
                        format!("#{:<3}", order_idx + 1)
                    } else {
                        String::new()
                    },
                    if first { order_id.clone() } else { String::new() },
                    if first {
                        plan.kind().to_string()
                    } else {
                        String::new()
                    },
                    charge.method_id.clone(),
                    format_amount(&charge.amount),
                    if first && !plan.discount().is_zero() {
                        format!("-{}", format_amount(plan.discount()))
                    } else {
                        String::new()
                    },
                ]);

                color_ops.push((current_row, 2, plan_color(plan.kind())));

                if first && !plan.discount().is_zero() {
                    color_ops.push((current_row, 5, Color::FG_GREEN));
                }

                current_row += 1;
            }
        }

        write_plan_table(&mut out, builder, &order_boundary_rows, color_ops)?;
        write_totals(&mut out, self)?;

        self.write_summary(&mut out)
    }
}

fn write_plan_table(
    out: &mut impl io::Write,
    builder: Builder,
    order_boundary_rows: &[usize],
    color_ops: Vec<(usize, usize, Color)>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    for &row in order_boundary_rows {
        if row > 1 {
            theme.insert_horizontal_line(row, separator);
        }
    }

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(4..6), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_totals(out: &mut impl io::Write, receipt: &Receipt<'_>) -> Result<(), ReceiptError> {
    let paid_label = " \x1b[1mPaid:\x1b[0m";
    let discount_label = " Discount:";

    let paid_val = format!("{}  ", format_amount(&receipt.total_paid()));
    let discount_val = format!("{}  ", format_amount(&receipt.total_discount()));

    let label_width = visible_width(paid_label).max(visible_width(discount_label));
    let value_width = paid_val.len().max(discount_val.len());

    write_total_line(
        out,
        discount_label,
        &discount_val,
        label_width,
        value_width,
    )?;

    write_total_line(
        out,
        paid_label,
        &format!("\x1b[1m{paid_val}\x1b[0m"),
        label_width,
        value_width,
    )?;

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Colour for the plan kind cell.
fn plan_color(kind: PlanKind) -> Color {
    match kind {
        PlanKind::Card => Color::FG_GREEN,
        PlanKind::LoyaltyFull | PlanKind::LoyaltyPartial => Color::FG_CYAN,
        PlanKind::FullPrice => color_dark_grey(),
    }
}

/// Wraps runs of UTF-8 box-drawing characters (U+2500..U+257F) in ANSI dark-grey
/// escape codes, leaving cell content untouched.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a totals line with a right-aligned label and a fixed-width value column.
fn write_total_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
