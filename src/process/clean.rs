// src/process/clean.rs

use super::chunk::RawRow;
use crate::error::{Result, ScrapeError};
use crate::table::{Record, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, instrument};

/// Call-to-action text the site appends to medication names and buttons.
const CTA_TEXT: &str = "Get Started";
const SAVINGS_PREFIX: &str = "Save ";

static CURRENCY_FORMATTING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[$,]").expect("currency pattern is valid"));

/// "Metformin (500mg) Get Started" → "Metformin"
pub fn clean_medication(raw: &str) -> String {
    let without_cta = raw.replace(CTA_TEXT, "");
    let name = without_cta
        .split_once('(')
        .map_or(without_cta.as_str(), |(head, _)| head);
    strip_currency(name).trim().to_string()
}

/// "Save $120.00" → "$120.00"
pub fn strip_savings_prefix(raw: &str) -> &str {
    let s = raw.trim_start();
    s.strip_prefix(SAVINGS_PREFIX).unwrap_or(s)
}

/// Remove `$` and thousands separators.
pub fn strip_currency(raw: &str) -> String {
    CURRENCY_FORMATTING.replace_all(raw, "").into_owned()
}

/// Parse a cleaned money cell. Anything that is not a finite, non-negative
/// number is an error naming the row and field.
pub fn parse_amount(row: usize, field: &'static str, raw: &str) -> Result<f64> {
    let cleaned = strip_currency(raw);
    let value: f64 = cleaned.trim().parse().map_err(|_| ScrapeError::Parse {
        row,
        field,
        value: raw.to_string(),
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(ScrapeError::Parse {
            row,
            field,
            value: raw.to_string(),
        });
    }
    Ok(value)
}

fn clean_row(index: usize, row: RawRow) -> Result<Record> {
    // the button column carries no data
    let RawRow {
        medication,
        form,
        retail,
        price,
        savings,
        button: _,
    } = row;

    Ok(Record {
        medication: clean_medication(&medication),
        form: strip_currency(&form),
        retail: parse_amount(index, "Retail", &retail)?,
        price: parse_amount(index, "Price", &price)?,
        savings: parse_amount(index, "Savings", strip_savings_prefix(&savings))?,
    })
}

/// Turn scraped rows into the typed table, keyed by medication name.
///
/// Row indices in errors are positions in `rows`.
#[instrument(level = "info", skip_all, fields(rows = rows.len()))]
pub fn clean(rows: Vec<RawRow>) -> Result<Table> {
    let records = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| clean_row(i, row))
        .collect::<Result<Vec<_>>>()?;
    debug!(records = records.len(), "cleaned");
    Ok(Table::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(cells: [&str; 6]) -> RawRow {
        RawRow::try_from(cells.iter().map(|c| c.to_string()).collect::<Vec<_>>()).unwrap()
    }

    #[test]
    fn medication_rules() {
        assert_eq!(clean_medication("Metformin (500mg) Get Started"), "Metformin");
        assert_eq!(
            clean_medication("  Atorvastatin Calcium Get Started "),
            "Atorvastatin Calcium"
        );
        assert_eq!(clean_medication("Get StartedAmlodipine (Norvasc)"), "Amlodipine");
        // only the first parenthesis splits
        assert_eq!(clean_medication("Insulin (a) (b)"), "Insulin");
    }

    #[test]
    fn currency_and_prefix() -> Result<()> {
        assert_eq!(parse_amount(0, "Retail", "$1,234.56")?, 1234.56);
        assert_eq!(parse_amount(0, "Savings", strip_savings_prefix("Save $120.00"))?, 120.0);
        assert_eq!(strip_savings_prefix("$5.00"), "$5.00");
        assert_eq!(parse_amount(0, "Price", " 3.6 ")?, 3.6);
        Ok(())
    }

    #[test]
    fn single_row_end_to_end() -> Result<()> {
        let table = clean(vec![raw([
            "Aspirin (81mg) Get Started",
            "Tablet",
            "$10.00",
            "$3.00",
            "Save $7.00",
            "Get Started",
        ])])?;

        assert_eq!(table.len(), 1);
        let rec = table.get("Aspirin").next().expect("keyed by Aspirin");
        assert_eq!(rec.form, "Tablet");
        assert_eq!(rec.retail, 10.0);
        assert_eq!(rec.price, 3.0);
        assert_eq!(rec.savings, 7.0);
        Ok(())
    }

    #[test]
    fn idempotent_on_clean_values() -> Result<()> {
        let once = clean(vec![raw(["Aspirin", "Tablet", "10", "3", "7", ""])])?;
        let r = &once.records()[0];
        let (retail, price, savings) = (
            r.retail.to_string(),
            r.price.to_string(),
            r.savings.to_string(),
        );
        let again = clean(vec![raw([
            r.medication.as_str(),
            r.form.as_str(),
            retail.as_str(),
            price.as_str(),
            savings.as_str(),
            "",
        ])])?;
        assert_eq!(once, again);
        Ok(())
    }

    #[test]
    fn non_numeric_price_names_row_and_field() {
        let err = clean(vec![
            raw(["A", "Tablet", "$1.00", "$0.50", "Save $0.50", "Get Started"]),
            raw(["B", "Tablet", "$2.00", "Call us", "Save $1.00", "Get Started"]),
        ])
        .unwrap_err();

        match err {
            ScrapeError::Parse { row, field, value } => {
                assert_eq!(row, 1);
                assert_eq!(field, "Price");
                assert_eq!(value, "Call us");
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_and_non_finite() {
        for bad in ["-1.00", "NaN", "inf", ""] {
            assert!(
                matches!(parse_amount(3, "Retail", bad), Err(ScrapeError::Parse { row: 3, .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn duplicate_names_survive() -> Result<()> {
        let table = clean(vec![
            raw(["Metformin (500mg) Get Started", "Tablet", "$20", "$4", "Save $16", ""]),
            raw(["Metformin (1000mg) Get Started", "Tablet", "$40", "$6", "Save $34", ""]),
        ])?;
        assert_eq!(table.get("Metformin").count(), 2);
        Ok(())
    }
}
