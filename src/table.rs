// src/table.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Header of the exported table, key column first.
pub const HEADER: [&str; 5] = ["Medication", "Form", "Retail", "Price", "Savings"];

/// Savings may differ from `retail - price` by rounding on the source page.
const SAVINGS_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericColumn {
    Retail,
    Price,
    Savings,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 3] = [Self::Retail, Self::Price, Self::Savings];

    pub fn name(self) -> &'static str {
        match self {
            Self::Retail => "Retail",
            Self::Price => "Price",
            Self::Savings => "Savings",
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One cleaned medication row, keyed by `medication`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Medication")]
    pub medication: String,
    #[serde(rename = "Form")]
    pub form: String,
    #[serde(rename = "Retail")]
    pub retail: f64,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Savings")]
    pub savings: f64,
}

impl Record {
    pub fn value(&self, column: NumericColumn) -> f64 {
        match column {
            NumericColumn::Retail => self.retail,
            NumericColumn::Price => self.price,
            NumericColumn::Savings => self.savings,
        }
    }
}

/// A record that breaks the expected pricing relationships.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsistencyIssue {
    PriceAboveRetail { medication: String, retail: f64, price: f64 },
    SavingsMismatch { medication: String, expected: f64, savings: f64 },
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PriceAboveRetail {
                medication,
                retail,
                price,
            } => write!(f, "{medication}: price {price} exceeds retail {retail}"),
            Self::SavingsMismatch {
                medication,
                expected,
                savings,
            } => write!(
                f,
                "{medication}: savings {savings} differs from retail - price = {expected:.2}"
            ),
        }
    }
}

/// Ordered collection of cleaned records. Keys may repeat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// All records under `medication`, in table order.
    pub fn get<'a>(&'a self, medication: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |r| r.medication == medication)
    }

    pub fn column(&self, column: NumericColumn) -> Vec<f64> {
        self.records.iter().map(|r| r.value(column)).collect()
    }

    pub fn consistency_issues(&self) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();
        for r in &self.records {
            if r.price > r.retail {
                issues.push(ConsistencyIssue::PriceAboveRetail {
                    medication: r.medication.clone(),
                    retail: r.retail,
                    price: r.price,
                });
            }
            let expected = r.retail - r.price;
            if (r.savings - expected).abs() > SAVINGS_TOLERANCE {
                issues.push(ConsistencyIssue::SavingsMismatch {
                    medication: r.medication.clone(),
                    expected,
                    savings: r.savings,
                });
            }
        }
        issues
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, retail: f64, price: f64, savings: f64) -> Record {
        Record {
            medication: name.into(),
            form: "Tablet".into(),
            retail,
            price,
            savings,
        }
    }

    #[test]
    fn duplicate_keys_are_kept() {
        let table: Table = vec![
            rec("Metformin", 20.0, 4.0, 16.0),
            rec("Lisinopril", 15.0, 3.6, 11.4),
            rec("Metformin", 40.0, 6.0, 34.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 3);
        let prices: Vec<f64> = table.get("Metformin").map(|r| r.price).collect();
        assert_eq!(prices, vec![4.0, 6.0]);
        assert_eq!(table.column(NumericColumn::Retail), vec![20.0, 15.0, 40.0]);
    }

    #[test]
    fn consistency_flags_bad_rows_only() {
        let table = Table::new(vec![
            rec("Good", 10.0, 3.0, 7.0),
            rec("Inverted", 3.0, 10.0, 0.0),
            rec("Off", 10.0, 3.0, 5.0),
        ]);
        let issues = table.consistency_issues();
        // "Inverted" breaks both rules, "Off" only the savings rule.
        assert_eq!(issues.len(), 3);
        assert!(matches!(
            &issues[0],
            ConsistencyIssue::PriceAboveRetail { medication, .. } if medication == "Inverted"
        ));
        assert!(issues[2].to_string().starts_with("Off: savings 5"));
    }
}
