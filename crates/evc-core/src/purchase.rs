//! Purchases as returned by `getrecentpurchases`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::bag::{apply_fields, as_integer, as_text, PropertyBag, Setter};

/// Columns with a dedicated attribute on [`Purchase`]. Keys are case-exact.
const FIELDS: &[(&str, Setter<Purchase>)] = &[
    ("Customer", |p: &mut Purchase, v: &Value| p.customer = as_integer(v)),
    ("Filename", |p: &mut Purchase, v: &Value| p.filename = as_text(v)),
    ("ComputerName", |p: &mut Purchase, v: &Value| p.computer = as_text(v)),
    ("IP", |p: &mut Purchase, v: &Value| p.ip = as_text(v)),
    ("Manufacturer", |p: &mut Purchase, v: &Value| p.manufacturer = as_text(v)),
    ("Series", |p: &mut Purchase, v: &Value| p.series = as_text(v)),
    ("Build", |p: &mut Purchase, v: &Value| p.build = as_text(v)),
    ("Model", |p: &mut Purchase, v: &Value| p.model = as_text(v)),
    ("Characteristic", |p: &mut Purchase, v: &Value| p.characteristic = as_text(v)),
    ("Output", |p: &mut Purchase, v: &Value| p.output = as_text(v)),
    ("Project type", |p: &mut Purchase, v: &Value| p.project = as_text(v)),
    ("Ecu Manufacturer", |p: &mut Purchase, v: &Value| p.ecu_manufacturer = as_text(v)),
    ("Ecu Build", |p: &mut Purchase, v: &Value| p.ecu_build = as_text(v)),
    ("ECU_Nr_ECU", |p: &mut Purchase, v: &Value| p.ecu_nr_ecu = as_text(v)),
    ("ECU_Nr_Prod", |p: &mut Purchase, v: &Value| p.ecu_nr_prod = as_text(v)),
    ("Software", |p: &mut Purchase, v: &Value| p.software = as_text(v)),
    ("SoftwareVersion", |p: &mut Purchase, v: &Value| p.software_version = as_text(v)),
    ("Date", |p: &mut Purchase, v: &Value| {
        p.date = v.as_str().and_then(parse_date);
    }),
];

/// Layouts the backend has been seen to use for the `Date` column.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// A file purchase performed by a customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Purchase {
    customer: Option<i64>,
    filename: Option<String>,
    computer: Option<String>,
    ip: Option<String>,
    manufacturer: Option<String>,
    series: Option<String>,
    build: Option<String>,
    model: Option<String>,
    characteristic: Option<String>,
    output: Option<String>,
    project: Option<String>,
    ecu_manufacturer: Option<String>,
    ecu_build: Option<String>,
    ecu_nr_ecu: Option<String>,
    ecu_nr_prod: Option<String>,
    software: Option<String>,
    software_version: Option<String>,
    date: Option<NaiveDateTime>,
    options: PropertyBag,
}

impl Purchase {
    /// Build a purchase from a decoded property bag.
    ///
    /// An unparsable `Date` leaves [`Purchase::date`] unset; it is not an error.
    #[must_use]
    pub fn from_bag(bag: PropertyBag) -> Self {
        let mut purchase = Self::default();
        let options = apply_fields(&mut purchase, bag, FIELDS);
        Self { options, ..purchase }
    }

    /// Identifier of the customer who purchased.
    #[must_use]
    pub const fn customer(&self) -> Option<i64> {
        self.customer
    }

    /// Name of the purchased file.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Name of the computer used for the purchase.
    #[must_use]
    pub fn computer(&self) -> Option<&str> {
        self.computer.as_deref()
    }

    /// IP address of the purchaser.
    #[must_use]
    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }

    /// Vehicle manufacturer.
    #[must_use]
    pub fn manufacturer(&self) -> Option<&str> {
        self.manufacturer.as_deref()
    }

    /// Vehicle series.
    #[must_use]
    pub fn series(&self) -> Option<&str> {
        self.series.as_deref()
    }

    /// Vehicle build.
    #[must_use]
    pub fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    /// Vehicle model.
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Engine characteristic.
    #[must_use]
    pub fn characteristic(&self) -> Option<&str> {
        self.characteristic.as_deref()
    }

    /// Engine output.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Project type.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// ECU manufacturer.
    #[must_use]
    pub fn ecu_manufacturer(&self) -> Option<&str> {
        self.ecu_manufacturer.as_deref()
    }

    /// ECU build.
    #[must_use]
    pub fn ecu_build(&self) -> Option<&str> {
        self.ecu_build.as_deref()
    }

    /// ECU number.
    #[must_use]
    pub fn ecu_nr_ecu(&self) -> Option<&str> {
        self.ecu_nr_ecu.as_deref()
    }

    /// ECU production number.
    #[must_use]
    pub fn ecu_nr_prod(&self) -> Option<&str> {
        self.ecu_nr_prod.as_deref()
    }

    /// Software name.
    #[must_use]
    pub fn software(&self) -> Option<&str> {
        self.software.as_deref()
    }

    /// Software version.
    #[must_use]
    pub fn software_version(&self) -> Option<&str> {
        self.software_version.as_deref()
    }

    /// When the purchase happened.
    #[must_use]
    pub const fn date(&self) -> Option<NaiveDateTime> {
        self.date
    }

    /// Every column that is not a known attribute.
    #[must_use]
    pub const fn options(&self) -> &PropertyBag {
        &self.options
    }

    /// One unknown column by name.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }
}

impl From<PropertyBag> for Purchase {
    fn from(bag: PropertyBag) -> Self {
        Self::from_bag(bag)
    }
}

/// Parse a purchase date, returning `None` for anything unrecognised.
fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
