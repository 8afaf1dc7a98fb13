use std::fs;
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;
use serde_yaml::Value;

use crate::billing::{Currency, LineItem};
use crate::calendar::{self, LongForm};
use crate::cli::Opts;
use crate::error::RunError;

/// Optional values read from the YAML defaults file. Keys mirror the CLI
/// flags; unknown keys are ignored.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
pub struct Defaults {
    pub client: Option<String>,
    pub from: Option<String>,
    pub header: Option<String>,
    pub notes: Option<String>,
    pub po: Option<String>,
    pub currency: Option<String>,
    pub date: Option<String>,
    pub due_date: Option<String>,
    pub invoice_counter: Option<Value>,
    pub items: Option<Value>,
    pub send_to: Option<String>,
    pub smtp_address: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl Defaults {
    pub fn load(path: &Path) -> Result<Self, RunError> {
        let text = fs::read_to_string(path).map_err(|_| RunError::DefaultsNotFound {
            path: path.to_path_buf(),
        })?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

/// Complete SMTP delivery settings. Only constructed when the recipient and
/// the full credential set are all present; anything less means the email
/// step is skipped.
#[derive(Debug, PartialEq, Clone)]
pub struct MailConfig {
    pub send_to: String,
    pub address: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// Resolved invoice parameters, immutable after `merge`.
#[derive(Debug, PartialEq)]
pub struct InvoiceConfig {
    pub client: String,
    pub from: String,
    pub header: String,
    pub notes: String,
    pub po: String,
    pub currency: Currency,
    pub date: NaiveDate,
    pub due_date: NaiveDate,
    pub counter: u64,
    pub items: Vec<LineItem>,
    pub today: NaiveDate,
    pub mail: Option<MailConfig>,
}

fn pick(flag: &Option<String>, fallback: &Option<String>) -> String {
    flag.clone().or_else(|| fallback.clone()).unwrap_or_default()
}

fn counter_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl InvoiceConfig {
    /// Merge CLI flags over the YAML defaults. An explicitly supplied flag
    /// wins; the file fills the gaps; fixed defaults fill the rest.
    pub fn merge(cli: &Opts, defaults: &Defaults, today: NaiveDate) -> Result<Self, RunError> {
        let currency_code = cli
            .currency
            .clone()
            .or_else(|| defaults.currency.clone())
            .unwrap_or_else(|| "USD".to_string());
        let currency = Currency::from_code(&currency_code)?;

        let date = match cli.date.as_ref().or(defaults.date.as_ref()) {
            Some(value) => calendar::parse_date(value)?,
            None => today,
        };
        let due_date = match cli.due_date.as_ref().or(defaults.due_date.as_ref()) {
            Some(value) => calendar::parse_date(value)?,
            None => today + Duration::days(5),
        };

        let counter = match (&cli.invoice_counter, &defaults.invoice_counter) {
            (Some(flag), _) => flag.trim().parse().map_err(|_| RunError::BadCounter {
                value: flag.clone(),
            })?,
            (None, Some(value)) => {
                counter_from_value(value).ok_or_else(|| RunError::BadCounter {
                    value: serde_yaml::to_string(value)
                        .unwrap_or_default()
                        .trim()
                        .to_string(),
                })?
            }
            (None, None) => 0,
        };

        let sequence = defaults
            .items
            .as_ref()
            .and_then(Value::as_sequence)
            .ok_or(RunError::ItemsNotASequence)?;
        let items = sequence
            .iter()
            .enumerate()
            .map(|(index, value)| LineItem::from_yaml(index, value))
            .collect::<Result<Vec<_>, _>>()?;

        let send_to = cli
            .send_to
            .clone()
            .or_else(|| defaults.send_to.clone())
            .filter(|addr| !addr.is_empty());
        let port = cli.smtp_port.or(defaults.smtp_port).unwrap_or(587);
        let mail = match (
            send_to,
            pick_some(&cli.smtp_address, &defaults.smtp_address),
            pick_some(&cli.smtp_user, &defaults.smtp_user),
            pick_some(&cli.smtp_password, &defaults.smtp_password),
        ) {
            (Some(send_to), Some(address), Some(user), Some(password)) => Some(MailConfig {
                send_to,
                address,
                port,
                user,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            client: pick(&cli.client, &defaults.client),
            from: pick(&cli.from, &defaults.from),
            header: cli
                .header
                .clone()
                .or_else(|| defaults.header.clone())
                .unwrap_or_else(|| "Invoice".to_string()),
            notes: pick(&cli.notes, &defaults.notes),
            po: pick(&cli.po, &defaults.po),
            currency,
            date,
            due_date,
            counter,
            items,
            today,
            mail,
        })
    }

    /// The issued invoice number: one past the persisted counter, zero-padded
    /// to 6 digits. The same value is written back by `bump_counter`.
    pub fn number(&self) -> String {
        format!("{:06}", self.counter + 1)
    }

    /// Fields derived from the run date, available as placeholders inside
    /// item descriptions as well as the main template.
    pub fn date_vars(&self) -> Vec<(String, String)> {
        vec![
            ("month".to_string(), self.today.format("%B").to_string()),
            (
                "past_month".to_string(),
                self.today.previous_month().format("%B").to_string(),
            ),
            ("year".to_string(), self.today.year().to_string()),
        ]
    }

    /// The fixed set of template placeholders. SMTP settings are deliberately
    /// not part of it.
    pub fn template_vars(&self, rows: String, balance: String) -> Vec<(String, String)> {
        let mut vars = vec![
            ("client".to_string(), self.client.clone()),
            ("from".to_string(), self.from.clone()),
            ("header".to_string(), self.header.clone()),
            ("notes".to_string(), self.notes.clone()),
            ("po".to_string(), self.po.clone()),
            ("currency".to_string(), self.currency.to_string()),
            ("date".to_string(), self.date.long_form()),
            ("due_date".to_string(), self.due_date.long_form()),
            ("number".to_string(), self.number()),
            ("items".to_string(), rows),
            ("balance".to_string(), balance),
        ];
        vars.extend(self.date_vars());
        vars
    }
}

fn pick_some(flag: &Option<String>, fallback: &Option<String>) -> Option<String> {
    flag.clone().or_else(|| fallback.clone())
}

/// Increment `invoice_counter` in the YAML file and write the whole document
/// back via a temp-file rename, leaving unrelated keys untouched. Returns the
/// new counter value.
pub fn bump_counter(path: &Path) -> Result<u64, RunError> {
    let text = fs::read_to_string(path).map_err(|_| RunError::DefaultsNotFound {
        path: path.to_path_buf(),
    })?;
    let mut doc: serde_yaml::Mapping = serde_yaml::from_str(&text)?;

    let key = Value::from("invoice_counter");
    let next = doc.get(&key).and_then(counter_from_value).unwrap_or(0) + 1;
    doc.insert(key, Value::from(next));

    let updated = path.with_extension("updated");
    fs::write(&updated, serde_yaml::to_string(&doc)?)?;
    fs::rename(&updated, path)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rust_decimal_macros::dec;

    const ITEMS_ONLY: &str = "items:\n  - [Widget, 2, 500]\n";

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn opts(args: &[&str]) -> Opts {
        let mut argv = vec!["invoicer"];
        argv.extend(args);
        Opts::try_parse_from(argv).unwrap()
    }

    fn defaults(yaml: &str) -> Defaults {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn cli_flag_wins_over_yaml() {
        let yaml = defaults(&format!("client: File Corp\n{}", ITEMS_ONLY));
        let config = InvoiceConfig::merge(
            &opts(&["--client", "Flag Corp"]),
            &yaml,
            ymd(2024, 3, 15),
        )
        .unwrap();
        assert_eq!(config.client, "Flag Corp");
    }

    #[test]
    fn yaml_fills_missing_flags() {
        let yaml = defaults(&format!(
            "client: File Corp\ncurrency: GBP\npo: PO-77\n{}",
            ITEMS_ONLY
        ));
        let config = InvoiceConfig::merge(&opts(&[]), &yaml, ymd(2024, 3, 15)).unwrap();
        assert_eq!(config.client, "File Corp");
        assert_eq!(config.currency, Currency::Gbp);
        assert_eq!(config.po, "PO-77");
        assert_eq!(config.header, "Invoice");
    }

    #[test]
    fn date_defaults_to_today_and_due_date_five_days_later() {
        let today = ymd(2024, 3, 15);
        let config =
            InvoiceConfig::merge(&opts(&[]), &defaults(ITEMS_ONLY), today).unwrap();
        assert_eq!(config.date, today);
        assert_eq!(config.due_date, ymd(2024, 3, 20));
    }

    #[test]
    fn explicit_dates_are_parsed() {
        let config = InvoiceConfig::merge(
            &opts(&["--date", "2024-03-04", "--due-date", "2024-04-01"]),
            &defaults(ITEMS_ONLY),
            ymd(2024, 3, 15),
        )
        .unwrap();
        assert_eq!(config.date, ymd(2024, 3, 4));
        assert_eq!(config.due_date, ymd(2024, 4, 1));
    }

    #[test]
    fn unparseable_date_is_an_error() {
        let result = InvoiceConfig::merge(
            &opts(&["--date", "soonish"]),
            &defaults(ITEMS_ONLY),
            ymd(2024, 3, 15),
        );
        assert!(matches!(result, Err(RunError::DateParse { .. })));
    }

    #[test]
    fn missing_items_fails() {
        let result =
            InvoiceConfig::merge(&opts(&[]), &defaults("client: X\n"), ymd(2024, 3, 15));
        assert!(matches!(result, Err(RunError::ItemsNotASequence)));
    }

    #[test]
    fn items_as_string_fails() {
        let result = InvoiceConfig::merge(
            &opts(&[]),
            &defaults("items: not a list\n"),
            ymd(2024, 3, 15),
        );
        assert!(matches!(result, Err(RunError::ItemsNotASequence)));
    }

    #[test]
    fn items_are_decoded() {
        let yaml = defaults("items:\n  - [Widget, 2, 500]\n  - [Half, 0.5, 100]\n");
        let config = InvoiceConfig::merge(&opts(&[]), &yaml, ymd(2024, 3, 15)).unwrap();
        assert_eq!(config.items.len(), 2);
        assert_eq!(config.items[0].description, "Widget");
        assert_eq!(config.items[1].quantity, dec!(0.5));
    }

    #[test]
    fn counter_accepts_int_and_string_forms() {
        let today = ymd(2024, 3, 15);
        let from_int =
            InvoiceConfig::merge(&opts(&[]), &defaults(&format!("invoice_counter: 41\n{}", ITEMS_ONLY)), today)
                .unwrap();
        assert_eq!(from_int.number(), "000042");

        let from_string = InvoiceConfig::merge(
            &opts(&[]),
            &defaults(&format!("invoice_counter: '41'\n{}", ITEMS_ONLY)),
            today,
        )
        .unwrap();
        assert_eq!(from_string.number(), "000042");

        let from_flag = InvoiceConfig::merge(
            &opts(&["--invoice-counter", "7"]),
            &defaults(ITEMS_ONLY),
            today,
        )
        .unwrap();
        assert_eq!(from_flag.number(), "000008");
    }

    #[test]
    fn non_numeric_counter_fails() {
        let result = InvoiceConfig::merge(
            &opts(&["--invoice-counter", "many"]),
            &defaults(ITEMS_ONLY),
            ymd(2024, 3, 15),
        );
        assert!(matches!(result, Err(RunError::BadCounter { .. })));
    }

    #[test]
    fn date_vars_follow_the_run_date() {
        let config =
            InvoiceConfig::merge(&opts(&[]), &defaults(ITEMS_ONLY), ymd(2024, 1, 10))
                .unwrap();
        let vars = config.date_vars();
        assert!(vars.contains(&("month".to_string(), "January".to_string())));
        assert!(vars.contains(&("past_month".to_string(), "December".to_string())));
        assert!(vars.contains(&("year".to_string(), "2024".to_string())));
    }

    #[test]
    fn template_vars_exclude_smtp_settings() {
        let yaml = defaults(&format!(
            "send_to: a@b.c\nsmtp_address: mail.example\n\
             smtp_user: u\nsmtp_password: hunter2\n{}",
            ITEMS_ONLY
        ));
        let config = InvoiceConfig::merge(&opts(&[]), &yaml, ymd(2024, 3, 15)).unwrap();
        let vars = config.template_vars(String::new(), String::new());
        assert!(vars.iter().all(|(name, _)| !name.starts_with("smtp")));
        assert!(vars.iter().all(|(_, value)| value != "hunter2"));
    }

    #[test]
    fn mail_config_requires_full_credentials() {
        let partial = defaults(&format!(
            "send_to: a@b.c\nsmtp_address: mail.example\n{}",
            ITEMS_ONLY
        ));
        let config =
            InvoiceConfig::merge(&opts(&[]), &partial, ymd(2024, 3, 15)).unwrap();
        assert_eq!(config.mail, None);

        let full = defaults(&format!(
            "send_to: a@b.c\nsmtp_address: mail.example\n\
             smtp_user: u\nsmtp_password: p\n{}",
            ITEMS_ONLY
        ));
        let config = InvoiceConfig::merge(&opts(&[]), &full, ymd(2024, 3, 15)).unwrap();
        let mail = config.mail.unwrap();
        assert_eq!(mail.port, 587);
        assert_eq!(mail.send_to, "a@b.c");
    }

    #[test]
    fn missing_defaults_file() {
        let result = Defaults::load(Path::new("no/such/file.yml"));
        assert!(matches!(result, Err(RunError::DefaultsNotFound { .. })));
    }

    #[test]
    fn bump_increments_and_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.yml");
        fs::write(&path, "client: Acme\ninvoice_counter: 41\n").unwrap();

        assert_eq!(bump_counter(&path).unwrap(), 42);

        let reread = Defaults::load(&path).unwrap();
        assert_eq!(reread.client.as_deref(), Some("Acme"));
        assert_eq!(
            reread.invoice_counter.and_then(|v| counter_from_value(&v)),
            Some(42)
        );
    }

    #[test]
    fn bump_starts_from_zero_when_counter_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.yml");
        fs::write(&path, "client: Acme\n").unwrap();
        assert_eq!(bump_counter(&path).unwrap(), 1);
    }
}
