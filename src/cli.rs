use clap::{Parser, ValueHint};
use std::path::PathBuf;

/// Generate a PDF invoice from CLI flags and a YAML defaults file.
///
/// Any flag left out is taken from the YAML file; an explicit flag wins over
/// the file. The file's `invoice_counter` is incremented after each
/// successful run.
#[derive(Parser, Debug)]
#[clap(name = "invoicer", version)]
pub struct Opts {
    /// Contents of client field
    #[clap(long)]
    pub client: Option<String>,

    /// Currency used (ISO 4217 code, default USD)
    #[clap(long)]
    pub currency: Option<String>,

    /// Invoice date, YYYY-MM-DD (default today)
    #[clap(long)]
    pub date: Option<String>,

    /// Due date, YYYY-MM-DD (default today + 5 days)
    #[clap(long)]
    pub due_date: Option<String>,

    /// Contents of from field
    #[clap(long)]
    pub from: Option<String>,

    /// Contents of the header
    #[clap(long)]
    pub header: Option<String>,

    /// Contents of notes field
    #[clap(long)]
    pub notes: Option<String>,

    /// PO number
    #[clap(long)]
    pub po: Option<String>,

    /// Invoice counter number
    #[clap(long)]
    pub invoice_counter: Option<String>,

    /// YML file with values for parameters not given on the command line
    #[clap(long, default_value = "invoice.yml", value_hint = ValueHint::FilePath)]
    pub yml: PathBuf,

    /// HTML template with %placeholder% tokens
    #[clap(long, default_value = "invoicegenerator.html",
        value_hint = ValueHint::FilePath)]
    pub template: PathBuf,

    /// Send generated invoice to this email
    #[clap(long)]
    pub send_to: Option<String>,

    /// SMTP server address
    #[clap(long)]
    pub smtp_address: Option<String>,

    /// SMTP server port
    #[clap(long)]
    pub smtp_port: Option<u16>,

    /// SMTP user
    #[clap(long)]
    pub smtp_user: Option<String>,

    /// SMTP password
    #[clap(long)]
    pub smtp_password: Option<String>,

    /// Show an example of a YML file that can be used by this program
    #[clap(long)]
    pub show_yml_example: bool,
}

pub const YML_EXAMPLE: &str = "\
from: |
  My multiline name
  Here's a second line
client: |
  My multiline client
  Hey ho, second line here
notes: |
  If all your data are always the same, just the invoice number changes,
  save the static data in a yml and pass the counter on the command line
  by using (--invoice-counter).

  Note that the date always defaults to today, and the due-date to today + 5
items:
  -
    - Nice item for %past_month% %year%
    - 1
    - 12334
  -
    - Other item, for %month%
    - 0.5
    - 100000
currency: GBP
invoice_counter: 1
";
