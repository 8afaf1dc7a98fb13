use std::fs;
use std::path::Path;

use chrono::Local;

use crate::billing::{self, Money};
use crate::cli::{Opts, YML_EXAMPLE};
use crate::config::{self, Defaults, InvoiceConfig};
use crate::email;
use crate::error::RunError;
use crate::render;
use crate::templates;

/// One invoice per invocation: merge options, render the template to HTML,
/// produce the PDF, persist the counter, then optionally email the result.
/// The first failure aborts; nothing already written is rolled back.
pub fn run(opts: Opts) -> Result<(), RunError> {
    if opts.show_yml_example {
        print!("{}", YML_EXAMPLE);
        return Ok(());
    }

    let defaults = Defaults::load(&opts.yml)?;
    let config = InvoiceConfig::merge(&opts, &defaults, Local::now().date_naive())?;

    let template =
        fs::read_to_string(&opts.template).map_err(|_| RunError::TemplateNotFound {
            path: opts.template.clone(),
        })?;
    let html = build_html(&template, &config);

    let name = format!("invoice-{}.pdf", config.number());
    println!("Generating {}...", name);
    render::to_pdf(&html, Path::new(&name))?;

    config::bump_counter(&opts.yml)?;

    if email::send_invoice(&config, Path::new(&name))? {
        if let Some(mail) = &config.mail {
            println!("Sent {} to {}", name, mail.send_to);
        }
    }
    Ok(())
}

fn build_html(template: &str, config: &InvoiceConfig) -> String {
    let rows =
        templates::render_rows(&config.items, config.currency, &config.date_vars());
    let balance = Money::new(config.currency, billing::total(&config.items)).to_string();
    templates::substitute(template, &config.template_vars(rows, balance))
}
